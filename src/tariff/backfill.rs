//! Unit backfill: headings inherit the unit of their first descendant.

use crate::output::TariffEntry;
use tracing::trace;

/// Fill missing units from the nearest following descendant that has one.
///
/// Operates on rows in document order. For a row without a unit, the rows
/// right after it whose codes extend its code form its family; the first of
/// those with a unit supplies it. The scan stops where the family ends, so
/// units never leak across sibling groups.
pub fn backfill_units(entries: &mut [TariffEntry]) {
    for idx in 0..entries.len() {
        if entries[idx].uncode.is_some() {
            continue;
        }

        let (head, tail) = entries.split_at_mut(idx + 1);
        let parent = &mut head[idx];
        let inherited = tail
            .iter()
            .take_while(|child| is_descendant(&child.hscode, &parent.hscode))
            .find_map(|child| child.uncode.clone());

        if let Some(unit) = inherited {
            trace!(hscode = %parent.hscode, unit = %unit, "backfilled unit");
            parent.uncode = Some(unit);
        }
    }
}

/// `code` extends `parent` (a proper prefix; equal codes are siblings).
fn is_descendant(code: &str, parent: &str) -> bool {
    code.len() > parent.len() && code.starts_with(parent)
}
