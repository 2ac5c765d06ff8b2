//! Table finalization: sort by code.

use crate::output::{TariffEntry, TariffTable};
use tracing::warn;

/// Sort rows by `hscode` (plain string order) and wrap them in a table.
///
/// The sort is stable, so rows sharing a code keep their document order.
/// A row with an empty code cannot be placed in the hierarchy; when one is
/// present the rows are returned in document order instead.
pub fn finalize(mut entries: Vec<TariffEntry>) -> TariffTable {
    if let Some(pos) = entries.iter().position(|e| e.hscode.is_empty()) {
        warn!(
            row = pos,
            rows = entries.len(),
            "row without tariff code; keeping document order"
        );
        return TariffTable::from_entries(entries);
    }

    entries.sort_by(|a, b| a.hscode.cmp(&b.hscode));
    TariffTable::from_entries(entries)
}
