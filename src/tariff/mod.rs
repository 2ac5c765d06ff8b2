//! The tariff-text parser: Markdown in, sorted tariff table out.
//!
//! Converted tariff PDFs arrive as one flat run of Markdown in which heading
//! codes, statistical codes with units, and Thai/English descriptions are
//! interleaved without reliable delimiters. Each submodule implements one
//! stage of rebuilding the hierarchy.
//!
//! ## Data Flow
//!
//! ```text
//! markdown ──▶ tokenize ──▶ interpret ──▶ backfill ──▶ finalize
//!              (Code/Stat/   (heading +    (unit from   (sort by
//!               Text)         stat rows)    children)    hscode)
//!                               │
//!                               └── describe (Thai/English split per row)
//! ```
//!
//! 1. [`tokenize`]  — split on the tariff-code and statistical-code patterns
//! 2. [`interpret`] — single forward pass with the current heading as fold
//!    state; one row per childless heading and per statistical code
//! 3. [`describe`]  — normalise a raw description into Thai and English runs
//! 4. [`backfill`]  — headings without a unit take their first child's unit
//! 5. [`finalize`]  — lexicographic sort by code, dense re-indexing
//!
//! Every stage is a pure function. Nothing is shared between invocations, so
//! separate documents can be parsed on separate threads without locking.

pub mod backfill;
pub mod describe;
pub mod finalize;
pub mod interpret;
pub mod tokenize;

use crate::output::TariffTable;
use tracing::debug;

/// Parse converted tariff Markdown into a sorted table.
///
/// Never fails: empty input gives an empty table and malformed content
/// degrades into best-effort rows.
///
/// # Example
/// ```rust
/// use customs_tariff_md::parse_tariff_table;
///
/// let md = "10.06 ข้าว Rice\n1006.20.10 006/KGM ข้าวหอมมะลิ Hom Mali";
/// let table = parse_tariff_table(md);
/// let codes: Vec<&str> = table.entries().iter().map(|e| e.hscode.as_str()).collect();
/// assert_eq!(codes, ["1006", "1006.20.10.006"]);
/// assert_eq!(table.entries()[0].uncode.as_deref(), Some("KGM"));
/// ```
pub fn parse_tariff_table(markdown: &str) -> TariffTable {
    if markdown.trim().is_empty() {
        return TariffTable::default();
    }

    let tokens = tokenize::tokenize(markdown);
    let mut entries = interpret::interpret(&tokens);
    debug!(
        tokens = tokens.len(),
        entries = entries.len(),
        "interpreted tariff tokens"
    );

    backfill::backfill_units(&mut entries);
    finalize::finalize(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_input_give_empty_table() {
        assert!(parse_tariff_table("").is_empty());
        assert!(parse_tariff_table("  \n\t ").is_empty());
    }

    #[test]
    fn text_without_codes_gives_empty_table() {
        assert!(parse_tariff_table("| ประเภท | Description |\n|---|---|").is_empty());
    }

    #[test]
    fn full_chapter_fragment() {
        let md = "\
ตอนที่ 2 ผลิตภัณฑ์จากพืช
10.06 ข้าว Rice
1006.20 ข้าวกล้อง Husked (brown) rice
1006.20.10 000/KGM - - ข้าวหอมมะลิ Hom Mali rice
1006.20.90 011/KGM - - ข้าวเหนียว Glutinous rice
090/KGM - - อื่น ๆ Other
";
        let table = parse_tariff_table(md);
        let codes: Vec<&str> = table.entries().iter().map(|e| e.hscode.as_str()).collect();
        assert_eq!(
            codes,
            [
                "1006",
                "1006.20",
                "1006.20.10",
                "1006.20.90.011",
                "1006.20.90.090",
            ]
        );

        let rice = table.get("1006").unwrap();
        assert_eq!(rice.thdescription, "ข้าว");
        assert_eq!(rice.endescription, "Rice");
        // first descendant with a unit in document order
        assert_eq!(rice.uncode.as_deref(), Some("KGM"));

        let hom_mali = table.get("1006.20.10").unwrap();
        assert_eq!(hom_mali.thdescription, "ข้าวหอมมะลิ");
        assert_eq!(hom_mali.endescription, "Hom Mali rice");

        let other = table.get("1006.20.90.090").unwrap();
        assert_eq!(other.thdescription, "อื่น ๆ");
        assert_eq!(other.endescription, "Other");
    }

    #[test]
    fn shallower_code_after_deep_code_is_treated_as_reference() {
        let md = "1006.10.10 000/KGM เพื่อใช้ทำพันธุ์ For sowing\n1006.20 ข้าวกล้อง Husked 090/KGM อื่น ๆ Other";
        let table = parse_tariff_table(md);
        let codes: Vec<&str> = table.entries().iter().map(|e| e.hscode.as_str()).collect();
        assert_eq!(codes, ["1006.10.10", "1006.10.10.090"]);
    }

    #[test]
    fn statistical_rows_carry_heading_prefix() {
        let md = "0101.21 ม้า Horses 010/NMB พันธุ์แท้ Pure-bred 090/NMB อื่น ๆ Other";
        let table = parse_tariff_table(md);
        for e in table.entries() {
            assert!(e.hscode.starts_with("0101.21"), "{}", e.hscode);
        }
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("0101.21").and_then(|e| e.uncode.as_deref()), Some("NMB"));
    }
}
