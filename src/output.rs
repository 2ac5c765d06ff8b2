//! Output types: tariff rows, the finalized table, and the extraction envelope.

use crate::error::TariffError;
use crate::pipeline::input::SourceKind;
use serde::{Deserialize, Serialize};

/// Base code used when a statistical code appears before any heading.
pub const UNKNOWN_BASE: &str = "UNKNOWN";

/// One row of the tariff table.
///
/// Serialised as `hscode`, `uncode`, `thdescriptions`, `endescriptions`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TariffEntry {
    /// Dotted tariff code, optionally with a statistical suffix
    /// (`"1006.20.10"`, `"1006.20.10.006"`).
    pub hscode: String,
    /// Unit of measure (`"KGM"`), if known.
    pub uncode: Option<String>,
    /// Thai-script description, or empty.
    #[serde(rename = "thdescriptions")]
    pub thdescription: String,
    /// English-script description, or empty.
    #[serde(rename = "endescriptions")]
    pub endescription: String,
}

impl TariffEntry {
    /// Whether this row hangs off the `UNKNOWN` placeholder base.
    pub fn has_unknown_base(&self) -> bool {
        self.hscode.starts_with(UNKNOWN_BASE)
    }
}

/// The finalized, sorted tariff table.
///
/// A row's position is its zero-based index; positions are dense and are
/// re-assigned whenever the table is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TariffTable {
    entries: Vec<TariffEntry>,
}

impl TariffTable {
    pub(crate) fn from_entries(entries: Vec<TariffEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TariffEntry] {
        &self.entries
    }

    /// Rows paired with their dense zero-based position.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &TariffEntry)> {
        self.entries.iter().enumerate()
    }

    /// Look up a row by its exact code.
    pub fn get(&self, hscode: &str) -> Option<&TariffEntry> {
        self.entries.iter().find(|e| e.hscode == hscode)
    }

    pub fn into_entries(self) -> Vec<TariffEntry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a TariffTable {
    type Item = &'a TariffEntry;
    type IntoIter = std::slice::Iter<'a, TariffEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Message returned alongside a non-empty table.
pub const MESSAGE_OK: &str = "extraction completed";
/// Message returned when the document yielded no rows.
pub const MESSAGE_EMPTY: &str = "no tariff data found";

/// Statistics for one extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Whether the source was a PDF (converted) or Markdown (read as-is).
    pub source_kind: SourceKind,
    /// Length of the Markdown text fed to the parser, in bytes.
    pub markdown_bytes: usize,
    /// Rows in the finalized table.
    pub total_rows: usize,
    /// Rows that carry a unit after backfilling.
    pub rows_with_unit: usize,
    /// Rows whose code fell back to the `UNKNOWN` base.
    pub unknown_base_rows: usize,
    /// Wall-clock time spent obtaining Markdown (conversion or file read).
    pub acquire_duration_ms: u64,
    /// Wall-clock time spent in the tariff parser.
    pub parse_duration_ms: u64,
    /// Total wall-clock time.
    pub total_duration_ms: u64,
}

/// Result of a full extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Display name of the source document.
    pub filename: String,
    /// Number of rows in `data`.
    pub total_rows: usize,
    /// The finalized tariff table.
    pub data: TariffTable,
    /// Human-readable status line.
    pub message: String,
    /// Timing and row statistics.
    pub stats: ExtractionStats,
    /// The intermediate Markdown, when `include_markdown` was set.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub markdown: Option<String>,
}

impl ExtractionOutput {
    pub(crate) fn new(
        filename: String,
        data: TariffTable,
        stats: ExtractionStats,
        markdown: Option<String>,
    ) -> Self {
        let message = if data.is_empty() {
            MESSAGE_EMPTY
        } else {
            MESSAGE_OK
        };
        Self {
            filename,
            total_rows: data.len(),
            data,
            message: message.to_string(),
            stats,
            markdown,
        }
    }

    /// Treat an empty table as [`TariffError::NoTariffData`].
    pub fn into_result(self) -> Result<Self, TariffError> {
        if self.data.is_empty() {
            Err(TariffError::NoTariffData {
                source_name: self.filename,
            })
        } else {
            Ok(self)
        }
    }
}
