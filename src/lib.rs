//! # customs-tariff-md
//!
//! Extract the Thai customs tariff table (HS code, statistical suffix, unit,
//! Thai and English description) from tariff schedule PDFs.
//!
//! The schedules come as scanned or typeset PDFs. A vision model turns them
//! into Markdown, but the hierarchy of the table does not survive: heading
//! codes, statistical codes and bilingual descriptions arrive as one flat
//! stream. The tariff parser rebuilds the rows from that stream.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / Markdown / URL
//!  │
//!  ├─ 1. Input     resolve local file or download from URL, detect PDF vs Markdown
//!  ├─ 2. Markdown  read as-is, or convert the PDF with a vision model
//!  ├─ 3. Tokenize  split on tariff codes and statistical codes
//!  ├─ 4. Interpret one pass, current heading as state → rows
//!  ├─ 5. Backfill  headings inherit their first child's unit
//!  ├─ 6. Finalize  sort by code
//!  └─ 7. Output    response envelope + stats, optional JSON/CSV file
//! ```
//!
//! ## Quick Start
//!
//! Parsing Markdown needs nothing else:
//!
//! ```rust
//! use customs_tariff_md::parse_tariff_table;
//!
//! let table = parse_tariff_table("1006.20.10 000/KGM ข้าวหอมมะลิ Hom Mali rice");
//! let row = &table.entries()[0];
//! assert_eq!(row.hscode, "1006.20.10");
//! assert_eq!(row.uncode.as_deref(), Some("KGM"));
//! assert_eq!(row.thdescription, "ข้าวหอมมะลิ");
//! assert_eq!(row.endescription, "Hom Mali rice");
//! ```
//!
//! Extracting from a PDF converts it first (provider auto-detected from
//! `OPENAI_API_KEY` / `ANTHROPIC_API_KEY` / `GEMINI_API_KEY`):
//!
//! ```rust,no_run
//! use customs_tariff_md::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder().export_path("chapter10.csv").build()?;
//!     let output = extract("chapter10.pdf", &config).await?;
//!     println!("{}: {} rows", output.filename, output.total_rows);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature   | Default | Description |
//! |-----------|---------|-------------|
//! | `cli`     | on      | Enables the `tariff2table` binary (clap + anyhow + tracing-subscriber) |
//! | `bundled` | off     | Embed the PDFium library in the binary |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod tariff;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use edgequake_pdf2md::PageSelection;
pub use error::TariffError;
pub use export::{export_table, write_csv_rows, write_table, ExportFormat};
pub use extract::{extract, extract_from_bytes, extract_sync, extract_to_file};
pub use output::{ExtractionOutput, ExtractionStats, TariffEntry, TariffTable};
pub use pipeline::input::SourceKind;
pub use pipeline::markdown::{MarkdownConverter, VisionConverter};
pub use tariff::describe::{normalize_description, Description};
pub use tariff::parse_tariff_table;
