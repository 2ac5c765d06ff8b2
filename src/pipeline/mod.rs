//! Acquisition stages in front of the tariff parser.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ markdown ──▶ tariff::parse_tariff_table
//! (URL/path,  (read .md or
//!  PDF/MD)     convert PDF)
//! ```
//!
//! 1. [`input`]    — canonicalise the user-supplied path or URL to a local
//!    file and classify it as PDF or Markdown
//! 2. [`markdown`] — read Markdown as-is, or run the PDF through a
//!    [`markdown::MarkdownConverter`]; the only stage with network I/O

pub mod input;
pub mod markdown;
