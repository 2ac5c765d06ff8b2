//! Error types for the customs-tariff-md library.
//!
//! Only *acquisition* can fail: the input file is missing, the URL cannot be
//! downloaded, the bytes are neither a PDF nor Markdown, or an output file
//! cannot be written. Those are returned as [`TariffError`] from the
//! `extract*` entry points.
//!
//! The tariff parser itself never fails on malformed content. A stray
//! statistical code, an unsortable table or an empty conversion all degrade
//! into best-effort rows (see [`crate::tariff`]) and are reported through
//! `tracing` warnings rather than errors.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the customs-tariff-md library.
#[derive(Debug, Error)]
pub enum TariffError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is neither a file path nor a valid URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file is neither a PDF (by magic bytes) nor Markdown/text (by extension).
    #[error(
        "Unsupported input '{path}': expected a PDF or a Markdown/text file\nFirst bytes: {magic:?}"
    )]
    UnsupportedInput { path: PathBuf, magic: Vec<u8> },

    /// A Markdown input could not be read as UTF-8 text.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output table file.
    #[error("Failed to write output file '{path}': {detail}")]
    OutputWriteFailed { path: PathBuf, detail: String },

    /// The export path has an extension we cannot serialise to.
    #[error("Unsupported export format for '{path}'\nUse a .json or .csv file name.")]
    UnsupportedExportFormat { path: PathBuf },

    /// The document converted fine but contained no tariff rows.
    ///
    /// Returned only by [`crate::output::ExtractionOutput::into_result`]
    /// for callers that treat an empty table as a failure.
    #[error("No tariff data found in '{source_name}'")]
    NoTariffData { source_name: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
