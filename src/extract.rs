//! Extraction entry points: document in, tariff table out.
//!
//! Each call runs the full chain once: resolve the input, obtain Markdown,
//! parse it, and optionally export the table. Nothing is cached between
//! calls, so independent documents can be extracted concurrently.

use crate::config::ExtractionConfig;
use crate::error::TariffError;
use crate::export::{export_table, write_table};
use crate::output::{ExtractionOutput, ExtractionStats};
use crate::pipeline::{input, markdown};
use crate::tariff::parse_tariff_table;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Extract the tariff table from a PDF or Markdown file, or an HTTP(S) URL.
///
/// # Returns
/// `Ok(ExtractionOutput)` whenever the input could be read, even if it
/// yielded no rows (check `output.total_rows`, or call
/// [`ExtractionOutput::into_result`]).
///
/// # Errors
/// Only for acquisition failures: missing or unreadable file, failed
/// download, unsupported file type, invalid configuration.
pub async fn extract(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, TariffError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting extraction: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;

    // ── Step 2: Obtain Markdown ──────────────────────────────────────────
    let acquire_start = Instant::now();
    let md = markdown::acquire_markdown(&resolved, config).await?;
    let acquire_duration_ms = acquire_start.elapsed().as_millis() as u64;

    // ── Step 3: Parse ────────────────────────────────────────────────────
    let parse_start = Instant::now();
    let table = parse_tariff_table(&md);
    let parse_duration_ms = parse_start.elapsed().as_millis() as u64;

    // ── Step 4: Optional export ──────────────────────────────────────────
    if let Some(ref path) = config.export_path {
        export_table(&table, path);
    }

    let stats = ExtractionStats {
        source_kind: resolved.kind(),
        markdown_bytes: md.len(),
        total_rows: table.len(),
        rows_with_unit: table.entries().iter().filter(|e| e.uncode.is_some()).count(),
        unknown_base_rows: table.entries().iter().filter(|e| e.has_unknown_base()).count(),
        acquire_duration_ms,
        parse_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Extraction complete: {} rows from {:?} input, {}ms total",
        stats.total_rows, stats.source_kind, stats.total_duration_ms
    );

    let markdown = config.include_markdown.then_some(md);
    Ok(ExtractionOutput::new(
        resolved.display_name(),
        table,
        stats,
        markdown,
    ))
}

/// Extract a document held in memory.
///
/// The bytes are written to a managed [`tempfile`] whose suffix comes from
/// `filename` (so a `.md` upload is read as Markdown); the file is removed
/// when this returns, or on panic. The output reports `filename`, not the
/// scratch name.
///
/// # Example
/// ```rust,no_run
/// use customs_tariff_md::{extract_from_bytes, ExtractionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("chapter10.pdf")?;
/// let output = extract_from_bytes(&bytes, "chapter10.pdf", &ExtractionConfig::default()).await?;
/// println!("{} rows", output.total_rows);
/// # Ok(())
/// # }
/// ```
pub async fn extract_from_bytes(
    bytes: &[u8],
    filename: &str,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, TariffError> {
    let suffix = Path::new(filename)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let mut tmp = tempfile::Builder::new()
        .prefix("tariff-upload-")
        .suffix(&suffix)
        .tempfile()
        .map_err(|e| TariffError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| TariffError::Internal(format!("tempfile write: {e}")))?;
    tmp.flush()
        .map_err(|e| TariffError::Internal(format!("tempfile write: {e}")))?;

    let path = tmp.path().to_string_lossy().to_string();
    // `tmp` is dropped (and the file deleted) when `extract` returns
    let mut output = extract(&path, config).await?;
    output.filename = filename.to_string();
    Ok(output)
}

/// Extract and write the table directly to a `.json` or `.csv` file.
///
/// Unlike [`ExtractionConfig::export_path`], a write failure here is an
/// error: the file is the point of the call.
pub async fn extract_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, TariffError> {
    let output = extract(input_str, config).await?;
    write_table(&output.data, output_path.as_ref())?;
    Ok(output.stats)
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, TariffError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| TariffError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input_str, config))
}
