//! Markdown acquisition: turn a resolved input into the text the tariff
//! parser reads.
//!
//! Markdown inputs are read as-is. PDFs go through a [`MarkdownConverter`];
//! the default is [`VisionConverter`], which rasterises each page and has a
//! vision model transcribe it via `edgequake-pdf2md`.
//!
//! A converter never fails. Whatever goes wrong inside it (missing API key,
//! every page timing out, a corrupt PDF) is logged and surfaces as empty
//! text, which the parser turns into an empty table.

use crate::config::ExtractionConfig;
use crate::error::TariffError;
use crate::pipeline::input::{ResolvedInput, SourceKind};
use async_trait::async_trait;
use edgequake_pdf2md::ConversionConfig;
use std::path::Path;
use tracing::{debug, info, warn};

/// Converts a PDF on disk into Markdown text.
///
/// Implement this to plug in another conversion backend, or to feed canned
/// Markdown in tests. Implementations return an empty string on failure.
#[async_trait]
pub trait MarkdownConverter: Send + Sync {
    async fn convert(&self, pdf_path: &Path) -> String;
}

/// Vision-LLM PDF converter backed by `edgequake-pdf2md`.
///
/// Needs the PDFium library and an LLM provider key in the environment
/// (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, ...).
#[derive(Debug, Clone)]
pub struct VisionConverter {
    config: ConversionConfig,
}

impl VisionConverter {
    pub fn new(config: ConversionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl MarkdownConverter for VisionConverter {
    async fn convert(&self, pdf_path: &Path) -> String {
        let input = pdf_path.to_string_lossy();
        match edgequake_pdf2md::convert(input.as_ref(), &self.config).await {
            Ok(output) => {
                info!(
                    pages = output.stats.processed_pages,
                    bytes = output.markdown.len(),
                    "PDF converted to Markdown"
                );
                output.markdown
            }
            Err(e) => {
                warn!("PDF conversion failed for {}: {}", pdf_path.display(), e);
                String::new()
            }
        }
    }
}

/// Obtain Markdown for a resolved input.
///
/// Reading a Markdown file can fail here, and so can building the converter
/// for a PDF. Converter settings are not looked at for Markdown inputs. PDF
/// conversion failures come back as empty text.
pub async fn acquire_markdown(
    resolved: &ResolvedInput,
    config: &ExtractionConfig,
) -> Result<String, TariffError> {
    match resolved.kind() {
        SourceKind::Markdown => {
            let path = resolved.path();
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|source| TariffError::ReadFailed {
                    path: path.to_path_buf(),
                    source,
                })?;
            debug!(path = %path.display(), bytes = bytes.len(), "read Markdown input");
            Ok(decode_text(bytes))
        }
        SourceKind::Pdf => {
            let converter = config.resolve_converter()?;
            let markdown = converter.convert(resolved.path()).await;
            if markdown.trim().is_empty() {
                warn!(
                    "Converter returned no text for {}",
                    resolved.path().display()
                );
            }
            Ok(markdown)
        }
    }
}

/// UTF-8 text with an optional BOM; invalid sequences are replaced.
fn decode_text(bytes: Vec<u8>) -> String {
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes[..]);
    match std::str::from_utf8(body) {
        Ok(s) => s.to_string(),
        Err(_) => {
            warn!("Markdown input is not valid UTF-8; replacing invalid bytes");
            String::from_utf8_lossy(body).into_owned()
        }
    }
}
