//! Input resolution: normalise a user-supplied path or URL to a local file
//! and decide whether it is a PDF or already Markdown.
//!
//! ## Detection
//!
//! Magic bytes win over the file name: anything starting with `%PDF` is a
//! PDF, whatever it is called. Otherwise a `.md`, `.markdown` or `.txt`
//! extension marks Markdown. Everything else is rejected up front so the
//! converter is never handed a spreadsheet or a Word document.
//!
//! URL inputs are downloaded into a `TempDir` that lives as long as the
//! [`ResolvedInput`], so the file is removed when extraction finishes.

use crate::error::TariffError;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Extensions accepted as Markdown text.
const MARKDOWN_EXTENSIONS: [&str; 3] = ["md", "markdown", "txt"];

/// Where the Markdown text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A PDF that has to go through the converter.
    Pdf,
    /// Markdown (or plain text) read as-is.
    #[default]
    Markdown,
}

/// The resolved input — either a local path or a downloaded temp file.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local { path: PathBuf, kind: SourceKind },
    /// Input was a URL; the body was saved to a temp directory that is kept
    /// alive until extraction completes.
    Downloaded {
        path: PathBuf,
        kind: SourceKind,
        _temp_dir: TempDir,
    },
}

impl ResolvedInput {
    /// Path of the local file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local { path, .. } | ResolvedInput::Downloaded { path, .. } => path,
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            ResolvedInput::Local { kind, .. } | ResolvedInput::Downloaded { kind, .. } => *kind,
        }
    }

    /// File name used in the output envelope.
    pub fn display_name(&self) -> String {
        self.path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path().display().to_string())
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a local file with a known [`SourceKind`].
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, TariffError> {
    if input.trim().is_empty() {
        return Err(TariffError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

/// Classify a file from its first bytes and its name.
pub fn detect_kind(path: &Path, head: &[u8]) -> Result<SourceKind, TariffError> {
    if head.starts_with(PDF_MAGIC) {
        return Ok(SourceKind::Pdf);
    }
    let is_markdown = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| MARKDOWN_EXTENSIONS.iter().any(|m| e.eq_ignore_ascii_case(m)))
        .unwrap_or(false);
    if is_markdown {
        Ok(SourceKind::Markdown)
    } else {
        Err(TariffError::UnsupportedInput {
            path: path.to_path_buf(),
            magic: head.to_vec(),
        })
    }
}

fn resolve_local(path_str: &str) -> Result<ResolvedInput, TariffError> {
    let path = PathBuf::from(path_str);

    if !path.is_file() {
        return Err(TariffError::FileNotFound { path });
    }

    let head = match std::fs::File::open(&path) {
        Ok(f) => read_head(f).map_err(|source| TariffError::ReadFailed {
            path: path.clone(),
            source,
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(TariffError::PermissionDenied { path });
        }
        Err(_) => return Err(TariffError::FileNotFound { path }),
    };

    let kind = detect_kind(&path, &head)?;
    debug!(path = %path.display(), ?kind, "resolved local input");
    Ok(ResolvedInput::Local { path, kind })
}

fn read_head(file: std::fs::File) -> std::io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(PDF_MAGIC.len());
    file.take(PDF_MAGIC.len() as u64).read_to_end(&mut head)?;
    Ok(head)
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, TariffError> {
    let parsed = reqwest::Url::parse(url).map_err(|_| TariffError::InvalidInput {
        input: url.to_string(),
    })?;
    info!("Downloading tariff document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| TariffError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let map_send_err = |e: reqwest::Error| {
        if e.is_timeout() {
            TariffError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            TariffError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(parsed.clone()).send().await.map_err(map_send_err)?;

    if !response.status().is_success() {
        return Err(TariffError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(map_send_err)?;

    let temp_dir = TempDir::new().map_err(|e| TariffError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(filename_from_url(&parsed));
    let head = &bytes[..bytes.len().min(PDF_MAGIC.len())];
    let kind = detect_kind(&file_path, head)?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| TariffError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        kind,
        _temp_dir: temp_dir,
    })
}

/// Last path segment when it looks like a file name, else `downloaded.pdf`.
fn filename_from_url(url: &reqwest::Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|last| !last.is_empty() && last.contains('.'))
        .map(str::to_string)
        .unwrap_or_else(|| "downloaded.pdf".to_string())
}
