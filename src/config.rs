//! Configuration for tariff extraction.
//!
//! Every knob lives in [`ExtractionConfig`], built via
//! [`ExtractionConfigBuilder`]. Most fields are passed straight through to
//! the PDF converter; the rest control what the extraction returns and
//! where it writes.

use crate::error::TariffError;
use crate::export::ExportFormat;
use crate::pipeline::markdown::{MarkdownConverter, VisionConverter};
use edgequake_pdf2md::{ConversionConfig, PageSelection};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for an extraction.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use customs_tariff_md::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .dpi(200)
///     .model("gpt-4.1-mini")
///     .export_path("out/chapter10.csv")
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 200);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Vision model used for PDF conversion. If None, the provider default.
    pub model: Option<String>,

    /// LLM provider name (`openai`, `anthropic`, `gemini`, `ollama`).
    /// If None, the provider is detected from API key variables.
    pub provider_name: Option<String>,

    /// Page rasterisation DPI. Range: 72–400. Default: 150.
    ///
    /// Tariff schedules are dense tables with small print; raise this to 200
    /// when codes come back with dropped digits.
    pub dpi: u32,

    /// Number of pages converted concurrently. Default: 10.
    pub concurrency: usize,

    /// Retry attempts per page on a transient API failure. Default: 3.
    pub max_retries: u32,

    /// Pages to convert. Default: all.
    pub pages: PageSelection,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Per-call conversion timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Return the intermediate Markdown in [`crate::ExtractionOutput::markdown`].
    /// Default: false.
    pub include_markdown: bool,

    /// Also write the table to this file (`.json` or `.csv`). Failures are
    /// logged and do not affect the returned table. Default: None.
    pub export_path: Option<PathBuf>,

    /// Converter used for PDF inputs. Takes precedence over the built-in
    /// [`VisionConverter`].
    pub converter: Option<Arc<dyn MarkdownConverter>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            dpi: 150,
            concurrency: 10,
            max_retries: 3,
            pages: PageSelection::default(),
            download_timeout_secs: 120,
            api_timeout_secs: 60,
            include_markdown: false,
            export_path: None,
            converter: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("dpi", &self.dpi)
            .field("concurrency", &self.concurrency)
            .field("max_retries", &self.max_retries)
            .field("pages", &self.pages)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("include_markdown", &self.include_markdown)
            .field("export_path", &self.export_path)
            .field(
                "converter",
                &self.converter.as_ref().map(|_| "<dyn MarkdownConverter>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The converter settings for PDF inputs.
    ///
    /// Fails with [`TariffError::InvalidConfig`] when the DPI or concurrency
    /// is out of range, including values set directly on the public fields.
    pub fn conversion_config(&self) -> Result<ConversionConfig, TariffError> {
        self.check_converter_knobs()?;
        let mut builder = ConversionConfig::builder()
            .dpi(self.dpi)
            .concurrency(self.concurrency)
            .max_retries(self.max_retries)
            .pages(self.pages.clone())
            .download_timeout_secs(self.download_timeout_secs)
            .api_timeout_secs(self.api_timeout_secs);
        if let Some(ref model) = self.model {
            builder = builder.model(model.clone());
        }
        if let Some(ref name) = self.provider_name {
            builder = builder.provider_name(name.clone());
        }
        builder
            .build()
            .map_err(|e| TariffError::InvalidConfig(e.to_string()))
    }

    fn check_converter_knobs(&self) -> Result<(), TariffError> {
        if self.dpi < 72 || self.dpi > 400 {
            return Err(TariffError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                self.dpi
            )));
        }
        if self.concurrency == 0 {
            return Err(TariffError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        Ok(())
    }

    /// The injected converter, or a [`VisionConverter`] built from this config.
    pub fn resolve_converter(&self) -> Result<Arc<dyn MarkdownConverter>, TariffError> {
        match self.converter {
            Some(ref converter) => Ok(Arc::clone(converter)),
            None => Ok(Arc::new(VisionConverter::new(self.conversion_config()?))),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn include_markdown(mut self, v: bool) -> Self {
        self.config.include_markdown = v;
        self
    }

    pub fn export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.export_path = Some(path.into());
        self
    }

    pub fn converter(mut self, converter: Arc<dyn MarkdownConverter>) -> Self {
        self.config.converter = Some(converter);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, TariffError> {
        let c = &self.config;
        c.check_converter_knobs()?;
        if let Some(ref path) = c.export_path {
            ExportFormat::from_path(path)?;
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;

    struct NullConverter;

    #[async_trait]
    impl MarkdownConverter for NullConverter {
        async fn convert(&self, _pdf_path: &Path) -> String {
            String::new()
        }
    }

    #[test]
    fn defaults() {
        let c = ExtractionConfig::default();
        assert_eq!(c.dpi, 150);
        assert_eq!(c.concurrency, 10);
        assert_eq!(c.max_retries, 3);
        assert_eq!(c.download_timeout_secs, 120);
        assert_eq!(c.api_timeout_secs, 60);
        assert!(!c.include_markdown);
        assert!(c.export_path.is_none());
        assert!(c.converter.is_none());
    }

    #[test]
    fn rejects_out_of_range_dpi() {
        assert!(ExtractionConfig::builder().dpi(71).build().is_err());
        assert!(ExtractionConfig::builder().dpi(401).build().is_err());
        assert!(ExtractionConfig::builder().dpi(72).build().is_ok());
    }

    #[test]
    fn conversion_config_checks_public_fields() {
        let c = ExtractionConfig {
            dpi: 600,
            ..Default::default()
        };
        assert!(matches!(
            c.conversion_config(),
            Err(TariffError::InvalidConfig(_))
        ));
        assert!(c.resolve_converter().is_err());
    }

    #[test]
    fn rejects_zero_concurrency() {
        let err = ExtractionConfig::builder().concurrency(0).build().unwrap_err();
        assert!(matches!(err, TariffError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_unknown_export_extension() {
        let err = ExtractionConfig::builder()
            .export_path("table.xlsx")
            .build()
            .unwrap_err();
        assert!(matches!(err, TariffError::UnsupportedExportFormat { .. }));
        assert!(ExtractionConfig::builder()
            .export_path("table.CSV")
            .build()
            .is_ok());
    }

    #[test]
    fn conversion_config_carries_converter_knobs() {
        let c = ExtractionConfig::builder()
            .dpi(200)
            .concurrency(4)
            .model("gpt-4.1-mini")
            .provider_name("openai")
            .build()
            .unwrap();
        let conv = c.conversion_config().unwrap();
        assert_eq!(conv.dpi, 200);
        assert_eq!(conv.concurrency, 4);
        assert_eq!(conv.model.as_deref(), Some("gpt-4.1-mini"));
        assert_eq!(conv.provider_name.as_deref(), Some("openai"));
    }

    #[test]
    fn debug_hides_converter() {
        let c = ExtractionConfig::builder()
            .converter(Arc::new(NullConverter))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("<dyn MarkdownConverter>"));
    }

    #[test]
    fn injected_converter_is_used() {
        let injected: Arc<dyn MarkdownConverter> = Arc::new(NullConverter);
        let c = ExtractionConfig::builder()
            .converter(Arc::clone(&injected))
            .build()
            .unwrap();
        let resolved = c.resolve_converter().unwrap();
        assert!(Arc::ptr_eq(&resolved, &injected));
    }
}
