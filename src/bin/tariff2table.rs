//! CLI binary for customs-tariff-md.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints the tariff table.

use anyhow::{Context, Result};
use clap::Parser;
use customs_tariff_md::{
    extract, write_csv_rows, write_table, ExtractionConfig, ExtractionOutput, PageSelection,
    TariffTable,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

const AFTER_HELP: &str = r#"EXAMPLES:
  # Tariff PDF to JSON on stdout
  tariff2table chapter10.pdf

  # Already-converted Markdown, no API key needed
  tariff2table chapter10.md --format table

  # Write a CSV for spreadsheets (UTF-8 with BOM)
  tariff2table chapter10.pdf -o chapter10.csv

  # Keep the intermediate Markdown for inspection
  tariff2table chapter10.pdf -o chapter10.json --save-markdown chapter10.md

  # Specific pages with a stronger model
  tariff2table --pages 3-15 --model gpt-4.1 --provider openai tariff.pdf

  # Download from a URL, fail in scripts when nothing was found
  tariff2table https://example.org/tariff/ch10.pdf --fail-on-empty

OUTPUT COLUMNS:
  hscode          tariff code, with statistical suffix when present (1006.20.10.006)
  uncode          unit of measure (KGM, NMB, ...), inherited by headings
  thdescriptions  Thai description
  endescriptions  English description

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_PROVIDER      Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to an existing libpdfium — skips auto-download
  PDFIUM_AUTO_CACHE_DIR   Override the default pdfium cache directory
  RUST_LOG                Log filter (overrides -v / -q)

  Every flag also reads TARIFF2TABLE_<FLAG>, e.g. TARIFF2TABLE_DPI=200.
"#;

/// Extract the customs tariff table from tariff PDFs or their Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "tariff2table",
    version,
    about = "Extract the customs tariff table from tariff PDFs or their Markdown",
    long_about = "Extract HS codes, statistical suffixes, units and Thai/English descriptions \
from Thai customs tariff schedules. PDFs (local files or URLs) are converted to Markdown with \
a vision model first; Markdown and text files are parsed directly.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF or Markdown file, or HTTP/HTTPS URL.
    input: String,

    /// Write the table to this file (.json or .csv) instead of stdout.
    #[arg(short, long, env = "TARIFF2TABLE_OUTPUT")]
    output: Option<PathBuf>,

    /// Stdout format: json (full response), csv, or table.
    #[arg(long, env = "TARIFF2TABLE_FORMAT", value_enum, default_value = "json")]
    format: FormatArg,

    /// Also write the intermediate Markdown to this file.
    #[arg(long, env = "TARIFF2TABLE_SAVE_MARKDOWN")]
    save_markdown: Option<PathBuf>,

    /// Vision model ID for PDF conversion (e.g. gpt-4.1-nano, gpt-4.1).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Rendering DPI (72–400).
    #[arg(long, env = "TARIFF2TABLE_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Number of pages converted concurrently.
    #[arg(short, long, env = "TARIFF2TABLE_CONCURRENCY", default_value_t = 10)]
    concurrency: usize,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "TARIFF2TABLE_PAGES", default_value = "all")]
    pages: String,

    /// Retries per page on conversion failure.
    #[arg(long, env = "TARIFF2TABLE_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "TARIFF2TABLE_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Per-call conversion timeout in seconds.
    #[arg(long, env = "TARIFF2TABLE_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Exit with an error when the document yields no tariff rows.
    #[arg(long, env = "TARIFF2TABLE_FAIL_ON_EMPTY")]
    fail_on_empty: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "TARIFF2TABLE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TARIFF2TABLE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "TARIFF2TABLE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Json,
    Csv,
    Table,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs would tear through the spinner; keep them quiet
    // while it is shown.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Ensure PDFium engine is available for PDF inputs ─────────────────
    if needs_pdf_engine(&cli.input) {
        ensure_pdf_engine(cli.quiet)?;
    }

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;

    // ── Run extraction ───────────────────────────────────────────────────
    let spinner = show_progress.then(|| extraction_spinner(&cli.input));
    let result = extract(&cli.input, &config).await;
    if let Some(ref bar) = spinner {
        bar.finish_and_clear();
    }
    let output = result.context("Extraction failed")?;

    if let Some(ref md_path) = cli.save_markdown {
        let md = output.markdown.as_deref().unwrap_or_default();
        tokio::fs::write(md_path, md)
            .await
            .with_context(|| format!("Failed to write Markdown to {}", md_path.display()))?;
    }

    let output = if cli.fail_on_empty {
        output.into_result()?
    } else {
        output
    };

    if let Some(ref output_path) = cli.output {
        write_table(&output.data, output_path).context("Failed to write table")?;
    } else {
        print_output(&output, cli.format)?;
    }

    if !cli.quiet {
        print_summary(&output, cli.output.as_ref());
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli) -> Result<ExtractionConfig> {
    let pages = parse_pages(&cli.pages)?;

    let mut builder = ExtractionConfig::builder()
        .dpi(cli.dpi)
        .concurrency(cli.concurrency)
        .pages(pages)
        .max_retries(cli.max_retries)
        .download_timeout_secs(cli.download_timeout)
        .api_timeout_secs(cli.api_timeout)
        .include_markdown(cli.save_markdown.is_some());

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }

    builder.build().context("Invalid configuration")
}

/// Local files are checked for the `%PDF` header. A URL whose path ends in
/// a Markdown extension skips the engine; any other URL may be a PDF.
fn needs_pdf_engine(input: &str) -> bool {
    if input.starts_with("http://") || input.starts_with("https://") {
        let path = input.split(['?', '#']).next().unwrap_or(input);
        let ext = path
            .rsplit('/')
            .next()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        return !matches!(ext.as_deref(), Some("md" | "markdown" | "txt"));
    }
    let mut head = [0u8; 4];
    std::fs::File::open(input)
        .and_then(|mut f| f.read_exact(&mut head))
        .map(|()| &head == b"%PDF")
        .unwrap_or(false)
}

/// Make sure the pdfium shared library is on disk before conversion.
///
/// With `--features bundled` the library is embedded and only extracted.
/// Otherwise the first run downloads it (~30 MB) into the user cache and
/// later runs only check the path.
fn ensure_pdf_engine(quiet: bool) -> Result<()> {
    #[cfg(feature = "bundled")]
    {
        let _ = quiet;
        tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_bundled())
            .context("Failed to extract bundled PDFium engine")?;
    }

    #[cfg(not(feature = "bundled"))]
    if !pdfium_auto::is_pdfium_cached() {
        if quiet {
            tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_library(None))
                .context("Failed to download PDFium engine")?;
            return Ok(());
        }

        let dl_bar = ProgressBar::new(0);
        dl_bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        dl_bar.set_prefix("PDF engine");
        dl_bar.set_message("Connecting…");
        dl_bar.enable_steady_tick(Duration::from_millis(80));

        let bar = dl_bar.clone();
        tokio::task::block_in_place(|| {
            pdfium_auto::ensure_pdfium_library(Some(&|downloaded, total| {
                if let Some(t) = total {
                    if bar.length().unwrap_or(0) != t {
                        bar.set_length(t);
                    }
                }
                bar.set_position(downloaded);
            }))
        })
        .context("Failed to download PDFium engine")?;

        dl_bar.finish_with_message("ready ✓");
    }

    Ok(())
}

fn extraction_spinner(input: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS),
    );
    bar.set_prefix("Extracting");
    bar.set_message(input.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn print_output(output: &ExtractionOutput, format: FormatArg) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match format {
        FormatArg::Json => {
            let json =
                serde_json::to_string_pretty(output).context("Failed to serialise output")?;
            writeln!(handle, "{json}").context("Failed to write to stdout")?;
        }
        FormatArg::Csv => {
            write_csv_rows(&output.data, &mut handle).context("Failed to write CSV")?;
        }
        FormatArg::Table => {
            handle
                .write_all(render_table(&output.data).as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

/// Fixed-width text table; widths are counted in characters.
fn render_table(table: &TariffTable) -> String {
    let code_w = table
        .entries()
        .iter()
        .map(|e| e.hscode.chars().count())
        .max()
        .unwrap_or(0)
        .max("hscode".len());
    let unit_w = table
        .entries()
        .iter()
        .filter_map(|e| e.uncode.as_ref())
        .map(|u| u.chars().count())
        .max()
        .unwrap_or(0)
        .max("unit".len());

    let mut out = format!(
        "{:<code_w$}  {:<unit_w$}  {}\n",
        "hscode", "unit", "description"
    );
    for e in table {
        let unit = e.uncode.as_deref().unwrap_or("-");
        out.push_str(&format!(
            "{:<code_w$}  {:<unit_w$}  {}\n",
            e.hscode, unit, e.thdescription
        ));
        if !e.endescription.is_empty() {
            out.push_str(&format!(
                "{:<code_w$}  {:<unit_w$}  {}\n",
                "", "", e.endescription
            ));
        }
    }
    out
}

fn print_summary(output: &ExtractionOutput, written_to: Option<&PathBuf>) {
    let stats = &output.stats;
    let target = written_to
        .map(|p| format!("  →  {}", bold(&p.display().to_string())))
        .unwrap_or_default();
    eprintln!(
        "{}  {} rows  {}ms{}",
        if output.total_rows > 0 {
            green("✔")
        } else {
            cyan("⚠")
        },
        bold(&output.total_rows.to_string()),
        stats.total_duration_ms,
        target,
    );
    eprintln!(
        "   {}",
        dim(&format!(
            "{} with unit  /  {} under UNKNOWN  /  {} bytes of Markdown",
            stats.rows_with_unit, stats.unknown_base_rows, stats.markdown_bytes
        )),
    );
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid page range '{}-{}': start must be <= end",
                start,
                end
            );
        }
        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;
        if let Some(&p) = pages.iter().find(|&&p| p < 1) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
        }
        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }
    Ok(PageSelection::Single(page))
}
