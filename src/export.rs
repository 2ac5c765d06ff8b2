//! Table export: write the finalized table to a `.json` or `.csv` file.
//!
//! The format follows the file extension. CSV files start with a UTF-8 BOM
//! so spreadsheet tools open the Thai columns in the right encoding.
//! Writes go to a sibling `.tmp` file first and are renamed into place, so a
//! reader never sees a half-written table.

use crate::error::TariffError;
use crate::output::TariffTable;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Output file format, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Pretty-printed JSON array of records.
    Json,
    /// CSV with a header row.
    Csv,
}

impl ExportFormat {
    /// Pick the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, TariffError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(ExportFormat::Json),
            Some("csv") => Ok(ExportFormat::Csv),
            _ => Err(TariffError::UnsupportedExportFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Write `table` to `path`, creating parent directories.
pub fn write_table(table: &TariffTable, path: impl AsRef<Path>) -> Result<(), TariffError> {
    let path = path.as_ref();
    let format = ExportFormat::from_path(path)?;
    let write_err = |detail: String| TariffError::OutputWriteFailed {
        path: path.to_path_buf(),
        detail,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
    }

    let tmp_path = tmp_path_for(path);
    let result = File::create(&tmp_path)
        .map_err(|e| write_err(e.to_string()))
        .and_then(|file| match format {
            ExportFormat::Json => write_json(table, file).map_err(write_err),
            ExportFormat::Csv => write_csv(table, file).map_err(write_err),
        })
        .and_then(|()| std::fs::rename(&tmp_path, path).map_err(|e| write_err(e.to_string())));

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result
}

/// Write `table` to `path`, logging instead of failing.
///
/// Returns whether the file was written. The table itself is never affected.
pub fn export_table(table: &TariffTable, path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    match write_table(table, path) {
        Ok(()) => {
            info!(rows = table.len(), "Exported tariff table to {}", path.display());
            true
        }
        Err(e) => {
            warn!("Export failed: {}", e);
            false
        }
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_json(table: &TariffTable, file: File) -> Result<(), String> {
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, table).map_err(|e| e.to_string())?;
    out.write_all(b"\n").map_err(|e| e.to_string())?;
    out.flush().map_err(|e| e.to_string())
}

fn write_csv(table: &TariffTable, file: File) -> Result<(), String> {
    let mut out = BufWriter::new(file);
    out.write_all(UTF8_BOM).map_err(|e| e.to_string())?;
    write_csv_rows(table, out).map_err(|e| e.to_string())
}

/// Write `table` as CSV (no BOM) to any writer.
///
/// The header row is always written, even for an empty table.
pub fn write_csv_rows<W: Write>(table: &TariffTable, out: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for entry in table {
        writer.serialize(entry)?;
    }
    // serialize() emits the header with the first record only
    if table.is_empty() {
        writer.write_record(["hscode", "uncode", "thdescriptions", "endescriptions"])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::TariffEntry;

    fn sample() -> TariffTable {
        TariffTable::from_entries(vec![
            TariffEntry {
                hscode: "1006".into(),
                uncode: Some("KGM".into()),
                thdescription: "ข้าว".into(),
                endescription: "Rice".into(),
            },
            TariffEntry {
                hscode: "1006.20".into(),
                uncode: None,
                thdescription: "ข้าวกล้อง".into(),
                endescription: "Husked (brown) rice, other".into(),
            },
        ])
    }

    #[test]
    fn csv_rows_to_writer() {
        let mut buf = Vec::new();
        write_csv_rows(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "hscode,uncode,thdescriptions,endescriptions");
        assert_eq!(lines[1], "1006,KGM,ข้าว,Rice");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn csv_rows_for_empty_table_keep_header() {
        let mut buf = Vec::new();
        write_csv_rows(&TariffTable::default(), &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "hscode,uncode,thdescriptions,endescriptions\n"
        );
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            ExportFormat::from_path(Path::new("a/b.JSON")).unwrap(),
            ExportFormat::Json
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("b.csv")).unwrap(),
            ExportFormat::Csv
        );
        assert!(ExportFormat::from_path(Path::new("b.xlsx")).is_err());
        assert!(ExportFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn csv_has_bom_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.csv");
        write_table(&sample(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let mut reader = csv::Reader::from_reader(&bytes[UTF8_BOM.len()..]);
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["hscode", "uncode", "thdescriptions", "endescriptions"]
        );
        let rows: Vec<TariffEntry> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows, sample().into_entries());
    }

    #[test]
    fn empty_csv_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_table(&TariffTable::default(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text.trim_start_matches('\u{FEFF}').trim_end(),
            "hscode,uncode,thdescriptions,endescriptions"
        );
    }

    #[test]
    fn json_is_array_of_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_table(&sample(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: TariffTable = serde_json::from_str(&text).unwrap();
        assert_eq!(back, sample());
        assert!(!dir.path().join("out.json.tmp").exists());
    }

    #[test]
    fn export_table_reports_failure_without_panicking() {
        assert!(!export_table(&sample(), "table.xlsx"));

        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        assert!(!export_table(&sample(), blocker.join("out.csv")));
    }

    #[test]
    fn export_table_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.json");
        assert!(export_table(&sample(), &path));
        assert!(path.exists());
    }
}
