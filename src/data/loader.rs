//! File Ingest Module
//! Detects the upload format by extension and parses it into a DataFrame.

use crate::config::AppConfig;
use crate::data::excel;
use crate::error::{Result, SweeperError};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

/// A file handed over by the UI: name (with extension), size and raw bytes.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// Read a file picked from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self::new(name, bytes))
    }

    /// Lower-cased extension including the leading dot, or `""` when the
    /// name has none. Leading dots of hidden files are not extensions.
    pub fn extension(&self) -> String {
        split_extension(&self.name).1.to_lowercase()
    }

    /// File name without its final extension.
    pub fn stem(&self) -> &str {
        split_extension(&self.name).0
    }

    pub fn size_kb(&self) -> f64 {
        self.size as f64 / 1024.0
    }
}

fn split_extension(name: &str) -> (&str, &str) {
    let base_start = name.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    let base = &name[base_start..];
    let trimmed = base.trim_start_matches('.');
    let leading = base.len() - trimmed.len();

    match trimmed.rfind('.') {
        Some(dot) => name.split_at(base_start + leading + dot),
        None => (name, ""),
    }
}

/// Cell markers read as missing, on top of empty fields.
const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn missing_markers() -> NullValues {
    NullValues::AllColumns(MISSING_MARKERS.into_iter().map(PlSmallStr::from_static).collect())
}

/// Formats the ingest step understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    pub fn detect(file: &UploadedFile) -> Result<Self> {
        let extension = file.extension();
        match extension.as_str() {
            ".csv" => Ok(Self::Csv),
            ".xlsx" => Ok(Self::Xlsx),
            _ => Err(SweeperError::UnsupportedFormat { extension }),
        }
    }
}

/// Parses uploaded bytes into tables.
pub struct DataLoader;

impl DataLoader {
    pub fn ingest(file: &UploadedFile, config: &AppConfig) -> Result<DataFrame> {
        let df = match FileFormat::detect(file)? {
            FileFormat::Csv => Self::read_csv(&file.bytes, config.infer_schema_length)?,
            FileFormat::Xlsx => excel::read_first_sheet(&file.bytes)?,
        };

        tracing::info!(
            file = %file.name,
            rows = df.height(),
            columns = df.width(),
            "Ingested file"
        );
        Ok(df)
    }

    /// Parse CSV bytes with a header row. Empty fields and the usual
    /// `NA`/`NaN`/`null` markers are missing.
    pub fn read_csv(bytes: &[u8], infer_schema_length: usize) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(infer_schema_length))
            .map_parse_options(|opts| opts.with_null_values(Some(missing_markers())))
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()?;
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased_with_dot() {
        assert_eq!(UploadedFile::new("Report.CSV", vec![]).extension(), ".csv");
        assert_eq!(UploadedFile::new("book.v2.xlsx", vec![]).extension(), ".xlsx");
        assert_eq!(UploadedFile::new("README", vec![]).extension(), "");
        assert_eq!(UploadedFile::new(".hidden", vec![]).extension(), "");
    }

    #[test]
    fn stem_drops_only_final_extension() {
        assert_eq!(UploadedFile::new("sales.csv.csv", vec![]).stem(), "sales.csv");
        assert_eq!(UploadedFile::new("DATA.XLSX", vec![]).stem(), "DATA");
        assert_eq!(UploadedFile::new("notes", vec![]).stem(), "notes");
    }

    #[test]
    fn unsupported_extension_message() {
        let file = UploadedFile::new("data.txt", b"a,b\n1,2\n".to_vec());
        let err = DataLoader::ingest(&file, &AppConfig::default())
            .err()
            .map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("Unsupported file type: .txt"));
    }

    #[test]
    fn csv_is_parsed_with_header_and_nulls() -> anyhow::Result<()> {
        let file = UploadedFile::new("data.CSV", b"a,b\n1,\n2,4\n".to_vec());
        let df = DataLoader::ingest(&file, &AppConfig::default())?;

        assert_eq!(df.height(), 2);
        let names: Vec<&str> = df.get_column_names().iter().map(|c| c.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(df.column("b")?.null_count(), 1);
        Ok(())
    }

    #[test]
    fn missing_markers_read_as_nulls() -> anyhow::Result<()> {
        let csv = b"a,b,c\n1,NA,x\n2,4,N/A\n3,nan,null\n4,NaN,y\n";
        let df = DataLoader::read_csv(csv, 100)?;

        assert_eq!(df.column("b")?.dtype(), &DataType::Int64);
        let b: Vec<Option<i64>> = df.column("b")?.i64()?.into_iter().collect();
        assert_eq!(b, [None, Some(4), None, None]);
        assert_eq!(df.column("c")?.null_count(), 2);
        Ok(())
    }
}
