//! Export module - serializes a table to CSV or XLSX bytes

mod xlsx;

pub use xlsx::XlsxWriter;

use crate::data::UploadedFile;
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Output format picked per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConversionTarget {
    #[default]
    Csv,
    Excel,
}

impl ConversionTarget {
    pub const ALL: [Self; 2] = [Self::Csv, Self::Excel];

    pub fn label(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Excel => "Excel",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => ".csv",
            Self::Excel => ".xlsx",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Csv => CSV_MIME,
            Self::Excel => XLSX_MIME,
        }
    }
}

/// A finished download: bytes plus the suggested name and MIME type.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Serialize `df` for `target`, naming the result after `source`.
pub fn export(
    df: &DataFrame,
    source: &UploadedFile,
    target: ConversionTarget,
) -> Result<ExportArtifact> {
    let bytes = match target {
        ConversionTarget::Csv => write_csv(df)?,
        ConversionTarget::Excel => XlsxWriter::write(df)?,
    };

    let file_name = format!("{}{}", source.stem(), target.extension());
    tracing::info!(
        source = %source.name,
        file_name = %file_name,
        bytes = bytes.len(),
        "Exported table"
    );

    Ok(ExportArtifact {
        file_name,
        mime: target.mime(),
        bytes,
    })
}

/// Comma-separated, header row, no row index.
pub fn write_csv(df: &DataFrame) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut df = df.clone();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut df)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_has_header_and_empty_missing_cells() -> anyhow::Result<()> {
        let df = df!("a" => [1i64, 2], "b" => [None, Some("x")])?;
        let artifact = export(&df, &UploadedFile::new("in.xlsx", vec![]), ConversionTarget::Csv)?;

        assert_eq!(artifact.file_name, "in.csv");
        assert_eq!(artifact.mime, "text/csv");
        assert_eq!(String::from_utf8(artifact.bytes)?, "a,b\n1,\n2,x\n");
        Ok(())
    }

    #[test]
    fn excel_target_names_and_mime() -> anyhow::Result<()> {
        let df = df!("a" => [1i64])?;
        let source = UploadedFile::new("Q1.Report.CSV", vec![]);
        let artifact = export(&df, &source, ConversionTarget::Excel)?;

        assert_eq!(artifact.file_name, "Q1.Report.xlsx");
        assert_eq!(artifact.mime, XLSX_MIME);
        assert!(artifact.bytes.starts_with(b"PK"));
        Ok(())
    }
}
