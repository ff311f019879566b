//! Error types shared by the ingest, cleaning and export pipeline.

use crate::session::FileId;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweeperError {
    #[error("Unsupported file type: {extension}")]
    UnsupportedFormat { extension: String },
    #[error("{name} is {size} bytes, above the {limit} byte upload limit")]
    FileTooLarge { name: String, size: u64, limit: u64 },
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Invalid xlsx file: {0}")]
    Xlsx(#[from] calamine::XlsxError),
    #[error("Workbook has no worksheets")]
    EmptyWorkbook,
    #[error("Failed to write xlsx archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
    #[error("Unknown file id {0}")]
    UnknownFile(FileId),
    #[error("{0} could not be ingested")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, SweeperError>;
