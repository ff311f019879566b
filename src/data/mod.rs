//! Data module - file ingest and table processing

pub(crate) mod excel;
mod loader;
mod processor;

pub use loader::{DataLoader, FileFormat, UploadedFile};
pub use processor::{DataProcessor, Projection};
