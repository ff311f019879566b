//! Data Sweeper - upload CSV/Excel files, clean them, pick columns, chart
//! the numeric ones and convert between the two formats.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod gui;
pub mod logging;
pub mod session;

pub use error::{Result, SweeperError};
