//! Application settings, read from an optional JSON file.

use crate::export::ConversionTarget;
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable pointing at a settings file.
pub const CONFIG_ENV: &str = "DATA_SWEEPER_CONFIG";
/// Settings file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "data_sweeper.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Rows shown in each file preview.
    pub preview_rows: usize,
    /// Numeric columns plotted by the bar chart.
    pub chart_series_limit: usize,
    /// Rows sampled when inferring CSV column types.
    pub infer_schema_length: usize,
    pub max_upload_bytes: u64,
    /// Conversion target preselected for new uploads.
    pub default_target: ConversionTarget,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            chart_series_limit: 2,
            infer_schema_length: 10000,
            max_upload_bytes: 200 * 1024 * 1024,
            default_target: ConversionTarget::Csv,
            window_width: 1400.0,
            window_height: 800.0,
        }
    }
}

impl AppConfig {
    /// Load settings from `$DATA_SWEEPER_CONFIG`, then `./data_sweeper.json`,
    /// falling back to defaults when neither exists.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_path(Path::new(&path));
        }

        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_path(&local);
        }

        Ok(Self::default())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config)
    }
}
