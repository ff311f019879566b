//! Data Sweeper - CSV/Excel cleaning and conversion
//!
//! A Rust application for previewing, cleaning and converting tabular files.

use anyhow::{Context as _, Result};
use data_sweeper::config::AppConfig;
use data_sweeper::gui::SweeperApp;
use data_sweeper::logging;
use eframe::egui;

fn main() -> Result<()> {
    logging::init()?;
    let config = AppConfig::load().context("Failed to load configuration")?;
    tracing::info!(?config, "Starting Data Sweeper");

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([900.0, 600.0])
            .with_title("📊 Data Sweeper"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Data Sweeper",
        options,
        Box::new(move |cc| Ok(Box::new(SweeperApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run window: {e}"))
}
