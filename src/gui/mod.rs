//! GUI module - User interface components

mod app;
mod file_card;

pub use app::SweeperApp;
pub use file_card::{FileCard, FileCardAction};
