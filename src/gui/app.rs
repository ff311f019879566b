//! Data Sweeper Main Application
//! Side panel with uploads, central panel with one card per file.

use crate::config::AppConfig;
use crate::data::UploadedFile;
use crate::gui::file_card::{FileCard, FileCardAction};
use crate::session::{Action, FileId, Notice, Session};
use egui::{Color32, RichText, SidePanel};
use std::path::Path;

/// Main application window.
pub struct SweeperApp {
    session: Session,
    /// App-level banner (file dialog or save failures).
    status: Option<Notice>,
}

impl SweeperApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        Self {
            session: Session::new(config),
            status: None,
        }
    }

    /// Pick one or more files and ingest them in upload order.
    fn handle_upload(&mut self) {
        let Some(paths) = rfd::FileDialog::new()
            .add_filter("CSV or Excel", &["csv", "xlsx"])
            .add_filter("All files", &["*"])
            .pick_files()
        else {
            return; // User cancelled
        };

        for path in paths {
            match UploadedFile::from_path(&path) {
                Ok(file) => {
                    self.session.upload(file);
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Failed to read upload");
                    self.status = Some(Notice::error(format!(
                        "Could not read {}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }
    }

    fn handle_action(&mut self, action: Action) {
        let file_id = action.file_id();
        if let Err(e) = self.session.apply(action) {
            tracing::error!(file = %file_id, error = %e, "Action failed");
            self.status = Some(Notice::error(e.to_string()));
        }
    }

    /// Save the converted file through a save dialog.
    fn handle_save(&mut self, id: FileId) {
        let artifact = match self.session.view(id) {
            Ok(view) => view.artifact,
            Err(e) => {
                self.status = Some(Notice::error(e.to_string()));
                return;
            }
        };
        let Some(artifact) = artifact else {
            return;
        };

        let Some(output_path) = rfd::FileDialog::new()
            .set_file_name(&artifact.file_name)
            .save_file()
        else {
            return; // User cancelled
        };

        match std::fs::write(&output_path, &artifact.bytes) {
            Ok(()) => {
                tracing::info!(path = %output_path.display(), mime = artifact.mime, "Saved export");
                self.status = Some(Notice::success(format!(
                    "Saved {}",
                    Self::display_name(&output_path)
                )));
            }
            Err(e) => {
                tracing::error!(path = %output_path.display(), error = %e, "Failed to save export");
                self.status = Some(Notice::error(format!("Save failed: {}", e)));
            }
        }
    }

    fn display_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string())
    }

    fn show_side_panel(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Data Sweeper")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("CSV ⇄ Excel with built-in cleaning")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();

        ui.label(RichText::new("📁 Upload").size(14.0).strong());
        ui.add_space(5.0);
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("📂 Upload your file (CSV or Excel)"))
                .min_size(egui::vec2(220.0, 30.0));
            if ui.add(button).clicked() {
                self.handle_upload();
            }
        });

        ui.add_space(10.0);
        ui.separator();
        ui.label(RichText::new("Files").size(14.0).strong());
        for id in self.session.file_ids() {
            if let Ok(view) = self.session.view(id) {
                let color = if view.rejected.is_some() {
                    FileCard::notice_color(crate::session::NoticeLevel::Error)
                } else {
                    ui.visuals().text_color()
                };
                ui.label(RichText::new(&view.name).color(color));
            }
        }

        if let Some(status) = &self.status {
            ui.add_space(10.0);
            FileCard::show_notice(ui, status);
        }
    }
}

impl eframe::App for SweeperApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        SidePanel::left("upload_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.show_side_panel(ui);
                });
            });

        let mut pending = Vec::new();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(
                RichText::new(
                    "Transform your files between CSV and Excel formats with built-in data cleaning and visualization!",
                )
                .size(13.0),
            );
            ui.add_space(8.0);

            if self.session.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No files uploaded").size(20.0));
                });
                return;
            }

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for id in self.session.file_ids() {
                        match self.session.view(id) {
                            Ok(view) => {
                                let action = ui.push_id(id, |ui| FileCard::show(ui, &view)).inner;
                                if action != FileCardAction::None {
                                    pending.push(action);
                                }
                            }
                            Err(e) => {
                                FileCard::show_notice(ui, &Notice::error(e.to_string()));
                            }
                        }
                        ui.add_space(15.0);
                    }

                    if let Some(summary) = self.session.summary() {
                        FileCard::show_notice(ui, &summary);
                    }
                });
        });

        // Files are handled strictly in upload order, after the frame is laid out.
        for action in pending {
            match action {
                FileCardAction::Apply(action) => self.handle_action(action),
                FileCardAction::Save(id) => self.handle_save(id),
                FileCardAction::None => {}
            }
        }
    }
}
