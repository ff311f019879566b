//! File Card Widget
//! One card per uploaded file: preview, cleaning, column selection, chart
//! and conversion controls.

use crate::charts::ChartPlotter;
use crate::data::DataProcessor;
use crate::export::ConversionTarget;
use crate::session::{Action, FileView, Notice, NoticeLevel};
use egui::{Color32, RichText, ScrollArea};
use polars::prelude::DataFrame;

/// Actions triggered from a file card
#[derive(Debug, Clone, PartialEq)]
pub enum FileCardAction {
    None,
    Apply(Action),
    /// Write the converted file to disk.
    Save(crate::session::FileId),
}

pub struct FileCard;

impl FileCard {
    pub fn notice_color(level: NoticeLevel) -> Color32 {
        match level {
            NoticeLevel::Info => Color32::from_rgb(100, 149, 237),
            NoticeLevel::Success => Color32::from_rgb(40, 167, 69),
            NoticeLevel::Warning => Color32::from_rgb(255, 193, 7),
            NoticeLevel::Error => Color32::from_rgb(220, 53, 69),
        }
    }

    pub fn show_notice(ui: &mut egui::Ui, notice: &Notice) {
        let color = Self::notice_color(notice.level);
        egui::Frame::none()
            .stroke(egui::Stroke::new(1.0, color))
            .rounding(5.0)
            .inner_margin(6.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&notice.text).color(color));
            });
    }

    /// Draw the card for one file
    pub fn show(ui: &mut egui::Ui, view: &FileView) -> FileCardAction {
        let mut action = FileCardAction::None;
        let id = view.id;

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(8.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(format!("📄 File Name: {}", view.name)).size(16.0).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✖ Remove").clicked() {
                            action = FileCardAction::Apply(Action::Remove(id));
                        }
                    });
                });
                ui.label(format!("File Size: {:.2} KB", view.size_kb));

                for notice in &view.last_notices {
                    Self::show_notice(ui, notice);
                }

                if view.rejected.is_some() {
                    return;
                }

                // ===== Preview =====
                ui.add_space(8.0);
                ui.label(RichText::new("🔎 Preview the head of the Dataframe").size(14.0).strong());
                if let Some(preview) = &view.preview {
                    Self::draw_preview_table(ui, id, preview);
                }

                // ===== Cleaning =====
                ui.add_space(10.0);
                ui.label(RichText::new("⚒️ Data Cleaning Options").size(14.0).strong());
                let mut clean_enabled = view.options.clean_enabled;
                if ui
                    .checkbox(&mut clean_enabled, format!("Clean data for {}", view.name))
                    .changed()
                {
                    action = FileCardAction::Apply(Action::SetCleaning(id, clean_enabled));
                }
                if view.options.clean_enabled {
                    ui.horizontal(|ui| {
                        if ui.button(format!("Remove Duplicates from {}", view.name)).clicked() {
                            action = FileCardAction::Apply(Action::RemoveDuplicates(id));
                        }
                        if ui.button(format!("Fill Missing Values for {}", view.name)).clicked() {
                            action = FileCardAction::Apply(Action::FillMissing(id));
                        }
                        if ui.button("↺ Reset").clicked() {
                            action = FileCardAction::Apply(Action::Reset(id));
                        }
                    });
                }

                // ===== Column selection =====
                ui.add_space(10.0);
                ui.label(RichText::new("🧭 Select Columns to Convert").size(14.0).strong());
                if let Some(selection) = Self::draw_column_picker(ui, view) {
                    action = FileCardAction::Apply(Action::SelectColumns(id, selection));
                }

                // ===== Visualization =====
                ui.add_space(10.0);
                ui.label(RichText::new("📈 Data Visualizations").size(14.0).strong());
                let mut show_chart = view.options.show_chart;
                if ui
                    .checkbox(&mut show_chart, format!("Show visualizations for {}", view.name))
                    .changed()
                {
                    action = FileCardAction::Apply(Action::SetShowChart(id, show_chart));
                }
                if let Some(chart) = &view.chart {
                    ChartPlotter::draw_bar_chart(ui, ("bar_chart", id), chart);
                }

                for warning in &view.warnings {
                    Self::show_notice(ui, warning);
                }

                // ===== Conversion =====
                ui.add_space(10.0);
                ui.label(RichText::new("🔄 Conversion Options").size(14.0).strong());
                ui.horizontal(|ui| {
                    ui.label(format!("Convert {} to:", view.name));
                    for target in ConversionTarget::ALL {
                        if ui
                            .radio(view.options.target == target, target.label())
                            .clicked()
                            && view.options.target != target
                        {
                            action = FileCardAction::Apply(Action::SetTarget(id, target));
                        }
                    }
                });

                ui.horizontal(|ui| {
                    if ui.button(format!("Convert {}", view.name)).clicked() {
                        action = FileCardAction::Apply(Action::Convert(id));
                    }
                    if let Some(artifact) = &view.artifact {
                        let label = format!(
                            "🡇 Download {} as {}",
                            view.name,
                            view.options.target.label()
                        );
                        if ui.button(label).on_hover_text(&artifact.file_name).clicked() {
                            action = FileCardAction::Save(id);
                        }
                    }
                });
            });

        action
    }

    fn draw_preview_table(ui: &mut egui::Ui, id: crate::session::FileId, preview: &DataFrame) {
        ScrollArea::horizontal()
            .id_salt(("preview_scroll", id))
            .show(ui, |ui| {
                egui::Grid::new(("preview", id))
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for name in preview.get_column_names() {
                            ui.label(RichText::new(name.as_str()).strong());
                        }
                        ui.end_row();

                        for row in 0..preview.height() {
                            for column in preview.get_columns() {
                                ui.label(DataProcessor::cell_text(column, row));
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    /// Checklist of columns; returns the new selection when it changed.
    fn draw_column_picker(ui: &mut egui::Ui, view: &FileView) -> Option<Vec<String>> {
        if view.columns.is_empty() {
            return None;
        }

        let mut changed = false;
        let mut checked: Vec<bool> = view
            .columns
            .iter()
            .map(|c| view.options.selected_columns.contains(c))
            .collect();

        ui.label(format!("Choose columns for {}", view.name));
        egui::Frame::none()
            .fill(ui.visuals().extreme_bg_color)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for (col, is_checked) in view.columns.iter().zip(checked.iter_mut()) {
                        changed |= ui.checkbox(is_checked, col).changed();
                    }
                });
            });

        ui.horizontal(|ui| {
            if ui.small_button("Select All").clicked() {
                checked.iter_mut().for_each(|v| *v = true);
                changed = true;
            }
            if ui.small_button("Clear All").clicked() {
                checked.iter_mut().for_each(|v| *v = false);
                changed = true;
            }
        });

        changed.then(|| {
            view.columns
                .iter()
                .zip(checked.iter())
                .filter(|(_, &selected)| selected)
                .map(|(col, _)| col.clone())
                .collect()
        })
    }
}
