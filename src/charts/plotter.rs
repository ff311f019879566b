//! Chart Plotter Module
//! Draws the numeric bar chart using egui_plot.

use crate::charts::ChartData;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Plot};

/// Color palette for series
pub const PALETTE: [Color32; 4] = [
    Color32::from_rgb(52, 152, 219), // Blue
    Color32::from_rgb(231, 76, 60),  // Red
    Color32::from_rgb(46, 204, 113), // Green
    Color32::from_rgb(243, 156, 18), // Orange
];

const CHART_HEIGHT: f32 = 260.0;
/// Share of one row slot covered by its bar group.
const GROUP_WIDTH: f64 = 0.8;

pub struct ChartPlotter;

impl ChartPlotter {
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Build one bar per present value; bars of the same row sit side by side
    /// around the row index.
    pub fn bars_for(chart_data: &ChartData, series_idx: usize) -> Vec<Bar> {
        let Some(series) = chart_data.series.get(series_idx) else {
            return Vec::new();
        };

        let count = chart_data.series.len().max(1) as f64;
        let bar_width = GROUP_WIDTH / count;
        let offset = -GROUP_WIDTH / 2.0 + bar_width * (series_idx as f64 + 0.5);

        series
            .values
            .iter()
            .enumerate()
            .filter_map(|(row, value)| {
                value
                    .filter(|v| v.is_finite())
                    .map(|v| Bar::new(row as f64 + offset, v).width(bar_width))
            })
            .collect()
    }

    /// Draw the bar chart for one file.
    pub fn draw_bar_chart(ui: &mut egui::Ui, id: impl std::hash::Hash, chart_data: &ChartData) {
        // Legend
        ui.horizontal(|ui| {
            for (idx, series) in chart_data.series.iter().enumerate() {
                let (rect, _) =
                    ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
                ui.painter().rect_filled(rect, 3.0, Self::series_color(idx));
                ui.label(RichText::new(&series.name).size(12.0));
                ui.add_space(10.0);
            }
        });

        Plot::new(id)
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Row")
            .y_axis_label("Value")
            .show(ui, |plot_ui| {
                for (idx, series) in chart_data.series.iter().enumerate() {
                    let color = Self::series_color(idx);
                    let chart = BarChart::new(Self::bars_for(chart_data, idx))
                        .color(color)
                        .name(&series.name);
                    plot_ui.bar_chart(chart);
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartSeries;

    #[test]
    fn missing_values_produce_no_bar() {
        let data = ChartData {
            row_count: 3,
            series: vec![
                ChartSeries {
                    name: "a".into(),
                    values: vec![Some(1.0), None, Some(3.0)],
                },
                ChartSeries {
                    name: "b".into(),
                    values: vec![Some(2.0), Some(2.0), Some(f64::NAN)],
                },
            ],
        };

        assert_eq!(ChartPlotter::bars_for(&data, 0).len(), 2);
        assert_eq!(ChartPlotter::bars_for(&data, 1).len(), 2);
        assert!(ChartPlotter::bars_for(&data, 2).is_empty());
    }
}
