//! Charts module - bar chart data and rendering

mod plotter;

pub use plotter::ChartPlotter;

/// One plotted column: a value (or gap) per row index.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Bar chart over row index, one bar group per row.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub row_count: usize,
    pub series: Vec<ChartSeries>,
}
