//! Data Processor Module
//! Cleaning, projection and chart extraction over a loaded DataFrame.

use crate::charts::{ChartData, ChartSeries};
use crate::error::{Result, SweeperError};
use polars::prelude::*;

/// Result of a column projection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// The table now holds exactly the requested columns.
    Applied,
    /// Nothing was selected, the table was left untouched.
    Refused,
}

/// Handles data cleaning and transformation operations.
pub struct DataProcessor;

impl DataProcessor {
    /// First `n` rows, read-only.
    pub fn preview(df: &DataFrame, n: usize) -> DataFrame {
        df.head(Some(n))
    }

    /// Names of all columns, in table order.
    pub fn column_names(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn is_numeric(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    /// Names of numeric columns, in table order.
    pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
        df.get_columns()
            .iter()
            .filter(|col| Self::is_numeric(col.dtype()))
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Drop rows identical to an earlier row, keeping first occurrences in
    /// their original order. Returns the number of rows removed.
    pub fn remove_duplicates(df: &mut DataFrame) -> Result<usize> {
        let before = df.height();
        let deduped = df
            .clone()
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;

        let removed = before - deduped.height();
        *df = deduped;
        tracing::debug!(removed, "Removed duplicate rows");
        Ok(removed)
    }

    /// Replace missing cells of every numeric column with the mean of that
    /// column's present values. Returns the number of cells filled.
    ///
    /// Float NaN counts as missing. Columns that get filled are widened to
    /// Float64; numeric columns with nothing missing keep their type.
    pub fn fill_missing_numeric(df: &mut DataFrame) -> Result<usize> {
        Self::nan_to_null(df)?;

        let mut exprs = Vec::new();
        let mut filled = 0;

        for column in df.get_columns() {
            if !Self::is_numeric(column.dtype()) {
                continue;
            }
            let nulls = column.null_count();
            if nulls == 0 {
                continue;
            }
            let Some(mean) = column.as_materialized_series().mean() else {
                // All cells missing: there is no mean to fill with.
                continue;
            };

            let name = column.name().as_str();
            exprs.push(col(name).cast(DataType::Float64).fill_null(lit(mean)));
            filled += nulls;
        }

        if exprs.is_empty() {
            return Ok(0);
        }

        *df = df.clone().lazy().with_columns(exprs).collect()?;
        tracing::debug!(filled, "Filled missing numeric cells");
        Ok(filled)
    }

    fn nan_to_null(df: &mut DataFrame) -> Result<()> {
        let exprs: Vec<Expr> = df
            .get_columns()
            .iter()
            .filter(|c| matches!(c.dtype(), DataType::Float32 | DataType::Float64))
            .map(|c| col(c.name().as_str()).fill_nan(lit(NULL)))
            .collect();

        if !exprs.is_empty() {
            *df = df.clone().lazy().with_columns(exprs).collect()?;
        }
        Ok(())
    }

    /// Project onto `names` in the given order. An empty selection is
    /// refused and leaves the table as it was.
    pub fn select_columns(df: &mut DataFrame, names: &[String]) -> Result<Projection> {
        if names.is_empty() {
            return Ok(Projection::Refused);
        }

        if let Some(missing) = names.iter().find(|n| df.column(n.as_str()).is_err()) {
            return Err(SweeperError::ColumnNotFound(missing.clone()));
        }

        *df = df.select(names.iter().map(|n| n.as_str()))?;
        Ok(Projection::Applied)
    }

    /// Bar chart data from the first `limit` numeric columns, or `None` when
    /// the table has no numeric column.
    pub fn visualize_numeric(df: &DataFrame, limit: usize) -> Result<Option<ChartData>> {
        let numeric = Self::numeric_columns(df);
        if numeric.is_empty() {
            return Ok(None);
        }

        let mut series = Vec::new();
        for name in numeric.iter().take(limit) {
            let values_f64 = df.column(name)?.cast(&DataType::Float64)?;
            let values: Vec<Option<f64>> = values_f64.f64()?.into_iter().collect();
            series.push(ChartSeries {
                name: name.clone(),
                values,
            });
        }

        Ok(Some(ChartData {
            row_count: df.height(),
            series,
        }))
    }

    /// Render one cell for display; missing cells render empty.
    pub fn cell_text(column: &Column, row: usize) -> String {
        match column.get(row) {
            Ok(AnyValue::Null) | Err(_) => String::new(),
            Ok(AnyValue::String(s)) => s.to_string(),
            Ok(AnyValue::StringOwned(s)) => s.to_string(),
            Ok(val) => val.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PolarsResult<DataFrame> {
        df!(
            "id" => [1i64, 2, 1, 3, 2],
            "name" => ["a", "b", "a", "c", "b"],
            "score" => [Some(1.5), None, Some(1.5), Some(4.5), None],
        )
    }

    #[test]
    fn remove_duplicates_keeps_first_occurrence_order() -> anyhow::Result<()> {
        let mut df = sample()?;
        let removed = DataProcessor::remove_duplicates(&mut df)?;

        assert_eq!(removed, 2);
        let ids: Vec<Option<i64>> = df.column("id")?.i64()?.into_iter().collect();
        assert_eq!(ids, [Some(1), Some(2), Some(3)]);
        assert_eq!(DataProcessor::column_names(&df), ["id", "name", "score"]);
        Ok(())
    }

    #[test]
    fn remove_duplicates_is_idempotent() -> anyhow::Result<()> {
        let mut once = sample()?;
        DataProcessor::remove_duplicates(&mut once)?;
        let mut twice = once.clone();
        let removed = DataProcessor::remove_duplicates(&mut twice)?;

        assert_eq!(removed, 0);
        assert!(once.equals_missing(&twice));
        Ok(())
    }

    #[test]
    fn fill_uses_mean_of_present_values() -> anyhow::Result<()> {
        let mut df = df!(
            "a" => [1i64, 2],
            "b" => [None, Some(4i64)],
            "label" => [None, Some("x")],
        )?;
        let filled = DataProcessor::fill_missing_numeric(&mut df)?;

        assert_eq!(filled, 1);
        let a: Vec<Option<i64>> = df.column("a")?.i64()?.into_iter().collect();
        assert_eq!(a, [Some(1), Some(2)]);
        let b: Vec<Option<f64>> = df.column("b")?.f64()?.into_iter().collect();
        assert_eq!(b, [Some(4.0), Some(4.0)]);
        assert_eq!(df.column("label")?.null_count(), 1);
        Ok(())
    }

    #[test]
    fn fill_treats_nan_as_missing() -> anyhow::Result<()> {
        let mut df = df!("a" => [1i64, 2], "b" => [f64::NAN, 4.0])?;
        let filled = DataProcessor::fill_missing_numeric(&mut df)?;

        assert_eq!(filled, 1);
        let b: Vec<Option<f64>> = df.column("b")?.f64()?.into_iter().collect();
        assert_eq!(b, [Some(4.0), Some(4.0)]);
        Ok(())
    }

    #[test]
    fn cell_text_keeps_quotes_inside_strings() -> anyhow::Result<()> {
        let df = df!("s" => [Some("\"quoted\""), None], "n" => [Some(1.5), None])?;

        assert_eq!(DataProcessor::cell_text(df.column("s")?, 0), "\"quoted\"");
        assert_eq!(DataProcessor::cell_text(df.column("s")?, 1), "");
        assert_eq!(DataProcessor::cell_text(df.column("n")?, 0), "1.5");
        Ok(())
    }

    #[test]
    fn fill_preserves_column_mean() -> anyhow::Result<()> {
        let mut df = df!("v" => [Some(2.0), None, Some(7.0), None, Some(3.0)])?;
        let before = df.column("v")?.as_materialized_series().mean();
        DataProcessor::fill_missing_numeric(&mut df)?;
        let after = df.column("v")?.as_materialized_series().mean();

        assert_eq!(df.column("v")?.null_count(), 0);
        assert_eq!(before, Some(4.0));
        let after = after.unwrap_or(f64::NAN);
        assert!((after - 4.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn fill_without_numeric_columns_is_noop() -> anyhow::Result<()> {
        let mut df = df!("s" => [Some("x"), None])?;
        let original = df.clone();

        assert_eq!(DataProcessor::fill_missing_numeric(&mut df)?, 0);
        assert!(df.equals_missing(&original));
        Ok(())
    }

    #[test]
    fn empty_selection_is_refused() -> anyhow::Result<()> {
        let mut df = sample()?;
        let original = df.clone();

        let outcome = DataProcessor::select_columns(&mut df, &[])?;
        assert_eq!(outcome, Projection::Refused);
        assert!(df.equals_missing(&original));
        Ok(())
    }

    #[test]
    fn selection_follows_requested_order() -> anyhow::Result<()> {
        let mut df = sample()?;
        let names = vec!["score".to_string(), "id".to_string()];

        assert_eq!(DataProcessor::select_columns(&mut df, &names)?, Projection::Applied);
        assert_eq!(DataProcessor::column_names(&df), ["score", "id"]);

        let unknown = vec!["nope".to_string()];
        assert!(matches!(
            DataProcessor::select_columns(&mut df, &unknown),
            Err(SweeperError::ColumnNotFound(name)) if name == "nope"
        ));
        Ok(())
    }

    #[test]
    fn chart_takes_first_two_numeric_columns() -> anyhow::Result<()> {
        let df = df!(
            "label" => ["x", "y"],
            "first" => [1i64, 2],
            "second" => [Some(0.5), None],
            "third" => [9i64, 9],
        )?;
        let chart = DataProcessor::visualize_numeric(&df, 2)?;
        let Some(chart) = chart else {
            anyhow::bail!("expected chart data");
        };

        let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
        assert_eq!(chart.series[1].values, [Some(0.5), None]);
        assert_eq!(chart.row_count, 2);
        Ok(())
    }

    #[test]
    fn chart_without_numeric_columns_is_none() -> anyhow::Result<()> {
        let df = df!("label" => ["x", "y"])?;
        assert!(DataProcessor::visualize_numeric(&df, 2)?.is_none());
        Ok(())
    }
}
