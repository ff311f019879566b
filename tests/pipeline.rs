//! End-to-end tests for ingest → clean → select → export.

use anyhow::{bail, Result};
use data_sweeper::config::AppConfig;
use data_sweeper::data::{DataLoader, DataProcessor, UploadedFile};
use data_sweeper::export::{self, ConversionTarget, XLSX_MIME};
use data_sweeper::session::{Action, NoticeLevel, Session};

const SALES_CSV: &str = "region,units,price,note\n\
north,10,2.5,ok\n\
south,,3.0,\n\
north,10,2.5,ok\n\
east,7,,late\n";

fn ingest(name: &str, bytes: &[u8]) -> Result<polars::prelude::DataFrame> {
    Ok(DataLoader::ingest(
        &UploadedFile::new(name, bytes.to_vec()),
        &AppConfig::default(),
    )?)
}

#[test]
fn csv_round_trip_preserves_table() -> Result<()> {
    let original = ingest("sales.csv", SALES_CSV.as_bytes())?;
    let mut projected = original.clone();
    let all = DataProcessor::column_names(&projected);
    DataProcessor::select_columns(&mut projected, &all)?;

    let artifact = export::export(
        &projected,
        &UploadedFile::new("sales.csv", Vec::new()),
        ConversionTarget::Csv,
    )?;
    let back = ingest(&artifact.file_name, &artifact.bytes)?;

    assert!(back.equals_missing(&original), "{back:?} != {original:?}");
    Ok(())
}

#[test]
fn fill_missing_scenario_from_two_rows() -> Result<()> {
    let mut df = ingest("tiny.csv", b"a,b\n1,\n2,4\n")?;
    DataProcessor::fill_missing_numeric(&mut df)?;

    let a: Vec<Option<i64>> = df.column("a")?.i64()?.into_iter().collect();
    let b: Vec<Option<f64>> = df.column("b")?.f64()?.into_iter().collect();
    assert_eq!(a, [Some(1), Some(2)]);
    assert_eq!(b, [Some(4.0), Some(4.0)]);
    Ok(())
}

#[test]
fn fill_missing_covers_na_markers() -> Result<()> {
    for csv in ["a,b\n1,NaN\n2,4\n", "a,b\n1,NA\n2,4\n", "a,b\n1,nan\n2,4\n"] {
        let mut df = ingest("markers.csv", csv.as_bytes())?;
        let filled = DataProcessor::fill_missing_numeric(&mut df)?;

        let b: Vec<Option<f64>> = df.column("b")?.f64()?.into_iter().collect();
        assert_eq!(filled, 1, "{csv:?}");
        assert_eq!(b, [Some(4.0), Some(4.0)], "{csv:?}");
    }
    Ok(())
}

#[test]
fn txt_upload_reports_unsupported_type() -> Result<()> {
    let mut session = Session::new(AppConfig::default());
    let id = session.upload(UploadedFile::new("data.txt", b"a,b\n1,2\n".to_vec()));
    let view = session.view(id)?;

    assert_eq!(view.rejected.as_deref(), Some("Unsupported file type: .txt"));
    assert_eq!(view.last_notices.len(), 1);
    assert_eq!(view.last_notices[0].level, NoticeLevel::Error);
    assert!(view.preview.is_none() && view.chart.is_none() && view.columns.is_empty());
    Ok(())
}

#[test]
fn xlsx_export_reads_back_as_same_values() -> Result<()> {
    let original = ingest("sales.csv", SALES_CSV.as_bytes())?;
    let artifact = export::export(
        &original,
        &UploadedFile::new("sales.csv", Vec::new()),
        ConversionTarget::Excel,
    )?;
    assert_eq!(artifact.file_name, "sales.xlsx");
    assert_eq!(artifact.mime, XLSX_MIME);

    let back = ingest(&artifact.file_name, &artifact.bytes)?;
    assert!(back.equals_missing(&original), "{back:?} != {original:?}");
    Ok(())
}

#[test]
fn full_session_flow_over_two_files() -> Result<()> {
    let mut session = Session::new(AppConfig::default());
    let sales = session.upload(UploadedFile::new("sales.csv", SALES_CSV.as_bytes().to_vec()));
    let notes = session.upload(UploadedFile::new("notes.csv", b"text\nhello\n".to_vec()));

    let view = session.view(sales)?;
    assert_eq!(view.preview.as_ref().map(|p| p.height()), Some(4));
    assert_eq!(view.options.selected_columns, ["region", "units", "price", "note"]);

    session.apply(Action::SetCleaning(sales, true))?;
    session.apply(Action::RemoveDuplicates(sales))?;
    session.apply(Action::FillMissing(sales))?;
    session.apply(Action::SelectColumns(
        sales,
        vec!["units".into(), "region".into()],
    ))?;
    session.apply(Action::SetShowChart(sales, true))?;
    session.apply(Action::SetTarget(sales, ConversionTarget::Csv))?;

    let view = session.view(sales)?;
    let Some(chart) = view.chart else {
        bail!("expected a chart for numeric data");
    };
    assert_eq!(chart.series.len(), 1);
    assert_eq!(chart.series[0].name, "units");
    assert_eq!(chart.series[0].values, [Some(10.0), Some(8.5), Some(7.0)]);

    let outcome = session.apply(Action::Convert(sales))?;
    let Some(artifact) = outcome.artifact else {
        bail!("convert produced no artifact");
    };
    assert_eq!(
        String::from_utf8(artifact.bytes)?,
        "units,region\n10.0,north\n8.5,south\n7.0,east\n"
    );

    // The second file never saw any of the actions above.
    let notes_table = session.projected_table(notes)?;
    assert_eq!(notes_table.height(), 1);
    assert!(!session.view(notes)?.options.clean_enabled);
    assert_eq!(session.summary().map(|n| n.level), Some(NoticeLevel::Success));
    Ok(())
}
