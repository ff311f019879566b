//! Spreadsheet Reader
//! Turns the first worksheet of an xlsx workbook into a typed DataFrame.

use crate::error::{Result, SweeperError};
use calamine::{Data, Reader, Xlsx};
use polars::prelude::*;
use std::io::Cursor;

/// Column type inferred from the present (non-empty) cells of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Int,
    Float,
    Bool,
    Text,
}

static EMPTY: Data = Data::Empty;

/// Read the first worksheet. The first row is the header; every cell below
/// it belongs to the column of the same index.
pub fn read_first_sheet(bytes: &[u8]) -> Result<DataFrame> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SweeperError::EmptyWorkbook)??;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let body: Vec<&[Data]> = rows.collect();

    let names = header_names(header);
    let columns = names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| row.get(idx).unwrap_or(&EMPTY))
                .collect();
            build_column(&name, &cells)
        })
        .collect::<Vec<_>>();

    Ok(DataFrame::new(columns)?)
}

/// Header cells as column names; blanks are named `Unnamed: <index>` and
/// repeated names get a `.1`, `.2` suffix so every column stays addressable.
fn header_names(header: &[Data]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(header.len());
    for (idx, cell) in header.iter().enumerate() {
        let base = match cell_text(cell) {
            Some(text) if !text.trim().is_empty() => text,
            _ => format!("Unnamed: {}", idx),
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while names.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        names.push(name);
    }
    names
}

fn classify(cells: &[&Data]) -> CellKind {
    let mut kind: Option<CellKind> = None;

    for cell in cells {
        let cell_kind = match cell {
            Data::Empty => continue,
            Data::Int(_) => CellKind::Int,
            Data::Float(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => CellKind::Int,
            Data::Float(_) => CellKind::Float,
            Data::Bool(_) => CellKind::Bool,
            _ => return CellKind::Text,
        };

        kind = Some(match (kind, cell_kind) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(CellKind::Int | CellKind::Float), CellKind::Int | CellKind::Float) => {
                CellKind::Float
            }
            _ => return CellKind::Text,
        });
    }

    // An all-empty column carries no type information.
    kind.unwrap_or(CellKind::Text)
}

fn build_column(name: &str, cells: &[&Data]) -> Column {
    let name: PlSmallStr = name.into();
    match classify(cells) {
        CellKind::Int => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Int(v) => Some(*v),
                    Data::Float(v) => Some(*v as i64),
                    _ => None,
                })
                .collect();
            Column::new(name, values)
        }
        CellKind::Float => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Int(v) => Some(*v as f64),
                    Data::Float(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Column::new(name, values)
        }
        CellKind::Bool => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Bool(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Column::new(name, values)
        }
        CellKind::Text => {
            let values: Vec<Option<String>> = cells.iter().map(|cell| cell_text(cell)).collect();
            Column::new(name, values)
        }
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(value) => Some(value.clone()),
        Data::Int(value) => Some(value.to_string()),
        Data::Float(value) => Some(value.to_string()),
        Data::Bool(value) => Some(if *value { "True" } else { "False" }.to_string()),
        Data::DateTime(value) => value
            .as_datetime()
            .map(|dt| dt.to_string())
            .or_else(|| Some(value.as_f64().to_string())),
        Data::DateTimeIso(value) | Data::DurationIso(value) => Some(value.clone()),
        Data::Error(err) => Some(format!("{:?}", err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_floats_become_integers() {
        let cells = [Data::Float(1.0), Data::Empty, Data::Int(3)];
        let refs: Vec<&Data> = cells.iter().collect();
        assert_eq!(classify(&refs), CellKind::Int);
    }

    #[test]
    fn mixed_numbers_and_text_become_text() {
        let cells = [Data::Float(1.5), Data::String("n/a".into())];
        let refs: Vec<&Data> = cells.iter().collect();
        assert_eq!(classify(&refs), CellKind::Text);
    }

    #[test]
    fn blank_and_duplicate_headers_are_renamed() {
        let header = [
            Data::String("id".into()),
            Data::Empty,
            Data::String("id".into()),
        ];
        assert_eq!(header_names(&header), ["id", "Unnamed: 1", "id.1"]);
    }
}
