//! XLSX Writer Module
//! Builds a single-sheet workbook in memory.
//!
//! Uses direct ZIP/XML generation: the package parts are small and fixed,
//! only the worksheet body depends on the table.

use crate::error::Result;
use polars::prelude::*;
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use ::zip::write::FileOptions;
use ::zip::ZipWriter;

pub const SHEET_NAME: &str = "Sheet1";

/// Typed view over one column, resolved once before rows are written.
enum CellSource {
    Number(Float64Chunked),
    Bool(BooleanChunked),
    Text(StringChunked),
}

impl CellSource {
    fn from_column(column: &Column) -> Result<Self> {
        let series = column.as_materialized_series();
        let source = match series.dtype() {
            DataType::Boolean => Self::Bool(series.bool()?.clone()),
            dtype if crate::data::DataProcessor::is_numeric(dtype) => {
                Self::Number(series.cast(&DataType::Float64)?.f64()?.clone())
            }
            _ => Self::Text(series.cast(&DataType::String)?.str()?.clone()),
        };
        Ok(source)
    }

    /// Cell XML for `row`, or `None` for a missing value.
    fn cell_xml(&self, cell_ref: &str, row: usize) -> Option<String> {
        match self {
            Self::Number(ca) => ca
                .get(row)
                .filter(|v| v.is_finite())
                .map(|v| format!(r#"<c r="{}"><v>{}</v></c>"#, cell_ref, v)),
            Self::Bool(ca) => ca
                .get(row)
                .map(|v| format!(r#"<c r="{}" t="b"><v>{}</v></c>"#, cell_ref, u8::from(v))),
            Self::Text(ca) => ca.get(row).map(|v| inline_string(cell_ref, v)),
        }
    }
}

/// XLSX generator for exporting tables
pub struct XlsxWriter;

impl XlsxWriter {
    /// Serialize `df` to xlsx bytes: one sheet, header row, no row index.
    pub fn write(df: &DataFrame) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        // 1. [Content_Types].xml
        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(Self::content_types_xml().as_bytes())?;

        // 2. _rels/.rels
        zip.start_file("_rels/.rels", options)?;
        zip.write_all(Self::rels_xml().as_bytes())?;

        // 3. Workbook and its relationships
        zip.start_file("xl/workbook.xml", options)?;
        zip.write_all(Self::workbook_xml().as_bytes())?;
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(Self::workbook_rels_xml().as_bytes())?;

        // 4. Styles
        zip.start_file("xl/styles.xml", options)?;
        zip.write_all(Self::styles_xml().as_bytes())?;

        // 5. The sheet itself
        zip.start_file("xl/worksheets/sheet1.xml", options)?;
        zip.write_all(Self::sheet_xml(df)?.as_bytes())?;

        // 6. docProps
        zip.start_file("docProps/core.xml", options)?;
        zip.write_all(Self::core_props_xml().as_bytes())?;
        zip.start_file("docProps/app.xml", options)?;
        zip.write_all(Self::app_props_xml().as_bytes())?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    fn sheet_xml(df: &DataFrame) -> Result<String> {
        let sources = df
            .get_columns()
            .iter()
            .map(CellSource::from_column)
            .collect::<Result<Vec<_>>>()?;

        let mut rows = String::new();

        // Header row
        rows.push_str(r#"<row r="1">"#);
        for (col_idx, name) in df.get_column_names().iter().enumerate() {
            let cell_ref = format!("{}1", column_letters(col_idx));
            rows.push_str(&inline_string(&cell_ref, name.as_str()));
        }
        rows.push_str("</row>");

        // Data rows
        for row in 0..df.height() {
            let row_num = row + 2;
            rows.push_str(&format!(r#"<row r="{}">"#, row_num));
            for (col_idx, source) in sources.iter().enumerate() {
                let cell_ref = format!("{}{}", column_letters(col_idx), row_num);
                if let Some(cell) = source.cell_xml(&cell_ref, row) {
                    rows.push_str(&cell);
                }
            }
            rows.push_str("</row>");
        }

        Ok(format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheetData>{}</sheetData>
</worksheet>"#,
            rows
        ))
    }

    fn content_types_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
</Types>"#
    }

    fn rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#
    }

    fn workbook_xml() -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#,
            SHEET_NAME
        )
    }

    fn workbook_rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#
    }

    fn styles_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>
<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#
    }

    fn core_props_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dc:creator>Data Sweeper</dc:creator>
<cp:lastModifiedBy>Data Sweeper</cp:lastModifiedBy>
</cp:coreProperties>"#
    }

    fn app_props_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
<Application>Data Sweeper</Application>
<DocSecurity>0</DocSecurity>
<ScaleCrop>false</ScaleCrop>
<LinksUpToDate>false</LinksUpToDate>
<SharedDoc>false</SharedDoc>
<HyperlinksChanged>false</HyperlinksChanged>
</Properties>"#
    }
}

fn inline_string(cell_ref: &str, text: &str) -> String {
    // XML 1.0 forbids most control characters, even escaped.
    let clean: String = text
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    format!(
        r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
        cell_ref,
        escape(clean.as_str())
    )
}

/// Zero-based column index to spreadsheet letters: 0 -> A, 25 -> Z, 26 -> AA.
fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}
