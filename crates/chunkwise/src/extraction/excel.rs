//! Spreadsheet extraction using `calamine`.
//!
//! Supports the Office Open XML workbook (`.xlsx`) and the legacy binary
//! format (`.xls`). Every non-empty sheet becomes one sheet segment holding a
//! markdown table, with the sheet name as its heading.
use calamine::{Data, Range, Reader, Xls, Xlsx};
use std::fmt::Write as FmtWrite;
use std::io::Cursor;

use crate::core::mime::{EXCEL_BINARY_MIME_TYPE, EXCEL_MIME_TYPE};
use crate::error::{ChunkwiseError, Result};
use crate::extraction::table::cells_to_markdown;
use crate::types::{Extraction, PageFailure, Segment, SegmentKind};

/// Read a workbook from memory and emit one segment per non-empty sheet.
pub fn extract_workbook(data: &[u8], mime_type: &str) -> Result<Extraction> {
    let cursor = Cursor::new(data);

    match mime_type {
        EXCEL_MIME_TYPE => {
            let workbook =
                Xlsx::new(cursor).map_err(|e| ChunkwiseError::parsing(format!("Failed to parse XLSX: {}", e)))?;
            process_workbook(workbook)
        }
        EXCEL_BINARY_MIME_TYPE => {
            let workbook =
                Xls::new(cursor).map_err(|e| ChunkwiseError::parsing(format!("Failed to parse XLS: {}", e)))?;
            process_workbook(workbook)
        }
        other => Err(ChunkwiseError::UnsupportedFormat(other.to_string())),
    }
}

fn process_workbook<RS, R>(mut workbook: R) -> Result<Extraction>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let sheet_names = workbook.sheet_names();
    let mut extraction = Extraction::default();

    for (index, name) in sheet_names.iter().enumerate() {
        match workbook.worksheet_range(name) {
            Ok(range) => {
                if let Some(segment) = sheet_segment(name, &range) {
                    extraction.segments.push(segment);
                }
            }
            Err(e) => {
                tracing::warn!(sheet = %name, error = %e, "Skipping unreadable sheet");
                extraction.failed_pages.push(PageFailure {
                    page_number: index + 1,
                    reason: e.to_string(),
                });
            }
        }
    }

    extraction
        .attributes
        .insert("sheet_count".to_string(), serde_json::Value::from(sheet_names.len()));
    Ok(extraction)
}

fn sheet_segment(name: &str, range: &Range<Data>) -> Option<Segment> {
    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(format_cell).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect();

    if rows.is_empty() {
        return None;
    }

    let row_count = rows.len();
    Some(
        Segment::new(cells_to_markdown(&rows), vec![name.to_string()])
            .with_kind(SegmentKind::Sheet)
            .with_attribute("sheet_name", name)
            .with_attribute("rows", row_count),
    )
}

fn format_cell(data: &Data) -> String {
    let mut buffer = String::new();
    format_cell_value_into(&mut buffer, data);
    buffer
}

#[inline]
fn format_cell_value_into(buffer: &mut String, data: &Data) {
    match data {
        Data::Empty => {}
        Data::String(s) | Data::DateTimeIso(s) => buffer.push_str(s),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                let _ = write!(buffer, "{}", *f as i64);
            } else {
                let _ = write!(buffer, "{}", f);
            }
        }
        Data::Int(i) => {
            let _ = write!(buffer, "{}", i);
        }
        Data::Bool(b) => buffer.push_str(if *b { "true" } else { "false" }),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => {
                let _ = write!(buffer, "{}", datetime.format("%Y-%m-%d %H:%M:%S"));
            }
            None => {
                let _ = write!(buffer, "{}", dt.as_f64());
            }
        },
        Data::Error(e) => {
            let _ = write!(buffer, "#ERR: {:?}", e);
        }
        Data::DurationIso(s) => {
            buffer.push_str("DURATION: ");
            buffer.push_str(s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    #[test]
    fn test_format_cell_value_into() {
        assert_eq!(format_cell(&Data::Empty), "");
        assert_eq!(format_cell(&Data::String("test".to_owned())), "test");
        assert_eq!(format_cell(&Data::Float(42.0)), "42");
        assert_eq!(format_cell(&Data::Float(2.5)), "2.5");
        assert_eq!(format_cell(&Data::Int(100)), "100");
        assert_eq!(format_cell(&Data::Bool(true)), "true");
        assert_eq!(format_cell(&Data::Error(CellErrorType::Div0)), "#ERR: Div0");
        assert_eq!(format_cell(&Data::DurationIso("PT1H30M".to_owned())), "DURATION: PT1H30M");
    }

    #[test]
    fn test_sheet_segment_with_data() {
        let mut range = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("Name".to_owned()));
        range.set_value((0, 1), Data::String("Age".to_owned()));
        range.set_value((1, 0), Data::String("Alice".to_owned()));
        range.set_value((1, 1), Data::Int(30));
        range.set_value((2, 0), Data::String("Bob".to_owned()));
        range.set_value((2, 1), Data::Int(25));

        let segment = sheet_segment("People", &range).unwrap();
        assert_eq!(segment.kind, SegmentKind::Sheet);
        assert_eq!(segment.headings, vec!["People".to_string()]);
        assert!(segment.text.starts_with("| Name | Age |"));
        assert!(segment.text.contains("| Bob | 25 |"));
        assert_eq!(segment.attributes["rows"], serde_json::Value::from(3));
    }

    #[test]
    fn test_empty_sheet_is_skipped() {
        let range: Range<Data> = Range::new((0, 0), (1, 1));
        assert!(sheet_segment("Blank", &range).is_none());
    }

    /// A workbook listing `Data` and `Missing`, where only `Data` has a worksheet part.
    fn workbook_with_missing_sheet() -> Vec<u8> {
        use std::io::Write;
        use zip::write::SimpleFileOptions;

        const MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
        const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
        let parts = [
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/></Types>"#.to_string(),
            ),
            (
                "xl/workbook.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="{MAIN}" xmlns:r="{REL}"><sheets><sheet name="Data" sheetId="1" r:id="rId1"/><sheet name="Missing" sheetId="2" r:id="rId2"/></sheets></workbook>"#
                ),
            ),
            (
                "xl/_rels/workbook.xml.rels",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL}/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="{REL}/worksheet" Target="worksheets/sheet2.xml"/></Relationships>"#
                ),
            ),
            (
                "xl/worksheets/sheet1.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="{MAIN}"><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>Item</t></is></c></row><row r="2"><c r="A2" t="inlineStr"><is><t>Bolts</t></is></c></row></sheetData></worksheet>"#
                ),
            ),
        ];

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            for (name, content) in &parts {
                zip.start_file(*name, SimpleFileOptions::default()).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_unreadable_sheet_is_recorded_and_skipped() {
        let extraction = extract_workbook(&workbook_with_missing_sheet(), EXCEL_MIME_TYPE).unwrap();

        assert_eq!(extraction.segments.len(), 1);
        assert_eq!(extraction.segments[0].headings, vec!["Data".to_string()]);
        assert_eq!(extraction.failed_pages.len(), 1);
        assert_eq!(extraction.failed_pages[0].page_number, 2);
        assert!(extraction.failed_pages[0].reason.contains("Missing"));
        assert_eq!(extraction.attributes["sheet_count"], serde_json::Value::from(2));
    }

    #[test]
    fn test_invalid_bytes() {
        let err = extract_workbook(b"not a workbook", EXCEL_MIME_TYPE).unwrap_err();
        assert!(matches!(err, ChunkwiseError::Parsing { .. }));
    }

    #[test]
    fn test_unsupported_mime() {
        let err = extract_workbook(b"", "text/plain").unwrap_err();
        assert!(matches!(err, ChunkwiseError::UnsupportedFormat(_)));
    }
}
