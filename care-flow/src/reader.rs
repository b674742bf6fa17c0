//! Ports for the binary document decoders.
//!
//! The normalizer only ever sees the output of these readers: one block of
//! text for page documents, or sheets of rows of text cells for tabular ones.
//! The default implementations wrap `pdf-extract` and `calamine`; tests swap
//! in fixtures through the same traits.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};

use crate::error::{CareError, Result};

/// Rows of one sheet, every cell already coerced to text.
pub type SheetRows = Vec<Vec<String>>;

/// Decodes a page-based document into its linear text.
pub trait PageTextReader: Send + Sync {
    fn read_text(&self, bytes: &[u8]) -> Result<String>;
}

/// Decodes a tabular document into sheets, in workbook order.
pub trait TabularReader: Send + Sync {
    fn read_sheets(&self, bytes: &[u8]) -> Result<Vec<SheetRows>>;
}

/// PDF text layer extraction via `pdf-extract`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextReader;

impl PageTextReader for PdfTextReader {
    fn read_text(&self, bytes: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| CareError::Decode(e.to_string()))
    }
}

/// Spreadsheet decoding via `calamine` (xlsx, xls, ods).
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkbookReader;

impl TabularReader for WorkbookReader {
    fn read_sheets(&self, bytes: &[u8]) -> Result<Vec<SheetRows>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| CareError::Decode(format!("Failed to open workbook: {}", e)))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| CareError::Decode(format!("Failed to read sheet {}: {}", name, e)))?;

            let rows = range
                .rows()
                .map(|row| trim_trailing_empty(row.iter().map(cell_to_text).collect()))
                .collect();
            sheets.push(rows);
        }

        Ok(sheets)
    }
}

pub fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

// Ranges are rectangular; drop the padding so a row is only as wide as its
// last populated cell.
fn trim_trailing_empty(mut cells: Vec<String>) -> Vec<String> {
    while cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_text() {
        assert_eq!(cell_to_text(&Data::Empty), "");
        assert_eq!(cell_to_text(&Data::Float(72.0)), "72");
        assert_eq!(cell_to_text(&Data::Float(98.6)), "98.6");
        assert_eq!(cell_to_text(&Data::Int(120)), "120");
        assert_eq!(cell_to_text(&Data::Bool(true)), "true");
        assert_eq!(
            cell_to_text(&Data::String("Blood Pressure".to_string())),
            "Blood Pressure"
        );
    }

    #[test]
    fn test_trim_trailing_empty() {
        let row = vec!["Name".to_string(), String::new(), String::new()];
        assert_eq!(trim_trailing_empty(row), vec!["Name".to_string()]);

        let row = vec![String::new(), "x".to_string()];
        assert_eq!(trim_trailing_empty(row.clone()), row);
    }

    #[test]
    fn test_workbook_sheets_and_rows_in_order() {
        let bytes = include_bytes!("../tests/fixtures/vitals.xlsx");
        let sheets = WorkbookReader.read_sheets(bytes).unwrap();

        fn text(row: &[&str]) -> Vec<String> {
            row.iter().map(|c| c.to_string()).collect()
        }
        assert_eq!(
            sheets,
            vec![
                vec![
                    text(&["Metric", "Value"]),
                    text(&["Heart Rate", "72"]),
                    text(&["Blood Pressure", "130/85"]),
                ],
                vec![
                    text(&["Diagnosis", "hypertension", "Clinic"]),
                    text(&["Follow-up"]),
                ],
            ]
        );
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        assert!(matches!(
            PdfTextReader.read_text(b"not a pdf"),
            Err(CareError::Decode(_))
        ));
        assert!(matches!(
            WorkbookReader.read_sheets(b"not a workbook"),
            Err(CareError::Decode(_))
        ));
    }
}
