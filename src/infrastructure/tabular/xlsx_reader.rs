// ============================================================
// XLSX READER
// ============================================================
// Read the first worksheet of an uploaded workbook

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::domain::bug_report::Cell;
use crate::domain::error::{AppError, Result};

#[derive(Default)]
pub struct XlsxReader;

impl XlsxReader {
    pub fn new() -> Self {
        Self
    }

    /// Rows of the first worksheet, starting at worksheet row 1.
    /// Rows above the used range come back empty so header offsets stay physical.
    pub fn read_rows(&self, bytes: &[u8]) -> Result<Vec<Vec<Cell>>> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
            .map_err(|e| AppError::ParseError(format!("Failed to open Excel file: {}", e)))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::ParseError("No worksheet found".to_string()))?
            .map_err(|e| AppError::ParseError(format!("Failed to read Excel range: {}", e)))?;

        let leading_rows = range.start().map(|(row, _)| row as usize).unwrap_or(0);
        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); leading_rows];

        for row in range.rows() {
            rows.push(row.iter().map(cell_from_data).collect());
        }

        Ok(rows)
    }
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Int(value) => Cell::Int(*value),
        // whole numbers are stored as floats in the sheet XML
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            Cell::Int(*value as i64)
        }
        Data::Float(value) => Cell::Float(*value),
        Data::String(value) => Cell::from_raw_text(value),
        Data::Bool(value) => Cell::Bool(*value),
        Data::Empty | Data::Error(_) => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}
