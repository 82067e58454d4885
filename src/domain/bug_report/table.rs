// ============================================================
// BUG REPORT TABLE
// ============================================================
// Row/column view of an uploaded sheet

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::Cell;
use crate::domain::error::{AppError, Result};

/// Ordered rows under a named header. Every row has exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnKind {
    Int,
    Float,
    Bool,
    Text,
}

impl Table {
    /// Create a table, widening the header when a row is longer than it
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(columns.len());

        let mut columns = columns;
        for idx in columns.len()..width {
            columns.push(format!("Unnamed: {}", idx));
        }

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();

        Self { columns, rows }
    }

    /// Build a table from physical sheet rows.
    ///
    /// The first `skip_rows` rows are discarded, blank rows are ignored, and the
    /// first remaining row becomes the header.
    pub fn from_sheet_rows(raw_rows: Vec<Vec<Cell>>, skip_rows: usize) -> Result<Self> {
        let mut remaining = raw_rows
            .into_iter()
            .skip(skip_rows)
            .filter(|row| !row.iter().all(Cell::is_null));

        let header = remaining
            .next()
            .ok_or_else(|| AppError::ParseError("No columns to parse from file".to_string()))?;
        let data: Vec<Vec<Cell>> = remaining.collect();

        let width = data
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(header.len());

        Ok(Self::new(header_names(&header, width), data))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cells of a column in row order
    pub fn column_values(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|cells| &cells[idx])
    }

    /// Like `column_values`, failing with `MissingColumn` when absent
    pub fn require_column(&self, name: &str) -> Result<Vec<&Cell>> {
        self.column_values(name)
            .ok_or_else(|| AppError::MissingColumn(name.to_string()))
    }

    pub fn trim_column_names(&mut self) {
        for column in &mut self.columns {
            let trimmed = column.trim();
            if trimmed.len() != column.len() {
                *column = trimmed.to_string();
            }
        }
    }

    /// Rename the first case-insensitive match of `canonical` when no exact match exists
    pub fn canonicalize_column(&mut self, canonical: &str) -> bool {
        if self.has_column(canonical) {
            return false;
        }
        match self
            .columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(canonical))
        {
            Some(idx) => {
                self.columns[idx] = canonical.to_string();
                true
            }
            None => false,
        }
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Keep rows matching the predicate; returns how many were removed
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&[Cell]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }

    /// Replace every cell of a column in place; false when the column is absent
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> bool
    where
        F: FnMut(&Cell) -> Cell,
    {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        for row in &mut self.rows {
            let mapped = f(&row[idx]);
            row[idx] = mapped;
        }
        true
    }

    /// Append a column; the value count must equal the row count
    pub fn push_column(&mut self, name: &str, values: Vec<Cell>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(AppError::Internal(format!(
                "Column '{}' has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Convert text columns to Int, Float or Bool when every non-null value agrees
    pub fn infer_column_types(&mut self) {
        for idx in 0..self.columns.len() {
            let kind = self.detect_column_kind(idx);
            if kind == ColumnKind::Text {
                continue;
            }
            for row in &mut self.rows {
                let converted = match &row[idx] {
                    Cell::Text(raw) => convert_text(raw, kind),
                    _ => continue,
                };
                row[idx] = converted;
            }
        }
    }

    fn detect_column_kind(&self, idx: usize) -> ColumnKind {
        let values: Vec<&str> = self
            .rows
            .iter()
            .filter_map(|row| match &row[idx] {
                Cell::Text(raw) => Some(raw.as_str()),
                _ => None,
            })
            .collect();

        if values.is_empty() {
            return ColumnKind::Text;
        }

        let trimmed = || values.iter().map(|value| value.trim());
        if trimmed().all(|value| value.parse::<i64>().is_ok()) {
            ColumnKind::Int
        } else if trimmed().all(|value| value.parse::<f64>().is_ok()) {
            ColumnKind::Float
        } else if trimmed().all(|value| parse_bool(value).is_some()) {
            ColumnKind::Bool
        } else {
            ColumnKind::Text
        }
    }
}

fn convert_text(raw: &str, kind: ColumnKind) -> Cell {
    let value = raw.trim();
    let converted = match kind {
        ColumnKind::Int => value.parse::<i64>().ok().map(Cell::Int),
        ColumnKind::Float => value.parse::<f64>().ok().map(Cell::Float),
        ColumnKind::Bool => parse_bool(value).map(Cell::Bool),
        ColumnKind::Text => None,
    };
    converted.unwrap_or_else(|| Cell::Text(raw.to_string()))
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Header names with `Unnamed: {i}` placeholders and `.N` suffixes for duplicates
fn header_names(header: &[Cell], width: usize) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(width);

    for idx in 0..width {
        let base = match header.get(idx) {
            Some(cell) if !cell.is_null() => cell.to_text(),
            _ => format!("Unnamed: {}", idx),
        };

        let mut candidate = base.clone();
        while used.contains(&candidate) {
            let counter = counters.entry(base.clone()).or_insert(0);
            *counter += 1;
            candidate = format!("{}.{}", base, counter);
        }

        used.insert(candidate.clone());
        names.push(candidate);
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|value| Cell::from_raw_text(value)).collect()
    }

    #[test]
    fn test_header_from_first_non_blank_row() {
        let table = Table::from_sheet_rows(
            vec![
                text_row(&["", ""]),
                text_row(&["Details", "bug_type"]),
                text_row(&["crash", "Server"]),
            ],
            0,
        )
        .unwrap();

        assert_eq!(table.columns(), &["Details", "bug_type"]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_skip_rows_discards_banner() {
        let table = Table::from_sheet_rows(
            vec![
                text_row(&["Weekly bug export"]),
                text_row(&["generated nightly"]),
                text_row(&["Details"]),
                text_row(&["crash"]),
            ],
            2,
        )
        .unwrap();

        assert_eq!(table.columns(), &["Details"]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_empty_sheet_is_parse_error() {
        let err = Table::from_sheet_rows(vec![text_row(&["", ""])], 0).unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
    }

    #[test]
    fn test_header_mangling() {
        let table = Table::from_sheet_rows(
            vec![text_row(&["a", "", "a", "a"]), text_row(&["1", "2", "3", "4", "5"])],
            0,
        )
        .unwrap();

        assert_eq!(
            table.columns(),
            &["a", "Unnamed: 1", "a.1", "a.2", "Unnamed: 4"]
        );
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = Table::from_sheet_rows(
            vec![text_row(&["Details", "bug_type"]), text_row(&["crash"])],
            0,
        )
        .unwrap();

        assert_eq!(table.rows()[0], vec![Cell::Text("crash".to_string()), Cell::Empty]);
    }

    #[test]
    fn test_trim_and_canonicalize() {
        let mut table = Table::new(vec![" details ".to_string(), "BUG_TYPE".to_string()], vec![]);
        table.trim_column_names();
        assert!(table.canonicalize_column("Details"));
        assert!(table.canonicalize_column("bug_type"));
        assert!(!table.canonicalize_column("Logical_Issue"));
        assert_eq!(table.columns(), &["Details", "bug_type"]);
    }

    #[test]
    fn test_infer_column_types() {
        let mut table = Table::from_sheet_rows(
            vec![
                text_row(&["S.No", "score", "flag", "Details"]),
                text_row(&["1", "0.5", "TRUE", "12"]),
                text_row(&["2", "", "false", "abc"]),
            ],
            0,
        )
        .unwrap();
        table.infer_column_types();

        assert_eq!(table.rows()[0][0], Cell::Int(1));
        assert_eq!(table.rows()[0][1], Cell::Float(0.5));
        assert_eq!(table.rows()[1][1], Cell::Empty);
        assert_eq!(table.rows()[1][2], Cell::Bool(false));
        assert_eq!(table.rows()[0][3], Cell::Text("12".to_string()));
    }

    #[test]
    fn test_retain_and_push_column() {
        let mut table = Table::from_sheet_rows(
            vec![text_row(&["Details"]), text_row(&["a"]), text_row(&[""]), text_row(&["b"])],
            0,
        )
        .unwrap();
        // blank rows are skipped at load, so only two data rows remain
        assert_eq!(table.row_count(), 2);

        let removed = table.retain_rows(|row| row[0] != Cell::Text("a".to_string()));
        assert_eq!(removed, 1);

        table.push_column("Bug ID", vec![Cell::Int(1)]).unwrap();
        assert_eq!(table.cell(0, "Bug ID"), Some(&Cell::Int(1)));
        assert!(table.push_column("x", vec![]).is_err());
    }
}
