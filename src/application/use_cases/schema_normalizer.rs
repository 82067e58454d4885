// ============================================================
// SCHEMA NORMALIZER USE CASE
// ============================================================
// Guarantee a text `Details` column and a `Bug ID` identifier

use tracing::debug;

use crate::domain::bug_report::columns::{BUG_ID, DETAILS, SERIAL_NUMBER};
use crate::domain::bug_report::{Cell, Table};
use crate::domain::error::{AppError, Result};

/// Where the `Bug ID` column of a normalized table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BugIdSource {
    Existing,
    SerialNumber,
    Synthesized,
}

#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub table: Table,
    /// Rows removed because `Details` was null
    pub dropped_rows: usize,
    pub bug_id_source: BugIdSource,
}

impl NormalizedTable {
    /// `Details` values in row order
    pub fn details(&self) -> Result<Vec<String>> {
        Ok(self
            .table
            .require_column(DETAILS)?
            .into_iter()
            .map(Cell::to_text)
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct SchemaNormalizer;

impl SchemaNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, mut table: Table) -> Result<NormalizedTable> {
        let details_idx = table
            .column_index(DETAILS)
            .ok_or_else(|| AppError::MissingColumn(DETAILS.to_string()))?;

        let dropped_rows = table.retain_rows(|row| !row[details_idx].is_null());
        table.map_column(DETAILS, |cell| Cell::Text(cell.to_text()));

        let bug_id_source = if table.has_column(BUG_ID) {
            BugIdSource::Existing
        } else if table.rename_column(SERIAL_NUMBER, BUG_ID) {
            BugIdSource::SerialNumber
        } else {
            let ids = (1..=table.row_count())
                .map(|id| Cell::Int(id as i64))
                .collect();
            table.push_column(BUG_ID, ids)?;
            BugIdSource::Synthesized
        };

        debug!(
            rows = table.row_count(),
            dropped_rows,
            bug_id_source = ?bug_id_source,
            "Schema normalized"
        );

        Ok(NormalizedTable {
            table,
            dropped_rows,
            bug_id_source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<Cell>>) -> Table {
        Table::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    fn text(value: &str) -> Cell {
        Cell::Text(value.to_string())
    }

    #[test]
    fn test_null_details_dropped_and_ids_synthesized() {
        let normalized = SchemaNormalizer::new()
            .normalize(table(
                &["Details"],
                vec![vec![text("a")], vec![Cell::Empty], vec![text("b")], vec![Cell::Empty]],
            ))
            .unwrap();

        assert_eq!(normalized.dropped_rows, 2);
        assert_eq!(normalized.bug_id_source, BugIdSource::Synthesized);
        assert_eq!(
            normalized.table.column_values("Bug ID").unwrap(),
            vec![&Cell::Int(1), &Cell::Int(2)]
        );
    }

    #[test]
    fn test_synthesized_ids_are_dense_for_any_length() {
        for n in 0..6 {
            let rows = (0..n).map(|i| vec![text(&format!("bug {}", i))]).collect();
            let normalized = SchemaNormalizer::new().normalize(table(&["Details"], rows)).unwrap();
            let ids: Vec<Cell> = normalized
                .table
                .column_values("Bug ID")
                .unwrap()
                .into_iter()
                .cloned()
                .collect();
            let expected: Vec<Cell> = (1..=n).map(|i| Cell::Int(i as i64)).collect();
            assert_eq!(ids, expected);
        }
    }

    #[test]
    fn test_serial_number_renamed() {
        let normalized = SchemaNormalizer::new()
            .normalize(table(
                &["S.No", "Details"],
                vec![vec![Cell::Int(10), text("a")], vec![Cell::Int(11), text("b")]],
            ))
            .unwrap();

        assert_eq!(normalized.bug_id_source, BugIdSource::SerialNumber);
        assert_eq!(normalized.table.columns(), &["Bug ID", "Details"]);
        assert_eq!(normalized.table.cell(1, "Bug ID"), Some(&Cell::Int(11)));
    }

    #[test]
    fn test_existing_bug_id_is_idempotent() {
        let input = table(
            &["Bug ID", "Details"],
            vec![vec![text("BUG-7"), text("a")], vec![text("BUG-9"), text("b")]],
        );
        let once = SchemaNormalizer::new().normalize(input).unwrap();
        let twice = SchemaNormalizer::new().normalize(once.table.clone()).unwrap();

        assert_eq!(once.bug_id_source, BugIdSource::Existing);
        assert_eq!(once.table, twice.table);
    }

    #[test]
    fn test_details_coerced_to_text() {
        let normalized = SchemaNormalizer::new()
            .normalize(table(&["Details"], vec![vec![Cell::Int(404)], vec![Cell::Float(1.0)]]))
            .unwrap();

        assert_eq!(normalized.details().unwrap(), vec!["404", "1.0"]);
        assert_eq!(normalized.table.cell(0, "Details"), Some(&text("404")));
    }

    #[test]
    fn test_missing_details_rejected() {
        let err = SchemaNormalizer::new()
            .normalize(table(&["Summary"], vec![]))
            .unwrap_err();
        assert_eq!(err, AppError::MissingColumn("Details".to_string()));
    }
}
