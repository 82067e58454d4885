// ============================================================
// TABULAR INFRASTRUCTURE LAYER
// ============================================================
// Decoding uploaded CSV / XLSX bytes into physical sheet rows

mod csv_reader;
mod xlsx_reader;

pub use csv_reader::CsvReader;
pub use xlsx_reader::XlsxReader;

use std::path::Path;

use crate::domain::bug_report::{Cell, Table};
use crate::domain::error::{AppError, Result};

/// Upload formats the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Csv,
    Xlsx,
}

impl TabularFormat {
    /// Pick the format from the declared file name's extension (case-insensitive)
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(TabularFormat::Csv),
            Some("xlsx") => Ok(TabularFormat::Xlsx),
            Some(other) => Err(AppError::UnsupportedFormat(format!(
                "'.{}' files are not supported, upload a .csv or .xlsx file",
                other
            ))),
            None => Err(AppError::UnsupportedFormat(format!(
                "'{}' has no file extension, upload a .csv or .xlsx file",
                file_name
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TabularFormat::Csv => "csv",
            TabularFormat::Xlsx => "xlsx",
        }
    }
}

/// Physical rows of the first sheet, before any header handling
#[derive(Debug, Clone)]
pub struct SheetRows {
    format: TabularFormat,
    rows: Vec<Vec<Cell>>,
}

impl SheetRows {
    pub fn read(format: TabularFormat, bytes: &[u8]) -> Result<Self> {
        let rows = match format {
            TabularFormat::Csv => CsvReader::new().read_rows(bytes)?,
            TabularFormat::Xlsx => XlsxReader::new().read_rows(bytes)?,
        };
        Ok(Self { format, rows })
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    /// Build a table whose header is the first non-blank row after `skip_rows`.
    /// Column names come back whitespace-trimmed.
    pub fn to_table(&self, skip_rows: usize) -> Result<Table> {
        let mut table = Table::from_sheet_rows(self.rows.clone(), skip_rows)?;
        if self.format == TabularFormat::Csv {
            table.infer_column_types();
        }
        table.trim_column_names();
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(
            TabularFormat::from_file_name("bugs.csv").unwrap(),
            TabularFormat::Csv
        );
        assert_eq!(
            TabularFormat::from_file_name("Report.XLSX").unwrap(),
            TabularFormat::Xlsx
        );
        assert!(matches!(
            TabularFormat::from_file_name("bugs.pdf"),
            Err(AppError::UnsupportedFormat(_))
        ));
        assert!(TabularFormat::from_file_name("bugs").is_err());
    }

    #[test]
    fn test_csv_table_is_typed_and_trimmed() {
        let rows = SheetRows::read(TabularFormat::Csv, b" S.No , Details \n1,crash\n2,hang").unwrap();
        let table = rows.to_table(0).unwrap();

        assert_eq!(table.columns(), &["S.No", "Details"]);
        assert_eq!(table.cell(1, "S.No"), Some(&Cell::Int(2)));
    }
}
