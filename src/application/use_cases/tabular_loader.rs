// ============================================================
// TABULAR LOADER USE CASE
// ============================================================
// Parse an upload into a table that carries a `Details` column

use tracing::{debug, info};

use crate::domain::bug_report::columns::{DETAILS, KNOWN_INPUT_COLUMNS};
use crate::domain::bug_report::Table;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::tabular::{SheetRows, TabularFormat};

const DEFAULT_RETRY_SKIP_ROWS: usize = 2;

/// Table produced by the loader, with where its header was found
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Table,
    pub format: TabularFormat,
    /// Physical rows skipped before header detection (0 or the retry offset)
    pub header_offset: usize,
}

pub struct TabularLoader {
    retry_skip_rows: usize,
}

impl Default for TabularLoader {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_SKIP_ROWS)
    }
}

impl TabularLoader {
    pub fn new(retry_skip_rows: usize) -> Self {
        Self { retry_skip_rows }
    }

    /// Load an upload by its declared file name.
    ///
    /// When the first parse has no `Details` column the same bytes are parsed
    /// again with the banner rows skipped. Fails with `MissingColumn` when
    /// neither attempt finds it.
    pub fn load(&self, bytes: &[u8], file_name: &str) -> Result<LoadedTable> {
        let format = TabularFormat::from_file_name(file_name)?;
        let sheet = SheetRows::read(format, bytes)?;
        debug!(file_name, rows = sheet.len(), format = format.as_str(), "Sheet rows read");

        let table = Self::prepare(sheet.to_table(0)?);
        if table.has_column(DETAILS) {
            return Ok(LoadedTable {
                table,
                format,
                header_offset: 0,
            });
        }

        if self.retry_skip_rows == 0 {
            return Err(AppError::MissingColumn(DETAILS.to_string()));
        }

        info!(
            file_name,
            skip_rows = self.retry_skip_rows,
            columns = ?table.columns(),
            "No Details column on first row, retrying below banner rows"
        );

        let retried = sheet
            .to_table(self.retry_skip_rows)
            .map(Self::prepare)
            .map_err(|_| AppError::MissingColumn(DETAILS.to_string()))?;

        if !retried.has_column(DETAILS) {
            return Err(AppError::MissingColumn(DETAILS.to_string()));
        }

        Ok(LoadedTable {
            table: retried,
            format,
            header_offset: self.retry_skip_rows,
        })
    }

    fn prepare(mut table: Table) -> Table {
        for column in KNOWN_INPUT_COLUMNS {
            table.canonicalize_column(column);
        }
        table
    }
}
