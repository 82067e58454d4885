// ============================================================
// CSV READER
// ============================================================
// Read CSV uploads with encoding detection

use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::WINDOWS_1252;

use crate::domain::bug_report::Cell;
use crate::domain::error::{AppError, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const DELIMITER: u8 = b',';
const QUOTE: u8 = b'"';

/// CSV reader producing physical rows (header included)
#[derive(Debug, Default)]
pub struct CsvReader;

impl CsvReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse CSV bytes into rows of raw cells; NA tokens become `Cell::Empty`.
    ///
    /// Blank lines come back as empty rows, so row `n` is line `n + 1` of the
    /// file unless a quoted field spans lines.
    pub fn read_rows(&self, bytes: &[u8]) -> Result<Vec<Vec<Cell>>> {
        let content = Self::decode(bytes);

        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(DELIMITER)
            .has_headers(false)
            .trim(Trim::None)
            .flexible(true); // Allow rows with different lengths

        let mut rows = Vec::new();
        let mut record = StringRecord::new();
        for (index, line) in split_records(&content).into_iter().enumerate() {
            if line.trim_end_matches('\r').is_empty() {
                rows.push(Vec::new());
                continue;
            }
            builder
                .from_reader(line.as_bytes())
                .read_record(&mut record)
                .map_err(|e| {
                    AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
                })?;
            rows.push(record.iter().map(Cell::from_raw_text).collect());
        }

        Ok(rows)
    }

    /// UTF-8 (BOM stripped) with a Windows-1252 fallback
    pub fn decode(bytes: &[u8]) -> String {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        match std::str::from_utf8(bytes) {
            Ok(content) => content.to_string(),
            Err(_) => {
                let (content, _, _) = WINDOWS_1252.decode(bytes);
                content.into_owned()
            }
        }
    }
}

/// Split on line feeds that are not inside a quoted field
fn split_records(content: &str) -> Vec<&str> {
    let bytes = content.as_bytes();
    let mut records = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut field_start = true;
    let mut idx = 0;

    while idx < bytes.len() {
        let byte = bytes[idx];
        if in_quotes {
            if byte == QUOTE {
                if bytes.get(idx + 1) == Some(&QUOTE) {
                    idx += 1; // Escaped quote
                } else {
                    in_quotes = false;
                }
            }
        } else if byte == QUOTE && field_start {
            in_quotes = true;
        } else if byte == b'\n' {
            records.push(&content[start..idx]);
            start = idx + 1;
        }
        field_start = !in_quotes && (byte == DELIMITER || byte == b'\n');
        idx += 1;
    }

    if start < bytes.len() {
        records.push(&content[start..]);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_simple_csv() {
        let rows = CsvReader::new()
            .read_rows(b"Details,bug_type\nnull pointer crash,Server\n")
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], Cell::Text("Details".to_string()));
        assert_eq!(rows[1][1], Cell::Text("Server".to_string()));
    }

    #[test]
    fn test_quoted_fields_and_na_tokens() {
        let rows = CsvReader::new()
            .read_rows(b"Details,Logical_Issue\n\"crash, then hang\",NA\n")
            .unwrap();

        assert_eq!(rows[1][0], Cell::Text("crash, then hang".to_string()));
        assert_eq!(rows[1][1], Cell::Empty);
    }

    #[test]
    fn test_ragged_rows_are_kept() {
        let rows = CsvReader::new()
            .read_rows(b"Bug Export\nExported 2024-01-01,by QA\nDetails,bug_type,Logical_Issue\ncrash,Server\n")
            .unwrap();

        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[1].len(), 2);
        assert_eq!(rows.last().unwrap().len(), 2);
    }

    #[test]
    fn test_blank_lines_become_empty_rows() {
        let rows = CsvReader::new()
            .read_rows(b"Bug Export\n\r\nDetails,bug_type\r\ncrash,Server\n")
            .unwrap();

        assert_eq!(rows.len(), 4);
        assert!(rows[1].is_empty());
        assert_eq!(rows[2][0], Cell::Text("Details".to_string()));
        assert_eq!(rows[3][1], Cell::Text("Server".to_string()));
    }

    #[test]
    fn test_quoted_newline_stays_in_one_row() {
        let rows = CsvReader::new()
            .read_rows(b"Details,bug_type\n\"crash\n\nthen hang\",Server\n5\" screen,UI\n")
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][0], Cell::Text("crash\n\nthen hang".to_string()));
        assert_eq!(rows[2][0], Cell::Text("5\" screen".to_string()));
    }

    #[test]
    fn test_decode_strips_bom_and_falls_back() {
        assert_eq!(CsvReader::decode(b"\xEF\xBB\xBFDetails"), "Details");
        assert_eq!(CsvReader::decode(b"caf\xE9"), "café");
    }
}
