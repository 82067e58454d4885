// ============================================================
// CELL VALUE
// ============================================================
// A single value in an uploaded table

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw tokens read as missing values (data-frame NA conventions)
const NA_TOKENS: [&str; 19] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A",
    "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "1.#IND", "1.#QNAN", "<NA>",
];

/// A typed table cell. `Empty` is the null value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Build a cell from raw file text, mapping NA tokens to `Empty`
    pub fn from_raw_text(raw: &str) -> Self {
        if NA_TOKENS.contains(&raw) {
            Cell::Empty
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Float(value) => value.is_nan(),
            _ => false,
        }
    }

    /// Text coercion used for `Details` and for grouping keys
    pub fn to_text(&self) -> String {
        match self {
            Cell::Bool(true) => "True".to_string(),
            Cell::Bool(false) => "False".to_string(),
            Cell::Int(value) => value.to_string(),
            Cell::Float(value) => format_float(*value),
            Cell::Text(value) => value.clone(),
            Cell::Empty => "nan".to_string(),
        }
    }

    /// Case-insensitive textual equality, never true for nulls
    pub fn text_eq_ignore_case(&self, expected: &str) -> bool {
        !self.is_null() && self.to_text().to_lowercase() == expected.to_lowercase()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            other => f.write_str(&other.to_text()),
        }
    }
}

fn format_float(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_na_tokens_become_empty() {
        assert_eq!(Cell::from_raw_text(""), Cell::Empty);
        assert_eq!(Cell::from_raw_text("N/A"), Cell::Empty);
        assert_eq!(Cell::from_raw_text("null"), Cell::Empty);
        assert_eq!(
            Cell::from_raw_text("crash on login"),
            Cell::Text("crash on login".to_string())
        );
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(Cell::Int(42).to_text(), "42");
        assert_eq!(Cell::Float(3.0).to_text(), "3.0");
        assert_eq!(Cell::Float(2.5).to_text(), "2.5");
        assert_eq!(Cell::Bool(true).to_text(), "True");
    }

    #[test]
    fn test_text_eq_ignore_case() {
        assert!(Cell::Text("YES".to_string()).text_eq_ignore_case("yes"));
        assert!(!Cell::Text("yes ".to_string()).text_eq_ignore_case("yes"));
        assert!(!Cell::Empty.text_eq_ignore_case("nan"));
    }

    #[test]
    fn test_serializes_untagged() {
        let json = serde_json::to_string(&vec![Cell::Int(1), Cell::Empty]).unwrap();
        assert_eq!(json, "[1,null]");
    }
}
