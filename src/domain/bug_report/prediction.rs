// ============================================================
// PREDICTIONS
// ============================================================
// Model class labels and the per-row prediction value object

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed mapping from numeric class codes to human labels
const CATEGORY_CODES: [(i64, &str); 5] = [
    (0, "UI"),
    (1, "API"),
    (2, "DB"),
    (3, "Server"),
    (4, "Other"),
];

/// A class as emitted by a model: a numeric code or a ready-made label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Code(i64),
    Name(String),
}

impl ClassLabel {
    pub fn is_code(&self) -> bool {
        matches!(self, ClassLabel::Code(_))
    }

    /// Human label for this class.
    ///
    /// Codes go through the category table only when the model is numeric;
    /// unknown codes render as their string form.
    pub fn to_category(&self, numeric_model: bool) -> String {
        match self {
            ClassLabel::Code(code) if numeric_model => category_for_code(*code)
                .map(str::to_string)
                .unwrap_or_else(|| code.to_string()),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::Code(code) => write!(f, "{}", code),
            ClassLabel::Name(name) => f.write_str(name),
        }
    }
}

pub fn category_for_code(code: i64) -> Option<&'static str> {
    CATEGORY_CODES
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, label)| *label)
}

/// Round a probability to two decimals, clamped to [0, 1]
pub fn round_confidence(probability: f64) -> f64 {
    if probability.is_nan() {
        return 0.0;
    }
    ((probability * 100.0).round() / 100.0).clamp(0.0, 1.0)
}

/// Classifier output for one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_category: String,
    pub confidence_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_map_to_labels() {
        let labels: Vec<String> = (0..5)
            .map(|code| ClassLabel::Code(code).to_category(true))
            .collect();
        assert_eq!(labels, vec!["UI", "API", "DB", "Server", "Other"]);
    }

    #[test]
    fn test_unknown_code_passes_through() {
        assert_eq!(ClassLabel::Code(7).to_category(true), "7");
        assert_eq!(ClassLabel::Code(-1).to_category(true), "-1");
    }

    #[test]
    fn test_string_labels_unchanged() {
        assert_eq!(
            ClassLabel::Name("Security".to_string()).to_category(false),
            "Security"
        );
        // a code inside a mixed class list is not looked up
        assert_eq!(ClassLabel::Code(0).to_category(false), "0");
    }

    #[test]
    fn test_round_confidence() {
        assert_eq!(round_confidence(0.876), 0.88);
        assert_eq!(round_confidence(0.5), 0.5);
        assert_eq!(round_confidence(1.0000001), 1.0);
        assert_eq!(round_confidence(f64::NAN), 0.0);
    }

    #[test]
    fn test_class_label_deserializes_untagged() {
        let labels: Vec<ClassLabel> = serde_json::from_str(r#"[0, "UI"]"#).unwrap();
        assert_eq!(
            labels,
            vec![ClassLabel::Code(0), ClassLabel::Name("UI".to_string())]
        );
    }
}
