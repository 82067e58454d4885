// ============================================================
// CLASSIFICATION REPORT
// ============================================================
// Result rows and aggregates handed to the reporting layer

use serde::{Deserialize, Serialize};

use super::Cell;

/// One row of the result table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub bug_id: Cell,
    pub details: String,
    pub predicted_category: String,
    pub logic_level_issue: Cell,
    pub confidence_score: f64,
}

/// Row count for one `bug_type` value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

impl CategoryCount {
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Everything produced for one uploaded file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub run_id: String,
    pub file_name: String,
    /// SHA-256 of the uploaded bytes, hex encoded
    pub file_digest: String,
    pub columns_found: Vec<String>,
    pub dropped_rows: usize,
    pub rows: Vec<ResultRow>,
    /// Counts by `bug_type` (pie chart); `None` when the column is absent
    pub type_distribution: Option<Vec<CategoryCount>>,
    /// Counts by `bug_type` where `Logical_Issue` is "yes" (bar chart)
    pub logic_issue_distribution: Option<Vec<CategoryCount>>,
    pub warnings: Vec<String>,
    pub generated_at: String,
}
