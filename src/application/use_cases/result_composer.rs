// ============================================================
// RESULT COMPOSER USE CASE
// ============================================================
// Merge predictions into result rows and derive chart aggregates

use std::collections::HashMap;

use crate::domain::bug_report::columns::{
    BUG_ID, BUG_TYPE, DETAILS, LOGICAL_ISSUE, LOGIC_ISSUE_FALLBACK,
};
use crate::domain::bug_report::{CategoryCount, Cell, Prediction, ResultRow, Table};
use crate::domain::error::{AppError, Result};

const LOGIC_ISSUE_MARKER: &str = "yes";

#[derive(Debug, Default)]
pub struct ResultComposer;

impl ResultComposer {
    pub fn new() -> Self {
        Self
    }

    /// One result row per table row, in table order
    pub fn compose(&self, table: &Table, predictions: &[Prediction]) -> Result<Vec<ResultRow>> {
        if predictions.len() != table.row_count() {
            return Err(AppError::Internal(format!(
                "{} predictions for {} rows",
                predictions.len(),
                table.row_count()
            )));
        }

        let bug_ids = table.require_column(BUG_ID)?;
        let details = table.require_column(DETAILS)?;
        let logic_flags = table.column_values(LOGICAL_ISSUE);

        Ok(predictions
            .iter()
            .enumerate()
            .map(|(idx, prediction)| ResultRow {
                bug_id: bug_ids[idx].clone(),
                details: details[idx].to_text(),
                predicted_category: prediction.predicted_category.clone(),
                logic_level_issue: match &logic_flags {
                    Some(flags) => flags[idx].clone(),
                    None => Cell::Text(LOGIC_ISSUE_FALLBACK.to_string()),
                },
                confidence_score: prediction.confidence_score,
            })
            .collect())
    }

    /// Row counts by the uploaded `bug_type` column (pie chart)
    pub fn type_distribution(&self, table: &Table) -> Result<Vec<CategoryCount>> {
        let types = table.require_column(BUG_TYPE)?;
        Ok(count_values(types))
    }

    /// Row counts by `bug_type` among rows flagged "yes" in `Logical_Issue` (bar chart)
    pub fn logic_issue_distribution(&self, table: &Table) -> Result<Vec<CategoryCount>> {
        let types = table.require_column(BUG_TYPE)?;
        let flags = table.require_column(LOGICAL_ISSUE)?;

        Ok(count_values(
            types
                .into_iter()
                .zip(flags)
                .filter(|(_, flag)| flag.text_eq_ignore_case(LOGIC_ISSUE_MARKER))
                .map(|(bug_type, _)| bug_type),
        ))
    }
}

/// Non-null values counted, most frequent first; ties keep first-seen order
fn count_values<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Vec<CategoryCount> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<CategoryCount> = Vec::new();

    for cell in cells.into_iter().filter(|cell| !cell.is_null()) {
        let label = cell.to_text();
        match positions.get(&label) {
            Some(&idx) => counts[idx].count += 1,
            None => {
                positions.insert(label.clone(), counts.len());
                counts.push(CategoryCount::new(label, 1));
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
