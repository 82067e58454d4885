// ============================================================
// COLUMN NAMES
// ============================================================
// Canonical spellings of the columns the pipeline reads and writes

/// Free-text description of the bug (required)
pub const DETAILS: &str = "Details";

/// Serial number column some exports use as the identifier
pub const SERIAL_NUMBER: &str = "S.No";

pub const BUG_ID: &str = "Bug ID";

/// Pre-existing category label, distinct from the predicted category
pub const BUG_TYPE: &str = "bug_type";

/// Pre-existing "yes"/other logic-level flag
pub const LOGICAL_ISSUE: &str = "Logical_Issue";

pub const PREDICTED_CATEGORY: &str = "Predicted Category";
pub const LOGIC_LEVEL_ISSUE: &str = "Logic-level Issue";
pub const CONFIDENCE_SCORE: &str = "Confidence Score";

/// Value used for every row when the upload carries no logic-level flag
pub const LOGIC_ISSUE_FALLBACK: &str = "N/A";

/// Input columns whose header spelling is canonicalized case-insensitively
pub const KNOWN_INPUT_COLUMNS: [&str; 5] =
    [DETAILS, SERIAL_NUMBER, BUG_ID, BUG_TYPE, LOGICAL_ISSUE];

/// Result table layout, in display order
pub const RESULT_COLUMNS: [&str; 5] = [
    BUG_ID,
    DETAILS,
    PREDICTED_CATEGORY,
    LOGIC_LEVEL_ISSUE,
    CONFIDENCE_SCORE,
];
