// ============================================================
// BUG REPORT DOMAIN LAYER
// ============================================================
// Core types for uploaded bug report tables and classification results
// No I/O, no async

pub mod columns;
mod cell;
mod prediction;
mod report;
mod table;

pub use cell::Cell;
pub use prediction::{category_for_code, round_confidence, ClassLabel, Prediction};
pub use report::{CategoryCount, ClassificationReport, ResultRow};
pub use table::Table;
