pub mod app_config;
pub mod error;

// Uploaded bug report tables and classification results
pub mod bug_report;
