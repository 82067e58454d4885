pub mod classifier;
pub mod config;
pub mod tabular;
