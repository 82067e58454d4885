pub mod bug_classification;
pub mod classifier_adapter;
pub mod result_composer;
pub mod schema_normalizer;
pub mod tabular_loader;
