// ============================================================
// BUG CLASSIFICATION USE CASE
// ============================================================
// Upload -> load -> normalize -> classify -> compose -> report

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use super::classifier_adapter::ClassifierAdapter;
use super::result_composer::ResultComposer;
use super::schema_normalizer::SchemaNormalizer;
use super::tabular_loader::TabularLoader;
use crate::domain::app_config::LoaderConfig;
use crate::domain::bug_report::{CategoryCount, ClassificationReport};
use crate::domain::error::Result;
use crate::infrastructure::classifier::ClassifierArtifacts;

pub struct BugClassificationUseCase {
    loader: TabularLoader,
    normalizer: SchemaNormalizer,
    classifier: ClassifierAdapter,
    composer: ResultComposer,
}

impl BugClassificationUseCase {
    pub fn new(artifacts: Arc<ClassifierArtifacts>, loader_config: &LoaderConfig) -> Self {
        Self {
            loader: TabularLoader::new(loader_config.header_retry_skip_rows),
            normalizer: SchemaNormalizer::new(),
            classifier: ClassifierAdapter::new(artifacts),
            composer: ResultComposer::new(),
        }
    }

    pub fn classifier(&self) -> &ClassifierAdapter {
        &self.classifier
    }

    /// Run the whole pipeline over one uploaded file.
    ///
    /// Load and model failures abort the run. A missing `bug_type` or
    /// `Logical_Issue` column only drops the matching aggregate and adds a
    /// warning to the report.
    pub fn execute(&self, file_name: &str, bytes: &[u8]) -> Result<ClassificationReport> {
        let run_id = Uuid::new_v4().to_string();
        let file_digest = hex::encode(Sha256::digest(bytes));
        info!(%run_id, file_name, bytes = bytes.len(), %file_digest, "Classification started");

        let loaded = self.loader.load(bytes, file_name)?;
        let columns_found = loaded.table.columns().to_vec();

        let normalized = self.normalizer.normalize(loaded.table)?;
        let details = normalized.details()?;
        let predictions = self.classifier.classify(&details)?;
        let rows = self.composer.compose(&normalized.table, &predictions)?;

        let mut warnings = Vec::new();
        let type_distribution = degrade(
            self.composer.type_distribution(&normalized.table),
            "Pie chart skipped",
            &mut warnings,
        );
        let logic_issue_distribution = degrade(
            self.composer.logic_issue_distribution(&normalized.table),
            "Bar chart skipped",
            &mut warnings,
        );
        if normalized.dropped_rows > 0 {
            warnings.push(format!(
                "{} row(s) without Details were skipped",
                normalized.dropped_rows
            ));
        }

        info!(
            %run_id,
            rows = rows.len(),
            dropped_rows = normalized.dropped_rows,
            header_offset = loaded.header_offset,
            format = loaded.format.as_str(),
            warnings = warnings.len(),
            "Classification finished"
        );

        Ok(ClassificationReport {
            run_id,
            file_name: file_name.to_string(),
            file_digest,
            columns_found,
            dropped_rows: normalized.dropped_rows,
            rows,
            type_distribution,
            logic_issue_distribution,
            warnings,
            generated_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

fn degrade(
    result: Result<Vec<CategoryCount>>,
    context: &str,
    warnings: &mut Vec<String>,
) -> Option<Vec<CategoryCount>> {
    match result {
        Ok(counts) => Some(counts),
        Err(e) => {
            warn!(error = %e, "{}", context);
            warnings.push(format!("{}: {}", context, e));
            None
        }
    }
}
