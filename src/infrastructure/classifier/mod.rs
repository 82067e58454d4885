pub mod linear_model;
pub mod tfidf;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::domain::app_config::ModelConfig;
use crate::domain::bug_report::ClassLabel;
use crate::domain::error::{AppError, Result};
use linear_model::ModelArtifact;
use tfidf::{TfidfVectorizer, VectorizerArtifact};

/// Sparse feature row: (column, value) pairs sorted by column
pub type SparseVector = Vec<(usize, f64)>;
pub type FeatureMatrix = Vec<SparseVector>;

/// Turns raw documents into the model's feature space
pub trait TextVectorizer {
    fn n_features(&self) -> usize;
    fn transform(&self, documents: &[String]) -> Result<FeatureMatrix>;
}

/// A fitted classifier exposing per-class probabilities
pub trait ProbabilisticClassifier {
    /// Classes in probability-column order
    fn classes(&self) -> &[ClassLabel];
    fn n_features(&self) -> usize;
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<Vec<f64>>>;

    /// Most probable class per row; the first class wins ties
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<ClassLabel>> {
        self.predict_proba(features)?
            .iter()
            .map(|row| {
                argmax(row)
                    .and_then(|idx| self.classes().get(idx).cloned())
                    .ok_or_else(|| {
                        AppError::ModelError("Model returned an empty probability row".to_string())
                    })
            })
            .collect()
    }
}

pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in values.iter().enumerate() {
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// The pre-trained vectorizer and model, loaded once and shared read-only
pub struct ClassifierArtifacts {
    vectorizer: Arc<dyn TextVectorizer + Send + Sync>,
    model: Arc<dyn ProbabilisticClassifier + Send + Sync>,
}

impl ClassifierArtifacts {
    pub fn new(
        vectorizer: Arc<dyn TextVectorizer + Send + Sync>,
        model: Arc<dyn ProbabilisticClassifier + Send + Sync>,
    ) -> Result<Self> {
        if vectorizer.n_features() != model.n_features() {
            return Err(AppError::ModelError(format!(
                "Vectorizer produces {} features but the model expects {}",
                vectorizer.n_features(),
                model.n_features()
            )));
        }
        Ok(Self { vectorizer, model })
    }

    /// Read both JSON artifacts from the configured paths
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let vectorizer: VectorizerArtifact = read_json(Path::new(&config.vectorizer_path))?;
        let model: ModelArtifact = read_json(Path::new(&config.model_path))?;

        let vectorizer = TfidfVectorizer::try_from(vectorizer)?;
        let model = model.into_classifier()?;

        tracing::info!(
            vectorizer_path = %config.vectorizer_path,
            model_path = %config.model_path,
            n_features = vectorizer.n_features(),
            n_classes = model.classes().len(),
            "Classifier artifacts loaded"
        );

        Self::new(Arc::new(vectorizer), model)
    }

    pub fn vectorizer(&self) -> &(dyn TextVectorizer + Send + Sync) {
        self.vectorizer.as_ref()
    }

    pub fn model(&self) -> &(dyn ProbabilisticClassifier + Send + Sync) {
        self.model.as_ref()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::IoError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        AppError::ModelError(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Small numeric model over {crash, button, timeout}: "button" -> UI (0), the others -> Server (3)
#[cfg(test)]
pub(crate) fn keyword_artifacts() -> Arc<ClassifierArtifacts> {
    use linear_model::{LogisticRegression, MultiClass};

    let vectorizer = TfidfVectorizer::try_from(VectorizerArtifact::with_vocabulary(&[
        "crash", "button", "timeout",
    ]))
    .unwrap();
    let model = ModelArtifact::LogisticRegression(LogisticRegression {
        classes: (0..5).map(ClassLabel::Code).collect(),
        coef: vec![
            vec![0.0, 5.0, 0.0],
            vec![0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0],
            vec![5.0, 0.0, 5.0],
            vec![0.0, 0.0, 0.0],
        ],
        intercept: vec![0.0; 5],
        multi_class: MultiClass::Multinomial,
    })
    .into_classifier()
    .unwrap();

    Arc::new(ClassifierArtifacts::new(Arc::new(vectorizer), model).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", uuid::Uuid::new_v4(), name));
        fs::write(&path, content).unwrap();
        path
    }

    const VECTORIZER_JSON: &str = r#"{"vocabulary": {"crash": 0, "button": 1, "timeout": 2}}"#;

    #[test]
    fn test_argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_load_artifacts_from_disk() {
        let vectorizer_path = temp_file("vectorizer.json", VECTORIZER_JSON);
        let model_path = temp_file(
            "model.json",
            r#"{
                "kind": "logistic_regression",
                "classes": [0, 1, 3],
                "coef": [[0, 2, 0], [0, 0, 0], [2, 0, 2]],
                "intercept": [0, 0, 0]
            }"#,
        );

        let artifacts = ClassifierArtifacts::load(&ModelConfig {
            model_path: model_path.display().to_string(),
            vectorizer_path: vectorizer_path.display().to_string(),
        })
        .unwrap();

        assert_eq!(artifacts.vectorizer().n_features(), 3);
        assert_eq!(artifacts.model().classes().len(), 3);

        fs::remove_file(vectorizer_path).ok();
        fs::remove_file(model_path).ok();
    }

    #[test]
    fn test_feature_count_mismatch_rejected() {
        let vectorizer_path = temp_file("vectorizer.json", VECTORIZER_JSON);
        let model_path = temp_file(
            "model.json",
            r#"{
                "kind": "multinomial_nb",
                "classes": ["UI", "API"],
                "class_log_prior": [-0.69, -0.69],
                "feature_log_prob": [[-1.0, -1.0], [-1.0, -1.0]]
            }"#,
        );

        let err = ClassifierArtifacts::load(&ModelConfig {
            model_path: model_path.display().to_string(),
            vectorizer_path: vectorizer_path.display().to_string(),
        })
        .err()
        .unwrap();
        assert!(matches!(err, AppError::ModelError(_)));

        fs::remove_file(vectorizer_path).ok();
        fs::remove_file(model_path).ok();
    }

    #[test]
    fn test_missing_artifact_is_io_error() {
        let err = ClassifierArtifacts::load(&ModelConfig {
            model_path: "missing/model.json".to_string(),
            vectorizer_path: "missing/vectorizer.json".to_string(),
        })
        .err()
        .unwrap();
        assert!(matches!(err, AppError::IoError(_)));
    }
}
