// ============================================================
// CLASSIFIER ADAPTER
// ============================================================
// Text -> (category, confidence) through the pre-trained artifacts

use std::sync::Arc;

use crate::domain::bug_report::{round_confidence, ClassLabel, Prediction};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::classifier::ClassifierArtifacts;

pub struct ClassifierAdapter {
    artifacts: Arc<ClassifierArtifacts>,
}

impl ClassifierAdapter {
    pub fn new(artifacts: Arc<ClassifierArtifacts>) -> Self {
        Self { artifacts }
    }

    /// Whether the model emits numeric class codes rather than labels
    pub fn is_numeric_model(&self) -> bool {
        self.artifacts
            .model()
            .classes()
            .iter()
            .all(ClassLabel::is_code)
    }

    /// Human category labels the model can produce, in class order
    pub fn categories(&self) -> Vec<String> {
        let numeric = self.is_numeric_model();
        self.artifacts
            .model()
            .classes()
            .iter()
            .map(|class| class.to_category(numeric))
            .collect()
    }

    pub fn n_features(&self) -> usize {
        self.artifacts.vectorizer().n_features()
    }

    /// One prediction per input text, in input order
    pub fn classify(&self, texts: &[String]) -> Result<Vec<Prediction>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.artifacts.model();
        let features = self.artifacts.vectorizer().transform(texts)?;
        let labels = model.predict(&features)?;
        let probabilities = model.predict_proba(&features)?;

        if labels.len() != texts.len() || probabilities.len() != texts.len() {
            return Err(AppError::ModelError(format!(
                "Model returned {} labels and {} probability rows for {} texts",
                labels.len(),
                probabilities.len(),
                texts.len()
            )));
        }

        let numeric = self.is_numeric_model();
        Ok(labels
            .iter()
            .zip(&probabilities)
            .map(|(label, row)| {
                let best = row.iter().cloned().fold(0.0_f64, f64::max);
                Prediction {
                    predicted_category: label.to_category(numeric),
                    confidence_score: round_confidence(best),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::classifier::{
        FeatureMatrix, ProbabilisticClassifier, TextVectorizer,
    };

    /// One feature per keyword; the document gets 1.0 for each keyword it contains
    struct KeywordVectorizer(Vec<&'static str>);

    impl TextVectorizer for KeywordVectorizer {
        fn n_features(&self) -> usize {
            self.0.len()
        }

        fn transform(&self, documents: &[String]) -> Result<FeatureMatrix> {
            Ok(documents
                .iter()
                .map(|doc| {
                    self.0
                        .iter()
                        .enumerate()
                        .filter(|(_, keyword)| doc.contains(*keyword))
                        .map(|(idx, _)| (idx, 1.0))
                        .collect()
                })
                .collect())
        }
    }

    /// Fixed distribution per first active feature
    struct TableModel {
        classes: Vec<ClassLabel>,
        rows: Vec<Vec<f64>>,
        fallback: Vec<f64>,
    }

    impl ProbabilisticClassifier for TableModel {
        fn classes(&self) -> &[ClassLabel] {
            &self.classes
        }

        fn n_features(&self) -> usize {
            self.rows.len()
        }

        fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<Vec<f64>>> {
            Ok(features
                .iter()
                .map(|row| match row.first() {
                    Some((idx, _)) => self.rows[*idx].clone(),
                    None => self.fallback.clone(),
                })
                .collect())
        }
    }

    fn adapter(classes: Vec<ClassLabel>) -> ClassifierAdapter {
        let vectorizer = Arc::new(KeywordVectorizer(vec!["crash", "button", "timeout"]));
        let model = Arc::new(TableModel {
            classes,
            rows: vec![
                vec![0.05, 0.1, 0.05, 0.777, 0.023],
                vec![0.904, 0.05, 0.02, 0.02, 0.006],
                vec![0.1, 0.2, 0.1, 0.5, 0.1],
            ],
            fallback: vec![0.2, 0.2, 0.2, 0.2, 0.2],
        });
        ClassifierAdapter::new(Arc::new(ClassifierArtifacts::new(vectorizer, model).unwrap()))
    }

    fn texts(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_numeric_codes_mapped_to_labels() {
        let adapter = adapter((0..5).map(ClassLabel::Code).collect());
        let predictions = adapter
            .classify(&texts(&["null pointer crash", "button misaligned", "timeout on save"]))
            .unwrap();

        let categories: Vec<&str> = predictions
            .iter()
            .map(|p| p.predicted_category.as_str())
            .collect();
        assert_eq!(categories, vec!["Server", "UI", "Server"]);
        assert_eq!(predictions[0].confidence_score, 0.78);
        assert_eq!(predictions[1].confidence_score, 0.9);
        assert_eq!(predictions[2].confidence_score, 0.5);
    }

    #[test]
    fn test_string_labels_pass_through() {
        let adapter = adapter(
            ["Frontend", "Backend", "Data", "Infra", "Misc"]
                .iter()
                .map(|l| ClassLabel::Name(l.to_string()))
                .collect(),
        );
        assert!(!adapter.is_numeric_model());

        let predictions = adapter.classify(&texts(&["button misaligned"])).unwrap();
        assert_eq!(predictions[0].predicted_category, "Frontend");
    }

    #[test]
    fn test_unknown_code_renders_as_string() {
        let adapter = adapter(vec![
            ClassLabel::Code(0),
            ClassLabel::Code(1),
            ClassLabel::Code(2),
            ClassLabel::Code(9),
            ClassLabel::Code(4),
        ]);
        let predictions = adapter.classify(&texts(&["crash"])).unwrap();
        assert_eq!(predictions[0].predicted_category, "9");
        assert_eq!(adapter.categories(), vec!["UI", "API", "DB", "9", "Other"]);
    }

    #[test]
    fn test_confidence_within_unit_interval() {
        let adapter = adapter((0..5).map(ClassLabel::Code).collect());
        let predictions = adapter
            .classify(&texts(&["crash", "nothing known", "button", "timeout"]))
            .unwrap();

        for prediction in predictions {
            assert!((0.0..=1.0).contains(&prediction.confidence_score));
        }
    }

    #[test]
    fn test_empty_input_yields_no_predictions() {
        let adapter = adapter((0..5).map(ClassLabel::Code).collect());
        assert!(adapter.classify(&[]).unwrap().is_empty());
    }
}
