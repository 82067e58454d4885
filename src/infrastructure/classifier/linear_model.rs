use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{FeatureMatrix, ProbabilisticClassifier, SparseVector};
use crate::domain::bug_report::ClassLabel;
use crate::domain::error::{AppError, Result};

/// How a multi-class logistic regression turns scores into probabilities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    /// Softmax over all class scores
    #[default]
    Multinomial,
    /// Independent sigmoid per class, renormalized
    Ovr,
}

/// Exported state of a fitted linear text classifier, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression(LogisticRegression),
    MultinomialNb(MultinomialNb),
}

impl ModelArtifact {
    /// Validate shapes and wrap the model for shared, read-only use
    pub fn into_classifier(self) -> Result<Arc<dyn ProbabilisticClassifier + Send + Sync>> {
        match self {
            ModelArtifact::LogisticRegression(model) => {
                model.validate()?;
                Ok(Arc::new(model))
            }
            ModelArtifact::MultinomialNb(model) => {
                model.validate()?;
                Ok(Arc::new(model))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub classes: Vec<ClassLabel>,
    /// One weight row per class, or a single row for binary problems
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default)]
    pub multi_class: MultiClass,
}

impl LogisticRegression {
    fn is_binary(&self) -> bool {
        self.classes.len() == 2 && self.coef.len() == 1
    }

    fn validate(&self) -> Result<()> {
        if self.classes.len() < 2 {
            return Err(AppError::ModelError(
                "Logistic regression needs at least two classes".to_string(),
            ));
        }
        let expected_rows = if self.is_binary() { 1 } else { self.classes.len() };
        if self.coef.len() != expected_rows || self.intercept.len() != expected_rows {
            return Err(AppError::ModelError(format!(
                "Expected {} coef rows and intercepts for {} classes, got {} and {}",
                expected_rows,
                self.classes.len(),
                self.coef.len(),
                self.intercept.len()
            )));
        }
        check_rectangular(&self.coef, "coef")
    }

    fn decision_function(&self, row: &SparseVector) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(weights, bias)| bias + dot(weights, row))
            .collect()
    }
}

impl ProbabilisticClassifier for LogisticRegression {
    fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.coef.first().map(Vec::len).unwrap_or(0)
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<Vec<f64>>> {
        check_features(features, self.n_features())?;
        Ok(features
            .iter()
            .map(|row| {
                let scores = self.decision_function(row);
                if self.is_binary() {
                    let positive = sigmoid(scores[0]);
                    vec![1.0 - positive, positive]
                } else {
                    match self.multi_class {
                        MultiClass::Multinomial => softmax(&scores),
                        MultiClass::Ovr => {
                            let raw: Vec<f64> = scores.into_iter().map(sigmoid).collect();
                            let total: f64 = raw.iter().sum();
                            raw.into_iter().map(|p| p / total).collect()
                        }
                    }
                }
            })
            .collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNb {
    pub classes: Vec<ClassLabel>,
    pub class_log_prior: Vec<f64>,
    /// Log P(feature | class), one row per class
    pub feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(AppError::ModelError("Naive Bayes model has no classes".to_string()));
        }
        if self.class_log_prior.len() != self.classes.len()
            || self.feature_log_prob.len() != self.classes.len()
        {
            return Err(AppError::ModelError(format!(
                "Expected {} priors and feature rows, got {} and {}",
                self.classes.len(),
                self.class_log_prior.len(),
                self.feature_log_prob.len()
            )));
        }
        check_rectangular(&self.feature_log_prob, "feature_log_prob")
    }
}

impl ProbabilisticClassifier for MultinomialNb {
    fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.feature_log_prob.first().map(Vec::len).unwrap_or(0)
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<Vec<f64>>> {
        check_features(features, self.n_features())?;
        Ok(features
            .iter()
            .map(|row| {
                let joint: Vec<f64> = self
                    .feature_log_prob
                    .iter()
                    .zip(&self.class_log_prior)
                    .map(|(log_probs, prior)| prior + dot(log_probs, row))
                    .collect();
                softmax(&joint)
            })
            .collect())
    }
}

fn check_rectangular(matrix: &[Vec<f64>], name: &str) -> Result<()> {
    let width = matrix.first().map(Vec::len).unwrap_or(0);
    if width == 0 || matrix.iter().any(|row| row.len() != width) {
        return Err(AppError::ModelError(format!(
            "{} rows must be non-empty and equally long",
            name
        )));
    }
    Ok(())
}

fn check_features(features: &FeatureMatrix, n_features: usize) -> Result<()> {
    let out_of_range = features
        .iter()
        .flatten()
        .any(|(column, _)| *column >= n_features);
    if out_of_range {
        return Err(AppError::ModelError(format!(
            "Feature index exceeds the model's {} features",
            n_features
        )));
    }
    Ok(())
}

fn dot(weights: &[f64], row: &SparseVector) -> f64 {
    row.iter().map(|(column, value)| weights[*column] * value).sum()
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
