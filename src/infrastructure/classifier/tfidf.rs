use std::collections::{BTreeMap, HashMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{FeatureMatrix, SparseVector, TextVectorizer};
use crate::domain::error::{AppError, Result};

const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// Exported state of a fitted TF-IDF vectorizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerArtifact {
    /// Term -> feature column
    pub vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per column; plain term counts when absent
    #[serde(default)]
    pub idf: Option<Vec<f64>>,
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub stop_words: HashSet<String>,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub binary: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
    #[serde(default)]
    pub strip_accents: Option<String>,
}

fn default_lowercase() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

impl VectorizerArtifact {
    /// Artifact with default settings over the given vocabulary
    pub fn with_vocabulary(terms: &[&str]) -> Self {
        Self {
            vocabulary: terms
                .iter()
                .enumerate()
                .map(|(idx, term)| (term.to_string(), idx))
                .collect(),
            idf: None,
            lowercase: default_lowercase(),
            token_pattern: default_token_pattern(),
            ngram_range: default_ngram_range(),
            stop_words: HashSet::new(),
            sublinear_tf: false,
            binary: false,
            norm: default_norm(),
            strip_accents: None,
        }
    }
}

/// Bag-of-words TF-IDF transform over a fixed vocabulary
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    artifact: VectorizerArtifact,
    token_regex: Regex,
    n_features: usize,
}

impl TryFrom<VectorizerArtifact> for TfidfVectorizer {
    type Error = AppError;

    fn try_from(artifact: VectorizerArtifact) -> Result<Self> {
        if artifact.vocabulary.is_empty() {
            return Err(AppError::ModelError("Vectorizer vocabulary is empty".to_string()));
        }
        if let Some(mode) = &artifact.strip_accents {
            return Err(AppError::ModelError(format!(
                "Vectorizer strip_accents='{}' is not supported",
                mode
            )));
        }

        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(AppError::ModelError(format!(
                "Invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }

        let n_features = artifact.vocabulary.len();
        let mut seen = vec![false; n_features];
        for (term, &column) in &artifact.vocabulary {
            if column >= n_features || seen[column] {
                return Err(AppError::ModelError(format!(
                    "Vocabulary column {} for '{}' is out of range or duplicated",
                    column, term
                )));
            }
            seen[column] = true;
        }

        if let Some(idf) = &artifact.idf {
            if idf.len() != n_features {
                return Err(AppError::ModelError(format!(
                    "idf has {} weights for {} vocabulary terms",
                    idf.len(),
                    n_features
                )));
            }
        }

        let token_regex = Regex::new(&artifact.token_pattern).map_err(|e| {
            AppError::ModelError(format!("Invalid token_pattern: {}", e))
        })?;
        if token_regex.captures_len() > 2 {
            return Err(AppError::ModelError(
                "token_pattern may contain at most one capturing group".to_string(),
            ));
        }

        Ok(Self {
            artifact,
            token_regex,
            n_features,
        })
    }
}

impl TfidfVectorizer {
    /// Tokens of one document, after lowercasing and stop-word removal
    fn tokenize(&self, document: &str) -> Vec<String> {
        let text = if self.artifact.lowercase {
            document.to_lowercase()
        } else {
            document.to_string()
        };

        let use_group = self.token_regex.captures_len() == 2;
        self.token_regex
            .captures_iter(&text)
            .filter_map(|caps| {
                let token = if use_group { caps.get(1) } else { caps.get(0) };
                token.map(|m| m.as_str().to_string())
            })
            .filter(|token| !self.artifact.stop_words.contains(token))
            .collect()
    }

    /// Word n-grams joined by a single space
    fn ngrams(&self, tokens: Vec<String>) -> Vec<String> {
        let (min_n, max_n) = self.artifact.ngram_range;
        if max_n == 1 {
            return tokens;
        }

        let mut grams = Vec::new();
        if min_n == 1 {
            grams.extend(tokens.iter().cloned());
        }
        for n in min_n.max(2)..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                grams.push(window.join(" "));
            }
        }
        grams
    }

    fn transform_one(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for gram in self.ngrams(self.tokenize(document)) {
            if let Some(&column) = self.artifact.vocabulary.get(&gram) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseVector = counts
            .into_iter()
            .map(|(column, count)| {
                let mut tf = if self.artifact.binary { 1.0 } else { count };
                if self.artifact.sublinear_tf {
                    tf = 1.0 + tf.ln();
                }
                let weight = self
                    .artifact
                    .idf
                    .as_ref()
                    .map(|idf| idf[column])
                    .unwrap_or(1.0);
                (column, tf * weight)
            })
            .collect();

        if let Some(norm) = self.artifact.norm {
            normalize(&mut row, norm);
        }
        row
    }
}

impl TextVectorizer for TfidfVectorizer {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn transform(&self, documents: &[String]) -> Result<FeatureMatrix> {
        Ok(documents
            .iter()
            .map(|document| self.transform_one(document))
            .collect())
    }
}

fn normalize(row: &mut SparseVector, norm: Norm) {
    let length = match norm {
        Norm::L1 => row.iter().map(|(_, value)| value.abs()).sum::<f64>(),
        Norm::L2 => row.iter().map(|(_, value)| value * value).sum::<f64>().sqrt(),
    };
    if length > 0.0 {
        for (_, value) in row.iter_mut() {
            *value /= length;
        }
    }
}
