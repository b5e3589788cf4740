use crate::error::{AppError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Common English stopwords, dropped during tokenization.
const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "again", "all", "also", "an", "and", "any", "are", "as", "at", "be",
    "because", "been", "before", "being", "below", "between", "both", "but", "by", "can", "could",
    "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from", "further",
    "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how", "if", "in",
    "into", "is", "it", "its", "just", "may", "me", "might", "more", "most", "must", "my", "no",
    "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "out", "over",
    "own", "same", "she", "should", "so", "some", "such", "than", "that", "the", "their", "them",
    "then", "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
    "up", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "will", "with", "would", "you", "your", "yours",
];

/// TF-IDF vectorizer for listing text
///
/// Fit once over the training corpus; afterwards `transform` maps raw text
/// into a fixed-dimensional feature vector. Terms never seen during fitting
/// contribute nothing at inference time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Vocabulary mapping (term -> column index)
    ///
    /// Ordered map: the artifact must serialize identically across runs.
    vocabulary: BTreeMap<String, usize>,

    /// Smoothed inverse document frequency per vocabulary index
    idf: Vec<f64>,

    /// Is fitted (vocabulary built)
    is_fitted: bool,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TfidfVectorizer {
    /// Create a new, unfitted vectorizer
    pub fn new() -> Self {
        Self {
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the vectorizer on a corpus of documents
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if documents.is_empty() {
            return Err(AppError::Model(
                "Cannot fit vectorizer on an empty corpus".to_string(),
            ));
        }

        // Document frequency per term
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let terms = tokenize(doc);
            let unique: std::collections::HashSet<_> = terms.into_iter().collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        if doc_freq.is_empty() {
            return Err(AppError::Model(
                "Corpus contains no usable terms after tokenization".to_string(),
            ));
        }

        // Sorted vocabulary keeps repeated fits over the same corpus
        // byte-identical regardless of hash-map iteration order.
        let mut terms: Vec<String> = doc_freq.keys().cloned().collect();
        terms.sort();

        let n_docs = documents.len() as f64;
        let mut idf = Vec::with_capacity(terms.len());
        self.vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| {
                let df = doc_freq[&term] as f64;
                idf.push(((1.0 + n_docs) / (1.0 + df)).ln() + 1.0);
                (term, idx)
            })
            .collect();

        self.idf = idf;
        self.is_fitted = true;

        Ok(())
    }

    /// Transform a single document into an L2-normalized TF-IDF vector
    pub fn transform(&self, document: &str) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(AppError::Model(
                "TfidfVectorizer must be fitted before transform".to_string(),
            ));
        }

        let mut features = Array1::zeros(self.idf.len());

        let terms = tokenize(document);
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for term in &terms {
            *counts.entry(term.as_str()).or_insert(0) += 1;
        }

        for (term, count) in counts {
            if let Some(&idx) = self.vocabulary.get(term) {
                features[idx] = count as f64 * self.idf[idx];
            }
        }

        let norm = features.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            features.mapv_inplace(|v| v / norm);
        }

        Ok(features)
    }

    /// Transform a batch of documents into a feature matrix
    pub fn transform_batch(&self, documents: &[String]) -> Result<Array2<f64>> {
        let mut matrix = Array2::zeros((documents.len(), self.n_features()));
        for (i, doc) in documents.iter().enumerate() {
            let row = self.transform(doc)?;
            matrix.row_mut(i).assign(&row);
        }
        Ok(matrix)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Array2<f64>> {
        self.fit(documents)?;
        self.transform_batch(documents)
    }

    /// Get number of features
    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    /// Check if fitted
    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Get vocabulary size
    pub fn vocab_size(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Tokenize text: lowercase, split on whitespace and punctuation, keep
/// tokens of at least two characters, drop English stopwords.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|w| w.len() >= 2 && !STOP_WORDS.contains(w))
        .map(|w| w.to_string())
        .collect()
}
