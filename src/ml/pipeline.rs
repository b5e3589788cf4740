use crate::error::{AppError, Result};
use crate::ml::classifier::MultinomialNb;
use crate::ml::features::TfidfVectorizer;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Index of the fraud class in the binary label space
const FRAUD_CLASS: usize = 1;

/// Probability threshold separating safe from fraudulent listings
const SAFE_THRESHOLD: f64 = 0.5;

/// Join listing fields into the single text document the pipeline consumes.
///
/// Training and inference must use this identically, otherwise the fitted
/// vocabulary no longer matches what the service feeds the model.
pub fn combine_listing_text(product_name: &str, description: &str) -> String {
    format!("{} {}", product_name, description)
}

/// Metadata recorded alongside the fitted pipeline
///
/// Deliberately carries no timestamps: training twice on the same dataset
/// and seed must produce byte-identical artifacts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineMetadata {
    /// Number of samples the pipeline was fitted on
    pub n_training_samples: usize,

    /// Feature dimensionality after vectorization
    pub n_features: usize,

    /// Vocabulary size of the fitted vectorizer
    pub vocab_size: usize,

    /// Accuracy on the held-out split, if one was evaluated
    pub holdout_accuracy: Option<f64>,
}

/// Verdict for a single listing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FraudVerdict {
    /// Direct class prediction from the classifier
    pub is_fraud: bool,

    /// Probability of the fraud class, rounded to 4 decimal places
    pub fraud_probability: f64,

    /// Whether the probability falls below the safe threshold
    pub is_safe: bool,
}

/// The fitted transform-then-predict unit
///
/// Created by the trainer, persisted to disk, loaded once by the service at
/// startup and never mutated afterwards, so it can be shared freely across
/// request handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudPipeline {
    vectorizer: TfidfVectorizer,
    classifier: MultinomialNb,
    metadata: PipelineMetadata,
}

impl Default for FraudPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl FraudPipeline {
    /// Create a new, unfitted pipeline
    pub fn new() -> Self {
        Self {
            vectorizer: TfidfVectorizer::new(),
            classifier: MultinomialNb::new(1.0),
            metadata: PipelineMetadata::default(),
        }
    }

    /// Fit the vectorizer and classifier on labeled listing text
    pub fn fit(&mut self, texts: &[String], labels: &[bool]) -> Result<()> {
        if texts.len() != labels.len() {
            return Err(AppError::Model(format!(
                "Got {} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }
        if texts.is_empty() {
            return Err(AppError::Model(
                "Cannot fit pipeline on an empty dataset".to_string(),
            ));
        }
        if labels.iter().all(|&l| l) || labels.iter().all(|&l| !l) {
            return Err(AppError::Model(
                "Training data must contain both fraud and non-fraud listings".to_string(),
            ));
        }

        let features = self.vectorizer.fit_transform(texts)?;
        let y: Vec<usize> = labels.iter().map(|&l| l as usize).collect();
        self.classifier.fit(&features, &y)?;

        self.metadata = PipelineMetadata {
            n_training_samples: texts.len(),
            n_features: self.vectorizer.n_features(),
            vocab_size: self.vectorizer.vocab_size(),
            holdout_accuracy: None,
        };

        Ok(())
    }

    /// Score a single listing text
    pub fn score(&self, text: &str) -> Result<FraudVerdict> {
        let features = self.vectorizer.transform(text)?;
        let x = features
            .into_shape((1, self.vectorizer.n_features()))
            .map_err(|e| AppError::Model(format!("Failed to shape feature vector: {}", e)))?;

        let prediction = self.classifier.predict(&x)?[0];
        let proba = self.classifier.predict_proba(&x)?;
        let fraud_probability = round4(proba[[0, FRAUD_CLASS]]);

        let verdict = FraudVerdict {
            is_fraud: prediction == FRAUD_CLASS,
            fraud_probability,
            is_safe: fraud_probability < SAFE_THRESHOLD,
        };

        // Class prediction and threshold share the same likelihood, so a
        // disagreement (beyond rounding at exactly 0.5) means a bug.
        if verdict.is_fraud == verdict.is_safe && fraud_probability != SAFE_THRESHOLD {
            tracing::warn!(
                fraud_probability,
                is_fraud = verdict.is_fraud,
                "Class prediction disagrees with probability threshold"
            );
        }

        Ok(verdict)
    }

    /// Accuracy over a labeled evaluation set
    pub fn evaluate(&self, texts: &[String], labels: &[bool]) -> Result<f64> {
        if texts.len() != labels.len() {
            return Err(AppError::Model(format!(
                "Got {} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }
        if texts.is_empty() {
            return Err(AppError::Model(
                "Cannot evaluate on an empty dataset".to_string(),
            ));
        }

        let features: Array2<f64> = self.vectorizer.transform_batch(texts)?;
        let predictions = self.classifier.predict(&features)?;

        let correct = predictions
            .iter()
            .zip(labels.iter())
            .filter(|(&pred, &label)| (pred == FRAUD_CLASS) == label)
            .count();

        Ok(correct as f64 / texts.len() as f64)
    }

    /// Record the held-out accuracy in the artifact metadata
    pub fn set_holdout_accuracy(&mut self, accuracy: f64) {
        self.metadata.holdout_accuracy = Some(accuracy);
    }

    /// Pipeline metadata
    pub fn metadata(&self) -> &PipelineMetadata {
        &self.metadata
    }

    /// Check if fitted
    pub fn is_fitted(&self) -> bool {
        self.vectorizer.is_fitted() && self.classifier.is_trained()
    }

    /// Serialize the fitted pipeline to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        bincode::serialize_into(BufWriter::new(file), self).map_err(|e| {
            AppError::Serialization(format!(
                "Failed to write pipeline artifact to {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Load a fitted pipeline from disk
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            AppError::Model(format!(
                "Failed to open pipeline artifact at {}: {}",
                path.display(),
                e
            ))
        })?;

        bincode::deserialize_from(BufReader::new(file)).map_err(|e| {
            AppError::Model(format!(
                "Failed to read pipeline artifact at {}: {}",
                path.display(),
                e
            ))
        })
    }
}

/// Round to exactly 4 decimal places
fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
