use crate::error::{AppError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Multinomial Naive Bayes classifier
///
/// Operates on non-negative feature matrices (TF-IDF weights). Unlike a
/// wrapper around an external fitting library, the fitted state here is just
/// log priors and per-feature log likelihoods, so the whole model serializes
/// cleanly into the pipeline artifact and predictions are exactly
/// reproducible across processes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNb {
    /// Lidstone smoothing parameter
    alpha: f64,

    /// Log prior per class
    class_log_prior: Vec<f64>,

    /// Log likelihood per class and feature, shape (n_classes, n_features)
    feature_log_prob: Option<Array2<f64>>,

    /// Number of classes
    n_classes: usize,

    /// Is trained
    trained: bool,
}

impl MultinomialNb {
    /// Create an untrained classifier with the given smoothing parameter
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            class_log_prior: Vec::new(),
            feature_log_prob: None,
            n_classes: 0,
            trained: false,
        }
    }

    /// Fit the classifier on a feature matrix and class labels
    pub fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<()> {
        if x.nrows() == 0 || y.is_empty() {
            return Err(AppError::Model(
                "Cannot fit classifier on an empty dataset".to_string(),
            ));
        }
        if x.nrows() != y.len() {
            return Err(AppError::Model(format!(
                "Feature matrix has {} rows but {} labels were given",
                x.nrows(),
                y.len()
            )));
        }

        let n_classes = y.iter().max().copied().unwrap_or(0) + 1;
        let n_samples = x.nrows();
        let n_features = x.ncols();

        let mut class_counts = vec![0usize; n_classes];
        for &label in y {
            class_counts[label] += 1;
        }
        if class_counts.iter().any(|&c| c == 0) {
            return Err(AppError::Model(
                "Every class in 0..n_classes must appear in the training labels".to_string(),
            ));
        }

        // Accumulate per-class feature totals
        let mut feature_counts = Array2::<f64>::zeros((n_classes, n_features));
        for (row, &label) in x.axis_iter(Axis(0)).zip(y.iter()) {
            let mut class_row = feature_counts.row_mut(label);
            class_row += &row;
        }

        // Smoothed log likelihoods: ln((count + alpha) / (total + alpha * n_features))
        let mut feature_log_prob = Array2::<f64>::zeros((n_classes, n_features));
        for c in 0..n_classes {
            let class_total: f64 = feature_counts.row(c).sum();
            let denom = (class_total + self.alpha * n_features as f64).ln();
            for j in 0..n_features {
                feature_log_prob[[c, j]] = (feature_counts[[c, j]] + self.alpha).ln() - denom;
            }
        }

        self.class_log_prior = class_counts
            .iter()
            .map(|&c| (c as f64 / n_samples as f64).ln())
            .collect();
        self.feature_log_prob = Some(feature_log_prob);
        self.n_classes = n_classes;
        self.trained = true;

        Ok(())
    }

    /// Predict class labels (argmax of the joint log likelihood)
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let joint = self.joint_log_likelihood(x)?;

        let predictions = joint
            .axis_iter(Axis(0))
            .map(|row| {
                row.iter()
                    .enumerate()
                    .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(idx, _)| idx)
                    .unwrap_or(0)
            })
            .collect();

        Ok(predictions)
    }

    /// Predict class probabilities; each row sums to 1
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let joint = self.joint_log_likelihood(x)?;

        let mut proba = Array2::zeros(joint.raw_dim());
        for (i, row) in joint.axis_iter(Axis(0)).enumerate() {
            // log-sum-exp normalization
            let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let log_sum = row.iter().map(|&v| (v - max).exp()).sum::<f64>().ln() + max;
            for (j, &v) in row.iter().enumerate() {
                proba[[i, j]] = (v - log_sum).exp();
            }
        }

        Ok(proba)
    }

    /// Joint log likelihood per sample and class
    fn joint_log_likelihood(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let feature_log_prob = self.feature_log_prob.as_ref().ok_or_else(|| {
            AppError::Model("Classifier must be trained before prediction".to_string())
        })?;

        if x.ncols() != feature_log_prob.ncols() {
            return Err(AppError::Model(format!(
                "Expected {} features but got {}",
                feature_log_prob.ncols(),
                x.ncols()
            )));
        }

        let prior = Array1::from(self.class_log_prior.clone());
        let mut joint = x.dot(&feature_log_prob.t());
        joint += &prior;

        Ok(joint)
    }

    /// Get number of classes
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Check if trained
    pub fn is_trained(&self) -> bool {
        self.trained
    }
}
