//! Offline training: load the labeled listings CSV, fit the pipeline on an
//! 80/20 split, score the held-out rows, and write the artifact.

use crate::config::TrainingConfig;
use crate::error::{AppError, Result};
use crate::ml::{combine_listing_text, FraudPipeline};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Deserializer};
use std::path::Path;
use tracing::info;

/// One row of the labeled listings CSV
#[derive(Debug, Clone, Deserialize)]
pub struct ListingRecord {
    /// Listing title
    #[serde(rename = "productName")]
    pub product_name: String,

    /// Free-text listing description
    pub description: String,

    /// Fraud label; accepts true/false and 1/0 spellings
    #[serde(deserialize_with = "deserialize_bool_like")]
    pub is_fraud: bool,
}

/// Labeled training corpus
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Combined listing text per row
    pub texts: Vec<String>,

    /// Fraud label per row
    pub labels: Vec<bool>,
}

impl Dataset {
    /// Load and combine the labeled CSV
    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| {
            AppError::Dataset(format!("Failed to open dataset at {}: {}", path.display(), e))
        })?;

        let mut texts = Vec::new();
        let mut labels = Vec::new();

        for record in reader.deserialize() {
            let record: ListingRecord = record?;
            texts.push(combine_listing_text(&record.product_name, &record.description));
            labels.push(record.is_fraud);
        }

        if texts.is_empty() {
            return Err(AppError::Dataset(format!(
                "Dataset at {} contains no rows",
                path.display()
            )));
        }

        Ok(Self { texts, labels })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Split the dataset into train and test partitions
///
/// Rows are shuffled with a seeded RNG, so a given (dataset, seed) pair
/// always yields the same split. The test fraction must be in [0, 1) so the
/// training partition is never empty.
pub fn train_test_split(
    dataset: &Dataset,
    test_fraction: f64,
    seed: u64,
) -> Result<(Dataset, Dataset)> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(AppError::Configuration(format!(
            "test_fraction must be in [0, 1), got {}",
            test_fraction
        )));
    }

    let n = dataset.len();
    let n_test = ((n as f64) * test_fraction).floor() as usize;

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let pick = |idx: &[usize]| Dataset {
        texts: idx.iter().map(|&i| dataset.texts[i].clone()).collect(),
        labels: idx.iter().map(|&i| dataset.labels[i]).collect(),
    };

    let test = pick(&indices[..n_test]);
    let train = pick(&indices[n_test..]);

    Ok((train, test))
}

/// Summary of a completed training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// Rows in the training partition
    pub n_train: usize,

    /// Rows in the held-out partition
    pub n_test: usize,

    /// Vocabulary size of the fitted vectorizer
    pub vocab_size: usize,

    /// Accuracy on the held-out partition, if it was non-empty
    pub holdout_accuracy: Option<f64>,
}

/// Run the full training pass and write the artifact
pub fn run_training(config: &TrainingConfig, artifact_path: &Path) -> Result<TrainingReport> {
    let dataset = Dataset::from_csv(&config.dataset_path)?;
    info!(
        rows = dataset.len(),
        dataset = %config.dataset_path.display(),
        "Loaded labeled listings"
    );

    let (train, test) = train_test_split(&dataset, config.test_fraction, config.seed)?;
    info!(
        n_train = train.len(),
        n_test = test.len(),
        seed = config.seed,
        "Split dataset"
    );

    let mut pipeline = FraudPipeline::new();
    pipeline.fit(&train.texts, &train.labels)?;

    let holdout_accuracy = if test.is_empty() {
        None
    } else {
        let accuracy = pipeline.evaluate(&test.texts, &test.labels)?;
        info!(accuracy, "Held-out evaluation");
        pipeline.set_holdout_accuracy(accuracy);
        Some(accuracy)
    };

    pipeline.save(artifact_path)?;
    info!(artifact = %artifact_path.display(), "Pipeline artifact written");

    Ok(TrainingReport {
        n_train: train.len(),
        n_test: test.len(),
        vocab_size: pipeline.metadata().vocab_size,
        holdout_accuracy,
    })
}

/// Accept boolean-like CSV values: true/false, 1/0, case-insensitive
fn deserialize_bool_like<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "Invalid is_fraud value: {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = write_csv(
            "productName,description,is_fraud\n\
             iPhone 15,sealed box authentic,False\n\
             FREE MONEY,click now guaranteed prize,True\n",
        );

        let dataset = Dataset::from_csv(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.texts[0], "iPhone 15 sealed box authentic");
        assert_eq!(dataset.labels, vec![false, true]);
    }

    #[test]
    fn test_numeric_labels_accepted() {
        let file = write_csv(
            "productName,description,is_fraud\n\
             camera,tested working,0\n\
             prize,wire the fee upfront,1\n",
        );

        let dataset = Dataset::from_csv(file.path()).unwrap();
        assert_eq!(dataset.labels, vec![false, true]);
    }

    #[test]
    fn test_missing_column_errors() {
        let file = write_csv("productName,description\nitem,text\n");
        assert!(Dataset::from_csv(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_errors() {
        assert!(Dataset::from_csv(Path::new("/nonexistent/data.csv")).is_err());
    }

    #[test]
    fn test_empty_dataset_errors() {
        let file = write_csv("productName,description,is_fraud\n");
        assert!(Dataset::from_csv(file.path()).is_err());
    }

    #[test]
    fn test_bad_label_errors() {
        let file = write_csv("productName,description,is_fraud\nitem,text,maybe\n");
        assert!(Dataset::from_csv(file.path()).is_err());
    }

    fn ten_row_dataset() -> Dataset {
        Dataset {
            texts: (0..10).map(|i| format!("listing number {}", i)).collect(),
            labels: (0..10).map(|i| i % 2 == 0).collect(),
        }
    }

    #[test]
    fn test_split_sizes() {
        let dataset = ten_row_dataset();
        let (train, test) = train_test_split(&dataset, 0.2, 42).unwrap();

        assert_eq!(test.len(), 2);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn test_split_is_seed_stable() {
        let dataset = ten_row_dataset();
        let (train_a, test_a) = train_test_split(&dataset, 0.2, 42).unwrap();
        let (train_b, test_b) = train_test_split(&dataset, 0.2, 42).unwrap();

        assert_eq!(train_a.texts, train_b.texts);
        assert_eq!(test_a.texts, test_b.texts);
    }

    #[test]
    fn test_different_seeds_differ() {
        let dataset = ten_row_dataset();
        let (train_a, _) = train_test_split(&dataset, 0.2, 42).unwrap();
        let (train_b, _) = train_test_split(&dataset, 0.2, 43).unwrap();

        // Ten rows shuffled under two seeds should not line up
        assert_ne!(train_a.texts, train_b.texts);
    }

    #[test]
    fn test_out_of_range_fraction_errors() {
        let dataset = ten_row_dataset();

        assert!(train_test_split(&dataset, 1.5, 42).is_err());
        assert!(train_test_split(&dataset, 1.0, 42).is_err());
        assert!(train_test_split(&dataset, -0.1, 42).is_err());

        let (train, test) = train_test_split(&dataset, 0.0, 42).unwrap();
        assert_eq!(test.len(), 0);
        assert_eq!(train.len(), 10);
    }

    #[test]
    fn test_split_partitions_disjoint() {
        let dataset = ten_row_dataset();
        let (train, test) = train_test_split(&dataset, 0.2, 7).unwrap();

        for text in &test.texts {
            assert!(!train.texts.contains(text));
        }
        assert_eq!(train.len() + test.len(), dataset.len());
    }
}
