/// Integration tests for the offline training run
///
/// These tests verify the trainer end-to-end: CSV in, artifact out, with
/// deterministic results for a fixed seed.
use listing_fraud_screener::{
    config::TrainingConfig,
    ml::FraudPipeline,
    training::run_training,
};
use std::io::Write;
use std::path::PathBuf;

const DATASET_CSV: &str = "\
productName,description,is_fraud
iPhone 15,Brand new sealed box authentic Apple product,False
Mountain bike,Used good condition local pickup only,False
Vintage camera,Lens tested working fine includes strap,False
Office chair,Leather barely used original receipt included,False
Gaming laptop,Lightly used with original charger and box,False
Wooden desk,Solid oak minor scratches pickup preferred,False
FREE MONEY CLICK NOW,guaranteed cash prize no verification needed,True
Guaranteed winner,claim your cash prize instantly click now,True
Free prize,money wire transfer upfront fee required urgent,True
Instant cash,no verification needed guaranteed click here,True
Lottery payout,send processing fee to claim guaranteed winnings,True
Urgent offer,wire money now prize guaranteed no questions,True
";

struct TrainingRun {
    _dir: tempfile::TempDir,
    config: TrainingConfig,
    artifact_path: PathBuf,
}

fn setup_training_run(seed: u64) -> TrainingRun {
    let dir = tempfile::tempdir().unwrap();

    let dataset_path = dir.path().join("listings.csv");
    let mut file = std::fs::File::create(&dataset_path).unwrap();
    file.write_all(DATASET_CSV.as_bytes()).unwrap();

    let artifact_path = dir.path().join("pipeline.bin");
    let config = TrainingConfig {
        dataset_path,
        test_fraction: 0.2,
        seed,
    };

    TrainingRun {
        _dir: dir,
        config,
        artifact_path,
    }
}

#[test]
fn test_training_produces_artifact_and_report() {
    let run = setup_training_run(42);

    let report = run_training(&run.config, &run.artifact_path).unwrap();

    assert!(run.artifact_path.exists());
    assert_eq!(report.n_train + report.n_test, 12);
    assert_eq!(report.n_test, 2);
    assert!(report.vocab_size > 0);

    let accuracy = report.holdout_accuracy.unwrap();
    assert!((0.0..=1.0).contains(&accuracy));
}

#[test]
fn test_same_seed_byte_identical_artifacts() {
    let run_a = setup_training_run(42);
    let run_b = setup_training_run(42);

    run_training(&run_a.config, &run_a.artifact_path).unwrap();
    run_training(&run_b.config, &run_b.artifact_path).unwrap();

    let bytes_a = std::fs::read(&run_a.artifact_path).unwrap();
    let bytes_b = std::fs::read(&run_b.artifact_path).unwrap();
    assert_eq!(bytes_a, bytes_b);
}

#[test]
fn test_trained_artifact_scores_listings() {
    let run = setup_training_run(42);
    run_training(&run.config, &run.artifact_path).unwrap();

    let pipeline = FraudPipeline::load(&run.artifact_path).unwrap();
    assert!(pipeline.is_fitted());

    let scam = pipeline
        .score("FREE MONEY CLICK NOW guaranteed cash prize no verification needed")
        .unwrap();
    assert!(scam.fraud_probability > 0.5);
    assert!(!scam.is_safe);

    let listing = pipeline
        .score("iPhone 15 Brand new sealed box authentic Apple product")
        .unwrap();
    assert!(listing.fraud_probability < 0.5);
    assert!(listing.is_safe);
}

#[test]
fn test_out_of_range_test_fraction_fails() {
    let mut run = setup_training_run(42);
    run.config.test_fraction = 1.5;

    // A structured error, not a slice-bounds panic
    let err = run_training(&run.config, &run.artifact_path).unwrap_err();
    assert!(err.to_string().contains("test_fraction"));
    assert!(!run.artifact_path.exists());
}

#[test]
fn test_missing_dataset_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainingConfig {
        dataset_path: dir.path().join("missing.csv"),
        test_fraction: 0.2,
        seed: 42,
    };

    assert!(run_training(&config, &dir.path().join("pipeline.bin")).is_err());
}

#[test]
fn test_malformed_dataset_fails() {
    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("bad.csv");
    std::fs::write(&dataset_path, "productName,description\nitem,no label column\n").unwrap();

    let config = TrainingConfig {
        dataset_path,
        test_fraction: 0.2,
        seed: 42,
    };

    assert!(run_training(&config, &dir.path().join("pipeline.bin")).is_err());
}
