use clap::Parser;
use listing_fraud_screener::{config::Config, training::run_training};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fraud-trainer")]
#[command(about = "Fit the listing fraud pipeline from a labeled CSV", long_about = None)]
struct Cli {
    /// Labeled listings CSV (columns: productName, description, is_fraud)
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// Output path for the serialized pipeline artifact
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// RNG seed for the train/test shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of rows held out for evaluation
    #[arg(long)]
    test_fraction: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;

    let registry = tracing_subscriber::registry().with(config.observability.env_filter());
    if config.observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    let mut training = config.training.clone();
    if let Some(dataset) = cli.dataset {
        training.dataset_path = dataset;
    }
    if let Some(seed) = cli.seed {
        training.seed = seed;
    }
    if let Some(test_fraction) = cli.test_fraction {
        training.test_fraction = test_fraction;
    }
    let artifact_path = cli.output.unwrap_or(config.model.artifact_path);

    let report = run_training(&training, &artifact_path)?;

    tracing::info!(
        n_train = report.n_train,
        n_test = report.n_test,
        vocab_size = report.vocab_size,
        holdout_accuracy = ?report.holdout_accuracy,
        "Model trained and saved to {}",
        artifact_path.display()
    );

    Ok(())
}
