//! Offline model trainer
//!
//! Generates the synthetic dataset, fits the scaler and forest, prints
//! the held-out accuracy, and overwrites the artifact pair the server
//! loads at startup.
//!
//! # Usage
//! ```bash
//! cargo run --release --bin train
//! cargo run --release --bin train -- --samples 10000 --seed 7
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use glucoguard::model::{DEFAULT_MAX_DEPTH, DEFAULT_NUM_TREES};
use glucoguard::training::{self, TrainingConfig, DEFAULT_NUM_SAMPLES, DEFAULT_SEED};

#[derive(Parser, Debug)]
#[command(name = "train")]
#[command(about = "GlucoGuard offline model training")]
#[command(version)]
struct Args {
    /// Number of synthetic samples to generate
    #[arg(long, default_value_t = DEFAULT_NUM_SAMPLES)]
    samples: usize,

    /// Random seed (dataset, split, and forest are reproducible from it)
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Number of trees in the forest
    #[arg(long, default_value_t = DEFAULT_NUM_TREES)]
    trees: usize,

    /// Maximum tree depth
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Artifact output directory
    #[arg(long, default_value = "./model")]
    model_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = TrainingConfig {
        num_samples: args.samples,
        seed: args.seed,
        num_trees: args.trees,
        max_depth: args.max_depth,
    };

    let report = training::run(&config, &args.model_dir)?;

    println!(
        "Random Forest accuracy: {:.2}% ({} train / {} test rows, positive rate {:.1}%)",
        report.test_accuracy * 100.0,
        report.train_rows,
        report.test_rows,
        report.positive_rate * 100.0,
    );
    println!("Artifact written to {}", report.model_dir.display());

    Ok(())
}
