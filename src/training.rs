//! Offline training pipeline.
//!
//! Linear stage sequence, terminal at Persist:
//! Generate -> Engineer -> Split -> Scale -> Fit -> Evaluate -> Persist.
//!
//! Everything downstream of the seed is deterministic: the synthetic
//! dataset, the train/test split, and the forest are all reproduced
//! exactly by re-running with the same seed and sample count.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::features::{engineer_features, FeatureVector};
use crate::model::{
    ArtifactError, ForestParams, InferenceError, ModelArtifact, RandomForest, ScaleError,
    StandardScaler,
};
use crate::types::RiskReading;

/// Default synthetic sample count.
pub const DEFAULT_NUM_SAMPLES: usize = 5000;
/// Default master seed.
pub const DEFAULT_SEED: u64 = 42;
/// Held-out fraction for evaluation.
const TEST_FRACTION: f64 = 0.2;

/// Coefficient of the synthetic risk score.
const RISK_COEFFICIENT: f64 = 0.006;
/// Labeling threshold on the synthetic risk score.
const RISK_THRESHOLD: f64 = 1.0;

/// Training failure. Generation and labeling are infallible; only
/// scaling, inference during evaluation, and persistence can fail.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("scaling failed: {0}")]
    Scale(#[from] ScaleError),
    #[error("evaluation failed: {0}")]
    Inference(#[from] InferenceError),
    #[error("artifact persistence failed: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Pipeline configuration, resolved from the trainer CLI.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub num_samples: usize,
    pub seed: u64,
    pub num_trees: usize,
    pub max_depth: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_samples: DEFAULT_NUM_SAMPLES,
            seed: DEFAULT_SEED,
            num_trees: crate::model::DEFAULT_NUM_TREES,
            max_depth: crate::model::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Summary of one completed training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub num_samples: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub positive_rate: f64,
    pub test_accuracy: f64,
    pub model_dir: PathBuf,
}

/// Synthetic readings with their deterministic labels, row-aligned.
#[derive(Debug, Clone)]
pub struct LabeledDataset {
    pub readings: Vec<RiskReading>,
    pub labels: Vec<u8>,
}

/// Deterministic synthetic label: a linear combination of the raw
/// readings thresholded at 1.0. This is intentionally independent of
/// the clinical tier rule in `clinical.rs`; the two risk notions may
/// disagree for the same reading.
pub fn label_reading(reading: &RiskReading) -> u8 {
    let risk_score = RISK_COEFFICIENT
        * (reading.blood_sugar + reading.carb_intake - reading.activity_minutes);
    u8::from(risk_score > RISK_THRESHOLD)
}

/// Generate stage: N synthetic readings from a single seeded RNG.
///
/// blood_sugar ~ Normal(130, 25), carb_intake ~ Normal(60, 15),
/// activity ~ UniformInt[0, 60).
pub fn generate_dataset(num_samples: usize, seed: u64) -> LabeledDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    // Positive constant stddevs, construction cannot fail
    let blood_sugar_dist = Normal::new(130.0, 25.0).unwrap();
    let carb_dist = Normal::new(60.0, 15.0).unwrap();

    let mut readings = Vec::with_capacity(num_samples);
    let mut labels = Vec::with_capacity(num_samples);
    for _ in 0..num_samples {
        let reading = RiskReading {
            blood_sugar: blood_sugar_dist.sample(&mut rng),
            carb_intake: carb_dist.sample(&mut rng),
            activity_minutes: rng.gen_range(0..60) as f64,
        };
        labels.push(label_reading(&reading));
        readings.push(reading);
    }

    LabeledDataset { readings, labels }
}

/// Split stage: seeded shuffle into 80% train / 20% test index sets.
/// Features and labels stay row-aligned because both are addressed
/// through the same index vectors.
pub fn split_indices(num_rows: usize, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..num_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_size = (num_rows as f64 * TEST_FRACTION).round() as usize;
    let train_size = num_rows - test_size;
    let test = indices.split_off(train_size);
    (indices, test)
}

/// Run the full pipeline and persist the artifact under `model_dir`.
///
/// Persistence is unconditional; the measured accuracy is reported but
/// never gates it.
pub fn run(config: &TrainingConfig, model_dir: &Path) -> Result<TrainingReport, TrainingError> {
    info!(
        samples = config.num_samples,
        seed = config.seed,
        trees = config.num_trees,
        max_depth = config.max_depth,
        "Starting model training"
    );

    // Generate + Label
    let dataset = generate_dataset(config.num_samples, config.seed);
    let positives = dataset.labels.iter().filter(|&&l| l == 1).count();
    let positive_rate = positives as f64 / dataset.labels.len().max(1) as f64;

    // Engineer: the same shared function the serving path uses
    let features: Vec<FeatureVector> =
        dataset.readings.iter().map(engineer_features).collect();

    // Split
    let (train_idx, test_idx) = split_indices(features.len(), config.seed);
    let train_rows: Vec<FeatureVector> = train_idx.iter().map(|&i| features[i]).collect();
    let train_labels: Vec<u8> = train_idx.iter().map(|&i| dataset.labels[i]).collect();
    let test_rows: Vec<FeatureVector> = test_idx.iter().map(|&i| features[i]).collect();
    let test_labels: Vec<u8> = test_idx.iter().map(|&i| dataset.labels[i]).collect();

    // Scale: statistics come from the training partition only
    let scaler = StandardScaler::fit(&train_rows);
    let train_scaled = scaler.transform_all(&train_rows)?;
    let test_scaled = scaler.transform_all(&test_rows)?;

    // Fit
    let forest = RandomForest::fit(
        &train_scaled,
        &train_labels,
        ForestParams {
            num_trees: config.num_trees,
            max_depth: config.max_depth,
            seed: config.seed,
        },
    );

    // Evaluate
    let test_accuracy = evaluate_accuracy(&forest, &test_scaled, &test_labels)?;
    info!(
        test_accuracy = format!("{:.4}", test_accuracy),
        positive_rate = format!("{:.4}", positive_rate),
        "Training complete"
    );

    // Persist, unconditionally
    let artifact = ModelArtifact::new(forest, scaler, test_accuracy);
    artifact.save(model_dir)?;

    Ok(TrainingReport {
        num_samples: config.num_samples,
        train_rows: train_rows.len(),
        test_rows: test_rows.len(),
        positive_rate,
        test_accuracy,
        model_dir: model_dir.to_path_buf(),
    })
}

/// Classification accuracy at the 0.5 probability threshold.
pub fn evaluate_accuracy(
    forest: &RandomForest,
    rows: &[FeatureVector],
    labels: &[u8],
) -> Result<f64, InferenceError> {
    if rows.is_empty() {
        return Ok(0.0);
    }
    let mut correct = 0usize;
    for (row, &label) in rows.iter().zip(labels.iter()) {
        if forest.predict(row)? == label {
            correct += 1;
        }
    }
    Ok(correct as f64 / rows.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_threshold() {
        // 0.006 * (130 + 60 - 20) = 1.02 > 1.0 -> high risk
        let high = RiskReading {
            blood_sugar: 130.0,
            carb_intake: 60.0,
            activity_minutes: 20.0,
        };
        assert_eq!(label_reading(&high), 1);

        // 0.006 * (100 + 50 - 40) = 0.66 -> low risk
        let low = RiskReading {
            blood_sugar: 100.0,
            carb_intake: 50.0,
            activity_minutes: 40.0,
        };
        assert_eq!(label_reading(&low), 0);
    }

    #[test]
    fn test_label_threshold_is_strict() {
        // Score must exceed 1.0, not merely reach it
        let reading = RiskReading {
            blood_sugar: 100.0,
            carb_intake: 0.0,
            activity_minutes: 0.0,
        };
        // 0.006 * 100 = 0.6 -> below threshold
        assert_eq!(label_reading(&reading), 0);
    }

    #[test]
    fn test_generation_is_reproducible() {
        let a = generate_dataset(100, 42);
        let b = generate_dataset(100, 42);
        assert_eq!(a.readings, b.readings);
        assert_eq!(a.labels, b.labels);
    }

    #[test]
    fn test_generation_differs_across_seeds() {
        let a = generate_dataset(100, 1);
        let b = generate_dataset(100, 2);
        assert_ne!(a.readings, b.readings);
    }

    #[test]
    fn test_activity_range() {
        let dataset = generate_dataset(500, 42);
        for reading in &dataset.readings {
            assert!(reading.activity_minutes >= 0.0);
            assert!(reading.activity_minutes < 60.0);
            assert_eq!(reading.activity_minutes.fract(), 0.0);
        }
    }

    #[test]
    fn test_split_sizes_and_disjointness() {
        let (train, test) = split_indices(5000, 42);
        assert_eq!(train.len(), 4000);
        assert_eq!(test.len(), 1000);

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        let expected: Vec<usize> = (0..5000).collect();
        assert_eq!(all, expected);
    }

    #[test]
    fn test_split_is_seed_deterministic() {
        let (train_a, test_a) = split_indices(1000, 7);
        let (train_b, test_b) = split_indices(1000, 7);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);

        let (train_c, _) = split_indices(1000, 8);
        assert_ne!(train_a, train_c);
    }
}
