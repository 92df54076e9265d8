//! Bagged random forest classifier.
//!
//! 500 gini trees by default, each grown on a bootstrap resample with
//! sqrt-feature subsampling at every split. All randomness derives
//! from the master seed (per-tree seeds are drawn from one seeded
//! StdRng), so a fixed seed reproduces the identical forest.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::{FeatureVector, NUM_FEATURES};
use crate::model::tree::{DecisionTree, TreeParams};

/// Default number of trees.
pub const DEFAULT_NUM_TREES: usize = 500;
/// Default maximum tree depth.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Inference failure for a single request.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("forest has no trees")]
    EmptyForest,
    #[error("non-finite probability from ensemble")]
    NonFiniteProbability,
}

/// Forest hyperparameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForestParams {
    pub num_trees: usize,
    pub max_depth: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            num_trees: DEFAULT_NUM_TREES,
            max_depth: DEFAULT_MAX_DEPTH,
            seed: 42,
        }
    }
}

/// A fitted ensemble of bagged decision trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub params: ForestParams,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit the ensemble on scaled training rows and binary labels.
    pub fn fit(rows: &[FeatureVector], labels: &[u8], params: ForestParams) -> Self {
        // sqrt(7) -> 2 candidate features per split
        let max_features = (NUM_FEATURES as f64).sqrt().floor() as usize;
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            max_features,
        };

        let mut master = StdRng::seed_from_u64(params.seed);
        let n = rows.len();

        let mut trees = Vec::with_capacity(params.num_trees);
        for _ in 0..params.num_trees {
            let tree_seed: u64 = master.gen();
            let mut rng = StdRng::seed_from_u64(tree_seed);

            // Bootstrap: n draws with replacement
            let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            trees.push(DecisionTree::fit(rows, labels, &indices, tree_params, &mut rng));
        }

        Self { params, trees }
    }

    /// Probability of the high-risk class: the mean of per-tree leaf
    /// probabilities. Deterministic for a fitted forest.
    pub fn predict_proba(&self, row: &FeatureVector) -> Result<f64, InferenceError> {
        if self.trees.is_empty() {
            return Err(InferenceError::EmptyForest);
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_proba(row)).sum();
        let prob = sum / self.trees.len() as f64;
        if !prob.is_finite() {
            return Err(InferenceError::NonFiniteProbability);
        }
        Ok(prob)
    }

    /// Hard class at the 0.5 probability threshold.
    pub fn predict(&self, row: &FeatureVector) -> Result<u8, InferenceError> {
        Ok(if self.predict_proba(row)? >= 0.5 { 1 } else { 0 })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_data(n: usize) -> (Vec<FeatureVector>, Vec<u8>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..n {
            let mut row = [0.0; NUM_FEATURES];
            row[0] = i as f64;
            row[1] = (n - i) as f64;
            rows.push(row);
            labels.push(if i >= n / 2 { 1 } else { 0 });
        }
        (rows, labels)
    }

    fn small_params(seed: u64) -> ForestParams {
        ForestParams {
            num_trees: 25,
            max_depth: 6,
            seed,
        }
    }

    #[test]
    fn test_forest_learns_separable_data() {
        let (rows, labels) = separable_data(200);
        let forest = RandomForest::fit(&rows, &labels, small_params(42));

        let mut correct = 0;
        for (row, &label) in rows.iter().zip(labels.iter()) {
            if forest.predict(row).unwrap() == label {
                correct += 1;
            }
        }
        // Bootstrap noise allows a few mistakes near the boundary
        assert!(correct >= 190, "only {correct}/200 correct");
    }

    #[test]
    fn test_same_seed_reproduces_probabilities() {
        let (rows, labels) = separable_data(120);
        let forest_a = RandomForest::fit(&rows, &labels, small_params(7));
        let forest_b = RandomForest::fit(&rows, &labels, small_params(7));

        for row in rows.iter().take(20) {
            assert_eq!(
                forest_a.predict_proba(row).unwrap(),
                forest_b.predict_proba(row).unwrap()
            );
        }
    }

    #[test]
    fn test_different_seed_differs() {
        let (rows, labels) = separable_data(120);
        let forest_a = RandomForest::fit(&rows, &labels, small_params(1));
        let forest_b = RandomForest::fit(&rows, &labels, small_params(2));

        let diverged = rows.iter().any(|row| {
            forest_a.predict_proba(row).unwrap() != forest_b.predict_proba(row).unwrap()
        });
        assert!(diverged, "different seeds should grow different forests");
    }

    #[test]
    fn test_probability_in_unit_interval() {
        let (rows, labels) = separable_data(120);
        let forest = RandomForest::fit(&rows, &labels, small_params(42));
        for row in &rows {
            let p = forest.predict_proba(row).unwrap();
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_empty_forest_is_inference_error() {
        let forest = RandomForest {
            params: small_params(42),
            trees: Vec::new(),
        };
        assert!(matches!(
            forest.predict_proba(&[0.0; NUM_FEATURES]),
            Err(InferenceError::EmptyForest)
        ));
    }

    #[test]
    fn test_serde_round_trip_preserves_predictions() {
        let (rows, labels) = separable_data(80);
        let forest = RandomForest::fit(&rows, &labels, small_params(42));

        let json = serde_json::to_string(&forest).unwrap();
        let restored: RandomForest = serde_json::from_str(&json).unwrap();

        for row in rows.iter().take(10) {
            assert_eq!(
                forest.predict_proba(row).unwrap(),
                restored.predict_proba(row).unwrap()
            );
        }
    }
}
