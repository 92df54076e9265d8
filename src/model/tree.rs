//! CART decision tree for binary classification (gini impurity).
//!
//! Trees are stored as a flat node arena so they serialize cleanly as
//! part of the model artifact. Each leaf keeps the fraction of
//! high-risk training rows that reached it; that fraction is the
//! tree's probability estimate at inference time.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::features::{FeatureVector, NUM_FEATURES};

/// Minimum gini improvement for a split to be accepted.
const MIN_GAIN: f64 = 1e-12;
/// Minimum rows required to attempt a split.
const MIN_SAMPLES_SPLIT: usize = 2;

/// Tree growth parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: usize,
    /// Number of candidate features examined per split.
    pub max_features: usize,
}

/// One node in the flat arena. Child fields index into the arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        /// Fraction of high-risk (class 1) training rows at this leaf.
        prob_high: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted binary classification tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree on the rows selected by `indices` (bootstrap sample).
    ///
    /// All randomness (feature subsampling) comes from `rng`, so a
    /// fixed seed reproduces the identical tree.
    pub fn fit(
        rows: &[FeatureVector],
        labels: &[u8],
        indices: &[usize],
        params: TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        let mut work = indices.to_vec();
        tree.grow(rows, labels, &mut work, 0, params, rng);
        tree
    }

    /// Probability of the high-risk class for one scaled feature vector.
    pub fn predict_proba(&self, row: &FeatureVector) -> f64 {
        let mut at = 0;
        loop {
            match &self.nodes[at] {
                Node::Leaf { prob_high } => return *prob_high,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    at = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Recursively grow the subtree for `indices`, returning its arena index.
    fn grow(
        &mut self,
        rows: &[FeatureVector],
        labels: &[u8],
        indices: &mut [usize],
        depth: usize,
        params: TreeParams,
        rng: &mut StdRng,
    ) -> usize {
        let positives = indices.iter().filter(|&&i| labels[i] == 1).count();
        let prob_high = positives as f64 / indices.len().max(1) as f64;

        let pure = positives == 0 || positives == indices.len();
        if depth >= params.max_depth || indices.len() < MIN_SAMPLES_SPLIT || pure {
            return self.push(Node::Leaf { prob_high });
        }

        let split = match best_split(rows, labels, indices, params.max_features, rng) {
            Some(s) => s,
            None => return self.push(Node::Leaf { prob_high }),
        };

        // Partition indices in place around the chosen threshold
        let mid = partition(rows, indices, split.feature, split.threshold);
        if mid == 0 || mid == indices.len() {
            return self.push(Node::Leaf { prob_high });
        }

        let node = self.push(Node::Leaf { prob_high }); // placeholder
        let (left_idx, right_idx) = indices.split_at_mut(mid);
        let left = self.grow(rows, labels, left_idx, depth + 1, params, rng);
        let right = self.grow(rows, labels, right_idx, depth + 1, params, rng);
        self.nodes[node] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
}

/// Gini impurity of a (positive, total) count pair.
fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    2.0 * p * (1.0 - p)
}

/// Find the best gini split over a random subset of features.
fn best_split(
    rows: &[FeatureVector],
    labels: &[u8],
    indices: &[usize],
    max_features: usize,
    rng: &mut StdRng,
) -> Option<SplitCandidate> {
    let total = indices.len();
    let total_pos = indices.iter().filter(|&&i| labels[i] == 1).count();
    let parent_gini = gini(total_pos, total);

    let mut features: Vec<usize> = (0..NUM_FEATURES).collect();
    features.shuffle(rng);
    features.truncate(max_features.clamp(1, NUM_FEATURES));

    let mut best: Option<(f64, SplitCandidate)> = None;

    for &feature in &features {
        // Sort row indices by this feature's value, then scan prefix counts
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| {
            rows[a][feature]
                .partial_cmp(&rows[b][feature])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left_pos = 0usize;
        for k in 1..total {
            if labels[order[k - 1]] == 1 {
                left_pos += 1;
            }
            let prev = rows[order[k - 1]][feature];
            let next = rows[order[k]][feature];
            if prev == next {
                continue;
            }

            let left_gini = gini(left_pos, k);
            let right_gini = gini(total_pos - left_pos, total - k);
            let weighted = (k as f64 * left_gini + (total - k) as f64 * right_gini) / total as f64;
            let gain = parent_gini - weighted;

            if gain > MIN_GAIN && best.as_ref().map_or(true, |(g, _)| gain > *g) {
                best = Some((
                    gain,
                    SplitCandidate {
                        feature,
                        threshold: (prev + next) / 2.0,
                    },
                ));
            }
        }
    }

    best.map(|(_, s)| s)
}

/// Partition `indices` so rows with `feature <= threshold` come first;
/// returns the boundary position.
fn partition(rows: &[FeatureVector], indices: &mut [usize], feature: usize, threshold: f64) -> usize {
    let mut mid = 0;
    for k in 0..indices.len() {
        if rows[indices[k]][feature] <= threshold {
            indices.swap(mid, k);
            mid += 1;
        }
    }
    mid
}
