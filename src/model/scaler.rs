//! Per-feature standard scaling (zero mean, unit variance).
//!
//! Statistics are fit once on the training partition and frozen; the
//! serving path only ever calls [`StandardScaler::transform`] with the
//! training-time statistics, never refitting from request data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::{FeatureVector, NUM_FEATURES};

/// Floor applied to per-feature std to avoid division blowup on
/// (near-)constant features.
const STD_FLOOR: f64 = 1e-8;

/// Scaling failure while transforming a single vector.
#[derive(Debug, Error)]
pub enum ScaleError {
    #[error("non-finite value {value} in feature '{feature}'")]
    NonFiniteInput { feature: &'static str, value: f64 },
}

/// Fitted per-feature mean and standard deviation (population std).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: [f64; NUM_FEATURES],
    pub std: [f64; NUM_FEATURES],
    /// Number of training rows the statistics were fit on.
    pub fitted_on: usize,
}

impl StandardScaler {
    /// Fit statistics from a set of feature vectors.
    ///
    /// Callers must pass the training partition only; fitting on test
    /// rows leaks evaluation data into the model.
    pub fn fit(rows: &[FeatureVector]) -> Self {
        let n = rows.len().max(1) as f64;

        let mut mean = [0.0_f64; NUM_FEATURES];
        for row in rows {
            for i in 0..NUM_FEATURES {
                mean[i] += row[i];
            }
        }
        for m in mean.iter_mut() {
            *m /= n;
        }

        let mut std = [0.0_f64; NUM_FEATURES];
        for row in rows {
            for i in 0..NUM_FEATURES {
                let d = row[i] - mean[i];
                std[i] += d * d;
            }
        }
        for s in std.iter_mut() {
            *s = (*s / n).sqrt().max(STD_FLOOR);
        }

        Self {
            mean,
            std,
            fitted_on: rows.len(),
        }
    }

    /// Transform one vector with the frozen statistics: `(x - mean) / std`.
    pub fn transform(&self, raw: &FeatureVector) -> Result<FeatureVector, ScaleError> {
        let mut scaled = [0.0_f64; NUM_FEATURES];
        for i in 0..NUM_FEATURES {
            if !raw[i].is_finite() {
                return Err(ScaleError::NonFiniteInput {
                    feature: crate::features::FEATURE_NAMES[i],
                    value: raw[i],
                });
            }
            scaled[i] = (raw[i] - self.mean[i]) / self.std[i];
        }
        Ok(scaled)
    }

    /// Transform a whole table, failing on the first bad row.
    pub fn transform_all(&self, rows: &[FeatureVector]) -> Result<Vec<FeatureVector>, ScaleError> {
        rows.iter().map(|r| self.transform(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_constant_feature_has_floored_std() {
        let rows = vec![[1.0; NUM_FEATURES]; 50];
        let scaler = StandardScaler::fit(&rows);
        for i in 0..NUM_FEATURES {
            assert!((scaler.mean[i] - 1.0).abs() < 1e-12);
            assert_eq!(scaler.std[i], STD_FLOOR);
        }
    }

    #[test]
    fn test_transform_centers_and_scales() {
        let mut rows = Vec::new();
        for v in [2.0, 4.0, 6.0] {
            rows.push([v; NUM_FEATURES]);
        }
        let scaler = StandardScaler::fit(&rows);

        // mean 4, population std sqrt(8/3)
        let scaled = scaler.transform(&[4.0; NUM_FEATURES]).unwrap();
        for &v in &scaled {
            assert!(v.abs() < 1e-12);
        }
        let scaled = scaler.transform(&[6.0; NUM_FEATURES]).unwrap();
        let expected = 2.0 / (8.0_f64 / 3.0).sqrt();
        for &v in &scaled {
            assert!((v - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_transform_rejects_non_finite() {
        let scaler = StandardScaler::fit(&[[1.0; NUM_FEATURES], [2.0; NUM_FEATURES]]);
        let mut bad = [1.0; NUM_FEATURES];
        bad[3] = f64::NAN;
        let err = scaler.transform(&bad);
        assert!(err.is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let scaler = StandardScaler::fit(&[[1.0; NUM_FEATURES], [3.0; NUM_FEATURES]]);
        let json = serde_json::to_string(&scaler).unwrap();
        let restored: StandardScaler = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, scaler);
    }
}
