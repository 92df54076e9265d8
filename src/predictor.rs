//! Risk prediction: scale the engineered features with training-time
//! statistics, then classify with the loaded forest.
//!
//! Every failure mode is contained here. The outcome type records
//! whether the probability came from the model or from the neutral
//! fallback, so tests can tell "model said 0.5" apart from "model
//! failed"; the wire response flattens both to the probability value.

use std::path::Path;
use tracing::warn;

use crate::features::FeatureVector;
use crate::model::{InferenceError, ModelArtifact, ScaleError};

/// Fixed descriptive label reported on every response.
pub const MODEL_LABEL: &str = "Random Forest (bagged, 500 trees)";

/// Neutral probability returned whenever the model cannot be used.
pub const FALLBACK_PROBABILITY: f64 = 0.5;

/// Immutable process-wide model state, constructed once at startup and
/// passed by reference into every request handler. There is no update
/// path; retraining requires a restart.
#[derive(Debug)]
pub struct ModelContext {
    artifact: Option<ModelArtifact>,
}

impl ModelContext {
    pub fn new(artifact: Option<ModelArtifact>) -> Self {
        Self { artifact }
    }

    /// One-time startup load. Missing or corrupt files degrade to the
    /// absent marker (warned once inside [`ModelArtifact::load`]).
    pub fn startup(model_dir: &Path) -> Self {
        Self::new(ModelArtifact::load(model_dir))
    }

    /// Context with no model, for degraded mode and tests.
    pub fn absent() -> Self {
        Self::new(None)
    }

    pub fn has_model(&self) -> bool {
        self.artifact.is_some()
    }

    pub fn artifact(&self) -> Option<&ModelArtifact> {
        self.artifact.as_ref()
    }
}

/// Why a prediction fell back to the neutral probability.
#[derive(Debug)]
pub enum FallbackReason {
    /// No artifact was loaded at startup.
    ArtifactUnavailable,
    /// The request's features could not be scaled.
    Scaling(ScaleError),
    /// The forest failed to produce a probability.
    Inference(InferenceError),
}

/// Result of one prediction. Always carries a usable probability.
#[derive(Debug)]
pub enum PredictionOutcome {
    /// The model scored the request.
    Scored(f64),
    /// The model could not be used; callers get the neutral value.
    Fallback(FallbackReason),
}

impl PredictionOutcome {
    /// The probability to report, in [0, 1].
    pub fn probability(&self) -> f64 {
        match self {
            PredictionOutcome::Scored(p) => *p,
            PredictionOutcome::Fallback(_) => FALLBACK_PROBABILITY,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, PredictionOutcome::Fallback(_))
    }
}

/// Score one engineered feature vector against the loaded model.
///
/// Guarantee: always returns a concrete probability in [0, 1]; no
/// model-related failure escapes this function. The artifact-absent
/// case is not re-warned here (it was warned once at startup);
/// per-request scaling and inference failures are.
pub fn predict_risk(context: &ModelContext, features: &FeatureVector) -> PredictionOutcome {
    let artifact = match context.artifact() {
        Some(a) => a,
        None => return PredictionOutcome::Fallback(FallbackReason::ArtifactUnavailable),
    };

    let scaled = match artifact.scaler.transform(features) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "Feature scaling failed - returning fallback probability");
            return PredictionOutcome::Fallback(FallbackReason::Scaling(e));
        }
    };

    match artifact.forest.predict_proba(&scaled) {
        Ok(p) => PredictionOutcome::Scored(p),
        Err(e) => {
            warn!(error = %e, "Inference failed - returning fallback probability");
            PredictionOutcome::Fallback(FallbackReason::Inference(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{engineer_features, NUM_FEATURES};
    use crate::model::{ForestParams, RandomForest, StandardScaler};
    use crate::types::RiskReading;

    fn fitted_context() -> ModelContext {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..100 {
            let reading = RiskReading {
                blood_sugar: 80.0 + i as f64,
                carb_intake: 60.0,
                activity_minutes: 30.0,
            };
            rows.push(engineer_features(&reading));
            labels.push(u8::from(i >= 50));
        }
        let scaler = StandardScaler::fit(&rows);
        let scaled = scaler.transform_all(&rows).unwrap();
        let forest = RandomForest::fit(
            &scaled,
            &labels,
            ForestParams {
                num_trees: 15,
                max_depth: 6,
                seed: 42,
            },
        );
        ModelContext::new(Some(ModelArtifact::new(forest, scaler, 0.9)))
    }

    #[test]
    fn test_absent_artifact_returns_exact_fallback() {
        let context = ModelContext::absent();
        let features = engineer_features(&RiskReading {
            blood_sugar: 200.0,
            carb_intake: 90.0,
            activity_minutes: 5.0,
        });

        let outcome = predict_risk(&context, &features);
        assert!(outcome.is_fallback());
        assert_eq!(outcome.probability(), 0.5);
        assert!(matches!(
            outcome,
            PredictionOutcome::Fallback(FallbackReason::ArtifactUnavailable)
        ));
    }

    #[test]
    fn test_scored_probability_in_unit_interval() {
        let context = fitted_context();
        let features = engineer_features(&RiskReading {
            blood_sugar: 150.0,
            carb_intake: 80.0,
            activity_minutes: 20.0,
        });

        let outcome = predict_risk(&context, &features);
        assert!(!outcome.is_fallback());
        let p = outcome.probability();
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let context = fitted_context();
        let features = engineer_features(&RiskReading {
            blood_sugar: 123.0,
            carb_intake: 45.0,
            activity_minutes: 10.0,
        });

        let first = predict_risk(&context, &features).probability();
        for _ in 0..10 {
            assert_eq!(predict_risk(&context, &features).probability(), first);
        }
    }

    #[test]
    fn test_non_finite_features_fall_back_to_neutral() {
        let context = fitted_context();
        let mut features = [1.0; NUM_FEATURES];
        features[2] = f64::INFINITY;

        let outcome = predict_risk(&context, &features);
        assert_eq!(outcome.probability(), 0.5);
        assert!(matches!(
            outcome,
            PredictionOutcome::Fallback(FallbackReason::Scaling(_))
        ));
    }
}
