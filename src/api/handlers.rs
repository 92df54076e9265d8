//! API route handlers
//!
//! Request handling for the risk scoring service:
//! - prediction verdicts from the loaded model
//! - model/service status
//! - liveness check

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::clinical::{recommendation_for, risk_level_for};
use crate::features::{engineer_features, FEATURE_NAMES};
use crate::predictor::{self, ModelContext, MODEL_LABEL};
use crate::types::{PredictionResult, RiskRequest};

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers. The model context is immutable after
/// startup, so handlers share it through a plain `Arc` with no lock.
#[derive(Clone)]
pub struct ApiState {
    pub model: Arc<ModelContext>,
}

impl ApiState {
    pub fn new(model: ModelContext) -> Self {
        Self {
            model: Arc::new(model),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /predict_risk
///
/// Absent fields resolve to their defaults; a body that fails to parse
/// is rejected by the `Json` extractor before this handler runs. A
/// model failure never fails the request: the response still carries
/// `success: true` with the neutral probability.
pub async fn predict_risk(
    State(state): State<ApiState>,
    Json(request): Json<RiskRequest>,
) -> Json<PredictionResult> {
    let reading = request.resolve();
    debug!(
        blood_sugar = reading.blood_sugar,
        carb_intake = reading.carb_intake,
        activity = reading.activity_minutes,
        "Received prediction request"
    );

    let features = engineer_features(&reading);
    let outcome = predictor::predict_risk(&state.model, &features);

    // Clinical tier comes from blood sugar alone, independent of the model
    let risk_level = risk_level_for(reading.blood_sugar);

    Json(PredictionResult {
        success: true,
        risk_probability: outcome.probability(),
        risk_level,
        recommendation: recommendation_for(risk_level).to_string(),
        model_used: MODEL_LABEL.to_string(),
    })
}

/// Model/service status payload.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub model_loaded: bool,
    pub model_used: &'static str,
    pub feature_names: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_trees: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_accuracy: Option<f64>,
}

/// GET /status
pub async fn get_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let artifact = state.model.artifact();
    Json(StatusResponse {
        model_loaded: artifact.is_some(),
        model_used: MODEL_LABEL,
        feature_names: FEATURE_NAMES.to_vec(),
        num_trees: artifact.map(|a| a.forest.num_trees()),
        trained_at: artifact.map(|a| a.metadata.trained_at.clone()),
        test_accuracy: artifact.map(|a| a.metadata.test_accuracy),
    })
}

/// GET /health - liveness only, no model state involved.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
