//! Core domain types for risk scoring
//!
//! Shared structures used across the training pipeline, the predictor
//! and the HTTP API:
//! - RiskReading: one set of physiological readings
//! - RiskLevel: clinical risk tier
//! - RiskRequest: wire-level request with per-field defaults
//! - PredictionResult: wire-level verdict

use serde::{Deserialize, Serialize};

// ============================================================================
// Readings
// ============================================================================

/// Default blood sugar (mg/dL) substituted when a request omits the field.
pub const DEFAULT_BLOOD_SUGAR: f64 = 120.0;
/// Default carbohydrate intake (grams).
pub const DEFAULT_CARB_INTAKE: f64 = 60.0;
/// Default activity (minutes).
pub const DEFAULT_ACTIVITY_MINUTES: f64 = 30.0;

/// One set of physiological readings, immutable once constructed.
///
/// Constructed per request (after default resolution) or per synthetic
/// training sample; carries no identity beyond its fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskReading {
    /// Blood sugar (mg/dL)
    pub blood_sugar: f64,
    /// Carbohydrate intake (grams)
    pub carb_intake: f64,
    /// Physical activity (minutes)
    pub activity_minutes: f64,
}

// ============================================================================
// Risk tiers
// ============================================================================

/// Clinical risk tier derived from blood sugar alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Low
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// Incoming prediction request. Every field is optional; absent fields
/// resolve to the documented defaults at the request boundary, before
/// any feature computation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiskRequest {
    /// Latest blood sugar reading (mg/dL), default 120
    pub latest_blood_sugar: Option<f64>,
    /// Carbohydrate intake (grams), default 60
    pub carb_intake: Option<f64>,
    /// Activity (minutes), default 30
    pub activity: Option<f64>,
}

impl RiskRequest {
    /// Resolve missing fields to their defaults, yielding a complete reading.
    pub fn resolve(&self) -> RiskReading {
        RiskReading {
            blood_sugar: self.latest_blood_sugar.unwrap_or(DEFAULT_BLOOD_SUGAR),
            carb_intake: self.carb_intake.unwrap_or(DEFAULT_CARB_INTAKE),
            activity_minutes: self.activity.unwrap_or(DEFAULT_ACTIVITY_MINUTES),
        }
    }
}

/// Outgoing prediction verdict. Produced fresh per request, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub success: bool,
    /// Probability of the high-risk class, in [0, 1]
    pub risk_probability: f64,
    pub risk_level: RiskLevel,
    pub recommendation: String,
    /// Fixed descriptive label of the serving model
    pub model_used: String,
}
