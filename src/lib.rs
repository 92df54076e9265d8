//! GlucoGuard: Diabetes Risk Scoring
//!
//! Scores diabetes-related risk from three physiological readings,
//! returning a probability, a clinical risk tier, and a recommendation.
//!
//! ## Architecture
//!
//! - **Features**: single shared reading-to-vector construction used
//!   identically by training and serving
//! - **Clinical**: deterministic blood-sugar tier thresholds
//! - **Model**: seeded bagged random forest + standard scaler,
//!   persisted as one matched artifact pair
//! - **Predictor**: scale-then-classify with contained fallback
//! - **Training**: reproducible synthetic pipeline producing the artifact

pub mod api;
pub mod clinical;
pub mod features;
pub mod model;
pub mod predictor;
pub mod training;
pub mod types;

// Re-export commonly used types
pub use types::{PredictionResult, RiskLevel, RiskReading, RiskRequest};

// Re-export the shared feature construction
pub use features::{engineer_features, FeatureVector, FEATURE_NAMES, NUM_FEATURES};

// Re-export model components
pub use model::{ModelArtifact, RandomForest, StandardScaler};

// Re-export predictor surface
pub use predictor::{
    predict_risk, FallbackReason, ModelContext, PredictionOutcome, FALLBACK_PROBABILITY,
    MODEL_LABEL,
};

// Re-export training pipeline
pub use training::{TrainingConfig, TrainingReport};
