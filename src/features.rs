//! Feature engineering: raw reading -> fixed 7-dimensional vector.
//!
//! This is the single shared implementation used by both the training
//! pipeline and the serving path. Train/serve skew in feature
//! construction silently corrupts every prediction, so neither side
//! may carry its own copy.

use crate::types::RiskReading;

/// Number of engineered features.
pub const NUM_FEATURES: usize = 7;

/// Feature names (matches construction order in [`engineer_features`]).
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "blood_sugar",
    "carb_intake",
    "activity_minutes",
    "bs_carb_interaction",
    "carb_per_activity",
    "bs_squared",
    "activity_inverse",
];

/// Fixed-length engineered feature vector.
pub type FeatureVector = [f64; NUM_FEATURES];

/// Build the feature vector for one reading.
///
/// Order is fixed and load-bearing: the scaler's per-feature statistics
/// and the forest's split indices are keyed by position. The `+1`
/// offsets guard division by zero when activity is 0 and must stay
/// identical on the training and serving paths.
pub fn engineer_features(reading: &RiskReading) -> FeatureVector {
    let bs = reading.blood_sugar;
    let carb = reading.carb_intake;
    let activity = reading.activity_minutes;

    [
        bs,
        carb,
        activity,
        bs * carb,
        carb / (activity + 1.0),
        bs * bs,
        1.0 / (activity + 1.0),
    ]
}
