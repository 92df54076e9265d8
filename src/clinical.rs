//! Clinical risk tiers and advisory text.
//!
//! Standard three-tier rule for adult fasting/random glucose
//! assessment. Blood sugar alone decides the tier; the learned model's
//! probability is reported alongside but never overrides it. The
//! synthetic training label uses a different (linear-combination)
//! notion of risk, so tier and probability may legitimately disagree.

use crate::types::RiskLevel;

/// Lower bound of the Medium tier (mg/dL), inclusive.
pub const MEDIUM_THRESHOLD: f64 = 100.0;
/// Lower bound of the High tier (mg/dL), inclusive.
pub const HIGH_THRESHOLD: f64 = 126.0;

/// Map a blood sugar reading (mg/dL) to its clinical risk tier.
///
/// Boundaries are half-open: `< 100` Low, `[100, 126)` Medium,
/// `>= 126` High. No hysteresis, no rounding tolerance.
pub fn risk_level_for(blood_sugar: f64) -> RiskLevel {
    if blood_sugar < MEDIUM_THRESHOLD {
        RiskLevel::Low
    } else if blood_sugar < HIGH_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// Fixed advisory text per tier. Total over [`RiskLevel`]; not
/// parameterized by reading values.
pub fn recommendation_for(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => {
            "High Risk: Immediately recheck your blood sugar, drink water, and do 15 mins light activity."
        }
        RiskLevel::Medium => {
            "Medium Risk: Monitor closely, manage carb intake, and stay active."
        }
        RiskLevel::Low => {
            "Low Risk: Keep up your current healthy habits and log your next reading as scheduled."
        }
    }
}
