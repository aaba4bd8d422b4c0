//! Severity banding and confidence scaling shared by both detectors.
//!
//! Every curve here is a pure function of its arguments, never negative, and
//! saturates at 1.0.

use crate::config::{ImageConfig, TabularConfig};
use crate::findings::Severity;

/// Weight of each additional flagged column: each one removes this share of
/// the remaining doubt.
const COLUMN_DOUBT_FACTOR: f64 = 0.8;

/// Confidence floor for an image finding sitting exactly on its threshold.
const THRESHOLD_CONFIDENCE: f64 = 0.5;

/// Band a row by its worst robust z-score.
///
/// High above `high_z_threshold`, Medium above `z_threshold`, otherwise Low
/// (the row was flagged by IQR fences alone).
pub fn tabular_severity(worst_abs_z: f64, config: &TabularConfig) -> Severity {
    if worst_abs_z > config.high_z_threshold {
        Severity::High
    } else if worst_abs_z > config.z_threshold {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Row confidence, increasing in both the worst |z| and the number of
/// flagged columns.
///
/// `1 - exp(-worst/z_threshold) * 0.8^columns`
pub fn tabular_confidence(worst_abs_z: f64, flagged_columns: usize, config: &TabularConfig) -> f64 {
    if worst_abs_z == f64::INFINITY {
        return 1.0;
    }
    let z = if worst_abs_z.is_nan() { 0.0 } else { worst_abs_z.max(0.0) };
    let z_doubt = (-z / config.z_threshold).exp();
    let column_doubt = COLUMN_DOUBT_FACTOR.powi(flagged_columns.min(i32::MAX as usize) as i32);
    (1.0 - z_doubt * column_doubt).clamp(0.0, 1.0)
}

/// Band a manipulation finding by its ELA score.
pub fn manipulation_severity(ela_score: f64, config: &ImageConfig) -> Severity {
    if ela_score > config.ela_high_threshold {
        Severity::High
    } else {
        Severity::Medium
    }
}

/// Confidence for a signal above `threshold`: 0.5 at the threshold, rising
/// linearly to 1.0 at `saturation`.
pub fn exceedance_confidence(value: f64, threshold: f64, saturation: f64) -> f64 {
    if value <= threshold {
        return 0.0;
    }
    let span = saturation - threshold;
    if span <= 0.0 || !span.is_finite() {
        return 1.0;
    }
    (THRESHOLD_CONFIDENCE + (1.0 - THRESHOLD_CONFIDENCE) * (value - threshold) / span)
        .clamp(0.0, 1.0)
}

/// How far below `threshold` a signal sits, as a fraction of the threshold.
pub fn shortfall_fraction(value: f64, threshold: f64) -> f64 {
    if threshold <= 0.0 || value >= threshold {
        return 0.0;
    }
    ((threshold - value) / threshold).clamp(0.0, 1.0)
}

/// Confidence for a quality finding from the worse of its two shortfalls.
pub fn shortfall_confidence(worst_shortfall: f64) -> f64 {
    (THRESHOLD_CONFIDENCE + (1.0 - THRESHOLD_CONFIDENCE) * worst_shortfall.clamp(0.0, 1.0))
        .clamp(0.0, 1.0)
}
