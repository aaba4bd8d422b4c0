//! Robust statistics primitives: median, MAD, robust z-score and IQR fences.
//!
//! All functions take the finite, non-missing values of a series. Missing
//! cells are filtered out by [`crate::table::NumericSeries::present`] before
//! they reach this module.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_IQR_FACTOR;
use crate::error::{DetectionError, DetectionResult};

/// Scales MAD so the robust z-score is comparable to a standard z-score
/// under normality (Iglewicz and Hoaglin).
pub const MAD_Z_SCALE: f64 = 0.6745;

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Median of a series. Mean of the two middle values when the length is even.
pub fn median(values: &[f64]) -> DetectionResult<f64> {
    if values.is_empty() {
        return Err(DetectionError::EmptyInput(
            "median of an empty series".to_string(),
        ));
    }
    Ok(median_of_sorted(&sorted_copy(values)))
}

/// Median absolute deviation around `center`.
pub fn mad(values: &[f64], center: f64) -> DetectionResult<f64> {
    if values.is_empty() {
        return Err(DetectionError::EmptyInput(
            "MAD of an empty series".to_string(),
        ));
    }
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median(&deviations)
}

/// Robust z-score `0.6745 * (x - median) / mad`.
///
/// Zero when `mad` is zero: without dispersion there is no basis to flag.
pub fn robust_z(x: f64, median: f64, mad: f64) -> f64 {
    if mad <= 0.0 || !mad.is_finite() {
        return 0.0;
    }
    MAD_Z_SCALE * (x - median) / mad
}

/// Percentile of pre-sorted values by linear interpolation between closest ranks.
///
/// `q` is a fraction in `[0, 1]`; `sorted` must be non-empty.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let idx = pos.floor() as usize;
    let frac = pos - idx as f64;
    let lo = sorted[idx];
    let hi = sorted[(idx + 1).min(sorted.len() - 1)];
    lo + (hi - lo) * frac
}

/// Percentile of a series by linear interpolation.
pub fn quantile(values: &[f64], q: f64) -> DetectionResult<f64> {
    if values.is_empty() {
        return Err(DetectionError::EmptyInput(
            "quantile of an empty series".to_string(),
        ));
    }
    Ok(quantile_sorted(&sorted_copy(values), q))
}

/// Tukey fences `(q1 - 1.5*iqr, q3 + 1.5*iqr)`.
pub fn iqr_fences(values: &[f64]) -> DetectionResult<(f64, f64)> {
    let stats = RobustStats::compute(values, DEFAULT_IQR_FACTOR)?;
    Ok((stats.lower_fence, stats.upper_fence))
}

/// Per-column robust summary, computed once and read for every cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobustStats {
    pub median: f64,
    pub mad: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
}

impl RobustStats {
    /// Compute the summary with fences at `iqr_factor` IQRs beyond the quartiles.
    pub fn compute(values: &[f64], iqr_factor: f64) -> DetectionResult<Self> {
        if values.is_empty() {
            return Err(DetectionError::EmptyInput(
                "robust statistics of an empty series".to_string(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(DetectionError::InvalidInput(
                "series contains non-finite values".to_string(),
            ));
        }

        let sorted = sorted_copy(values);
        let median = median_of_sorted(&sorted);
        let mut deviations: Vec<f64> = sorted.iter().map(|v| (v - median).abs()).collect();
        deviations.sort_by(|a, b| a.total_cmp(b));
        let mad = median_of_sorted(&deviations);

        let q1 = quantile_sorted(&sorted, 0.25);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;

        Ok(Self {
            median,
            mad,
            q1,
            q3,
            iqr,
            lower_fence: q1 - iqr_factor * iqr,
            upper_fence: q3 + iqr_factor * iqr,
        })
    }

    /// Robust z-score of `x` against this column.
    pub fn robust_z(&self, x: f64) -> f64 {
        robust_z(x, self.median, self.mad)
    }

    /// Whether `x` lies strictly outside the fences.
    pub fn is_iqr_outlier(&self, x: f64) -> bool {
        x < self.lower_fence || x > self.upper_fence
    }

    /// Whether z-scores carry information for this column.
    pub fn has_dispersion(&self) -> bool {
        self.mad > 0.0
    }
}
