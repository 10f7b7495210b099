//! Split conformal interval calibration.
//!
//! Conformity scores are absolute calibration residuals `|y - ŷ|`. For a
//! miscoverage rate α the interval half-width is the ⌈(n+1)(1-α)⌉-th
//! smallest score, clamped to the largest score when that rank exceeds n.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CalibrationError {
    #[error("calibration has no conformity scores")]
    Empty,

    #[error("conformity score {index} is not a finite non-negative number")]
    InvalidScore { index: usize },
}

const RANK_TOLERANCE: f64 = 1e-9;

/// Serialized calibration block of the model artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationSpec {
    pub scores: Vec<f64>,
}

/// Sorted conformity scores
#[derive(Debug, Clone)]
pub struct ConformalCalibration {
    sorted: Vec<f64>,
}

impl ConformalCalibration {
    pub fn new(mut scores: Vec<f64>) -> Result<Self, CalibrationError> {
        if scores.is_empty() {
            return Err(CalibrationError::Empty);
        }
        if let Some(index) = scores.iter().position(|s| !s.is_finite() || *s < 0.0) {
            return Err(CalibrationError::InvalidScore { index });
        }
        scores.sort_by(f64::total_cmp);
        Ok(Self { sorted: scores })
    }

    /// Number of calibration samples
    pub fn n_samples(&self) -> usize {
        self.sorted.len()
    }

    /// Interval half-width for miscoverage rate `alpha`
    pub fn half_width(&self, alpha: f64) -> f64 {
        let n = self.sorted.len();
        // Tolerance keeps products like 100 * 0.59 = 59.00000000000001 at rank 59
        let rank = ((n + 1) as f64 * (1.0 - alpha) - RANK_TOLERANCE).ceil() as usize;
        let idx = rank.saturating_sub(1).min(n - 1);
        self.sorted[idx]
    }
}

impl TryFrom<CalibrationSpec> for ConformalCalibration {
    type Error = CalibrationError;

    fn try_from(spec: CalibrationSpec) -> Result<Self, Self::Error> {
        Self::new(spec.scores)
    }
}
