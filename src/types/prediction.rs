//! Prediction output structures

use crate::types::record::FeatureValue;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Output column holding the point estimate
pub const PREDICTION_COLUMN: &str = "Traffic Volume Prediction";
/// Output column holding the (clamped) lower interval bound
pub const LOWER_COLUMN: &str = "Lower Limit";
/// Output column holding the upper interval bound
pub const UPPER_COLUMN: &str = "Upper Limit";

/// Nominal coverage of the interval in percent, rounded to two decimals.
pub fn confidence_percent(alpha: f64) -> f64 {
    ((1.0 - alpha) * 100.0 * 100.0).round() / 100.0
}

/// Human readable label, e.g. "90% Confidence Interval" for alpha = 0.10
pub fn confidence_label(alpha: f64) -> String {
    format!("{}% Confidence Interval", confidence_percent(alpha))
}

/// Prediction for a single input row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    /// Raw feature values, aligned with `PredictionTable::columns`
    pub values: Vec<FeatureValue>,
    /// Point estimate
    pub prediction: f64,
    /// Lower interval bound, never negative
    pub lower: f64,
    /// Upper interval bound
    pub upper: f64,
}

/// Predictions for one request, in input order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionTable {
    /// Request identifier used for log correlation
    pub request_id: Uuid,
    /// Miscoverage rate the intervals were computed with
    pub alpha: f64,
    /// Raw feature column names (no encoded columns)
    pub columns: Vec<String>,
    pub rows: Vec<PredictionRow>,
}

impl PredictionTable {
    pub fn new(alpha: f64, columns: Vec<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            alpha,
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn confidence_label(&self) -> String {
        confidence_label(self.alpha)
    }

    /// Display headers: raw feature columns followed by the three result columns
    pub fn headers(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(String::as_str)
            .chain([PREDICTION_COLUMN, LOWER_COLUMN, UPPER_COLUMN])
            .collect()
    }
}
