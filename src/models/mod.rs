//! Model artifact loading and interval inference

pub mod conformal;
pub mod estimator;
pub mod inference;
pub mod loader;

use crate::feature_encoder::EncodeError;
use ndarray::{Array1, Array2, ArrayView2};
use thiserror::Error;

pub use inference::InferenceEngine;
pub use loader::{LoadedModel, ModelLoader};

/// Smallest accepted miscoverage rate (99% interval)
pub const MIN_ALPHA: f64 = 0.01;
/// Largest accepted miscoverage rate (50% interval)
pub const MAX_ALPHA: f64 = 0.5;

/// Errors raised while producing predictions
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("alpha must be within [{}, {}], got {alpha}", MIN_ALPHA, MAX_ALPHA)]
    InvalidAlpha { alpha: f64 },

    #[error("model expects {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("model output has shape {actual}, expected {expected}")]
    OutputShape { expected: String, actual: String },

    #[error("model feature schema differs from reference schema: {detail}")]
    SchemaMismatch { detail: String },
}

/// Opaque predictor contract: `predict(X, alpha) -> (points, [lower, upper])`.
///
/// `intervals` has one row per input row and two columns, lower then upper.
pub trait IntervalRegressor: Send + Sync {
    /// Encoded feature names the model was trained on, in column order
    fn feature_names(&self) -> &[String];

    fn predict(
        &self,
        features: ArrayView2<'_, f64>,
        alpha: f64,
    ) -> Result<(Array1<f64>, Array2<f64>), InferenceError>;
}
