//! Prediction pipeline: encode raw rows, run the model, shape the output

use crate::config::AppConfig;
use crate::feature_encoder::FeatureEncoder;
use crate::models::loader::ModelLoader;
use crate::models::{IntervalRegressor, InferenceError, MAX_ALPHA, MIN_ALPHA};
use crate::schema::ReferenceSchema;
use crate::types::prediction::{PredictionRow, PredictionTable};
use crate::types::record::{FeatureValue, RawRecord};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Lower bounds are clamped here; volumes cannot be negative.
///
/// Upper bounds are passed through unchanged.
pub fn clamp_lower(lower: f64) -> f64 {
    lower.max(0.0)
}

/// Reject alphas outside the slider range
pub fn validate_alpha(alpha: f64) -> Result<f64, InferenceError> {
    if (MIN_ALPHA..=MAX_ALPHA).contains(&alpha) {
        Ok(alpha)
    } else {
        Err(InferenceError::InvalidAlpha { alpha })
    }
}

/// Stateless adapter between raw user input and the interval model.
///
/// Holds only read-only data; share it behind an `Arc`.
pub struct InferenceEngine {
    schema: Arc<ReferenceSchema>,
    encoder: FeatureEncoder,
    model: Box<dyn IntervalRegressor>,
}

impl InferenceEngine {
    /// Create an engine, checking that the model was trained on the
    /// encoded columns this schema produces.
    pub fn new(
        schema: Arc<ReferenceSchema>,
        model: Box<dyn IntervalRegressor>,
    ) -> Result<Self, InferenceError> {
        let encoder = FeatureEncoder::new(&schema);
        check_schema_parity(encoder.feature_names(), model.feature_names())?;

        info!(
            raw_columns = schema.len(),
            encoded_columns = encoder.feature_count(),
            "Inference engine initialized"
        );

        Ok(Self {
            schema,
            encoder,
            model,
        })
    }

    /// Load the model artifact named in the configuration
    pub fn from_config(config: &AppConfig, schema: Arc<ReferenceSchema>) -> Result<Self> {
        let model = ModelLoader::load_model(&config.model.artifact_path)?;
        Ok(Self::new(schema, Box::new(model))?)
    }

    pub fn schema(&self) -> &ReferenceSchema {
        &self.schema
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    /// Predict every record; output rows match input rows one to one, in order.
    pub fn predict(&self, records: &[RawRecord], alpha: f64) -> Result<PredictionTable, InferenceError> {
        let alpha = validate_alpha(alpha)?;
        let columns = self.schema.column_names();
        let mut table = PredictionTable::new(alpha, columns);
        if records.is_empty() {
            return Ok(table);
        }

        let features = self.encoder.encode(records)?;
        let (points, intervals) = self.model.predict(features.view(), alpha)?;

        let n = records.len();
        if points.len() != n || intervals.shape() != [n, 2] {
            return Err(InferenceError::OutputShape {
                expected: format!("[{}] and [{}, 2]", n, n),
                actual: format!("[{}] and {:?}", points.len(), intervals.shape()),
            });
        }

        table.rows = records
            .iter()
            .zip(points.iter())
            .zip(intervals.rows())
            .map(|((record, &prediction), bounds)| PredictionRow {
                values: table
                    .columns
                    .iter()
                    .map(|c| record.get(c).cloned().unwrap_or(FeatureValue::Missing))
                    .collect(),
                prediction,
                lower: clamp_lower(bounds[0]),
                upper: bounds[1],
            })
            .collect();

        debug!(
            request_id = %table.request_id,
            rows = n,
            alpha = alpha,
            "Prediction complete"
        );

        Ok(table)
    }
}

fn check_schema_parity(encoded: &[String], trained: &[String]) -> Result<(), InferenceError> {
    if encoded == trained {
        return Ok(());
    }

    let missing: Vec<&str> = trained
        .iter()
        .filter(|name| !encoded.contains(name))
        .map(String::as_str)
        .collect();
    let unexpected: Vec<&str> = encoded
        .iter()
        .filter(|name| !trained.contains(name))
        .map(String::as_str)
        .collect();

    let detail = if missing.is_empty() && unexpected.is_empty() {
        "same columns in a different order".to_string()
    } else {
        format!(
            "model-only columns {:?}, schema-only columns {:?}",
            missing, unexpected
        )
    };
    Err(InferenceError::SchemaMismatch { detail })
}
