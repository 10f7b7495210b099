//! JSON model artifact loader

use crate::models::conformal::{CalibrationSpec, ConformalCalibration};
use crate::models::estimator::Estimator;
use crate::models::{IntervalRegressor, InferenceError};
use anyhow::{Context, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// On-disk model artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Model name, used in logs
    pub name: String,
    /// Regression target the model predicts
    #[serde(default)]
    pub target: Option<String>,
    /// Encoded feature columns in training order
    pub feature_names: Vec<String>,
    /// Point estimator
    pub estimator: Estimator,
    /// Conformity scores for interval construction
    pub calibration: CalibrationSpec,
}

/// Validated model ready for inference
#[derive(Debug, Clone)]
pub struct LoadedModel {
    /// Model name
    pub name: String,
    feature_names: Vec<String>,
    estimator: Estimator,
    calibration: ConformalCalibration,
}

impl LoadedModel {
    /// Validate an artifact and turn it into a usable model
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        artifact
            .estimator
            .validate(artifact.feature_names.len())
            .with_context(|| format!("Invalid estimator in model '{}'", artifact.name))?;
        let calibration = ConformalCalibration::try_from(artifact.calibration)
            .with_context(|| format!("Invalid calibration in model '{}'", artifact.name))?;

        Ok(Self {
            name: artifact.name,
            feature_names: artifact.feature_names,
            estimator: artifact.estimator,
            calibration,
        })
    }

    pub fn estimator_kind(&self) -> &'static str {
        self.estimator.kind()
    }

    pub fn calibration_samples(&self) -> usize {
        self.calibration.n_samples()
    }
}

impl IntervalRegressor for LoadedModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(
        &self,
        features: ArrayView2<'_, f64>,
        alpha: f64,
    ) -> Result<(Array1<f64>, Array2<f64>), InferenceError> {
        if features.ncols() != self.feature_names.len() {
            return Err(InferenceError::FeatureCount {
                expected: self.feature_names.len(),
                actual: features.ncols(),
            });
        }

        let points = self.estimator.predict(features);
        let q = self.calibration.half_width(alpha);
        let lower = &points - q;
        let upper = &points + q;
        let intervals = ndarray::stack(Axis(1), &[lower.view(), upper.view()]).map_err(|e| {
            InferenceError::OutputShape {
                expected: format!("[{}, 2]", points.len()),
                actual: e.to_string(),
            }
        })?;

        Ok((points, intervals))
    }
}

/// Loader for JSON model artifacts
pub struct ModelLoader;

impl ModelLoader {
    /// Load and validate a model artifact from file
    pub fn load_model<P: AsRef<Path>>(path: P) -> Result<LoadedModel> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading model artifact");

        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read model artifact {}", path.display()))?;
        let artifact: ModelArtifact = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse model artifact {}", path.display()))?;
        let model = LoadedModel::from_artifact(artifact)?;

        info!(
            model = %model.name,
            estimator = model.estimator_kind(),
            features = model.feature_names.len(),
            calibration_samples = model.calibration_samples(),
            "Model loaded successfully"
        );

        Ok(model)
    }
}
