//! Configuration management for the traffic volume predictor

use crate::types::record::DEFAULT_NA_VALUES;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

/// Reference and sample dataset configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Historical observations used to derive the feature schema
    pub reference_path: String,
    /// Example upload file shown to users
    pub sample_path: String,
    /// Column holding the regression target
    #[serde(default = "default_target_column")]
    pub target_column: String,
    /// Timestamp column decomposed into month, weekday and hour
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: Option<String>,
    /// Field values treated as missing
    #[serde(default = "default_na_values")]
    pub na_values: Vec<String>,
}

fn default_target_column() -> String {
    "traffic_volume".to_string()
}

fn default_timestamp_column() -> Option<String> {
    Some("date_time".to_string())
}

fn default_na_values() -> Vec<String> {
    DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect()
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path to the JSON model artifact
    pub artifact_path: String,
}

/// Prediction defaults
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    /// Alpha preselected on the slider
    #[serde(default = "default_alpha")]
    pub default_alpha: f64,
    /// Number of sample-file rows previewed next to the upload control
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,
}

fn default_alpha() -> f64 {
    0.1
}

fn default_sample_rows() -> usize {
    5
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            default_alpha: default_alpha(),
            sample_rows: default_sample_rows(),
        }
    }
}

/// Static display assets (images are served verbatim from `dir`)
#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
    pub dir: String,
    pub banner: String,
    pub sidebar: String,
    pub feature_importance: String,
    pub residuals: String,
    pub predicted_vs_actual: String,
    pub coverage: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: "assets".to_string(),
            banner: "traffic_image.gif".to_string(),
            sidebar: "traffic_sidebar.jpg".to_string(),
            feature_importance: "feature_imp.svg".to_string(),
            residuals: "residual_plot.svg".to_string(),
            predicted_vs_actual: "pred_vs_actual.svg".to_string(),
            coverage: "coverage.svg".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Configuration file read when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

impl AppConfig {
    /// Load configuration from a specific path.
    ///
    /// `TRAFFIC__<SECTION>__<KEY>` environment variables override file values.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("TRAFFIC").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Socket address string for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8501,
                max_upload_bytes: default_max_upload_bytes(),
            },
            data: DataConfig {
                reference_path: "data/Traffic_Volume.csv".to_string(),
                sample_path: "data/traffic_data_user.csv".to_string(),
                target_column: default_target_column(),
                timestamp_column: default_timestamp_column(),
                na_values: default_na_values(),
            },
            model: ModelConfig {
                artifact_path: "models/traffic_model.json".to_string(),
            },
            prediction: PredictionConfig::default(),
            assets: AssetsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
