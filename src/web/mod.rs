//! HTTP surface: single-page form, upload, JSON API and static plots

pub mod error;
pub mod handlers;
pub mod render;

use crate::config::AppConfig;
use crate::models::InferenceEngine;
use crate::reference::ReferenceTable;
use crate::upload::SamplePreview;
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

pub use error::{AppError, AppResult};

/// Shared, read-only application state built once at startup
pub struct AppState {
    pub config: AppConfig,
    pub engine: InferenceEngine,
    pub sample: SamplePreview,
}

impl AppState {
    pub fn new(config: AppConfig, engine: InferenceEngine, sample: SamplePreview) -> Self {
        Self {
            config,
            engine,
            sample,
        }
    }

    /// Load reference data, model and sample preview from the configured paths
    pub fn build(config: AppConfig) -> Result<Self> {
        let table = ReferenceTable::load(&config.data)?;
        let schema = Arc::new(table.schema(&config.data.target_column)?);
        info!(columns = ?schema.column_names(), "Reference schema derived");

        let engine = InferenceEngine::from_config(&config, schema)?;
        let sample = SamplePreview::load(&config.data.sample_path, config.prediction.sample_rows);

        Ok(Self::new(config, engine, sample))
    }
}

/// Create the router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.config.assets.dir);
    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::page::index))
        .route("/predict", post(handlers::page::predict_form))
        .route("/upload", post(handlers::page::upload))
        .route("/api/v1/predict", post(handlers::api::predict))
        .route("/api/v1/schema", get(handlers::api::schema))
        .route("/health", get(handlers::health::check))
        .nest_service("/assets", assets)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
