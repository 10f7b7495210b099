//! JSON API handlers

use crate::schema::ReferenceSchema;
use crate::types::prediction::PredictionTable;
use crate::types::record::RawRecord;
use crate::web::error::AppResult;
use crate::web::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Defaults to the configured slider value
    #[serde(default)]
    pub alpha: Option<f64>,
    pub rows: Vec<RawRecord>,
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> AppResult<Json<PredictionTable>> {
    let alpha = request
        .alpha
        .unwrap_or(state.config.prediction.default_alpha);
    let table = state.engine.predict(&request.rows, alpha)?;

    info!(
        request_id = %table.request_id,
        rows = table.len(),
        alpha = alpha,
        "API predictions served"
    );
    Ok(Json(table))
}

pub async fn schema(State(state): State<Arc<AppState>>) -> Json<ReferenceSchema> {
    Json(state.engine.schema().clone())
}
