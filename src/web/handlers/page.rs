//! Page handlers: landing page, form submission and file upload

use crate::types::record::{FeatureValue, RawRecord};
use crate::upload::parse_records;
use crate::web::error::{AppError, AppResult};
use crate::web::render::{render_page, Outcome, PageView};
use crate::web::AppState;
use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::Html,
    Form,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

type PageResponse = (StatusCode, Html<String>);

/// Landing page. Query parameters (`alpha` and any form field) override the
/// defaults, so moving the slider re-renders with a fresh prediction.
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> PageResponse {
    let defaults = state.engine.schema().default_record();
    form_response(&state, defaults, &params)
}

/// Manual form submission (exactly one row)
pub async fn predict_form(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<HashMap<String, String>>,
) -> PageResponse {
    form_response(&state, RawRecord::new(), &fields)
}

/// CSV upload (N rows). An empty or absent file falls back to the form path.
pub async fn upload(State(state): State<Arc<AppState>>, multipart: Multipart) -> PageResponse {
    let defaults = state.engine.schema().default_record();
    let default_alpha = state.config.prediction.default_alpha;

    let (alpha, records) = match read_upload(&state, multipart).await {
        Ok(parsed) => parsed,
        Err(e) => return respond(&state, default_alpha, &defaults, Err(e)),
    };

    if records.is_empty() {
        debug!("No upload rows, using form values");
        let outcome = predict_single(&state, &defaults, alpha);
        return respond(&state, alpha, &defaults, outcome);
    }

    let outcome = state
        .engine
        .predict(&records, alpha)
        .map(|table| {
            info!(
                request_id = %table.request_id,
                rows = table.len(),
                alpha = alpha,
                "Upload predictions served"
            );
            Outcome::Batch(table)
        })
        .map_err(AppError::from);
    respond(&state, alpha, &defaults, outcome)
}

fn form_response(state: &AppState, mut record: RawRecord, fields: &HashMap<String, String>) -> PageResponse {
    let mut alpha = state.config.prediction.default_alpha;

    for (name, raw) in fields {
        if name == "alpha" {
            match parse_alpha(raw) {
                Ok(a) => alpha = a,
                Err(e) => return respond(state, alpha, &record, Err(e)),
            }
        } else {
            record.insert(name, FeatureValue::from_field(raw, &state.config.data.na_values));
        }
    }

    let outcome = predict_single(state, &record, alpha);
    respond(state, alpha, &record, outcome)
}

fn parse_alpha(raw: &str) -> AppResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| AppError::BadRequest(format!("alpha '{}' is not a number", raw)))
}

async fn read_upload(state: &AppState, mut multipart: Multipart) -> AppResult<(f64, Vec<RawRecord>)> {
    let mut alpha = state.config.prediction.default_alpha;
    let mut records = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "alpha" => alpha = parse_alpha(&field.text().await?)?,
            "file" => {
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    records = parse_records(&bytes[..], &state.config.data.na_values)?;
                }
            }
            other => debug!(field = %other, "Ignoring unknown multipart field"),
        }
    }

    Ok((alpha, records))
}

/// Form path: bounds are checked here, at the input-collection boundary
fn predict_single(state: &AppState, record: &RawRecord, alpha: f64) -> AppResult<Outcome> {
    state.engine.schema().check_bounds(record)?;
    let table = state.engine.predict(std::slice::from_ref(record), alpha)?;
    info!(
        request_id = %table.request_id,
        alpha = alpha,
        prediction = table.rows.first().map(|r| r.prediction),
        "Form prediction served"
    );
    Ok(Outcome::Single(table))
}

fn respond(
    state: &AppState,
    alpha: f64,
    form_values: &RawRecord,
    outcome: AppResult<Outcome>,
) -> PageResponse {
    let (status, outcome) = match outcome {
        Ok(outcome) => (StatusCode::OK, outcome),
        Err(e) => {
            warn!(error = %e, "Request failed");
            (e.status(), Outcome::Error(e.user_message()))
        }
    };

    let html = render_page(&PageView {
        schema: state.engine.schema(),
        sample: &state.sample,
        assets: &state.config.assets,
        alpha,
        form_values,
        outcome: &outcome,
    });
    (status, Html(html))
}
