//! Error handling for the HTTP layer

use crate::feature_encoder::EncodeError;
use crate::models::InferenceError;
use crate::upload::UploadError;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Upload(_) | AppError::Encode(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Inference(InferenceError::Encode(_))
            | AppError::Inference(InferenceError::InvalidAlpha { .. }) => StatusCode::BAD_REQUEST,
            AppError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the user; server faults are logged and hidden
    pub fn user_message(&self) -> String {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Prediction failed");
            "Prediction failed: the model could not process this input".to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(format!("Malformed upload: {}", err.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.user_message(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
