use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::report::store::StoreError;

/// The `error` object of every failed response, whether it comes from `AppError` or an
/// `UploadOutcome`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// Application-level error type for request-shape and storage failures.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Report generation failures never reach this type: the upload pipeline folds them
/// into an `UploadOutcome`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Report store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Multipart(e) => {
                tracing::warn!("Multipart error: {e}");
                (
                    StatusCode::BAD_REQUEST,
                    "MALFORMED_UPLOAD",
                    "The upload could not be read. Please try again.".to_string(),
                )
            }
            AppError::Store(e) => {
                tracing::error!("Report store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
        };

        let error = ErrorBody { code, message };
        let body = Json(json!({
            "ok": false,
            "error": error
        }));

        (status, body).into_response()
    }
}
