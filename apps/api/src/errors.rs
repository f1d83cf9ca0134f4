use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::chat::matcher::MatchError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Embedding provider error: {0}")]
    Provider(#[from] MatchError),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

/// The only failure text a client ever sees for server-side errors.
pub const REQUEST_FAILED_MESSAGE: &str = "Error processing your request";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Provider(e) => {
                tracing::error!(stage = %e.stage, "Embedding provider error: {}", e.source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROVIDER_ERROR",
                    REQUEST_FAILED_MESSAGE.to_string(),
                )
            }
            AppError::Timeout(after) => {
                tracing::error!("Chat request timed out after {after:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "TIMEOUT",
                    REQUEST_FAILED_MESSAGE.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
