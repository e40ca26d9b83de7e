use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::validation::ValidationErrorResponse;

/// Helper to create a JSON error response with a standard `{ "error": message }` body.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, Json(body)).into_response()
}

/// Error returned by request handlers.
///
/// Client errors carry a single `error` string. `Internal` keeps the
/// operation-level description (`error`) apart from the underlying cause
/// (`message`), and both are sent to the caller.
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Validation(ValidationErrorResponse),
    Internal { error: String, message: String },
}

impl ApiError {
    /// Build an `Internal` error from a description and the failure that caused it.
    pub fn internal(error: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        ApiError::Internal {
            error: error.into(),
            message: cause.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(resp) => {
                let body = serde_json::json!({
                    "error": resp.message,
                    "details": resp.errors,
                });
                (status, Json(body)).into_response()
            }
            ApiError::Internal { error, message } => {
                tracing::error!(%error, %message, "request failed");
                let body = serde_json::json!({ "error": error, "message": message });
                (status, Json(body)).into_response()
            }
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => error_response(status, msg),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            ApiError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            ApiError::Validation(resp) => {
                write!(f, "Validation Error: {} ({} errors)", resp.message, resp.errors.len())
            }
            ApiError::Internal { error, message } => write!(f, "Internal Error: {error}: {message}"),
        }
    }
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

impl std::error::Error for ApiError {}
