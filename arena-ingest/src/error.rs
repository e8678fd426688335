//! Error types for arena-ingest

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Batch could not be decoded (400)
    #[error("Decode error: {0}")]
    Decode(String),

    /// arena-common error
    #[error("Common error: {0}")]
    Common(arena_common::Error),
}

impl From<arena_common::Error> for ApiError {
    fn from(err: arena_common::Error) -> Self {
        match err {
            arena_common::Error::Decode(msg) => ApiError::Decode(msg),
            other => ApiError::Common(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Decode(msg) => (StatusCode::BAD_REQUEST, "DECODE_ERROR", msg),
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
