//! API error types and JSON error response formatting.
//!
//! Every failure leaves the relay as `{"error": "<message>"}`. Upstream
//! causes are kept for logging only; the client always sees the same
//! generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use walrus_core::WalrusError;

/// Returned when the request body carries no usable prompt.
pub const MISSING_PROMPT: &str = "Missing prompt in request body.";
/// Returned for every upstream failure, whatever the cause.
pub const UPSTREAM_FAILURE: &str = "Failed to fetch OpenAI response.";
/// Returned for `GET /api/chat`.
pub const POST_REQUIRED: &str = "Use POST /api/chat with a JSON body containing a prompt.";

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// 500 Internal Server Error - the model provider call failed.
    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Upstream(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                UPSTREAM_FAILURE.to_string(),
            ),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<WalrusError> for ApiError {
    fn from(err: WalrusError) -> Self {
        match err {
            WalrusError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}
