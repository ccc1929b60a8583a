//! Route handler functions for the relay endpoints.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::error::{ApiError, MISSING_PROMPT, POST_REQUIRED};
use crate::state::AppState;
use crate::upstream::{ChatUpstream, Envelope};

/// Plain-text body of the liveness check.
pub const LIVENESS: &str = "Backend is running!";

// =============================================================================
// Handler functions
// =============================================================================

/// GET / - liveness check.
pub async fn health() -> &'static str {
    LIVENESS
}

/// POST /api/chat - forward a prompt and return the provider envelope.
///
/// The body is read raw so that a missing content type or malformed JSON
/// yields the same 400 as a missing prompt.
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Json<Envelope>, ApiError> {
    let prompt = extract_prompt(&body)?;
    let envelope = relay_chat(state.upstream.as_ref(), &prompt).await?;
    Ok(Json(envelope))
}

/// GET /api/chat - misdirected method guard.
pub async fn chat_get() -> ApiError {
    ApiError::BadRequest(POST_REQUIRED.to_string())
}

// =============================================================================
// Relay operation
// =============================================================================

/// Pull a non-empty string `prompt` out of a JSON request body.
pub fn extract_prompt(body: &[u8]) -> Result<String, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Request body is not JSON");
        ApiError::BadRequest(MISSING_PROMPT.to_string())
    })?;

    match value.get("prompt").and_then(Value::as_str) {
        Some(prompt) if !prompt.is_empty() => Ok(prompt.to_string()),
        _ => Err(ApiError::BadRequest(MISSING_PROMPT.to_string())),
    }
}

/// Forward `prompt` upstream and hand back the envelope unmodified.
///
/// Upstream failures are logged here with their cause and surface to the
/// caller only as the generic 500 envelope.
pub async fn relay_chat(upstream: &dyn ChatUpstream, prompt: &str) -> Result<Envelope, ApiError> {
    tracing::info!(prompt_len = prompt.len(), "Relaying chat prompt");

    match upstream.complete(prompt).await {
        Ok(envelope) => {
            tracing::debug!("Upstream response received");
            Ok(envelope)
        }
        Err(e) => {
            tracing::error!(error = %e, "Error fetching OpenAI response");
            Err(e.into())
        }
    }
}
