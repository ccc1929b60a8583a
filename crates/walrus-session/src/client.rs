//! HTTP client for the relay.

use std::time::Duration;

use async_trait::async_trait;
use walrus_core::config::ClientConfig;
use walrus_core::{ChatCompletionResponse, ChatRequest};

use crate::error::SessionError;

/// Source of chat-completion envelopes for a session.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Submit `prompt` and return the provider envelope.
    async fn fetch_chat_response(&self, prompt: &str)
        -> Result<ChatCompletionResponse, SessionError>;
}

/// Talks to `POST {backend_url}/api/chat`.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    /// Create a client from session settings.
    pub fn new(config: &ClientConfig) -> Result<Self, SessionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SessionError::Relay(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

#[async_trait]
impl ChatBackend for RelayClient {
    async fn fetch_chat_response(
        &self,
        prompt: &str,
    ) -> Result<ChatCompletionResponse, SessionError> {
        let body = ChatRequest {
            prompt: prompt.to_string(),
        };

        let response = self
            .client
            .post(self.chat_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| SessionError::Relay(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::Status(status.as_u16()));
        }

        let envelope = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| SessionError::InvalidResponse(e.to_string()))?;
        tracing::debug!(choices = envelope.choices.len(), "Raw relay response received");
        Ok(envelope)
    }
}
