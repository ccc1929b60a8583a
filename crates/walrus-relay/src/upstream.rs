//! Model provider client.
//!
//! [`ChatUpstream`] is the seam between the HTTP handlers and the provider so
//! router tests can swap in a canned upstream. [`OpenAiUpstream`] is the real
//! chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::value::RawValue;
use walrus_core::config::RelayConfig;
use walrus_core::{ChatCompletionRequest, ChatMessage, Credentials, Result, WalrusError};

/// Provider response body, checked to be JSON but otherwise byte-for-byte
/// what the provider sent.
pub type Envelope = Box<RawValue>;

/// Something that can turn a prompt into a provider response envelope.
#[async_trait]
pub trait ChatUpstream: Send + Sync {
    /// Forward `prompt` and return the provider's JSON envelope untouched.
    async fn complete(&self, prompt: &str) -> Result<Envelope>;
}

/// Chat-completions client for the OpenAI API.
pub struct OpenAiUpstream {
    client: reqwest::Client,
    url: String,
    model: String,
    system_prompt: String,
    credentials: Credentials,
}

impl OpenAiUpstream {
    /// Build a client from relay settings and an explicit credential.
    pub fn new(config: &RelayConfig, credentials: Credentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WalrusError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.upstream_url.clone(),
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            credentials,
        })
    }

    /// The fixed system + user conversation sent for `prompt`.
    pub fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(self.system_prompt.clone()),
                ChatMessage::user(prompt),
            ],
        }
    }
}

#[async_trait]
impl ChatUpstream for OpenAiUpstream {
    async fn complete(&self, prompt: &str) -> Result<Envelope> {
        let request = self.build_request(prompt);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.credentials.api_key())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WalrusError::Upstream("request timed out".to_string())
                } else {
                    WalrusError::Upstream(format!("transport failure: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(WalrusError::Upstream(format!(
                "provider returned {}: {}",
                status, text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| WalrusError::Upstream(format!("failed to read provider body: {}", e)))?;
        RawValue::from_string(body)
            .map_err(|e| WalrusError::Upstream(format!("provider sent invalid JSON: {}", e)))
    }
}
