//! Application state shared across all route handlers.

use std::sync::Arc;

use walrus_core::config::RelayConfig;
use walrus_core::{Credentials, Result};

use crate::upstream::{ChatUpstream, OpenAiUpstream};

/// Shared application state.
///
/// Holds only the upstream client; the relay keeps no per-request state.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<dyn ChatUpstream>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    /// Create state around any upstream implementation.
    pub fn new(upstream: impl ChatUpstream + 'static) -> Self {
        Self {
            upstream: Arc::new(upstream),
        }
    }

    /// Create state backed by the real OpenAI client.
    pub fn from_config(config: &RelayConfig, credentials: Credentials) -> Result<Self> {
        Ok(Self::new(OpenAiUpstream::new(config, credentials)?))
    }
}
