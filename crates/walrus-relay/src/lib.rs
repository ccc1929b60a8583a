//! Walrus relay crate - axum HTTP server forwarding workshop prompts upstream.
//!
//! Accepts `POST /api/chat`, wraps the prompt in a fixed two-message
//! conversation, forwards it to the model provider and returns the
//! provider's envelope unmodified.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod upstream;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
pub use upstream::{ChatUpstream, Envelope, OpenAiUpstream};
