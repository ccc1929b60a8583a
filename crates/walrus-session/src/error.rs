//! Error types for the client session.

/// Errors from the relay client, exports and reordering.
///
/// Relay errors never reach the user directly: the session converts them
/// into a soft-failure activity card.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("HTTP error. Status: {0}")]
    Status(u16),
    #[error("relay request failed: {0}")]
    Relay(String),
    #[error("invalid relay response: {0}")]
    InvalidResponse(String),
    #[error("no activities to export")]
    NoActivities,
    #[error("cannot move activity {from} to {to}: only {len} activities")]
    Reorder { from: usize, to: usize, len: usize },
    #[error("clipboard error: {0}")]
    Clipboard(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
