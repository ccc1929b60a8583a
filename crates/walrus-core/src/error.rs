use thiserror::Error;

/// Top-level error type for Workshop Walrus.
///
/// The first four variants form the failure taxonomy shared by the relay and
/// the client session. Relay code converts them into HTTP responses; the
/// session swallows them into soft-failure activity cards.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WalrusError {
    /// Missing or invalid configuration. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller input malformed or missing.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Transport failure or non-success status from the model provider.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Structured-looking model output that failed to decode.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for WalrusError {
    fn from(err: toml::de::Error) -> Self {
        WalrusError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for WalrusError {
    fn from(err: serde_json::Error) -> Self {
        WalrusError::Serialization(err.to_string())
    }
}

impl WalrusError {
    /// True for an I/O error caused by a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, WalrusError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/// A specialized `Result` type for Walrus operations.
pub type Result<T> = std::result::Result<T, WalrusError>;
