//! Transport error types.
//!
//! These never cross [`Transport::send`](crate::Transport::send); they are
//! only visible through [`HttpTransport::try_send`](crate::HttpTransport::try_send).

use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint rejected event with status {0}")]
    Status(u16),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl TransportError {
    /// Returns true if the endpoint answered but refused the event.
    pub fn is_rejected(&self) -> bool {
        matches!(self, TransportError::Status(_))
    }

    /// Returns true if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Http(e) if e.is_timeout())
    }
}
