//! Error types for host collaborators.

use thiserror::Error;
use trackwire_store::StoreError;

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("unknown schedule interval: {0}")]
    UnknownInterval(String),

    #[error("invalid schedule interval '{name}': {secs}s")]
    InvalidInterval { name: String, secs: i64 },

    #[error("plugin metadata unavailable for '{identity}': {source}")]
    Metadata {
        identity: String,
        #[source]
        source: std::io::Error,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
