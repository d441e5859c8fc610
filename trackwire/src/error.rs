//! Error types for the reporting client.

use thiserror::Error;
use trackwire_host::HostError;
use trackwire_store::StoreError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client errors.
///
/// Delivery failures and missing consent are not errors; they surface as a
/// `false` return from the sending operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid construction parameters. Fatal.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("host error: {0}")]
    Host(#[from] HostError),
}
