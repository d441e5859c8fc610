//! Core type definitions for trackwire.
//!
//! This crate defines the plugin-agnostic values shared by every other
//! trackwire crate:
//! - The outgoing event envelope and its scalar property values
//! - The clock abstraction used for activation times and timestamps
//! - The site profile identifier
//!
//! Nothing here performs I/O.

mod clock;
mod event;
mod ids;

pub use clock::{format_iso8601, parse_iso8601, Clock, ManualClock, SystemClock};
pub use event::{keys, names, Event, Properties, PropertyValue};
pub use ids::SiteProfileId;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
