//! Event delivery for trackwire.
//!
//! A [`Transport`] posts one event to the analytics endpoint and reports
//! success as a plain boolean. Every failure (non-2xx status, connection
//! error, timeout) collapses to `false`; nothing is retried or queued.

mod error;
mod http;
mod recording;

pub use error::{TransportError, TransportResult};
pub use http::{HttpTransport, HttpTransportConfig, API_KEY_HEADER, API_SECRET_HEADER, DEFAULT_ENDPOINT};
pub use recording::{RecordingTransport, SentEvent};

use trackwire_types::Event;

/// API credentials attached to every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }
}

/// Keeps the first four characters of keys long enough to stay unguessable.
fn masked(key: &str) -> String {
    if key.chars().count() <= 8 {
        return "<redacted>".to_string();
    }
    let prefix: String = key.chars().take(4).collect();
    format!("{prefix}...")
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &masked(&self.api_key))
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Synchronous, fire-once event delivery.
pub trait Transport: Send + Sync {
    /// Sends one event. Returns `true` only if the endpoint accepted it.
    fn send(&self, credentials: &Credentials, event: &Event) -> bool;
}
