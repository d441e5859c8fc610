//! Blocking HTTP transport.

use crate::error::{TransportError, TransportResult};
use crate::{Credentials, Transport};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use trackwire_types::Event;

/// The fixed analytics endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.trackwire.io/v1/events";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Header carrying the API secret.
pub const API_SECRET_HEADER: &str = "X-API-SECRET";

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpTransportConfig {
    /// Full URL events are POSTed to.
    pub endpoint: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
            user_agent: format!("trackwire/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Posts events as JSON over HTTPS, blocking until a response or timeout.
pub struct HttpTransport {
    config: HttpTransportConfig,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Builds the underlying HTTP client.
    ///
    /// Must not be called from inside an async runtime worker thread.
    pub fn new(config: HttpTransportConfig) -> TransportResult<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(TransportError::Config("endpoint must not be empty".into()));
        }
        if config.timeout_secs == 0 {
            return Err(TransportError::Config("timeout_secs must be positive".into()));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, client })
    }

    /// Returns the configured endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Sends an event and reports why it failed, if it did.
    pub fn try_send(&self, credentials: &Credentials, event: &Event) -> TransportResult<()> {
        let resp = self
            .client
            .post(&self.config.endpoint)
            .header(API_KEY_HEADER, &credentials.api_key)
            .header(API_SECRET_HEADER, &credentials.api_secret)
            .json(event)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        Ok(())
    }
}

impl Transport for HttpTransport {
    fn send(&self, credentials: &Credentials, event: &Event) -> bool {
        match self.try_send(credentials, event) {
            Ok(()) => {
                debug!(event = %event.name, "Event delivered");
                true
            }
            Err(e) => {
                warn!(event = %event.name, endpoint = %self.config.endpoint, error = %e, "Event delivery failed");
                false
            }
        }
    }
}
