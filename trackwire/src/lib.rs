//! Plugin lifecycle and usage event reporting.
//!
//! A [`Client`] is created once per plugin at host startup. It:
//! - reports `plugin_activated` / `plugin_deactivated` whenever the host
//!   broadcasts that its plugin changed state, regardless of consent
//! - forwards custom events from [`Client::track`] only when the user has
//!   opted in
//! - sends a periodic `system_info` snapshot, also consent gated
//!
//! Delivery is a single synchronous POST per event. Failures are reported
//! as `false` and never retried.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use trackwire::{Client, Environment};
//! use trackwire_host::StaticMetadata;
//! use trackwire_store::MemoryStore;
//! use trackwire_transport::RecordingTransport;
//! use trackwire_types::Properties;
//!
//! let env = Environment::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(RecordingTransport::new()),
//!     Arc::new(StaticMetadata::new().with("acme-plugin/acme-plugin.php", "1.0.0")),
//!     "https://example.com",
//! );
//! let client = Client::new("k1", "s1", "Acme", "acme-plugin/acme-plugin.php", &env).unwrap();
//! assert_eq!(client.slug(), "acme-plugin");
//!
//! // No consent yet: dropped without a network call.
//! assert!(!client.track("feed_created", Properties::new()));
//! ```

mod client;
mod config;
mod dispatcher;
mod environment;
mod error;
mod registry;

pub use client::{Client, DEFAULT_REPORT_INTERVAL};
pub use config::{derive_slug, normalize_identity, ClientConfig};
pub use dispatcher::EventDispatcher;
pub use environment::Environment;
pub use error::{ClientError, ClientResult};
pub use registry::ClientRegistry;

use trackwire_types::Properties;

/// Tracks an event through the client registered for `plugin_identity`.
///
/// Returns `false` if no client is registered for it.
pub fn track(
    registry: &ClientRegistry,
    plugin_identity: &str,
    event_name: &str,
    properties: Properties,
) -> bool {
    registry
        .get_instance(plugin_identity)
        .is_some_and(|client| client.track(event_name, properties))
}

/// Records the last core action through the client registered for
/// `plugin_identity`. Returns `false` if no client is registered for it.
pub fn update_last_action(registry: &ClientRegistry, plugin_identity: &str, action: &str) -> bool {
    match registry.get_instance(plugin_identity) {
        Some(client) => {
            client.update_last_core_action(action);
            true
        }
        None => false,
    }
}
