//! Event envelope construction and delivery.
//!
//! The dispatcher is the only component that talks to the network. It adds
//! the standard enrichment to every event and hands it to the transport.
//! It applies no consent policy of its own: [`EventDispatcher::dispatch`]
//! is for callers that have already checked consent, and
//! [`EventDispatcher::dispatch_lifecycle_event`] for lifecycle events that
//! are sent regardless.

use crate::config::ClientConfig;
use std::sync::Arc;
use tracing::{debug, warn};
use trackwire_store::{ensure_site_profile_id, KeyValueStore};
use trackwire_transport::{Credentials, Transport};
use trackwire_types::{format_iso8601, keys, Clock, Event, Properties};

pub struct EventDispatcher {
    credentials: Credentials,
    plugin_name: String,
    plugin_version: String,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    store: Arc<dyn KeyValueStore>,
}

impl EventDispatcher {
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            credentials: config.credentials().clone(),
            plugin_name: config.plugin_name().to_string(),
            plugin_version: config.plugin_version().to_string(),
            transport,
            clock,
            store,
        }
    }

    /// Sends a consent-gated event. Callers must have checked consent.
    pub fn dispatch(&self, name: &str, properties: Properties) -> bool {
        self.send(name, properties)
    }

    /// Sends a lifecycle event. No consent check applies.
    pub fn dispatch_lifecycle_event(&self, name: &str, properties: Properties) -> bool {
        self.send(name, properties)
    }

    /// Builds the enriched envelope without sending it.
    ///
    /// Enrichment keys (`plugin_name`, `plugin_version`, `timestamp`,
    /// `site_profile_id`) overwrite caller properties of the same name.
    pub fn build_event(&self, name: &str, properties: Properties) -> Event {
        let mut event = Event::with_properties(name, properties);
        event.insert(keys::PLUGIN_NAME, self.plugin_name.as_str());
        event.insert(keys::PLUGIN_VERSION, self.plugin_version.as_str());
        event.insert(keys::TIMESTAMP, format_iso8601(self.clock.now()));

        match ensure_site_profile_id(self.store.as_ref()) {
            Ok(id) => event.insert(keys::SITE_PROFILE_ID, id),
            Err(e) => warn!(error = %e, "Site profile id unavailable"),
        }
        event
    }

    fn send(&self, name: &str, properties: Properties) -> bool {
        let event = self.build_event(name, properties);
        let delivered = self.transport.send(&self.credentials, &event);
        debug!(event = %name, delivered, "Event dispatched");
        delivered
    }
}
