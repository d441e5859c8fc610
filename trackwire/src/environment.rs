//! The collaborators a client is wired to.

use crate::registry::ClientRegistry;
use std::sync::Arc;
use trackwire_host::{HookRegistry, PluginMetadataReader, Scheduler};
use trackwire_store::KeyValueStore;
use trackwire_transport::Transport;
use trackwire_types::{Clock, SystemClock};

/// Everything a [`Client`](crate::Client) needs from its host, passed in
/// explicitly. Cloning shares the same underlying store, hooks, scheduler
/// and registry.
#[derive(Clone)]
pub struct Environment {
    pub store: Arc<dyn KeyValueStore>,
    pub transport: Arc<dyn Transport>,
    pub clock: Arc<dyn Clock>,
    pub metadata: Arc<dyn PluginMetadataReader>,
    pub hooks: HookRegistry,
    pub scheduler: Arc<Scheduler>,
    pub registry: ClientRegistry,
    /// Public URL of the hosting site, reported on activation.
    pub site_url: String,
}

impl Environment {
    /// Wires a fresh hook table, scheduler and registry around the given
    /// store, transport and metadata reader, using the system clock.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
        metadata: Arc<dyn PluginMetadataReader>,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            scheduler: Arc::new(Scheduler::new(Arc::clone(&store))),
            store,
            transport,
            clock: Arc::new(SystemClock),
            metadata,
            hooks: HookRegistry::new(),
            registry: ClientRegistry::new(),
            site_url: site_url.into(),
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
