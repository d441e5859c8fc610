//! Shared test fixtures.

#![allow(dead_code)]

use std::sync::Arc;
use trackwire::{Client, Environment};
use trackwire_host::StaticMetadata;
use trackwire_store::MemoryStore;
use trackwire_transport::RecordingTransport;
use trackwire_types::ManualClock;

pub const IDENTITY: &str = "acme-plugin/acme-plugin.php";
pub const SLUG: &str = "acme-plugin";
pub const VERSION: &str = "1.4.0";
pub const SITE_URL: &str = "https://example.com";

/// 2023-11-14T22:13:20Z
pub const T0: i64 = 1_700_000_000;

pub struct Fixture {
    pub env: Environment,
    pub store: Arc<MemoryStore>,
    pub transport: Arc<RecordingTransport>,
    pub clock: Arc<ManualClock>,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(RecordingTransport::new());
        let clock = Arc::new(ManualClock::at_unix(T0));
        let metadata = StaticMetadata::new()
            .with(IDENTITY, VERSION)
            .with("other-plugin/other-plugin.php", "2.0.0");

        let env = Environment::new(
            store.clone(),
            transport.clone(),
            Arc::new(metadata),
            SITE_URL,
        )
        .with_clock(clock.clone());

        Self {
            env,
            store,
            transport,
            clock,
        }
    }

    pub fn client(&self) -> Arc<Client> {
        Client::new("k1", "s1", "Acme", IDENTITY, &self.env).unwrap()
    }

    pub fn opted_in_client(&self) -> Arc<Client> {
        let client = self.client();
        client.set_tracking_allowed(true).unwrap();
        client
    }
}
