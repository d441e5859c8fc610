//! End-to-end against the SQLite store: state written by one process
//! lifetime is visible to the next.

use chrono::Duration;
use std::sync::Arc;
use tempfile::TempDir;
use trackwire::{Client, Environment};
use trackwire_host::StaticMetadata;
use trackwire_store::SqliteStore;
use trackwire_transport::RecordingTransport;
use trackwire_types::{keys, ManualClock, PropertyValue};

const IDENTITY: &str = "acme-plugin/acme-plugin.php";

fn boot(db: &std::path::Path, clock: Arc<ManualClock>) -> (Environment, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::new());
    let env = Environment::new(
        Arc::new(SqliteStore::open(db).unwrap()),
        transport.clone(),
        Arc::new(StaticMetadata::new().with(IDENTITY, "1.0.0")),
        "https://example.com",
    )
    .with_clock(clock);
    (env, transport)
}

#[test]
fn activation_survives_restart() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("settings.db");
    let clock = Arc::new(ManualClock::at_unix(1_700_000_000));

    {
        let (env, _) = boot(&db, clock.clone());
        let client = Client::new("k1", "s1", "Acme", IDENTITY, &env).unwrap();
        client.update_last_core_action("feed_created");
        env.hooks.plugin_activated(IDENTITY, false);
    }

    clock.advance(Duration::seconds(86_400));

    let (env, transport) = boot(&db, clock.clone());
    let client = Client::new("k1", "s1", "Acme", IDENTITY, &env).unwrap();
    env.hooks.plugin_deactivated(IDENTITY, false);

    let event = transport.last_event().unwrap();
    assert_eq!(event.get(keys::USAGE_DURATION), Some(&PropertyValue::Integer(86_400)));
    assert_eq!(
        event.get(keys::LAST_CORE_ACTION),
        Some(&PropertyValue::from("feed_created"))
    );
    assert_eq!(client.next_system_info_report().unwrap(), Some(1_700_000_000 + 7 * 86_400));
}

#[test]
fn consent_survives_restart() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("settings.db");
    let clock = Arc::new(ManualClock::at_unix(1_700_000_000));

    {
        let (env, _) = boot(&db, clock.clone());
        Client::new("k1", "s1", "Acme", IDENTITY, &env)
            .unwrap()
            .set_tracking_allowed(true)
            .unwrap();
    }

    let (env, transport) = boot(&db, clock);
    let client = Client::new("k1", "s1", "Acme", IDENTITY, &env).unwrap();
    assert!(client.track("feed_created", Default::default()));
    assert_eq!(transport.len(), 1);
}
