mod common;

use common::{Fixture, IDENTITY};
use std::sync::Arc;
use trackwire::{track, update_last_action, ClientRegistry};
use trackwire_store::PluginState;
use trackwire_types::Properties;

#[test]
fn get_instance_returns_constructed_client() {
    let fx = Fixture::new();
    let client = fx.client();
    let found = fx.env.registry.get_instance(IDENTITY).unwrap();
    assert!(Arc::ptr_eq(&client, &found));
}

#[test]
fn get_instance_unknown_identity_is_none() {
    let fx = Fixture::new();
    fx.client();
    assert!(fx.env.registry.get_instance("nope/nope.php").is_none());
    assert!(ClientRegistry::new().get_instance(IDENTITY).is_none());
}

#[test]
fn lookup_uses_same_slug_derivation() {
    let fx = Fixture::new();
    let client = fx.client();
    let found = fx.env.registry.get_instance("acme-plugin\\acme-plugin.php").unwrap();
    assert!(Arc::ptr_eq(&client, &found));
    assert!(Arc::ptr_eq(&client, &fx.env.registry.get_by_slug("acme-plugin").unwrap()));
}

#[test]
fn remove_unregisters_and_silences_listeners() {
    let fx = Fixture::new();
    fx.client();
    assert!(fx.env.registry.remove(IDENTITY).is_some());
    assert!(fx.env.registry.is_empty());

    fx.env.hooks.plugin_activated(IDENTITY, false);
    assert!(fx.transport.is_empty());
}

#[test]
fn free_track_forwards_to_registered_client() {
    let fx = Fixture::new();
    fx.opted_in_client();

    assert!(track(&fx.env.registry, IDENTITY, "feed_created", Properties::new()));
    assert!(!track(&fx.env.registry, "nope/nope.php", "feed_created", Properties::new()));
    assert_eq!(fx.transport.len(), 1);
}

#[test]
fn free_update_last_action_forwards() {
    let fx = Fixture::new();
    let client = fx.client();

    assert!(update_last_action(&fx.env.registry, IDENTITY, "feed_created"));
    assert!(!update_last_action(&fx.env.registry, "nope/nope.php", "x"));

    let state = PluginState::new(&*fx.store, client.slug());
    assert_eq!(state.last_core_action().unwrap(), "feed_created");
}

#[test]
fn client_does_not_outlive_environment_through_callbacks() {
    let fx = Fixture::new();
    let client = fx.client();
    let weak = Arc::downgrade(&client);
    drop(client);
    drop(fx);
    assert!(weak.upgrade().is_none());
}
