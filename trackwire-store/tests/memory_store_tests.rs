use serde_json::json;
use trackwire_store::{KeyValueStore, MemoryStore};

#[test]
fn get_absent_returns_none() {
    let store = MemoryStore::new();
    assert!(store.get("missing").unwrap().is_none());
}

#[test]
fn set_then_get() {
    let store = MemoryStore::new();
    store.set("k", json!(42), true).unwrap();
    assert_eq!(store.get("k").unwrap(), Some(json!(42)));
    assert_eq!(store.autoload("k"), Some(true));
}

#[test]
fn set_overwrites_value_and_autoload() {
    let store = MemoryStore::new();
    store.set("k", json!("a"), true).unwrap();
    store.set("k", json!("b"), false).unwrap();
    assert_eq!(store.get("k").unwrap(), Some(json!("b")));
    assert_eq!(store.autoload("k"), Some(false));
    assert_eq!(store.len(), 1);
}

#[test]
fn delete_removes_slot() {
    let store = MemoryStore::new();
    store.set("k", json!(1), false).unwrap();
    store.delete("k").unwrap();
    assert!(!store.contains("k"));
    assert!(store.is_empty());
}

#[test]
fn delete_absent_is_ok() {
    let store = MemoryStore::new();
    assert!(store.delete("never-set").is_ok());
}

#[test]
fn get_or_falls_back_to_default() {
    let store = MemoryStore::new();
    assert_eq!(store.get_or("k", json!("no")).unwrap(), json!("no"));
    store.set("k", json!("yes"), true).unwrap();
    assert_eq!(store.get_or("k", json!("no")).unwrap(), json!("yes"));
}
