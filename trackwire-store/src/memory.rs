//! In-memory store.
//!
//! Every write is a single map operation, so a poisoned lock still guards a
//! consistent map and is recovered rather than reported.

use crate::error::StoreResult;
use crate::KeyValueStore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone)]
struct Slot {
    value: Value,
    autoload: bool,
}

/// A [`KeyValueStore`] that lives and dies with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, Slot>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the slot exists.
    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Returns the number of stored slots.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the autoload flag of a slot, if present.
    pub fn autoload(&self, key: &str) -> Option<bool> {
        self.read().get(key).map(|s| s.autoload)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Slot>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Slot>> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.read().get(key).map(|s| s.value.clone()))
    }

    fn set(&self, key: &str, value: Value, autoload: bool) -> StoreResult<()> {
        self.write().insert(key.to_string(), Slot { value, autoload });
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.write().remove(key);
        Ok(())
    }
}
