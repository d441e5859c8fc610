//! Persistent key-value settings for trackwire.
//!
//! Plugins keep a handful of named slots (activation time, last action,
//! consent flag) plus one process-wide site profile id. Anything that can
//! get/set/delete JSON values by string key can back them.
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local, for tests and dry runs
//! - [`SqliteStore`]: an `options` table on disk, survives restarts
//!
//! [`PluginState`] layers the slug-namespaced slot names on top of any
//! backend.

mod error;
mod memory;
mod sqlite;
mod state;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use state::{
    ensure_site_profile_id, site_profile_id, OptIn, PluginState, SITE_PROFILE_ID_KEY,
};

use serde_json::Value;

/// A persistent, process-wide map of named slots.
pub trait KeyValueStore: Send + Sync {
    /// Reads a slot. Returns `None` if it was never set or was deleted.
    fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Writes a slot. `autoload` marks values the host preloads on startup.
    fn set(&self, key: &str, value: Value, autoload: bool) -> StoreResult<()>;

    /// Removes a slot. Deleting an absent slot is not an error.
    fn delete(&self, key: &str) -> StoreResult<()>;

    /// Reads a slot, falling back to `default` when it is absent.
    fn get_or(&self, key: &str, default: Value) -> StoreResult<Value> {
        Ok(self.get(key)?.unwrap_or(default))
    }
}
