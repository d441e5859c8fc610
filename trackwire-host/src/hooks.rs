//! Action and filter hooks.
//!
//! Lifecycle actions are broadcast: every listener sees every plugin's
//! transition and must filter by identity itself. Filters thread a value
//! through each registered callback in registration order.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Fired after any plugin is activated.
pub const ACTIVATED_PLUGIN: &str = "activated_plugin";

/// Fired after any plugin is deactivated.
pub const DEACTIVATED_PLUGIN: &str = "deactivated_plugin";

/// Receives `(plugin_identity, network_wide)`.
pub type LifecycleListener = Arc<dyn Fn(&str, bool) + Send + Sync>;

/// Maps a value to a (possibly) new value.
pub type FilterFn = Arc<dyn Fn(String) -> String + Send + Sync>;

#[derive(Default)]
struct HookTable {
    /// hook name -> (owner, listener), in registration order
    actions: HashMap<String, Vec<(String, LifecycleListener)>>,
    filters: HashMap<String, Vec<FilterFn>>,
}

/// Shared handle to the host's hook table.
#[derive(Clone, Default)]
pub struct HookRegistry {
    table: Arc<RwLock<HookTable>>,
}

impl HookRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener to a lifecycle hook on behalf of `owner`.
    ///
    /// Returns `false` and leaves the table untouched if `owner` already
    /// listens on `hook`.
    pub fn add_lifecycle_listener(
        &self,
        hook: &str,
        owner: &str,
        listener: LifecycleListener,
    ) -> bool {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let listeners = table.actions.entry(hook.to_string()).or_default();
        if listeners.iter().any(|(o, _)| o == owner) {
            return false;
        }
        listeners.push((owner.to_string(), listener));
        debug!(hook, owner, "Lifecycle listener added");
        true
    }

    /// Returns true if `owner` listens on `hook`.
    pub fn has_listener(&self, hook: &str, owner: &str) -> bool {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table
            .actions
            .get(hook)
            .is_some_and(|l| l.iter().any(|(o, _)| o == owner))
    }

    /// Number of listeners on a hook.
    pub fn listener_count(&self, hook: &str) -> usize {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.actions.get(hook).map_or(0, Vec::len)
    }

    /// Drops every listener `owner` registered, on every hook.
    pub fn remove_owner(&self, owner: &str) {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        for listeners in table.actions.values_mut() {
            listeners.retain(|(o, _)| o != owner);
        }
    }

    /// Invokes every listener on `hook`. Returns how many ran.
    ///
    /// Listeners run outside the table lock and may register further hooks.
    pub fn fire_lifecycle(&self, hook: &str, identity: &str, network_wide: bool) -> usize {
        let listeners: Vec<LifecycleListener> = {
            let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
            table
                .actions
                .get(hook)
                .map(|l| l.iter().map(|(_, f)| Arc::clone(f)).collect())
                .unwrap_or_default()
        };

        debug!(hook, identity, network_wide, listeners = listeners.len(), "Firing lifecycle hook");
        for listener in &listeners {
            listener(identity, network_wide);
        }
        listeners.len()
    }

    /// Broadcasts that `identity` was activated.
    pub fn plugin_activated(&self, identity: &str, network_wide: bool) -> usize {
        self.fire_lifecycle(ACTIVATED_PLUGIN, identity, network_wide)
    }

    /// Broadcasts that `identity` was deactivated.
    pub fn plugin_deactivated(&self, identity: &str, network_wide: bool) -> usize {
        self.fire_lifecycle(DEACTIVATED_PLUGIN, identity, network_wide)
    }

    /// Appends a filter to `name`.
    pub fn add_filter(&self, name: &str, filter: FilterFn) {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        table.filters.entry(name.to_string()).or_default().push(filter);
    }

    /// Threads `value` through every filter on `name`.
    pub fn apply_filters(&self, name: &str, value: impl Into<String>) -> String {
        let filters: Vec<FilterFn> = {
            let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
            table.filters.get(name).cloned().unwrap_or_default()
        };
        filters.iter().fold(value.into(), |acc, f| f(acc))
    }
}
