//! Explicit instance registry.
//!
//! Code that needs to reach a plugin's client by identity receives a
//! [`ClientRegistry`] handle rather than consulting global state. Entries
//! are keyed by slug; registering a second client for the same slug
//! replaces the first.

use crate::client::Client;
use crate::config::derive_slug;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};

type ClientTable = HashMap<String, Arc<Client>>;

/// Shared handle to the slug -> client table.
#[derive(Clone, Default)]
pub struct ClientRegistry {
    clients: Arc<RwLock<ClientTable>>,
}

impl ClientRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client under its slug. Returns the client it replaced.
    pub fn register(&self, client: Arc<Client>) -> Option<Arc<Client>> {
        let slug = client.slug().to_string();
        self.clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(slug, client)
    }

    /// Looks up the client for a plugin identity.
    pub fn get_instance(&self, identity: &str) -> Option<Arc<Client>> {
        self.get_by_slug(&derive_slug(identity))
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<Arc<Client>> {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(slug)
            .cloned()
    }

    /// Removes the client for a plugin identity.
    pub fn remove(&self, identity: &str) -> Option<Arc<Client>> {
        self.clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&derive_slug(identity))
    }

    pub fn len(&self) -> usize {
        self.clients.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A handle that does not keep the registry alive.
    pub(crate) fn downgrade(&self) -> WeakClientRegistry {
        WeakClientRegistry {
            clients: Arc::downgrade(&self.clients),
        }
    }
}

/// Non-owning registry handle held by hook listeners, so the registry and
/// the clients it owns are not kept alive by their own callbacks.
#[derive(Clone)]
pub(crate) struct WeakClientRegistry {
    clients: Weak<RwLock<ClientTable>>,
}

impl WeakClientRegistry {
    pub(crate) fn get_by_slug(&self, slug: &str) -> Option<Arc<Client>> {
        let clients = self.clients.upgrade()?;
        let table = clients.read().unwrap_or_else(PoisonError::into_inner);
        table.get(slug).cloned()
    }
}
