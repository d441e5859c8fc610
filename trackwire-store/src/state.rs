//! Typed access to one plugin's persisted slots.
//!
//! Slot names are namespaced by the plugin slug (`{slug}_activated_time`,
//! `{slug}_last_core_action`, `{slug}_allow_tracking`). The site profile id
//! is shared by every plugin on the site and is not namespaced.

use crate::error::StoreResult;
use crate::KeyValueStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::info;
use trackwire_types::SiteProfileId;

/// Process-wide slot holding the site profile id.
pub const SITE_PROFILE_ID_KEY: &str = "site_profile_id";

/// The user's consent to usage tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptIn {
    Yes,
    #[default]
    No,
}

impl OptIn {
    /// Returns the stored representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    /// Interprets a stored slot. Only the exact string `"yes"` grants consent.
    #[must_use]
    pub fn from_slot(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) if s == "yes" => Self::Yes,
            _ => Self::No,
        }
    }

    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl From<bool> for OptIn {
    fn from(allowed: bool) -> Self {
        if allowed { Self::Yes } else { Self::No }
    }
}

impl fmt::Display for OptIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slug-namespaced view over a [`KeyValueStore`].
pub struct PluginState<'a> {
    store: &'a dyn KeyValueStore,
    slug: &'a str,
}

impl<'a> PluginState<'a> {
    pub fn new(store: &'a dyn KeyValueStore, slug: &'a str) -> Self {
        Self { store, slug }
    }

    /// Returns the plugin slug this view is namespaced by.
    #[must_use]
    pub fn slug(&self) -> &str {
        self.slug
    }

    #[must_use]
    pub fn activated_time_key(&self) -> String {
        format!("{}_activated_time", self.slug)
    }

    #[must_use]
    pub fn last_core_action_key(&self) -> String {
        format!("{}_last_core_action", self.slug)
    }

    #[must_use]
    pub fn allow_tracking_key(&self) -> String {
        format!("{}_allow_tracking", self.slug)
    }

    /// Unix timestamp of the last activation, if recorded.
    ///
    /// Numeric strings are accepted as well as integers.
    pub fn activated_time(&self) -> StoreResult<Option<i64>> {
        let value = self.store.get(&self.activated_time_key())?;
        Ok(value.and_then(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }))
    }

    pub fn set_activated_time(&self, unix_secs: i64) -> StoreResult<()> {
        self.store
            .set(&self.activated_time_key(), Value::from(unix_secs), false)
    }

    pub fn clear_activated_time(&self) -> StoreResult<()> {
        self.store.delete(&self.activated_time_key())
    }

    /// The most recent significant user action, or an empty string.
    pub fn last_core_action(&self) -> StoreResult<String> {
        let value = self.store.get(&self.last_core_action_key())?;
        Ok(match value {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        })
    }

    pub fn set_last_core_action(&self, action: &str) -> StoreResult<()> {
        self.store
            .set(&self.last_core_action_key(), Value::from(action), false)
    }

    /// Current consent. Absent slots mean [`OptIn::No`].
    pub fn opt_in(&self) -> StoreResult<OptIn> {
        let value = self.store.get(&self.allow_tracking_key())?;
        Ok(OptIn::from_slot(value.as_ref()))
    }

    pub fn set_opt_in(&self, opt_in: OptIn) -> StoreResult<()> {
        self.store
            .set(&self.allow_tracking_key(), Value::from(opt_in.as_str()), true)
    }
}

/// Reads the site profile id, if one has been assigned.
///
/// The id is opaque: any non-empty value is returned as stored, whoever
/// wrote it. Non-string scalars are returned in their JSON text form.
pub fn site_profile_id(store: &dyn KeyValueStore) -> StoreResult<Option<String>> {
    Ok(match store.get(SITE_PROFILE_ID_KEY)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Null | Value::String(_)) | None => None,
        Some(other) => Some(other.to_string()),
    })
}

/// Returns the site profile id, generating and persisting one only when the
/// slot is absent or empty. An existing value is never overwritten.
pub fn ensure_site_profile_id(store: &dyn KeyValueStore) -> StoreResult<String> {
    if let Some(id) = site_profile_id(store)? {
        return Ok(id);
    }
    let id = SiteProfileId::new().to_string();
    store.set(SITE_PROFILE_ID_KEY, Value::from(id.as_str()), true)?;
    info!(site_profile_id = %id, "Assigned site profile id");
    Ok(id)
}
