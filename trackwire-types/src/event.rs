//! The event envelope sent to the analytics endpoint.
//!
//! On the wire an event is a flat object:
//!
//! ```json
//! {"event": "feed_created", "properties": {"count": 3, "plugin_name": "Acme"}}
//! ```
//!
//! Property values are scalars only. Nested objects and arrays are not part
//! of the data model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Well-known event names.
pub mod names {
    /// Sent when the owning plugin is activated. Bypasses consent.
    pub const PLUGIN_ACTIVATED: &str = "plugin_activated";
    /// Sent when the owning plugin is deactivated. Bypasses consent.
    pub const PLUGIN_DEACTIVATED: &str = "plugin_deactivated";
    /// Periodic snapshot, consent gated.
    pub const SYSTEM_INFO: &str = "system_info";
}

/// Well-known property keys.
pub mod keys {
    pub const PLUGIN_NAME: &str = "plugin_name";
    pub const PLUGIN_VERSION: &str = "plugin_version";
    pub const TIMESTAMP: &str = "timestamp";
    pub const SITE_PROFILE_ID: &str = "site_profile_id";
    pub const SITE_URL: &str = "site_url";
    pub const ACTIVATION_TIME: &str = "activation_time";
    pub const USAGE_DURATION: &str = "usage_duration";
    pub const LAST_CORE_ACTION: &str = "last_core_action";
    pub const DEACTIVATION_TIME: &str = "deactivation_time";
}

/// A single scalar property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    /// Returns the value as a string slice if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer if it is one.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Flat string-keyed property map. Ordered so serialized payloads are stable.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A named event with its properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The event name (e.g. `"plugin_activated"`).
    #[serde(rename = "event")]
    pub name: String,
    /// Event properties, including enrichment once dispatched.
    #[serde(default)]
    pub properties: Properties,
}

impl Event {
    /// Creates an event with no properties.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Properties::new(),
        }
    }

    /// Creates an event carrying the given properties.
    #[must_use]
    pub fn with_properties(name: impl Into<String>, properties: Properties) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or overwrites a property.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Looks up a property by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Serializes the event into its JSON wire form.
    pub fn to_json(&self) -> crate::Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
