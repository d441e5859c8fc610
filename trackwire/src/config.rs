//! Client identity and credentials.

use crate::error::{ClientError, ClientResult};
use tracing::warn;
use trackwire_host::PluginMetadataReader;
use trackwire_transport::Credentials;

/// Derives a plugin slug from its identity (main file path relative to the
/// plugins directory): the name of the file's parent directory.
///
/// `acme-plugin/acme-plugin.php` becomes `acme-plugin`. A bare file with no
/// parent directory (`hello.php`) falls back to its stem (`hello`). Both `/`
/// and `\` separate path components.
#[must_use]
pub fn derive_slug(identity: &str) -> String {
    let normalized = normalize_identity(identity);
    let mut components = normalized.rsplit('/');
    let file = components.next().unwrap_or_default();

    if let Some(dir) = components.find(|c| !c.is_empty() && *c != ".") {
        return dir.to_string();
    }

    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file.to_string(),
    }
}

/// Canonical form used for identity comparison: trimmed, forward slashes,
/// no trailing separator.
#[must_use]
pub fn normalize_identity(identity: &str) -> String {
    identity.trim().replace('\\', "/").trim_end_matches('/').to_string()
}

/// Immutable client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    credentials: Credentials,
    plugin_name: String,
    plugin_identity: String,
    plugin_version: String,
    slug: String,
}

impl ClientConfig {
    /// Validates credentials and derives slug and version from the identity.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the API key or plugin
    /// identity is empty.
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        plugin_name: impl Into<String>,
        plugin_identity: impl Into<String>,
        metadata: &dyn PluginMetadataReader,
    ) -> ClientResult<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ClientError::Configuration("API key is required".into()));
        }

        let plugin_identity = plugin_identity.into();
        if plugin_identity.is_empty() {
            return Err(ClientError::Configuration("plugin identity is required".into()));
        }

        let plugin_version = match metadata.version(&plugin_identity) {
            Ok(Some(version)) => version,
            Ok(None) => {
                warn!(identity = %plugin_identity, "Plugin declares no version");
                String::new()
            }
            Err(e) => {
                warn!(identity = %plugin_identity, error = %e, "Failed to read plugin version");
                String::new()
            }
        };

        Ok(Self {
            credentials: Credentials::new(api_key, api_secret),
            plugin_name: plugin_name.into(),
            slug: derive_slug(&plugin_identity),
            plugin_identity,
            plugin_version,
        })
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.credentials.api_key
    }

    #[must_use]
    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// The plugin's main file path, as given at construction.
    #[must_use]
    pub fn plugin_identity(&self) -> &str {
        &self.plugin_identity
    }

    /// Declared plugin version, or empty if none could be read.
    #[must_use]
    pub fn plugin_version(&self) -> &str {
        &self.plugin_version
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Returns true if `identity` names this plugin.
    #[must_use]
    pub fn is_identity(&self, identity: &str) -> bool {
        normalize_identity(identity) == normalize_identity(&self.plugin_identity)
    }
}
