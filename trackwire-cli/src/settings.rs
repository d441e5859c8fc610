//! Settings file (`trackwire.toml`).
//!
//! ```toml
//! api_key = "k1"
//! api_secret = "s1"
//! plugin_name = "Acme"
//! plugin_file = "acme-plugin/acme-plugin.php"
//! plugins_dir = "/srv/site/plugins"
//! site_url = "https://example.com"
//! database = "/var/lib/trackwire/settings.db"
//!
//! [transport]
//! endpoint = "https://api.trackwire.io/v1/events"
//! timeout_secs = 30
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use trackwire::Environment;
use trackwire_host::{PluginHeaderReader, PluginMetadataReader, StaticMetadata};
use trackwire_store::SqliteStore;
use trackwire_transport::{HttpTransport, HttpTransportConfig};
use trackwire_types::PropertyValue;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    pub plugin_name: String,
    /// Plugin main file, relative to `plugins_dir`.
    pub plugin_file: String,
    /// Directory plugin main files live under. Defaults to the settings
    /// file's directory.
    #[serde(default)]
    pub plugins_dir: Option<PathBuf>,
    /// Skips reading the plugin header when set.
    #[serde(default)]
    pub plugin_version: Option<String>,
    #[serde(default)]
    pub site_url: String,
    #[serde(default = "default_database")]
    pub database: PathBuf,
    #[serde(default)]
    pub transport: HttpTransportConfig,
}

fn default_database() -> PathBuf {
    PathBuf::from("trackwire.db")
}

impl Settings {
    /// Loads settings from a TOML file. Relative paths inside it resolve
    /// against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let mut settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("failed to parse settings file {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        if settings.database.is_relative() {
            settings.database = base.join(&settings.database);
        }
        settings.plugins_dir = Some(match settings.plugins_dir.take() {
            Some(dir) if dir.is_relative() => base.join(dir),
            Some(dir) => dir,
            None => base.to_path_buf(),
        });

        info!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    fn metadata(&self) -> Arc<dyn PluginMetadataReader> {
        match (&self.plugin_version, &self.plugins_dir) {
            (Some(version), _) => {
                Arc::new(StaticMetadata::new().with(self.plugin_file.clone(), version.clone()))
            }
            (None, Some(dir)) => Arc::new(PluginHeaderReader::new(dir.clone())),
            (None, None) => Arc::new(PluginHeaderReader::new(".")),
        }
    }

    /// Opens the store, builds the HTTP transport and wires an environment.
    pub fn environment(&self) -> Result<Environment> {
        let store = SqliteStore::open(&self.database)
            .with_context(|| format!("failed to open database {}", self.database.display()))?;
        let transport =
            HttpTransport::new(self.transport.clone()).context("failed to build HTTP transport")?;

        Ok(Environment::new(
            Arc::new(store),
            Arc::new(transport),
            self.metadata(),
            self.site_url.clone(),
        ))
    }
}

/// Parses a `key=value` property. Integers, floats and booleans are typed;
/// everything else is a string.
pub fn parse_property(raw: &str) -> Result<(String, PropertyValue)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("property '{raw}' must be key=value");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("property '{raw}' has an empty key");
    }

    let value = if let Ok(n) = value.parse::<i64>() {
        PropertyValue::Integer(n)
    } else if let Some(x) = value.contains('.').then(|| value.parse::<f64>().ok()).flatten() {
        PropertyValue::Float(x)
    } else if let Ok(b) = value.parse::<bool>() {
        PropertyValue::Bool(b)
    } else {
        PropertyValue::String(value.to_string())
    };
    Ok((key.to_string(), value))
}
