//! Plugin metadata lookup.
//!
//! A plugin declares its version in the header comment of its main file:
//!
//! ```text
//! /*
//!  * Plugin Name: Acme
//!  * Version: 1.4.0
//!  */
//! ```

use crate::error::{HostError, HostResult};
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;

/// Only the start of the file is scanned for header fields.
const HEADER_SCAN_BYTES: u64 = 8 * 1024;

/// Resolves a plugin's declared version from its identity
/// (the main file path relative to the plugins directory).
pub trait PluginMetadataReader: Send + Sync {
    /// Returns the declared version, or `None` if the plugin declares none.
    fn version(&self, identity: &str) -> HostResult<Option<String>>;
}

/// Reads `Version:` from plugin main files under a plugins directory.
#[derive(Debug, Clone)]
pub struct PluginHeaderReader {
    plugins_dir: PathBuf,
}

impl PluginHeaderReader {
    pub fn new(plugins_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
        }
    }

    fn read_header(&self, identity: &str) -> std::io::Result<String> {
        let path = self.plugins_dir.join(identity);
        let file = std::fs::File::open(path)?;
        let mut buf = Vec::new();
        file.take(HEADER_SCAN_BYTES).read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl PluginMetadataReader for PluginHeaderReader {
    fn version(&self, identity: &str) -> HostResult<Option<String>> {
        let header = self.read_header(identity).map_err(|source| HostError::Metadata {
            identity: identity.to_string(),
            source,
        })?;
        Ok(parse_header_field(&header, "Version"))
    }
}

/// Fixed identity -> version table.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata {
    versions: HashMap<String, String>,
}

impl StaticMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, identity: impl Into<String>, version: impl Into<String>) -> Self {
        self.versions.insert(identity.into(), version.into());
        self
    }
}

impl PluginMetadataReader for StaticMetadata {
    fn version(&self, identity: &str) -> HostResult<Option<String>> {
        Ok(self.versions.get(identity).cloned())
    }
}

/// Extracts `field: value` from a comment header. Field names match
/// case-insensitively; comment decoration (`*`, `#`, `//`, `@`) is ignored.
/// Empty values count as absent.
#[must_use]
pub fn parse_header_field(header: &str, field: &str) -> Option<String> {
    header.lines().find_map(|line| {
        let line = line.trim_start_matches(|c: char| matches!(c, ' ' | '\t' | '/' | '*' | '#' | '@'));
        let (name, value) = line.split_once(':')?;
        if !name.trim_end().eq_ignore_ascii_case(field) {
            return None;
        }
        let value = value.trim();
        let value = value.strip_suffix("*/").unwrap_or(value).trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}
