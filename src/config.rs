//! Search configuration loaded from an optional TOML file.
//!
//! Every field has a default, so an empty file (or no file at all) yields a working
//! configuration. Command-line flags are applied on top by the binary.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the config file looked up in the user's config directory.
const CONFIG_FILE: &str = "docsite-search/config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Site to search when none is given on the command line: a base URL
    /// (`https://docs.example.com/project`) or a generator output directory.
    pub site: Option<String>,
    /// Upper bound for every sitemap fetch, in milliseconds.
    pub fetch_timeout_ms: u64,
    /// Minimum time a query takes to return, in milliseconds. Zero disables it.
    pub min_latency_ms: u64,
    /// Sections searched when no allow-list is supplied with the query.
    pub default_sections: Option<Vec<String>>,
    pub snippet: SnippetConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnippetConfig {
    /// Characters of context shown before a match.
    pub leading_context: usize,
    /// Characters of context shown after a match.
    pub trailing_context: usize,
    /// Snippets rendered per matched (term, field) pair.
    pub max_per_field: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            site: None,
            fetch_timeout_ms: 30_000,
            min_latency_ms: 1_000,
            default_sections: None,
            snippet: SnippetConfig::default(),
        }
    }
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            leading_context: 12,
            trailing_context: 12,
            max_per_field: 3,
        }
    }
}

impl SearchConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads and parses the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text, path)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads `explicit` if given, otherwise the per-user config file if it exists,
    /// otherwise the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            let expanded = expand_tilde(&path.to_string_lossy()).into_owned();
            return Self::load(Path::new(&expanded));
        }

        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub const fn min_latency(&self) -> Duration {
        Duration::from_millis(self.min_latency_ms)
    }
}

/// `<config dir>/docsite-search/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/site` becomes `/home/user/site`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
