//! Error handling types and utilities.

use std::path::PathBuf;
use std::time::Duration;

/// A specialized Result type for application-level operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` at the CLI and configuration boundaries.
pub type Result<T> = anyhow::Result<T>;

/// Error returned when fetching or decoding part of a sitemap fails.
///
/// Cloneable so that a single failed build can be handed to every caller
/// awaiting the same in-flight load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The request could not be sent or the body could not be read.
    #[error("failed to fetch {resource}: {message}")]
    Fetch { resource: String, message: String },
    /// The server answered with a non-success status.
    #[error("fetching {resource} returned HTTP {status}")]
    Status { resource: String, status: u16 },
    /// The fetch did not settle within the configured timeout.
    #[error("fetching {resource} timed out after {after:?}")]
    Timeout { resource: String, after: Duration },
    /// The resource was fetched but is not the expected sitemap JSON.
    #[error("malformed sitemap JSON in {resource}: {message}")]
    Parse { resource: String, message: String },
    /// A link could not be mapped onto the sitemap source.
    #[error("invalid sitemap link '{link}': {reason}")]
    InvalidLink { link: String, reason: String },
}

impl LoadError {
    /// The resource (URL or path) this error refers to.
    pub fn resource(&self) -> &str {
        match self {
            Self::Fetch { resource, .. }
            | Self::Status { resource, .. }
            | Self::Timeout { resource, .. }
            | Self::Parse { resource, .. } => resource,
            Self::InvalidLink { link, .. } => link,
        }
    }
}

/// Error returned when a query string does not follow the query grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("unknown field '{field}' in '{clause}' (expected title, description or content)")]
    UnknownField { field: String, clause: String },
    #[error("invalid boost in '{clause}'")]
    InvalidBoost { clause: String },
    #[error("invalid edit distance in '{clause}'")]
    InvalidEditDistance { clause: String },
    #[error("missing term in '{clause}'")]
    MissingTerm { clause: String },
}

/// Error returned by a full search round-trip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Error returned when reading the configuration file fails.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
