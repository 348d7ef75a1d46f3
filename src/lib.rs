//! Full-text search over static documentation sites.
//!
//! A site generator exports its pages as a tree of JSON sitemap resources. This crate
//! loads that tree (over HTTP or from the output directory), builds a positional
//! full-text index once per [`SearchSession`], runs queries against it and renders
//! highlighted result snippets.

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod executor;
pub mod format;
pub mod html;
pub mod loader;
pub mod search;
pub mod session;
pub mod sitemap;
pub mod snippet;
pub mod source;
pub mod tracing;

pub use config::{SearchConfig, SnippetConfig};
pub use controller::{RenderedResult, SearchController, SearchForm, SearchView, UiState};
pub use error::{ConfigError, LoadError, QueryError, SearchError};
pub use executor::QueryExecutor;
pub use loader::{LoadReport, LoadedSite, SiteIndexLoader};
pub use search::{InvertedIndex, MatchData, Position, SearchResult};
pub use session::{SearchSession, SiteCorpus};
pub use sitemap::{Field, PageDocument};
pub use snippet::{Snippet, SnippetRenderer, Summary};
pub use source::{DirSource, HttpSource, SiteSource, SitemapSource};
