//! Full-text search infrastructure for site pages.
//!
//! This module provides TF-IDF based search over page titles, descriptions and content,
//! including tokenization, indexing with term positions, scoring, and the query grammar.

// Module declarations
pub(crate) mod index;
pub(crate) mod query;
pub(crate) mod scoring;
pub(crate) mod tokenize;

// Public re-exports (used via lib.rs)
pub use index::{InvertedIndex, MatchData, SearchResult};
pub use query::{Clause, Presence, Query, TermMatch};
pub use tokenize::Position;
