//! Query execution with a minimum response latency.

use crate::error::QueryError;
use crate::search::SearchResult;
use crate::session::SiteCorpus;
use std::time::Duration;
use tokio::time::Instant;

/// Runs queries against a corpus.
///
/// Local queries finish almost instantly; the executor holds the result back until
/// `min_latency` has passed so that a progress indicator does not merely flicker.
#[derive(Debug, Clone, Copy)]
pub struct QueryExecutor {
    min_latency: Duration,
}

impl QueryExecutor {
    pub const fn new(min_latency: Duration) -> Self {
        Self { min_latency }
    }

    pub const fn min_latency(&self) -> Duration {
        self.min_latency
    }

    /// Searches `corpus` for `query`, ranked by descending score.
    ///
    /// The query is passed to the index unmodified; grammar errors are returned as-is.
    /// The minimum latency applies to failed queries too.
    pub async fn search(
        &self,
        corpus: &SiteCorpus,
        query: &str,
    ) -> Result<Vec<SearchResult>, QueryError> {
        let start = Instant::now();
        let results = corpus.search(query);

        let elapsed = start.elapsed();
        tracing::debug!(
            "Query {:?} matched {} documents in {:?}",
            query,
            results.as_ref().map_or(0, Vec::len),
            elapsed
        );

        if let Some(remaining) = self.min_latency.checked_sub(elapsed)
            && !remaining.is_zero()
        {
            tokio::time::sleep(remaining).await;
        }

        results
    }
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoadedSite;
    use crate::sitemap::PageDocument;
    use assert2::{check, let_assert};

    fn corpus() -> SiteCorpus {
        SiteCorpus::build(LoadedSite {
            documents: vec![PageDocument {
                link: "/guide".to_string(),
                title: "Guide".to_string(),
                description: String::new(),
                content: "A guide to searching".to_string(),
            }],
            report: Default::default(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_min_latency_enforced() {
        let corpus = corpus();
        let executor = QueryExecutor::new(Duration::from_millis(1000));

        let start = Instant::now();
        let results = executor.search(&corpus, "guide").await.unwrap();
        check!(results.len() == 1);
        check!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_latency_returns_immediately() {
        let corpus = corpus();
        let executor = QueryExecutor::new(Duration::ZERO);

        let start = Instant::now();
        let results = executor.search(&corpus, "search").await.unwrap();
        check!(results.len() == 1);
        check!(start.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_grammar_errors_pass_through() {
        let corpus = corpus();
        let executor = QueryExecutor::new(Duration::from_millis(10));
        let_assert!(Err(QueryError::UnknownField { .. }) = executor.search(&corpus, "body:x").await);
    }
}
