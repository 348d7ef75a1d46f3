//! Session-scoped search state.
//!
//! A [`SearchSession`] owns the single cached [`SiteCorpus`] for its lifetime. The first
//! caller of [`SearchSession::get_or_build`] loads the sitemap and builds the index; every
//! later caller reuses the same `Arc`. Concurrent first callers await one shared in-flight
//! build instead of racing each other.

use crate::error::LoadError;
use crate::loader::{LoadReport, LoadedSite, SiteIndexLoader};
use crate::search::{InvertedIndex, SearchResult};
use crate::sitemap::PageDocument;
use crate::source::SitemapSource;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Type alias for the shared corpus build future.
type SharedBuild = Shared<BoxFuture<'static, Result<Arc<SiteCorpus>, LoadError>>>;

/// The documents of a site together with the full-text index built over them.
#[derive(Debug)]
pub struct SiteCorpus {
    documents: Vec<PageDocument>,
    by_link: HashMap<String, usize>,
    index: InvertedIndex,
    report: LoadReport,
}

impl SiteCorpus {
    /// Indexes the loaded documents. If two documents share a link, the later one is the
    /// one returned by [`SiteCorpus::document`].
    pub fn build(site: LoadedSite) -> Self {
        let LoadedSite { documents, report } = site;
        let index = InvertedIndex::build(&documents);
        let by_link = documents
            .iter()
            .enumerate()
            .map(|(idx, doc)| (doc.link.clone(), idx))
            .collect();

        Self {
            documents,
            by_link,
            index,
            report,
        }
    }

    pub fn documents(&self) -> &[PageDocument] {
        &self.documents
    }

    /// Looks up a document by its link (a search result's reference).
    pub fn document(&self, link: &str) -> Option<&PageDocument> {
        self.by_link.get(link).map(|&idx| &self.documents[idx])
    }

    pub const fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub const fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Runs a query against the index. See [`crate::search::Query`] for the grammar.
    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>, crate::error::QueryError> {
        self.index.search(query)
    }
}

/// Shared search state for one session: the loader and the once-built corpus.
pub struct SearchSession<S> {
    loader: Arc<SiteIndexLoader<S>>,

    /// The built corpus, set once the first build succeeds
    corpus: RwLock<Option<Arc<SiteCorpus>>>,

    /// In-flight build (can be awaited by multiple callers)
    in_flight: Mutex<Option<SharedBuild>>,
}

impl<S> std::fmt::Debug for SearchSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("is_built", &self.corpus.try_read().map(|c| c.is_some()).ok())
            .finish_non_exhaustive()
    }
}

impl<S: SitemapSource + 'static> SearchSession<S> {
    pub fn new(loader: SiteIndexLoader<S>) -> Self {
        Self {
            loader: Arc::new(loader),
            corpus: RwLock::new(None),
            in_flight: Mutex::new(None),
        }
    }

    pub fn loader(&self) -> &SiteIndexLoader<S> {
        &self.loader
    }

    /// Returns the session corpus, loading and indexing the site on first use.
    ///
    /// `allowed` only matters for the call that starts the build; later calls get the
    /// already-built corpus whatever allow-list they pass. A failed build is not cached,
    /// so the next call retries.
    pub async fn get_or_build(
        &self,
        allowed: Option<&[String]>,
    ) -> Result<Arc<SiteCorpus>, LoadError> {
        // 1. Check cache first
        if let Some(corpus) = self.cached().await {
            tracing::debug!("Search index cache hit");
            if allowed.is_some() {
                tracing::debug!("Ignoring allow-list {:?}: index already built", allowed);
            }
            return Ok(corpus);
        }

        // 2. Join the in-flight build or start a new one
        let build = {
            let mut in_flight = self.in_flight.lock().await;

            // The build may have finished between the cache check and taking the lock
            if let Some(corpus) = self.cached().await {
                return Ok(corpus);
            }

            if let Some(build) = in_flight.as_ref() {
                tracing::debug!("Awaiting in-flight index build");
                build.clone()
            } else {
                tracing::info!("Building search index for {}", self.loader.source().describe());
                let build = self.start_build(allowed);
                *in_flight = Some(build.clone());
                build
            }
        };

        // 3. Await the result and publish it, unless the build was cleared meanwhile
        let result = build.clone().await;

        {
            let mut in_flight = self.in_flight.lock().await;
            if in_flight.as_ref().is_some_and(|current| current.ptr_eq(&build)) {
                if let Ok(corpus) = &result {
                    let mut cache = self.corpus.write().await;
                    if cache.is_none() {
                        *cache = Some(corpus.clone());
                    }
                }
                *in_flight = None;
            }
        }

        if let Err(e) = &result {
            tracing::warn!("Search index build failed: {}", e);
        }

        result
    }

    fn start_build(&self, allowed: Option<&[String]>) -> SharedBuild {
        let loader = Arc::clone(&self.loader);
        let allowed = allowed.map(<[String]>::to_vec);

        let build: BoxFuture<'static, Result<Arc<SiteCorpus>, LoadError>> = Box::pin(async move {
            let site = loader.load(allowed.as_deref()).await?;
            Ok(Arc::new(SiteCorpus::build(site)))
        });

        build.shared()
    }

    /// Get the cached corpus without triggering a build.
    pub async fn cached(&self) -> Option<Arc<SiteCorpus>> {
        self.corpus.read().await.clone()
    }

    /// Check if the corpus has been built.
    pub async fn is_built(&self) -> bool {
        self.corpus.read().await.is_some()
    }

    /// Check if a build is in progress.
    pub async fn is_building(&self) -> bool {
        self.in_flight.lock().await.is_some()
    }

    /// Drops the cached corpus and any in-flight build; the next query rebuilds.
    ///
    /// Callers already awaiting a dropped build still get its result, but it is not cached.
    pub async fn clear(&self) {
        let mut in_flight = self.in_flight.lock().await;
        *in_flight = None;
        *self.corpus.write().await = None;
        tracing::debug!("Cleared search session");
    }
}
