//! Shared test fixtures and utilities for integration tests.
//!
//! # Test Isolation Strategy
//!
//! Every test writes its own sitemap tree into a fresh temporary directory and reads it
//! back through a [`DirSource`], so tests never share loaded state or cached indexes.
//!
//! # Available Fixtures
//!
//! - `site`: the sample site with `wiki`, `posts` and `changelog` sections
//! - `empty_site`: a temporary directory with no sitemap at all

#![allow(dead_code)] // Helpers used across different integration test crates

use docsite_search::error::LoadError;
use docsite_search::source::{DirSource, SitemapSource};
use rstest::fixture;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

/// A site generator output directory for test isolation.
///
/// Sections are written as `meta/<name>.index.json` and listed in the root index at
/// `meta/index.json` once [`TempSite::write_root`] is called.
pub struct TempSite {
    _temp: TempDir,
    root: PathBuf,
    sections: Vec<(String, String)>,
}

impl TempSite {
    /// Creates a new empty site directory.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self {
            _temp: temp,
            root,
            sections: vec![],
        }
    }

    /// Returns the root path of this site.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a file with the given content, creating parent directories as needed.
    ///
    /// # Panics
    /// Panics if file creation fails.
    pub fn create_file(&self, path: &str, content: &str) {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
    }

    /// Writes a section tree and registers it for the root index.
    pub fn add_section(&mut self, name: &str, tree: &Value) {
        let link = self.add_section_entry(name);
        self.create_file(link.trim_start_matches('/'), &tree.to_string());
    }

    /// Registers a section for the root index without writing its file.
    pub fn add_section_entry(&mut self, name: &str) -> String {
        let link = format!("/meta/{}.index.json", name);
        self.sections.push((format!("{}.index", name), link.clone()));
        link
    }

    /// Writes `meta/index.json` listing every registered section.
    pub fn write_root(&self) {
        self.create_file("meta/index.json", &root_index(&self.sections).to_string());
    }

    pub fn source(&self) -> DirSource {
        DirSource::new(&self.root)
    }
}

impl Default for TempSite {
    fn default() -> Self {
        Self::new()
    }
}

/// Root index JSON listing `(fileName, link)` sections.
pub fn root_index(sections: &[(String, String)]) -> Value {
    let pages: Vec<Value> = sections
        .iter()
        .map(|(file_name, link)| json!({ "reference": { "fileName": file_name, "link": link } }))
        .collect();
    json!({ "childrenPages": { "meta": { "ownPages": pages } } })
}

/// A leaf page as exported by the generator.
pub fn page(link: &str, title: &str, content: &str) -> Value {
    json!({
        "reference": { "link": link },
        "title": title,
        "description": "",
        "content": content,
    })
}

pub fn wiki_section() -> Value {
    json!({
        "childrenPages": {
            "getting-started": {
                "ownPages": [
                    page(
                        "/wiki/installation",
                        "Installation",
                        "<p>Add the Gradle plugin to your build and run the <b>orchidServe</b> task.</p>",
                    ),
                    page(
                        "/wiki/configuration",
                        "Configuration",
                        "<p>Site options live in config.yml.</p>",
                    ),
                ]
            },
            "plugins": {
                "ownPages": [
                    page(
                        "/wiki/kotlin",
                        "Kotlin plugin",
                        "<p>Render Kotlin documentation with the Kotlin plugin.</p>",
                    ),
                ]
            }
        }
    })
}

pub fn posts_section() -> Value {
    json!({
        "ownPages": [
            page("/posts/release-1", "Release 1.0", "<p>The first stable release of the plugin.</p>"),
            page("/posts/roadmap", "Roadmap", "<p>What comes next.</p>"),
        ]
    })
}

pub fn changelog_section() -> Value {
    json!({
        "ownPages": [
            page("/changelog", "Changelog", "<p>Fixed a bug in the search index.</p>"),
        ]
    })
}

/// Links of the sample site in load order.
pub const SAMPLE_LINKS: [&str; 6] = [
    "/wiki/installation",
    "/wiki/configuration",
    "/wiki/kotlin",
    "/posts/release-1",
    "/posts/roadmap",
    "/changelog",
];

/// The sample site with `wiki`, `posts` and `changelog` sections.
pub fn sample_site() -> TempSite {
    let mut site = TempSite::new();
    site.add_section("wiki", &wiki_section());
    site.add_section("posts", &posts_section());
    site.add_section("changelog", &changelog_section());
    site.write_root();
    site
}

#[fixture]
pub fn site() -> TempSite {
    sample_site()
}

#[fixture]
pub fn empty_site() -> TempSite {
    TempSite::new()
}

/// Wraps a source, counting fetches and optionally delaying each one.
#[derive(Debug, Clone)]
pub struct CountingSource<S> {
    inner: S,
    fetches: Arc<AtomicUsize>,
    delay: Duration,
}

impl<S: SitemapSource> CountingSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fetches: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Handle for reading the fetch count after the source has been moved into a loader.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.fetches)
    }
}

impl<S: SitemapSource> SitemapSource for CountingSource<S> {
    async fn fetch(&self, link: &str) -> Result<String, LoadError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.fetch(link).await
    }

    fn describe(&self) -> String {
        format!("counting({})", self.inner.describe())
    }
}

/// Reads a counter handed out by [`CountingSource::counter`].
pub fn fetch_count(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}
