//! Sitemap loading: fetches the root index and every allowed section, and flattens the
//! section trees into page documents.

use crate::error::LoadError;
use crate::sitemap::{PageDocument, RootIndex, SectionEntry, SitemapNode};
use crate::source::SitemapSource;
use futures::future::try_join_all;
use rapidfuzz::distance::jaro_winkler;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Link of the root sitemap resource, relative to the site base.
pub const ROOT_INDEX: &str = "/meta/index.json";

/// Suffix the generator appends to section names to form section identifiers.
pub const SECTION_SUFFIX: &str = ".index";

/// Outcome of a load: every section listed by the root index is either loaded or skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total: usize,
    pub loaded: usize,
    pub skipped: usize,
    pub documents: usize,
}

impl LoadReport {
    /// True once every section has been accounted for.
    pub const fn is_complete(&self) -> bool {
        self.loaded + self.skipped == self.total
    }
}

/// Flattened documents of a site, in section order.
#[derive(Debug, Clone, Default)]
pub struct LoadedSite {
    pub documents: Vec<PageDocument>,
    pub report: LoadReport,
}

/// Whether a section passes the allow-list.
///
/// Without an allow-list every section is included. Otherwise the section's identifier must
/// equal `<name>.index` for one of the (trimmed) allowed names; the comparison is exact and
/// case-sensitive.
pub fn section_allowed(file_name: &str, allowed: Option<&[String]>) -> bool {
    let Some(allowed) = allowed else {
        return true;
    };
    allowed.iter().any(|name| {
        file_name
            .strip_suffix(SECTION_SUFFIX)
            .is_some_and(|stem| stem == name.trim())
    })
}

/// Splits a comma-separated allow-list. Only an empty value means "no allow-list"; a blank
/// one is a list of a blank name, which matches no section.
pub fn parse_allow_list(value: &str) -> Option<Vec<String>> {
    if value.is_empty() {
        return None;
    }
    Some(value.split(',').map(str::to_string).collect())
}

/// Loads and flattens a site's sitemap from a [`SitemapSource`].
#[derive(Debug, Clone)]
pub struct SiteIndexLoader<S> {
    source: S,
    fetch_timeout: Duration,
}

impl<S: SitemapSource> SiteIndexLoader<S> {
    pub const fn new(source: S, fetch_timeout: Duration) -> Self {
        Self {
            source,
            fetch_timeout,
        }
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Fetches the root index, then every allowed section concurrently, and returns the
    /// flattened documents once all sections have settled.
    ///
    /// Sections are fetched in parallel but their documents are concatenated in the order the
    /// root index lists them. The first failing section fails the whole load.
    pub async fn load(&self, allowed: Option<&[String]>) -> Result<LoadedSite, LoadError> {
        let start = std::time::Instant::now();
        let root: RootIndex = self.fetch_json(ROOT_INDEX).await?;
        let sections = root.sections().ok_or_else(|| LoadError::Parse {
            resource: ROOT_INDEX.to_string(),
            message: "missing childrenPages.meta".to_string(),
        })?;

        let (included, skipped): (Vec<&SectionEntry>, Vec<&SectionEntry>) = sections
            .iter()
            .partition(|section| section_allowed(&section.reference.file_name, allowed));

        for section in &skipped {
            tracing::debug!("Skipping section '{}'", section.reference.file_name);
        }
        if let Some(allowed) = allowed
            && included.is_empty()
        {
            warn_no_sections(allowed, sections);
        }

        // Fan out one fetch per section, fan in once all of them have settled
        let fetched = try_join_all(included.iter().map(|section| self.load_section(section))).await?;

        let documents: Vec<PageDocument> = fetched.into_iter().flatten().collect();
        let report = LoadReport {
            total: sections.len(),
            loaded: included.len(),
            skipped: skipped.len(),
            documents: documents.len(),
        };
        debug_assert!(report.is_complete());

        tracing::info!(
            "Loaded {} documents from {} of {} sections of {} in {:?}",
            report.documents,
            report.loaded,
            report.total,
            self.source.describe(),
            start.elapsed()
        );

        Ok(LoadedSite { documents, report })
    }

    async fn load_section(&self, section: &SectionEntry) -> Result<Vec<PageDocument>, LoadError> {
        let node: SitemapNode = self.fetch_json(&section.reference.link).await?;
        let documents = node.into_documents();
        tracing::debug!(
            "Section '{}' has {} documents",
            section.reference.file_name,
            documents.len()
        );
        Ok(documents)
    }

    /// Fetches `link` within the fetch timeout and decodes it as JSON.
    async fn fetch_json<T: DeserializeOwned>(&self, link: &str) -> Result<T, LoadError> {
        let body = tokio::time::timeout(self.fetch_timeout, self.source.fetch(link))
            .await
            .map_err(|_| LoadError::Timeout {
                resource: link.to_string(),
                after: self.fetch_timeout,
            })??;

        serde_json::from_str(&body).map_err(|e| LoadError::Parse {
            resource: link.to_string(),
            message: e.to_string(),
        })
    }
}

/// Logs the closest section name when an allow-list matched nothing.
fn warn_no_sections(allowed: &[String], sections: &[SectionEntry]) {
    let names: Vec<&str> = sections
        .iter()
        .filter_map(|s| s.reference.file_name.strip_suffix(SECTION_SUFFIX))
        .collect();

    let suggestion = allowed
        .iter()
        .flat_map(|wanted| {
            names.iter().map(move |name| {
                (
                    *name,
                    jaro_winkler::similarity(wanted.trim().chars(), name.chars()),
                )
            })
        })
        .filter(|(_, score)| *score > 0.8)
        .max_by(|(_, a), (_, b)| a.total_cmp(b));

    match suggestion {
        Some((name, _)) => tracing::warn!(
            "No section matches {:?}; did you mean '{}'?",
            allowed,
            name
        ),
        None => tracing::warn!(
            "No section matches {:?} (available: {})",
            allowed,
            names.join(", ")
        ),
    }
}
