//! Sitemap sources: where the JSON resources of a site come from.
//!
//! A site is either served over HTTP ([`HttpSource`]) or available as the generator's
//! output directory on disk ([`DirSource`]). Both resolve the links found in the sitemap
//! relative to the site base.

use crate::error::LoadError;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Fetches a sitemap resource by link and returns its body.
pub trait SitemapSource: Send + Sync {
    fn fetch(&self, link: &str) -> impl Future<Output = Result<String, LoadError>> + Send;

    /// Human-readable description of the site, used in logs.
    fn describe(&self) -> String;
}

/// Normalizes a base URL or path prefix: `/` means "no prefix" and trailing slashes are
/// dropped so that links can be appended with a single `/`.
pub fn normalize_base(base: &str) -> &str {
    if base == "/" {
        ""
    } else {
        base.trim_end_matches('/')
    }
}

/// A site served over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("docsite-search/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LoadError::Fetch {
                resource: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: normalize_base(base_url).to_string(),
        })
    }

    /// Absolute links are used as-is; anything else is appended to the base URL.
    ///
    /// Host-rooted links (`/meta/...`) stay under the base path, so a site served from a
    /// sub-path still finds its root index.
    pub fn resolve(&self, link: &str) -> String {
        if Url::parse(link).is_ok() {
            link.to_string()
        } else {
            format!("{}/{}", self.base_url, link.trim_start_matches('/'))
        }
    }
}

impl SitemapSource for HttpSource {
    async fn fetch(&self, link: &str) -> Result<String, LoadError> {
        let url = self.resolve(link);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LoadError::Fetch {
                resource: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                resource: url,
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| LoadError::Fetch {
            resource: url,
            message: e.to_string(),
        })
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// A site generator's output directory on disk.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a link onto a file below the root.
    ///
    /// Absolute URLs contribute only their path, so links exported with the production
    /// host still resolve against a local build. Links escaping the root are rejected.
    pub fn resolve(&self, link: &str) -> Result<PathBuf, LoadError> {
        let path = match Url::parse(link) {
            Ok(url) if url.has_host() => url.path().to_string(),
            Ok(_) => {
                return Err(LoadError::InvalidLink {
                    link: link.to_string(),
                    reason: "not a path or http(s) URL".to_string(),
                });
            }
            Err(_) => link.to_string(),
        };

        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(LoadError::InvalidLink {
                link: link.to_string(),
                reason: "escapes the site directory".to_string(),
            });
        }

        Ok(self.root.join(relative))
    }
}

impl SitemapSource for DirSource {
    async fn fetch(&self, link: &str) -> Result<String, LoadError> {
        let path = self.resolve(link)?;
        tracing::debug!("Reading {}", path.display());

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| LoadError::Fetch {
                resource: path.display().to_string(),
                message: e.to_string(),
            })
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Either kind of source, chosen from a site location string.
#[derive(Debug, Clone)]
pub enum SiteSource {
    Http(HttpSource),
    Dir(DirSource),
}

impl SiteSource {
    /// `http://` and `https://` locations are fetched over the network; anything else is
    /// treated as a directory.
    pub fn from_location(location: &str, timeout: Duration) -> Result<Self, LoadError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            HttpSource::new(location, timeout).map(Self::Http)
        } else {
            let expanded = crate::config::expand_tilde(location);
            Ok(Self::Dir(DirSource::new(expanded.into_owned())))
        }
    }
}

impl SitemapSource for SiteSource {
    async fn fetch(&self, link: &str) -> Result<String, LoadError> {
        match self {
            Self::Http(source) => source.fetch(link).await,
            Self::Dir(source) => source.fetch(link).await,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Http(source) => source.describe(),
            Self::Dir(source) => source.describe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    #[rstest]
    #[case("/", "")]
    #[case("", "")]
    #[case("https://docs.example.com/", "https://docs.example.com")]
    #[case("https://docs.example.com/project", "https://docs.example.com/project")]
    fn test_normalize_base(#[case] base: &str, #[case] expected: &str) {
        check!(normalize_base(base) == expected);
    }

    #[rstest]
    #[case("meta/index.json", "https://docs.example.com/project/meta/index.json")]
    #[case("/meta/index.json", "https://docs.example.com/project/meta/index.json")]
    #[case(
        "https://cdn.example.com/meta/wiki.index.json",
        "https://cdn.example.com/meta/wiki.index.json"
    )]
    fn test_http_resolve(#[case] link: &str, #[case] expected: &str) {
        let source =
            HttpSource::new("https://docs.example.com/project/", Duration::from_secs(1)).unwrap();
        check!(source.resolve(link) == expected);
    }

    #[rstest]
    #[case("meta/index.json", "meta/index.json")]
    #[case("/meta/wiki.index.json", "meta/wiki.index.json")]
    #[case("https://docs.example.com/meta/posts.index.json", "meta/posts.index.json")]
    #[case("./meta/x.json", "meta/x.json")]
    fn test_dir_resolve(#[case] link: &str, #[case] expected: &str) {
        let source = DirSource::new("/srv/site");
        let_assert!(Ok(path) = source.resolve(link));
        check!(path.strip_prefix("/srv/site").unwrap() == Path::new(expected));
    }

    #[rstest]
    #[case("../etc/passwd")]
    #[case("/meta/../../secret.json")]
    #[case("mailto:someone@example.com")]
    fn test_dir_resolve_rejects_escapes(#[case] link: &str) {
        let source = DirSource::new("/srv/site");
        let_assert!(Err(LoadError::InvalidLink { .. }) = source.resolve(link));
    }

    #[tokio::test]
    async fn test_dir_fetch_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirSource::new(dir.path());
        let_assert!(Err(LoadError::Fetch { resource, .. }) = source.fetch("meta/index.json").await);
        check!(resource.ends_with("index.json"));
    }

    #[test]
    fn test_location_selects_source() {
        let timeout = Duration::from_secs(1);
        check!(matches!(
            SiteSource::from_location("https://docs.example.com", timeout),
            Ok(SiteSource::Http(_))
        ));
        check!(matches!(
            SiteSource::from_location("build/docs", timeout),
            Ok(SiteSource::Dir(_))
        ));
    }
}
