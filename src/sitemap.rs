//! Sitemap JSON data model and flattening into page documents.
//!
//! The site generator exports two kinds of JSON resources:
//!
//! - a root index listing the top-level sections under `childrenPages.meta.ownPages`
//! - one resource per section holding a tree of `childrenPages` (interior nodes,
//!   keyed by section name) and `ownPages` (leaf nodes carrying the actual pages)

use crate::html::strip_tags;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Indexed field of a [`PageDocument`].
///
/// Declaration order is the order fields are indexed and reported in match data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Description,
    Content,
}

impl Field {
    pub const ALL: [Self; 3] = [Self::Title, Self::Description, Self::Content];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Content => "content",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single indexable page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDocument {
    /// Unique identifier and index reference key.
    pub link: String,
    pub title: String,
    pub description: String,
    /// Plain text with all markup stripped.
    pub content: String,
}

impl PageDocument {
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Description => &self.description,
            Field::Content => &self.content,
        }
    }
}

/// The root sitemap resource.
#[derive(Debug, Clone, Deserialize)]
pub struct RootIndex {
    #[serde(rename = "childrenPages")]
    children_pages: HashMap<String, RootGroup>,
}

#[derive(Debug, Clone, Deserialize)]
struct RootGroup {
    #[serde(rename = "ownPages", default)]
    own_pages: Vec<SectionEntry>,
}

/// One top-level section listed by the root index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SectionEntry {
    pub reference: SectionReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SectionReference {
    /// Identifier matched against the allow-list, e.g. `wiki.index`.
    #[serde(rename = "fileName")]
    pub file_name: String,
    /// Where the section's JSON resource lives.
    pub link: String,
}

impl RootIndex {
    /// The sections listed under `childrenPages.meta`, or `None` if the root index has no
    /// `meta` group.
    pub fn sections(&self) -> Option<&[SectionEntry]> {
        self.children_pages
            .get("meta")
            .map(|group| group.own_pages.as_slice())
    }
}

/// A node of a section's page tree.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SitemapNode {
    #[serde(rename = "childrenPages", default)]
    pub children_pages: Option<ChildPages>,
    #[serde(rename = "ownPages", default)]
    pub own_pages: Option<Vec<OwnPage>>,
}

/// Interior node children, kept in the order they appear in the JSON document.
#[derive(Debug, Clone, Default)]
pub struct ChildPages(pub Vec<(String, SitemapNode)>);

impl<'de> Deserialize<'de> for ChildPages {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChildPagesVisitor;

        impl<'de> Visitor<'de> for ChildPagesVisitor {
            type Value = ChildPages;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of section names to sitemap nodes")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut children = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, node)) = map.next_entry::<String, SitemapNode>()? {
                    children.push((key, node));
                }
                Ok(ChildPages(children))
            }
        }

        deserializer.deserialize_map(ChildPagesVisitor)
    }
}

/// A page as exported in a leaf node, before markup stripping.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnPage {
    pub reference: PageReference,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Rendered HTML of the page.
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageReference {
    pub link: String,
}

impl From<OwnPage> for PageDocument {
    fn from(page: OwnPage) -> Self {
        Self {
            link: page.reference.link,
            title: page.title,
            description: page.description,
            content: strip_tags(&page.content),
        }
    }
}

impl SitemapNode {
    /// Flattens this tree into page documents, depth-first in document order.
    ///
    /// A node with `childrenPages` is interior and its own pages are ignored; otherwise its
    /// `ownPages` are emitted. This holds for the section root too, so a flat section file
    /// yields its pages.
    pub fn into_documents(self) -> Vec<PageDocument> {
        let mut documents = Vec::new();
        self.collect_documents(&mut documents);
        documents
    }

    fn collect_documents(self, out: &mut Vec<PageDocument>) {
        if let Some(ChildPages(children)) = self.children_pages {
            for (_, child) in children {
                child.collect_documents(out);
            }
        } else if let Some(pages) = self.own_pages {
            out.extend(pages.into_iter().map(PageDocument::from));
        }
    }
}
