use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publication state of a page in the site tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Draft,
    Reviewed,
    Published,
    Hidden,
}

/// A named content part of a page (`body`, `extended`, `sidebar`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePart {
    pub name: String,
    #[serde(default)]
    pub content: String,
}

/// A content node in the site tree. The URL is unique across the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub parts: Vec<PagePart>,
    #[serde(default)]
    pub status: PageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Virtual pages (search pages, feeds) render dynamically and are never indexed.
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,
}

impl Page {
    /// Published page with a single `body` part.
    pub fn new(url: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            parts: vec![PagePart {
                name: "body".to_string(),
                content: body.into(),
            }],
            status: PageStatus::Published,
            published_at: None,
            is_virtual: false,
        }
    }

    /// Concatenated text of all parts, in part order.
    pub fn content(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// A page is visible to search when it is published, not virtual, and its
    /// publication date (if any) is not in the future.
    pub fn is_searchable(&self, now: DateTime<Utc>) -> bool {
        self.status == PageStatus::Published
            && !self.is_virtual
            && self.published_at.map(|at| at <= now).unwrap_or(true)
    }
}

/// Serialized form of one result row returned by the JSON API.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub excerpt: String,
}
