/// In-process page store with LIKE-style full-text matching.
///
/// - Pages are kept in insertion order and are unique by URL
/// - A query is split into whitespace-separated tokens or quoted phrases;
///   every token must occur in the title or in some content part
///   (case- and accent-insensitive)
/// - Only searchable pages are returned (published, not virtual, not scheduled)
/// - Results are ranked by hit count, ties keep insertion order

use std::fs;
use std::path::Path;
use std::sync::RwLock;

use chrono::Utc;

use super::{PageStorage, StorageError};
use crate::search::{normalize_for_search, query_tokens};
use crate::types::Page;

const TITLE_WEIGHT: usize = 10;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    pages: RwLock<Vec<Page>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pages(pages: impl IntoIterator<Item = Page>) -> Result<Self, StorageError> {
        let storage = Self::new();
        for page in pages {
            storage.add_page(page)?;
        }
        Ok(storage)
    }

    /// Load a JSON array of pages from disk, appending to the store.
    /// Returns the number of pages added.
    pub fn load_file(&self, path: &Path) -> Result<usize, StorageError> {
        let content = fs::read_to_string(path)?;
        let pages: Vec<Page> = serde_json::from_str(&content)?;
        let count = pages.len();
        for page in pages {
            self.add_page(page)?;
        }
        log::info!(
            target: "sitesearch.storage",
            "Loaded {} pages from {}",
            count,
            path.display()
        );
        Ok(count)
    }

    pub fn add_page(&self, page: Page) -> Result<(), StorageError> {
        validate_url(&page.url)?;
        let mut pages = self.write()?;
        if pages.iter().any(|p| p.url == page.url) {
            return Err(StorageError::DuplicateUrl(page.url));
        }
        pages.push(page);
        Ok(())
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<Page>>, StorageError> {
        self.pages
            .write()
            .map_err(|_| StorageError::Unavailable("page store lock poisoned".to_string()))
    }
}

impl PageStorage for MemoryStorage {
    fn search(&self, query: &str) -> Result<Vec<Page>, StorageError> {
        let tokens: Vec<String> = query_tokens(query)
            .iter()
            .map(|token| normalize_for_search(token))
            .collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let pages = self
            .pages
            .read()
            .map_err(|_| StorageError::Unavailable("page store lock poisoned".to_string()))?;
        let now = Utc::now();

        let mut scored: Vec<(usize, &Page)> = pages
            .iter()
            .filter(|page| page.is_searchable(now))
            .filter_map(|page| score_page(page, &tokens).map(|score| (score, page)))
            .collect();
        // sort_by is stable, so equal scores keep insertion order
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored.into_iter().map(|(_, page)| page.clone()).collect())
    }

    fn page_count(&self) -> usize {
        self.pages.read().map(|pages| pages.len()).unwrap_or(0)
    }
}

/// `None` when some token is missing, otherwise the weighted hit count.
fn score_page(page: &Page, tokens: &[String]) -> Option<usize> {
    let title = normalize_for_search(&page.title);
    let parts: Vec<String> = page
        .parts
        .iter()
        .map(|part| normalize_for_search(&part.content))
        .collect();

    let mut score = 0;
    for token in tokens {
        let title_hits = title.matches(token.as_str()).count();
        let content_hits: usize = parts.iter().map(|p| p.matches(token.as_str()).count()).sum();
        if title_hits == 0 && content_hits == 0 {
            return None;
        }
        score += title_hits * TITLE_WEIGHT + content_hits;
    }
    Some(score)
}

fn validate_url(url: &str) -> Result<(), StorageError> {
    if url.is_empty() || !url.starts_with('/') || url.contains(char::is_whitespace) {
        return Err(StorageError::InvalidUrl(url.to_string()));
    }
    Ok(())
}
