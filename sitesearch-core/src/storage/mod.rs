pub mod memory;

use crate::types::Page;

/// Full-text query executor over the site's page tree.
/// Implementations: MemoryStorage (in-process), future: database-backed indexes.
pub trait PageStorage: Send + Sync {
    /// Pages matching `query`, most relevant first, unique by URL.
    /// A blank query yields no pages.
    fn search(&self, query: &str) -> Result<Vec<Page>, StorageError>;

    /// Number of stored pages, searchable or not.
    fn page_count(&self) -> usize;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Duplicate page URL: {0}")]
    DuplicateUrl(String),

    #[error("Invalid page URL: {0:?}")]
    InvalidUrl(String),

    #[error("Search backend unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid page file: {0}")]
    Json(#[from] serde_json::Error),
}
