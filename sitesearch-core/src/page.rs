//! The search page: one render cycle from request parameters to a filtered,
//! ordered result list.

use serde::Deserialize;

use crate::config::ConfigStore;
use crate::exclude::{ExclusionError, ExclusionOptions, ExclusionSpec};
use crate::storage::{PageStorage, StorageError};
use crate::tags::truncate_and_strip;
use crate::types::{Page, SearchResult};

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search failed: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Exclusion(#[from] ExclusionError),
}

/// Request parameters consumed by the search page. Both are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub exclude_pages: Option<String>,
}

impl SearchParams {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            exclude_pages: None,
        }
    }

    pub fn excluding(mut self, exclude_pages: impl Into<String>) -> Self {
        self.exclude_pages = Some(exclude_pages.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    query: String,
    query_result: Vec<Page>,
}

impl SearchPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search pages are rendered per request and never cached.
    pub fn is_cacheable(&self) -> bool {
        false
    }

    /// The trimmed query of the last render.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Filtered results of the last render.
    pub fn query_result(&self) -> &[Page] {
        &self.query_result
    }

    /// Result rows for serialization, each with a stripped, truncated excerpt.
    pub fn results(&self) -> Vec<SearchResult> {
        self.query_result
            .iter()
            .map(|page| SearchResult {
                url: page.url.clone(),
                title: page.title.clone(),
                excerpt: truncate_and_strip(&page.content(), None),
            })
            .collect()
    }

    /// Run the query and apply the exclusion parameter.
    ///
    /// Configuration is read from `config` on every call. On error the page
    /// keeps an empty result; callers must not present it as a successful
    /// empty search.
    pub fn render(
        &mut self,
        params: &SearchParams,
        storage: &dyn PageStorage,
        config: &ConfigStore,
    ) -> Result<(), SearchError> {
        self.query = params.q.as_deref().unwrap_or_default().trim().to_string();
        self.query_result = Vec::new();

        if self.query.is_empty() {
            return Ok(());
        }

        let settings = config.search_settings();
        let exclusion = ExclusionSpec::parse(
            params.exclude_pages.as_deref(),
            ExclusionOptions::from(settings),
        )?;
        let candidates = storage.search(&self.query)?;
        let candidate_count = candidates.len();

        self.query_result = exclusion.apply(candidates);

        log::debug!(
            target: "sitesearch.page",
            "Query {:?}: {} candidates, {} after exclusion (regex: {}, ignore_case: {})",
            self.query,
            candidate_count,
            self.query_result.len(),
            settings.exclude_using_regex,
            settings.ignore_case
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EXCLUDE_IGNORE_CASE, EXCLUDE_INVALID_PATTERN, EXCLUDE_USING_REGEX};
    use crate::storage::memory::MemoryStorage;

    /// Site fixture: a home page, a documentation section, a Ruby page, a page
    /// with a mixed-case URL, and the (virtual) search page itself.
    fn searched_pages() -> MemoryStorage {
        let mut search = Page::new("/search/", "Search", "<r:search:form />");
        search.is_virtual = true;
        MemoryStorage::from_pages([
            Page::new("/", "Home", "Welcome."),
            Page::new(
                "/documentation/",
                "Documentation",
                "This is the documentation section.",
            ),
            Page::new("/ruby-home-page/", "Ruby Home Page", "This is the Ruby home page."),
            Page::new("/cAsE_sensitive/", "Case Sensitive", "This page has a mixed-case URL."),
            search,
        ])
        .unwrap()
    }

    fn urls(page: &SearchPage) -> Vec<&str> {
        page.query_result().iter().map(|p| p.url.as_str()).collect()
    }

    fn regex_config() -> ConfigStore {
        let config = ConfigStore::new();
        config.set_bool(EXCLUDE_USING_REGEX, true).unwrap();
        config
    }

    struct FailingStorage;

    impl PageStorage for FailingStorage {
        fn search(&self, _query: &str) -> Result<Vec<Page>, StorageError> {
            Err(StorageError::Unavailable("index offline".to_string()))
        }

        fn page_count(&self) -> usize {
            0
        }
    }

    #[test]
    fn test_returns_pages_containing_term() {
        let storage = searched_pages();
        let mut page = SearchPage::new();
        page.render(&SearchParams::new("documentation"), &storage, &ConfigStore::new())
            .unwrap();
        assert!(urls(&page).contains(&"/documentation/"));
        assert!(!urls(&page).contains(&"/ruby-home-page/"));
    }

    #[test]
    fn test_missing_or_blank_query_is_empty() {
        let storage = searched_pages();
        let mut page = SearchPage::new();
        page.render(&SearchParams::default(), &storage, &ConfigStore::new())
            .unwrap();
        assert!(page.query_result().is_empty());
        assert_eq!(page.query(), "");

        page.render(&SearchParams::new("   "), &storage, &ConfigStore::new())
            .unwrap();
        assert!(page.query_result().is_empty());
    }

    #[test]
    fn test_query_is_trimmed() {
        let storage = searched_pages();
        let mut page = SearchPage::new();
        page.render(&SearchParams::new("  ruby  "), &storage, &ConfigStore::new())
            .unwrap();
        assert_eq!(page.query(), "ruby");
        assert_eq!(urls(&page), vec!["/ruby-home-page/"]);
    }

    #[test]
    fn test_excludes_single_literal_url() {
        let storage = searched_pages();
        let mut page = SearchPage::new();
        let params = SearchParams::new("documentation").excluding("/documentation/");
        page.render(&params, &storage, &ConfigStore::new()).unwrap();
        assert!(!urls(&page).contains(&"/documentation/"));
    }

    #[test]
    fn test_excludes_multiple_literal_urls() {
        let storage = searched_pages();
        let mut page = SearchPage::new();
        let params = SearchParams::new(".").excluding("/documentation/,/ruby-home-page/");
        page.render(&params, &storage, &ConfigStore::new()).unwrap();
        assert_eq!(urls(&page), vec!["/", "/cAsE_sensitive/"]);
    }

    #[test]
    fn test_regex_single_pattern() {
        let storage = searched_pages();
        let mut page = SearchPage::new();
        let params = SearchParams::new("documentation").excluding("docu");
        page.render(&params, &storage, &regex_config()).unwrap();
        assert!(!urls(&page).contains(&"/documentation/"));
    }

    #[test]
    fn test_regex_multiple_patterns() {
        let storage = searched_pages();
        let mut page = SearchPage::new();
        let params = SearchParams::new("This").excluding("^/docu,home");
        page.render(&params, &storage, &regex_config()).unwrap();
        assert_eq!(urls(&page), vec!["/cAsE_sensitive/"]);
    }

    #[test]
    fn test_regex_case_sensitive_pattern() {
        let storage = searched_pages();
        let config = regex_config();
        config.set_bool(EXCLUDE_IGNORE_CASE, false).unwrap();
        let mut page = SearchPage::new();
        let params = SearchParams::new("This").excluding("rUBy,cAsE");
        page.render(&params, &storage, &config).unwrap();
        assert!(urls(&page).contains(&"/ruby-home-page/"));
        assert!(!urls(&page).contains(&"/cAsE_sensitive/"));
    }

    #[test]
    fn test_regex_case_insensitive_by_default() {
        let storage = searched_pages();
        let mut page = SearchPage::new();
        let params = SearchParams::new("This").excluding("rUBy,case");
        page.render(&params, &storage, &regex_config()).unwrap();
        assert!(urls(&page).contains(&"/documentation/"));
        assert!(!urls(&page).contains(&"/ruby-home-page/"));
        assert!(!urls(&page).contains(&"/cAsE_sensitive/"));
    }

    #[test]
    fn test_disabling_regex_falls_back_to_literal() {
        let storage = searched_pages();
        let config = regex_config();
        let params = SearchParams::new("documentation").excluding("docu");

        let mut page = SearchPage::new();
        page.render(&params, &storage, &config).unwrap();
        assert!(!urls(&page).contains(&"/documentation/"));

        config.set_bool(EXCLUDE_USING_REGEX, false).unwrap();
        page.render(&params, &storage, &config).unwrap();
        assert!(urls(&page).contains(&"/documentation/"));
    }

    #[test]
    fn test_virtual_search_page_never_listed() {
        let storage = searched_pages();
        let mut page = SearchPage::new();
        page.render(&SearchParams::new("search"), &storage, &ConfigStore::new())
            .unwrap();
        assert!(page.query_result().is_empty());
    }

    #[test]
    fn test_storage_failure_propagates() {
        let mut page = SearchPage::new();
        let err = page
            .render(&SearchParams::new("anything"), &FailingStorage, &ConfigStore::new())
            .unwrap_err();
        assert!(matches!(err, SearchError::Storage(StorageError::Unavailable(_))));
        assert!(page.query_result().is_empty());
    }

    #[test]
    fn test_invalid_pattern_policies() {
        let storage = searched_pages();
        let config = regex_config();
        let params = SearchParams::new("This").excluding("([,ruby");

        let mut page = SearchPage::new();
        page.render(&params, &storage, &config).unwrap();
        assert!(!urls(&page).contains(&"/ruby-home-page/"));
        assert!(urls(&page).contains(&"/documentation/"));

        config.set(EXCLUDE_INVALID_PATTERN, "reject").unwrap();
        let err = page.render(&params, &storage, &config).unwrap_err();
        assert!(matches!(err, SearchError::Exclusion(_)));
    }

    #[test]
    fn test_results_rows() {
        let storage = searched_pages();
        let mut page = SearchPage::new();
        page.render(&SearchParams::new("ruby"), &storage, &ConfigStore::new())
            .unwrap();
        let rows = page.results();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].url, "/ruby-home-page/");
        assert_eq!(rows[0].title, "Ruby Home Page");
        assert_eq!(rows[0].excerpt, "This is the Ruby home page.");
    }

    #[test]
    fn test_search_page_is_not_cacheable() {
        assert!(!SearchPage::new().is_cacheable());
    }
}
