//! Page exclusion for search results.
//!
//! The raw `exclude_pages` parameter is a comma-separated list. Depending on
//! configuration, entries are either exact URLs or unanchored regular
//! expressions searched within the page URL.

use regex::{Regex, RegexBuilder};

use crate::config::{InvalidPatternPolicy, SearchSettings};
use crate::types::Page;

#[derive(Debug, thiserror::Error)]
pub enum ExclusionError {
    #[error("Invalid exclusion pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Options controlling how the raw exclusion parameter is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExclusionOptions {
    pub use_regex: bool,
    /// Only meaningful when `use_regex` is set.
    pub ignore_case: bool,
    pub invalid_pattern: InvalidPatternPolicy,
}

impl Default for ExclusionOptions {
    fn default() -> Self {
        Self::from(SearchSettings::default())
    }
}

impl From<SearchSettings> for ExclusionOptions {
    fn from(settings: SearchSettings) -> Self {
        Self {
            use_regex: settings.exclude_using_regex,
            ignore_case: settings.ignore_case,
            invalid_pattern: settings.invalid_pattern,
        }
    }
}

/// Parsed exclusion parameter.
#[derive(Debug, Clone, Default)]
pub enum ExclusionSpec {
    /// No parameter given: every page passes.
    #[default]
    Nothing,
    /// Exact, case-sensitive URL matches.
    LiteralUrls(Vec<String>),
    /// Unanchored patterns; case folding was fixed at parse time.
    Patterns(Vec<Regex>),
}

impl ExclusionSpec {
    pub fn parse(raw: Option<&str>, options: ExclusionOptions) -> Result<Self, ExclusionError> {
        let entries = split_entries(raw.unwrap_or_default());
        if entries.is_empty() {
            return Ok(Self::Nothing);
        }

        if !options.use_regex {
            return Ok(Self::LiteralUrls(
                entries.into_iter().map(str::to_string).collect(),
            ));
        }

        let mut patterns = Vec::with_capacity(entries.len());
        for entry in entries {
            match RegexBuilder::new(entry)
                .case_insensitive(options.ignore_case)
                .build()
            {
                Ok(regex) => patterns.push(regex),
                Err(source) => match options.invalid_pattern {
                    InvalidPatternPolicy::Skip => {
                        log::warn!(
                            target: "sitesearch.exclude",
                            "Skipping invalid exclusion pattern {:?}: {}",
                            entry,
                            source
                        );
                    }
                    InvalidPatternPolicy::Reject => {
                        return Err(ExclusionError::InvalidPattern {
                            pattern: entry.to_string(),
                            source,
                        });
                    }
                },
            }
        }
        Ok(Self::Patterns(patterns))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Nothing => true,
            Self::LiteralUrls(urls) => urls.is_empty(),
            Self::Patterns(patterns) => patterns.is_empty(),
        }
    }

    /// True when `url` is excluded. Entries are OR'd.
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Nothing => false,
            Self::LiteralUrls(urls) => urls.iter().any(|u| u == url),
            Self::Patterns(patterns) => patterns.iter().any(|re| re.is_match(url)),
        }
    }

    pub fn excludes(&self, page: &Page) -> bool {
        self.matches(&page.url)
    }

    /// Stable filter: keeps the pages that are not excluded, in input order.
    pub fn apply(&self, candidates: Vec<Page>) -> Vec<Page> {
        if self.is_empty() {
            return candidates;
        }
        candidates
            .into_iter()
            .filter(|page| !self.excludes(page))
            .collect()
    }
}

fn split_entries(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}
