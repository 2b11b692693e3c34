/// Process-wide key/value configuration, editable between requests.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockWriteGuard};

pub const EXCLUDE_USING_REGEX: &str = "search.exclude_using_regex?";
pub const EXCLUDE_IGNORE_CASE: &str = "search.exclude_using_regex.ignore_case?";
pub const EXCLUDE_INVALID_PATTERN: &str = "search.exclude_using_regex.invalid_pattern";

/// What to do with an exclusion pattern that does not compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidPatternPolicy {
    /// Drop the entry and keep filtering with the rest.
    #[default]
    Skip,
    /// Fail the render.
    Reject,
}

impl InvalidPatternPolicy {
    /// Parse from a config value (case-insensitive). Unknown values map to `Skip`.
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "reject" | "error" => Self::Reject,
            _ => Self::Skip,
        }
    }
}

/// Snapshot of the search-related configuration for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub exclude_using_regex: bool,
    pub ignore_case: bool,
    pub invalid_pattern: InvalidPatternPolicy,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            exclude_using_regex: false,
            ignore_case: true,
            invalid_pattern: InvalidPatternPolicy::Skip,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration store lock poisoned")]
    Poisoned,
}

/// String-valued configuration store. Booleans are stored as `"true"`/`"false"`.
#[derive(Debug, Default)]
pub struct ConfigStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    pub fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ConfigError> {
        self.write()?.insert(key.into(), value.into());
        Ok(())
    }

    pub fn set_bool(&self, key: impl Into<String>, value: bool) -> Result<(), ConfigError> {
        self.set(key, value.to_string())
    }

    /// Drop an entry, returning its previous value.
    pub fn remove(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.write()?.remove(key))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, String>>, ConfigError> {
        self.entries.write().map_err(|_| ConfigError::Poisoned)
    }

    /// Read a boolean entry. Missing or unrecognised values yield `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(value) => parse_bool(&value).unwrap_or_else(|| {
                log::warn!(
                    target: "sitesearch.config",
                    "Config {} has non-boolean value {:?}, using {}",
                    key,
                    value,
                    default
                );
                default
            }),
            None => default,
        }
    }

    pub fn entries(&self) -> BTreeMap<String, String> {
        self.entries
            .read()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Current search settings. Called once per request, never cached.
    pub fn search_settings(&self) -> SearchSettings {
        let defaults = SearchSettings::default();
        SearchSettings {
            exclude_using_regex: self.get_bool(EXCLUDE_USING_REGEX, defaults.exclude_using_regex),
            ignore_case: self.get_bool(EXCLUDE_IGNORE_CASE, defaults.ignore_case),
            invalid_pattern: self
                .get(EXCLUDE_INVALID_PATTERN)
                .map(|v| InvalidPatternPolicy::from_str_loose(&v))
                .unwrap_or(defaults.invalid_pattern),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
