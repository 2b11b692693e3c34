/// Configuration for the sitesearch server.
/// Reads server.json from ~/.config/sitesearch/server.json (or platform
/// equivalent), or the path in SITESEARCH_CONFIG.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "SITESEARCH_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// JSON array of pages to index at startup.
    #[serde(default)]
    pub pages_file: Option<PathBuf>,
    /// Initial entries of the runtime configuration store.
    #[serde(default)]
    pub settings: BTreeMap<String, serde_json::Value>,
}

fn default_port() -> u16 {
    8080
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            pages_file: None,
            settings: BTreeMap::new(),
        }
    }
}

impl ServerConfig {
    /// Settings flattened to the string form the configuration store keeps.
    pub fn setting_entries(&self) -> Vec<(String, String)> {
        self.settings
            .iter()
            .map(|(key, value)| (key.clone(), setting_value_string(value)))
            .collect()
    }
}

/// `true` -> "true", `"skip"` -> "skip", anything else as compact JSON.
pub fn setting_value_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// SITESEARCH_CONFIG if set, else ~/.config/sitesearch/server.json
pub fn default_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sitesearch")
        .join("server.json")
}

/// Load config from path. Returns default if file doesn't exist or can't be parsed.
pub fn load_config(path: &Path) -> ServerConfig {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Failed to parse config {}: {}", path.display(), e);
            ServerConfig::default()
        }),
        Err(_) => {
            log::info!("No config at {}, using defaults", path.display());
            ServerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_for_missing_file() {
        let config = load_config(Path::new("/nonexistent/sitesearch/server.json"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert!(config.pages_file.is_none());
        assert!(config.settings.is_empty());
    }

    #[test]
    fn test_parse_settings() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "port": 9000,
                "pages_file": "pages.json",
                "settings": {{
                    "search.exclude_using_regex?": true,
                    "search.exclude_using_regex.invalid_pattern": "reject"
                }}
            }}"#
        )
        .unwrap();

        let config = load_config(file.path());
        assert_eq!(config.port, 9000);
        assert_eq!(config.pages_file, Some(PathBuf::from("pages.json")));
        let entries = config.setting_entries();
        assert!(entries.contains(&(
            "search.exclude_using_regex?".to_string(),
            "true".to_string()
        )));
        assert!(entries.contains(&(
            "search.exclude_using_regex.invalid_pattern".to_string(),
            "reject".to_string()
        )));
    }

    #[test]
    fn test_unparsable_file_falls_back() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let config = load_config(file.path());
        assert_eq!(config.port, 8080);
        assert!(config.settings.is_empty());
    }
}
