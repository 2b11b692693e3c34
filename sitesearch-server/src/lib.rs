/// Sitesearch server: config loading, page store init, logging, HTTP server.
pub mod api;
mod config;
mod log_bridge;
pub mod server;
pub mod state;

use crate::state::AppState;
use sitesearch_core::config::ConfigStore;
use sitesearch_core::storage::memory::MemoryStorage;
use sitesearch_core::storage::StorageError;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to load pages from {}: {source}", .path.display())]
    Pages {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    #[error("HTTP server error: {0}")]
    Io(#[from] std::io::Error),
}

pub async fn run() -> Result<(), ServerError> {
    if let Err(e) = log_bridge::init() {
        log_bridge::write_fallback_line(&format!("failed to initialize server logger: {}", e));
    }

    let config_path = config::default_config_path();
    let config = config::load_config(&config_path);

    let storage = MemoryStorage::new();
    if let Some(pages_file) = &config.pages_file {
        // Relative page files resolve against the config file's directory.
        let pages_path = match config_path.parent() {
            Some(dir) if pages_file.is_relative() => dir.join(pages_file),
            _ => pages_file.clone(),
        };
        storage
            .load_file(&pages_path)
            .map_err(|source| ServerError::Pages {
                path: pages_path.clone(),
                source,
            })?;
    } else {
        log::warn!(target: "sitesearch", "No pages_file configured, search index is empty");
    }

    let settings = ConfigStore::with_entries(config.setting_entries());
    let search_settings = settings.search_settings();
    log::info!(
        target: "sitesearch",
        "Exclusion mode: {} (ignore case: {}, invalid patterns: {:?})",
        if search_settings.exclude_using_regex { "regex" } else { "literal" },
        search_settings.ignore_case,
        search_settings.invalid_pattern
    );

    let state = AppState {
        storage: Arc::new(storage),
        config: Arc::new(settings),
        port: config.port,
        bind_address: config.bind_address.clone(),
    };

    server::serve(state).await
}
