/// Shared application state passed to axum handlers.

use sitesearch_core::config::ConfigStore;
use sitesearch_core::storage::PageStorage;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn PageStorage>,
    /// Read per request; admin endpoints may change it between requests.
    pub config: Arc<ConfigStore>,
    pub port: u16,
    pub bind_address: String,
}
