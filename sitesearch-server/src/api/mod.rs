use axum::{
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use sitesearch_core::page::SearchError;

mod events;
mod search;
mod settings;

use crate::state::AppState;

/// Axum REST API routes.
///
///   GET  /search?q=term&exclude_pages=...      -> JSON search results
///   GET  /search/page?q=term&exclude_pages=... -> HTML search page
///   GET  /config                               -> runtime configuration entries
///   PUT  /config/{key}                         -> set (or clear) one entry
///   GET  /status                               -> health check
///   GET  /logs                                 -> recent server log entries
///   GET  /logs/stream                          -> SSE stream of log entries
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search::search))
        .route("/search/page", get(search::search_page))
        .route("/config", get(settings::list_settings))
        .route("/config/{key}", put(settings::update_setting))
        .route("/status", get(events::status))
        .route("/logs", get(events::list_logs))
        .route("/logs/stream", get(events::stream_logs))
}

// ── Shared types and helpers used across sub-modules ────────────────────

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn log_api_issue(status: StatusCode, target: &'static str, message: impl AsRef<str>) {
    let message = message.as_ref();
    if status.is_server_error() {
        log::error!(target: target, "{}", message);
    } else {
        log::warn!(target: target, "{}", message);
    }
}

/// Bad exclusion patterns are the client's fault; a failing search backend is not.
fn search_error_response(err: SearchError, target: &'static str) -> ApiError {
    let status = match err {
        SearchError::Exclusion(_) => StatusCode::BAD_REQUEST,
        SearchError::Storage(_) => StatusCode::BAD_GATEWAY,
    };
    let error = err.to_string();
    log_api_issue(status, target, &error);
    (status, Json(ErrorResponse { error }))
}
