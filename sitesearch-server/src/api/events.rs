use axum::{
    extract::State,
    response::{sse::Event, Json, Sse},
};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::state::AppState;

pub async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "running",
        "port": state.port,
        "bind_address": state.bind_address,
        "pages": state.storage.page_count(),
    }))
}

pub async fn list_logs() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "entries": crate::log_bridge::recent_entries(),
    }))
}

pub async fn stream_logs() -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let rx = crate::log_bridge::subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|item| {
        let entry = match item {
            Ok(entry) => entry,
            Err(_) => return None,
        };
        let payload = match serde_json::to_string(&entry) {
            Ok(payload) => payload,
            Err(_) => return None,
        };
        Some(Ok(Event::default().data(payload)))
    });
    Sse::new(stream)
}
