use crate::api::api_router;
use crate::state::AppState;
use crate::ServerError;
/// HTTP server: builds the router and serves it until shutdown.
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api_router().layer(cors).with_state(state)
}

pub async fn serve(state: AppState) -> Result<(), ServerError> {
    let port = state.port;
    let bind_addr = state.bind_address.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind_addr, port)).await?;
    let actual_port = listener.local_addr()?.port();

    log::info!(
        target: "sitesearch.server",
        "HTTP server listening on http://{}:{}",
        bind_addr,
        actual_port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!(target: "sitesearch.server", "HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!(target: "sitesearch.server", "Failed to listen for shutdown signal: {}", e);
    }
}
