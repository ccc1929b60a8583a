//! Router setup with the relay routes and middleware.
//!
//! Configures the axum Router with CORS, tracing and a body limit.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use walrus_core::config::RelayConfig;
use walrus_core::WalrusError;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/api/chat", get(handlers::chat_get).post(handlers::chat))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TraceLayer::new_for_http())
        // The browser client is served from a different origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `host:port` from the relay config and serve until the process exits.
pub async fn start_server(config: &RelayConfig, state: AppState) -> Result<(), WalrusError> {
    let addr = format!("{}:{}", config.host, config.port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| WalrusError::Config(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
