//! Route table

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::middleware::log_request;
use super::state::AppState;

/// Build the full HTTP router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::info_handler))
        .route("/health", get(handlers::health_handler))
        .route("/indexer/status", get(handlers::indexer_status_handler))
        .route(
            "/indexer/trigger",
            get(handlers::trigger_handler).post(handlers::trigger_handler),
        )
        // MCP over SSE
        .route("/sse", get(handlers::sse_handler))
        .route("/messages/", post(handlers::messages_handler))
        .route("/messages", post(handlers::messages_handler))
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
