//! HTTP server lifecycle
//!
//! Serves the router until a shutdown signal arrives. On shutdown every
//! SSE stream is ended and the background indexer is stopped before
//! open connections are drained, so a connected client cannot hold the
//! process open with a watch child still running.

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use super::router::build_router;
use super::state::AppState;

/// Serve `state` on `listener` until `signal` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, signal: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let shutdown = state.shutdown.clone();
    let services = Arc::clone(&state.services);
    let sessions = Arc::clone(&state.sessions);
    let app = build_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            signal.await;
            info!("Closing {} SSE session(s)", sessions.len());
            shutdown.cancel();
            services.indexer.stop().await;
        })
        .await
}
