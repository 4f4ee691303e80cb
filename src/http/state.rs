//! Application state for the HTTP surface
//!
//! Shared by every handler: the core services, the MCP protocol
//! handlers, the live SSE sessions and the shutdown token.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::services::Services;
use crate::mcp::handlers::ProtocolHandlers;
use crate::mcp::sse::SessionRegistry;

/// Shared application state for Axum handlers
#[derive(Clone)]
pub struct AppState {
    /// Runner, background indexer and configuration
    pub services: Arc<Services>,

    /// MCP method handlers and the tool registry
    pub handlers: Arc<ProtocolHandlers>,

    /// Open SSE sessions
    pub sessions: Arc<SessionRegistry>,

    /// Cancelled when the server begins shutting down; ends every SSE stream
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(services: Arc<Services>) -> Self {
        let handlers = Arc::new(ProtocolHandlers::new(Arc::clone(&services)));
        Self::with_handlers(services, handlers)
    }

    /// Build state around explicit protocol handlers
    pub fn with_handlers(services: Arc<Services>, handlers: Arc<ProtocolHandlers>) -> Self {
        Self {
            services,
            handlers,
            sessions: Arc::new(SessionRegistry::new()),
            shutdown: CancellationToken::new(),
        }
    }
}
