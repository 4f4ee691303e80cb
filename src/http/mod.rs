//! HTTP adapter
//!
//! Serves the info, health and indexer endpoints and carries the MCP
//! SSE transport, all via Axum.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod state;

pub use router::build_router;
pub use server::serve;
pub use state::AppState;
