//! MCP (Model Context Protocol) server module
//!
//! This module implements a JSON-RPC 2.0 compliant MCP server that
//! exposes the cass command line as MCP tools. Requests arrive over
//! SSE (see [`sse`]) or line-delimited stdio (see [`server`]).

pub mod error;
pub mod handlers;
pub mod protocol;
pub mod server;
pub mod sse;
pub mod tools;
pub mod transport;
pub mod validation;

// Re-export main types
pub use error::McpError;
pub use handlers::ProtocolHandlers;
pub use server::McpServer;
pub use sse::SessionRegistry;
pub use tools::{McpToolHandler, ToolRegistry};
