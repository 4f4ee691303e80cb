//! cass-mcp - MCP server for Coding Agent Session Search
//!
//! Exposes the `cass` command line as ten MCP tools over SSE (or
//! stdio) and keeps the cass index fresh with a supervised background
//! indexer. All search, ranking and storage happen inside cass; this
//! crate translates arguments, supervises processes and routes HTTP.
//!
//! # Architecture
//!
//! - **core**: Domain logic (protocol-agnostic)
//!   - config, error, types
//!   - binary (locating cass), runner (one invocation)
//!   - supervisor (background indexer)
//!   - services (unified service container)
//!
//! - **mcp**: MCP adapter (depends on core)
//!   - protocol, handlers, validation, tools
//!   - sse sessions, stdio server
//!
//! - **http**: Axum adapter (depends on core and mcp)
//!   - info/health/indexer endpoints, SSE transport
//!
//! - **cli**: clap flags, logging and server lifecycle

// Command-line entry point
pub mod cli;

// Core domain logic (protocol-agnostic)
pub mod core;

// HTTP adapter
pub mod http;

// MCP (Model Context Protocol) adapter
pub mod mcp;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::error::{CassError, Result};
pub use core::services::Services;
pub use core::types::*;
