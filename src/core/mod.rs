//! Core domain logic (protocol-agnostic)
//!
//! This module contains everything that is independent of the
//! transport protocols (HTTP, SSE, stdio).
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Invocation results, indexer status, HTTP payloads
//! - **binary**: Locating the cass binary
//! - **runner**: Running cass as a subprocess
//! - **supervisor**: Background indexer (watch / periodic)
//! - **services**: Unified service container

pub mod binary;
pub mod config;
pub mod error;
pub mod runner;
pub mod services;
pub mod supervisor;
pub mod types;

// Re-export key types for convenience
pub use config::Config;
pub use error::{CassError, Result};
pub use runner::CassRunner;
pub use services::Services;
pub use supervisor::BackgroundIndexer;
