//! Error types for the cass MCP server.
//!
//! Only configuration loading and binary discovery fail with these
//! errors. Subprocess failures are data (`InvocationResult::Failure`)
//! and protocol errors live in the MCP adapter.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CassError>;

/// Main error type for the core module
#[derive(Error, Debug)]
pub enum CassError {
    #[error("cass binary not found: {0}")]
    BinaryNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl CassError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Startup can continue in a degraded state after these errors
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CassError::BinaryNotFound(_) | CassError::ConfigError(_) | CassError::TomlError(_)
        )
    }
}
