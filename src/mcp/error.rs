//! MCP-specific error types

use crate::mcp::protocol::{INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, PARSE_ERROR};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    /// JSON-RPC error code for this error
    pub fn code(&self) -> i32 {
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::InvalidParams(_) => INVALID_PARAMS,
            McpError::InternalError(_) | McpError::Io(_) | McpError::Json(_) => INTERNAL_ERROR,
        }
    }
}

impl From<crate::core::error::CassError> for McpError {
    fn from(err: crate::core::error::CassError) -> Self {
        use crate::core::error::CassError;
        match err {
            CassError::ConfigError(s) => {
                McpError::InvalidParams(format!("Configuration error: {s}"))
            }
            other => McpError::InternalError(other.to_string()),
        }
    }
}
