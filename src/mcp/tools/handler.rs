//! Tool handler trait and common types

use crate::core::types::InvocationResult;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ContentBlock, ToolResult, ToolSchema};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Trait for MCP tool implementations
///
/// Each tool (cass_search, cass_stats, etc.) implements this trait
/// to provide schema and execution logic.
#[async_trait]
pub trait McpToolHandler: Send + Sync {
    /// Tool name (e.g., "cass_search")
    fn name(&self) -> &str;

    /// Tool schema for tools/list
    fn schema(&self) -> ToolSchema;

    /// Execute tool with arguments
    async fn execute(&self, args: Value) -> Result<ToolResult, McpError>;
}

/// Helper function to create a text content block
pub fn text_content(text: String) -> ToolResult {
    ToolResult {
        content: vec![ContentBlock::Text { text }],
        is_error: false,
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Render a cass invocation as the single text payload of a tool result
pub fn invocation_content(result: &InvocationResult) -> ToolResult {
    ToolResult {
        content: vec![ContentBlock::Text {
            text: pretty(&result.to_value()),
        }],
        is_error: !result.is_success(),
    }
}

/// Structured failure payload for tool-level errors
pub fn error_content(message: impl Into<String>) -> ToolResult {
    let value = json!({ "error": true, "message": message.into() });
    ToolResult {
        content: vec![ContentBlock::Text {
            text: pretty(&value),
        }],
        is_error: true,
    }
}
