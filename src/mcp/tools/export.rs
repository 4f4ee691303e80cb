//! cass_export tool handler

use super::handler::{invocation_content, McpToolHandler};
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ExportArgs {
    path: String,
    #[serde(default = "default_format")]
    format: String,
}

fn default_format() -> String {
    "markdown".to_string()
}

fn build_args(args: &ExportArgs) -> Vec<String> {
    vec![
        "export".to_string(),
        args.path.clone(),
        "--format".to_string(),
        args.format.clone(),
    ]
}

pub struct ExportHandler {
    services: Arc<Services>,
}

impl ExportHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for ExportHandler {
    fn name(&self) -> &str {
        "cass_export"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "cass_export".to_string(),
            description: "Export a conversation to markdown format. Useful for sharing or archiving \
                          important conversations."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to the session file to export"
                    },
                    "format": {
                        "type": "string",
                        "description": "Export format",
                        "enum": ["markdown", "json", "html"],
                        "default": "markdown"
                    }
                },
                "required": ["path"]
            }),
        }
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, McpError> {
        let args: ExportArgs =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        // Exports write whole conversations and get a longer budget
        let cli = build_args(&args);
        let timeout = self.services.config.cass.export_timeout();
        let result = self.services.runner.run(&cli, timeout).await;

        Ok(invocation_content(&result))
    }
}
