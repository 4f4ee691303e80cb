//! cass_context tool handler

use super::handler::{invocation_content, McpToolHandler};
use super::helpers::{clamp_limit, push_int};
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ContextArgs {
    path: String,
    limit: Option<i64>,
}

fn build_args(args: &ContextArgs) -> Vec<String> {
    let mut cli = vec!["context".to_string(), args.path.clone(), "--json".to_string()];
    push_int(&mut cli, "--limit", args.limit.filter(|l| *l != 0).map(clamp_limit));
    cli
}

pub struct ContextHandler {
    services: Arc<Services>,
}

impl ContextHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for ContextHandler {
    fn name(&self) -> &str {
        "cass_context"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "cass_context".to_string(),
            description: "Find related sessions for a given file or project path. Use this to discover \
                          what AI agents have worked on in a specific codebase or file."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "File or directory path to find related sessions for"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum related sessions to return",
                        "default": 10,
                        "minimum": 1,
                        "maximum": 100
                    }
                },
                "required": ["path"]
            }),
        }
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, McpError> {
        let args: ContextArgs =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let cli = build_args(&args);
        let timeout = self.services.config.cass.default_timeout();
        let result = self.services.runner.run(&cli, timeout).await;

        Ok(invocation_content(&result))
    }
}
