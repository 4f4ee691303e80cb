//! cass_view tool handler

use super::handler::{invocation_content, McpToolHandler};
use super::helpers::push_int;
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ViewArgs {
    path: String,
    line: Option<i64>,
    context: Option<i64>,
}

fn build_args(args: &ViewArgs) -> Vec<String> {
    let mut cli = vec!["view".to_string(), args.path.clone(), "--json".to_string()];
    push_int(&mut cli, "-n", args.line);
    push_int(&mut cli, "-C", args.context);
    cli
}

pub struct ViewHandler {
    services: Arc<Services>,
}

impl ViewHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for ViewHandler {
    fn name(&self) -> &str {
        "cass_view"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "cass_view".to_string(),
            description: "View a specific conversation or message from search results. Use the \
                          source_path and line_number from search results to view full context."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to the session file (from search results)"
                    },
                    "line": {
                        "type": "integer",
                        "description": "Line number to view (from search results)"
                    },
                    "context": {
                        "type": "integer",
                        "description": "Number of context lines before/after",
                        "default": 5
                    }
                },
                "required": ["path"]
            }),
        }
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, McpError> {
        let args: ViewArgs =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let cli = build_args(&args);
        let timeout = self.services.config.cass.default_timeout();
        let result = self.services.runner.run(&cli, timeout).await;

        Ok(invocation_content(&result))
    }
}
