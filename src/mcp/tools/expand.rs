//! cass_expand tool handler

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
struct ExpandArgs {
    path: String,
    line: i64,
    context: Option<i64>,
}

fn build_args(args: &ExpandArgs) -> Vec<String> {
    let mut cli = vec![
        "expand".to_string(),
        args.path.clone(),
        "-n".to_string(),
        args.line.to_string(),
        "--json".to_string(),
    ];
    push_int(&mut cli, "-C", args.context);
    cli
}

pub struct ExpandHandler {
    services: Arc<Services>,
}

impl ExpandHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for ExpandHandler {
    fn name(&self) -> &str {
        "cass_expand"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "cass_expand".to_string(),
            description: "Expand context around a specific line in a session file. Shows messages \
                          before and after a specific point in a conversation."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to the session file"
                    },
                    "line": {
                        "type": "integer",
                        "description": "Line number to expand around"
                    },
                    "context": {
                        "type": "integer",
                        "description": "Number of messages before/after to show",
                        "default": 5
                    }
                },
                "required": ["path", "line"]
            }),
        }
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, McpError> {
        let args: ExpandArgs =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let cli = build_args(&args);
        let timeout = self.services.config.cass.default_timeout();
        let result = self.services.runner.run(&cli, timeout).await;

        Ok(invocation_content(&result))
    }
}
