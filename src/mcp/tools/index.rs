//! cass_index tool handler

use super::handler::{invocation_content, McpToolHandler};
use super::helpers::push_flag;
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
struct IndexArgs {
    full: Option<bool>,
}

fn build_args(args: &IndexArgs) -> Vec<String> {
    let mut cli = vec!["index".to_string()];
    push_flag(&mut cli, "--full", args.full);
    cli
}

/// Runs an index pass inline and returns its output
///
/// Unlike `/indexer/trigger` this waits for cass to finish, bounded by
/// the index timeout.
pub struct IndexHandler {
    services: Arc<Services>,
}

impl IndexHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for IndexHandler {
    fn name(&self) -> &str {
        "cass_index"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "cass_index".to_string(),
            description: "Trigger re-indexing of agent histories. Use this to refresh the index after \
                          new conversations, or to do a full rebuild. Note: this may take some time \
                          depending on the amount of data."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "full": {
                        "type": "boolean",
                        "description": "Do a full rebuild (slower but thorough)",
                        "default": false
                    }
                },
                "required": []
            }),
        }
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, McpError> {
        let args: IndexArgs =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let cli = build_args(&args);
        let timeout = self.services.config.cass.index_timeout();
        let result = self.services.runner.run(&cli, timeout).await;

        Ok(invocation_content(&result))
    }
}
