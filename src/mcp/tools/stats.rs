//! cass_stats tool handler

use super::handler::{invocation_content, McpToolHandler};
use super::helpers::empty_schema;
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub struct StatsHandler {
    services: Arc<Services>,
}

impl StatsHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for StatsHandler {
    fn name(&self) -> &str {
        "cass_stats"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "cass_stats".to_string(),
            description: "Get statistics about indexed coding agent data. Returns total conversations \
                          and messages indexed, a breakdown by agent (Copilot, Claude, etc.), top workspaces \
                          and the date range of indexed data."
                .to_string(),
            input_schema: empty_schema(),
        }
    }

    async fn execute(&self, _args: Value) -> Result<ToolResult, McpError> {
        let cli = ["stats", "--json"].map(String::from);
        let timeout = self.services.config.cass.default_timeout();
        let result = self.services.runner.run(&cli, timeout).await;

        Ok(invocation_content(&result))
    }
}
