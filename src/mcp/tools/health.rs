//! cass_health tool handler

use super::handler::{invocation_content, McpToolHandler};
use super::helpers::empty_schema;
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub struct HealthHandler {
    services: Arc<Services>,
}

impl HealthHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for HealthHandler {
    fn name(&self) -> &str {
        "cass_health"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "cass_health".to_string(),
            description: "Quick health check of the cass index. Returns whether the index is healthy \
                          and ready for queries."
                .to_string(),
            input_schema: empty_schema(),
        }
    }

    async fn execute(&self, _args: Value) -> Result<ToolResult, McpError> {
        let cli = ["health", "--json"].map(String::from);
        let timeout = self.services.config.cass.default_timeout();
        let result = self.services.runner.run(&cli, timeout).await;

        Ok(invocation_content(&result))
    }
}
