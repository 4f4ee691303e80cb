//! cass_capabilities tool handler

use super::handler::{invocation_content, McpToolHandler};
use super::helpers::empty_schema;
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub struct CapabilitiesHandler {
    services: Arc<Services>,
}

impl CapabilitiesHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for CapabilitiesHandler {
    fn name(&self) -> &str {
        "cass_capabilities"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "cass_capabilities".to_string(),
            description: "Discover available features, supported agents and limits. Use this to check \
                          what connectors are available and what features the search supports."
                .to_string(),
            input_schema: empty_schema(),
        }
    }

    async fn execute(&self, _args: Value) -> Result<ToolResult, McpError> {
        let cli = ["capabilities", "--json"].map(String::from);
        let timeout = self.services.config.cass.default_timeout();
        let result = self.services.runner.run(&cli, timeout).await;

        Ok(invocation_content(&result))
    }
}
