//! cass_timeline tool handler

use super::handler::{invocation_content, McpToolHandler};
use super::helpers::{agent_property, push_str};
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Window used when neither `today` nor `days` is given
const DEFAULT_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
struct TimelineArgs {
    days: Option<i64>,
    today: Option<bool>,
    group_by: Option<String>,
    agent: Option<String>,
}

/// `today` wins over `days`; with neither, the last week is shown
fn build_args(args: &TimelineArgs) -> Vec<String> {
    let mut cli = vec!["timeline".to_string(), "--json".to_string()];

    match (args.today.unwrap_or(false), args.days.filter(|d| *d != 0)) {
        (true, _) => cli.push("--today".to_string()),
        (false, Some(days)) => cli.extend(["--days".to_string(), days.to_string()]),
        (false, None) => cli.extend(["--days".to_string(), DEFAULT_DAYS.to_string()]),
    }

    push_str(&mut cli, "--group-by", args.group_by.as_deref());
    push_str(&mut cli, "--agent", args.agent.as_deref());
    cli
}

pub struct TimelineHandler {
    services: Arc<Services>,
}

impl TimelineHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for TimelineHandler {
    fn name(&self) -> &str {
        "cass_timeline"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "cass_timeline".to_string(),
            description: "Show activity timeline: when were coding agents active? Useful for \
                          understanding work patterns and finding conversations by time period."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "days": {
                        "type": "integer",
                        "description": "Show last N days of activity",
                        "default": DEFAULT_DAYS
                    },
                    "today": {
                        "type": "boolean",
                        "description": "Show only today's activity"
                    },
                    "group_by": {
                        "type": "string",
                        "description": "Group results by: hour, day, week",
                        "enum": ["hour", "day", "week"],
                        "default": "day"
                    },
                    "agent": agent_property("Filter to specific agent")
                },
                "required": []
            }),
        }
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, McpError> {
        let args: TimelineArgs =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let cli = build_args(&args);
        let timeout = self.services.config.cass.default_timeout();
        let result = self.services.runner.run(&cli, timeout).await;

        Ok(invocation_content(&result))
    }
}
