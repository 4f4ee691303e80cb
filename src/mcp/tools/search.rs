//! cass_search tool handler

use super::handler::{invocation_content, McpToolHandler};
use super::helpers::{agent_property, clamp_limit, push_flag, push_int, push_str};
use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::protocol::{ToolResult, ToolSchema};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    agent: Option<String>,
    workspace: Option<String>,
    limit: Option<i64>,
    days: Option<i64>,
    today: Option<bool>,
    highlight: Option<bool>,
}

fn build_args(args: &SearchArgs) -> Vec<String> {
    let mut cli = vec!["search".to_string(), args.query.clone(), "--json".to_string()];
    push_str(&mut cli, "--agent", args.agent.as_deref());
    push_str(&mut cli, "--workspace", args.workspace.as_deref());
    push_int(&mut cli, "--limit", args.limit.filter(|l| *l != 0).map(clamp_limit));
    push_int(&mut cli, "--days", args.days);
    push_flag(&mut cli, "--today", args.today);
    push_flag(&mut cli, "--highlight", args.highlight);
    cli
}

pub struct SearchHandler {
    services: Arc<Services>,
}

impl SearchHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl McpToolHandler for SearchHandler {
    fn name(&self) -> &str {
        "cass_search"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "cass_search".to_string(),
            description: "Search across all indexed coding agent histories (Copilot, Claude Code, Codex, \
                          Gemini, Cursor, Aider, etc.). Use this to find past conversations, debugging \
                          sessions, solutions and coding knowledge across all AI coding agents. \
                          Examples: query=\"authentication error\"; query=\"React useState hook\"; \
                          query=\"memory leak fix\", agent=\"claude_code\"."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query. Supports wildcards: foo* (prefix), *foo (suffix), *foo* (contains)"
                    },
                    "agent": agent_property(
                        "Filter by agent: copilot, claude_code, codex, gemini, cursor, aider, chatgpt, cline, amp, opencode, pi_agent"
                    ),
                    "workspace": {
                        "type": "string",
                        "description": "Filter by workspace/project path"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum results to return (default: 10, max: 100)",
                        "default": 10,
                        "minimum": 1,
                        "maximum": 100
                    },
                    "days": {
                        "type": "integer",
                        "description": "Filter to last N days"
                    },
                    "today": {
                        "type": "boolean",
                        "description": "Filter to today only"
                    },
                    "highlight": {
                        "type": "boolean",
                        "description": "Highlight matching terms in results"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, McpError> {
        let args: SearchArgs =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let cli = build_args(&args);
        let timeout = self.services.config.cass.default_timeout();
        let result = self.services.runner.run(&cli, timeout).await;

        Ok(invocation_content(&result))
    }
}
