//! Core data types for the cass MCP server.
//!
//! This module defines the normalized subprocess outcome, the
//! background indexer status snapshot, and the HTTP payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};

/// Agent identifiers recognized by `cass search --agent`
pub const SUPPORTED_AGENTS: &[&str] = &[
    "copilot",
    "claude_code",
    "codex",
    "gemini",
    "cursor",
    "aider",
    "chatgpt",
    "cline",
    "amp",
    "opencode",
    "pi_agent",
];

/// Server name reported by every surface
pub const SERVER_NAME: &str = "cass-mcp-server";

/// Successful stdout of a cass invocation
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// stdout parsed as JSON
    Json(Value),
    /// stdout was not JSON; trimmed text
    Text(String),
}

/// Why a cass invocation failed
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationFailure {
    /// The process ran and exited non-zero
    Exit {
        exit_code: Option<i32>,
        stderr: String,
        stdout: String,
    },
    /// Timeout, spawn failure, or any other error
    Message(String),
}

/// Normalized outcome of one subprocess run
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationResult {
    Success(CommandOutput),
    Failure(InvocationFailure),
}

impl InvocationResult {
    pub fn json(value: Value) -> Self {
        Self::Success(CommandOutput::Json(value))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Success(CommandOutput::Text(text.into()))
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::Failure(InvocationFailure::Message(message.into()))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Wire shape returned to tool callers
    pub fn to_value(&self) -> Value {
        match self {
            Self::Success(CommandOutput::Json(value)) => value.clone(),
            Self::Success(CommandOutput::Text(text)) => json!({ "output": text }),
            Self::Failure(InvocationFailure::Exit {
                exit_code,
                stderr,
                stdout,
            }) => json!({
                "error": true,
                "exit_code": exit_code,
                "stderr": stderr,
                "stdout": stdout,
            }),
            Self::Failure(InvocationFailure::Message(message)) => json!({
                "error": true,
                "message": message,
            }),
        }
    }
}

impl Serialize for InvocationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Steady-state mode of the background indexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexerMode {
    Stopped,
    /// Initial pass running, or a crashed watch process awaiting restart
    Starting,
    Watch,
    Periodic,
}

/// Snapshot of the background indexer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexerStatus {
    pub is_running: bool,
    pub mode: IndexerMode,
    pub watch_pid: Option<u32>,
    pub last_index_time: Option<DateTime<Utc>>,
    pub index_count: u64,
    pub failed_index_count: u64,
    pub watch_restarts: u64,
    pub index_interval_seconds: Option<u64>,
}

impl Default for IndexerStatus {
    fn default() -> Self {
        Self {
            is_running: false,
            mode: IndexerMode::Stopped,
            watch_pid: None,
            last_index_time: None,
            index_count: 0,
            failed_index_count: 0,
            watch_restarts: 0,
            index_interval_seconds: None,
        }
    }
}

/// Optional body of `POST /indexer/trigger`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerRequest {
    #[serde(default)]
    pub full: bool,
}

/// Response from `/indexer/trigger`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub status: String,
    pub full: bool,
    pub message: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub server: String,
    pub background_indexer: IndexerStatus,
}

/// Effective indexer settings reported by `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub watch_mode_enabled: bool,
    pub index_on_start: bool,
    pub index_interval_seconds: u64,
    pub binary: String,
    pub data_dir: String,
}

/// Response from `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub name: String,
    pub description: String,
    pub version: String,
    pub tools: Vec<String>,
    pub supported_agents: Vec<String>,
    pub background_indexer: IndexerStatus,
    pub config: ConfigSummary,
}
