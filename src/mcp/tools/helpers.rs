//! Helper functions for mapping tool arguments to cass flags
//!
//! Optional parameters are forwarded only when set to a "truthy" value:
//! non-empty strings, non-zero integers and `true`.

use crate::core::types::SUPPORTED_AGENTS;
use serde_json::{json, Value};

/// Upper bound for `--limit`
pub const MAX_LIMIT: i64 = 100;

/// Clamp a requested result limit to `[1, MAX_LIMIT]`
pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_LIMIT)
}

/// Append `flag value` when `value` is a non-empty string
pub fn push_str(args: &mut Vec<String>, flag: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}

/// Append `flag value` when `value` is a non-zero integer
pub fn push_int(args: &mut Vec<String>, flag: &str, value: Option<i64>) {
    if let Some(value) = value.filter(|v| *v != 0) {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}

/// Append a bare flag when `enabled`
pub fn push_flag(args: &mut Vec<String>, flag: &str, enabled: Option<bool>) {
    if enabled.unwrap_or(false) {
        args.push(flag.to_string());
    }
}

/// JSON schema fragment for the agent filter
pub fn agent_property(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description,
        "enum": SUPPORTED_AGENTS,
    })
}

/// Schema for tools that take no arguments
pub fn empty_schema() -> Value {
    json!({
        "type": "object",
        "properties": {},
        "required": []
    })
}
