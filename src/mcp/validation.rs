//! Schema-level argument validation for tool calls
//!
//! Checks `required` fields, JSON types and `enum` membership against a
//! tool's input schema. Numeric bounds are not rejected here; tools
//! clamp them when building the cass command line.

use serde_json::{Map, Value};

/// Validate `args` against a JSON input schema
///
/// Returns a human-readable message describing the first violation.
pub fn validate_arguments(schema: &Value, args: &Value) -> Result<(), String> {
    let empty = Map::new();
    let args = match args {
        Value::Object(map) => map,
        Value::Null => &empty,
        other => {
            return Err(format!(
                "Arguments must be an object, got {}",
                type_name(other)
            ))
        }
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            match args.get(field) {
                None | Some(Value::Null) => {
                    return Err(format!("Missing required argument: {field}"));
                }
                Some(_) => {}
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };

    for (name, value) in args {
        // Unknown arguments and explicit nulls are ignored
        let Some(property) = properties.get(name) else {
            continue;
        };
        if value.is_null() {
            continue;
        }

        if let Some(expected) = property.get("type").and_then(Value::as_str) {
            if !matches_type(expected, value) {
                return Err(format!(
                    "Argument '{name}' must be of type {expected}, got {}",
                    type_name(value)
                ));
            }
        }

        if let Some(allowed) = property.get("enum").and_then(Value::as_array) {
            if !allowed.contains(value) {
                let options: Vec<String> = allowed.iter().map(Value::to_string).collect();
                return Err(format!(
                    "Argument '{name}' must be one of [{}], got {value}",
                    options.join(", ")
                ));
            }
        }
    }

    Ok(())
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
