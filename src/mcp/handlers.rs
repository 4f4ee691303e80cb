//! MCP protocol method handlers

use crate::core::services::Services;
use crate::core::types::SERVER_NAME;
use crate::mcp::error::McpError;
use crate::mcp::protocol::*;
use crate::mcp::tools::{build_registry, error_content, ToolRegistry};
use crate::mcp::validation::validate_arguments;
use futures::FutureExt as _;
use serde_json::{json, Value};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct ProtocolHandlers {
    initialized: AtomicBool,
    tool_registry: ToolRegistry,
}

impl ProtocolHandlers {
    pub fn new(services: Arc<Services>) -> Self {
        Self::with_registry(build_registry(services))
    }

    /// Build handlers around an explicit registry
    pub fn with_registry(tool_registry: ToolRegistry) -> Self {
        Self {
            initialized: AtomicBool::new(false),
            tool_registry,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Parse one raw JSON-RPC message and produce its response
    ///
    /// Never fails: parse and dispatch errors become JSON-RPC error
    /// responses. Notifications yield [`JsonRpcResponse::empty`].
    pub async fn handle_message(&self, raw: &str) -> JsonRpcResponse {
        debug!("Received: {}", raw);

        let request: JsonRpcRequest = match serde_json::from_str(raw) {
            Ok(request) => request,
            Err(e) => {
                return create_error_response(None, PARSE_ERROR, format!("Parse error: {e}"));
            }
        };

        let id = request.id.clone();
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                error!("Error processing message: {}", e);
                create_error_response(id, e.code(), e.to_string())
            }
        }
    }

    /// Route a request to its method handler
    pub async fn dispatch(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpError> {
        if request.jsonrpc != "2.0" {
            return Ok(create_error_response(
                request.id,
                INVALID_REQUEST,
                format!("Unsupported jsonrpc version: {}", request.jsonrpc),
            ));
        }

        match request.method.as_str() {
            "initialize" => self.handle_initialize(request).await,
            "notifications/initialized" | "initialized" => {
                self.handle_initialized(request).await
            }
            "tools/list" => self.handle_tools_list(request).await,
            "tools/call" => self.handle_tools_call(request).await,
            "ping" => self.handle_ping(request).await,
            method if request.id.is_none() => {
                debug!("Ignoring notification: {}", method);
                Ok(JsonRpcResponse::empty())
            }
            method => Ok(create_error_response(
                request.id,
                METHOD_NOT_FOUND,
                format!("Unknown method: {method}"),
            )),
        }
    }

    /// Handle initialize request
    pub async fn handle_initialize(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let params: InitializeParams = match request.params {
            Some(params) => serde_json::from_value(params)
                .map_err(|e| McpError::InvalidParams(e.to_string()))?,
            None => InitializeParams::default(),
        };

        match &params.client_info {
            Some(client) => info!("Client initialized: {}", client.name),
            None => info!("Client initialized"),
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Ok(JsonRpcResponse::success(
            request.id,
            serde_json::to_value(result)?,
        ))
    }

    /// Handle initialized notification
    pub async fn handle_initialized(
        &self,
        _request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        self.initialized.store(true, Ordering::SeqCst);
        info!("Server initialized");

        // Initialized is a notification, no response needed
        Ok(JsonRpcResponse::empty())
    }

    /// Handle tools/list request
    pub async fn handle_tools_list(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let tools = self.tool_registry.list();
        Ok(JsonRpcResponse::success(request.id, json!({ "tools": tools })))
    }

    /// Handle tools/call request
    ///
    /// Only a missing or malformed params envelope is a protocol error.
    /// Unknown tools, invalid arguments and handler failures are returned
    /// as a structured error payload with `isError` set.
    pub async fn handle_tools_call(
        &self,
        request: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, McpError> {
        let params_value = match request.params {
            Some(v) => v,
            None => {
                return Ok(create_error_response(
                    request.id,
                    INVALID_PARAMS,
                    "Missing params".to_string(),
                ));
            }
        };

        let params: ToolCallParams = match serde_json::from_value(params_value) {
            Ok(p) => p,
            Err(e) => {
                return Ok(create_error_response(
                    request.id,
                    INVALID_PARAMS,
                    format!("Invalid params: {e}"),
                ));
            }
        };

        info!("Tool call: {} with args: {}", params.name, params.arguments);
        let result = self.call_tool(&params.name, params.arguments).await;

        Ok(JsonRpcResponse::success(
            request.id,
            serde_json::to_value(result)?,
        ))
    }

    /// Run a tool by name, folding every failure into the result payload
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult {
        let Some(handler) = self.tool_registry.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return error_content(format!("Unknown tool: {name}"));
        };

        let arguments = match arguments {
            Value::Null => json!({}),
            other => other,
        };

        if let Err(message) = validate_arguments(&handler.schema().input_schema, &arguments) {
            warn!("Rejected {} call: {}", name, message);
            return error_content(message);
        }

        match AssertUnwindSafe(handler.execute(arguments))
            .catch_unwind()
            .await
        {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                error!("Tool {} failed: {}", name, e);
                error_content(e.to_string())
            }
            Err(_) => {
                error!("Tool {} panicked", name);
                error_content(format!("Tool {name} failed with an internal error"))
            }
        }
    }

    /// Handle ping request
    pub async fn handle_ping(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpError> {
        Ok(JsonRpcResponse::success(request.id, json!({})))
    }
}

/// Create an error response with proper structure
fn create_error_response(id: Option<Value>, code: i32, message: String) -> JsonRpcResponse {
    JsonRpcResponse::error(id, code, message)
}
