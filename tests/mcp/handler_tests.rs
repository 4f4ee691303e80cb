//! MCP handler tests
//!
//! Drive `ProtocolHandlers` with raw JSON-RPC messages and a fake cass
//! script, checking both the protocol envelope and the cass command line.

#[cfg(test)]
mod tests {
    use crate::common::FakeCass;
    use cass_mcp::mcp::handlers::ProtocolHandlers;
    use cass_mcp::mcp::protocol::*;
    use cass_mcp::mcp::tools::TOOL_NAMES;
    use serde_json::{json, Value};
    use serial_test::serial;

    fn create_test_handlers() -> (ProtocolHandlers, FakeCass) {
        let cass = FakeCass::new();
        (ProtocolHandlers::new(cass.services()), cass)
    }

    async fn call_tool(handlers: &ProtocolHandlers, name: &str, arguments: Value) -> Value {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": {"name": name, "arguments": arguments}
        });
        let response = handlers.handle_message(&request.to_string()).await;
        assert!(response.error.is_none(), "unexpected error: {:?}", response.error);
        assert_eq!(response.id, Some(json!(7)));
        response.result.unwrap()
    }

    /// Parse the single text block of a tool result
    fn payload(result: &Value) -> Value {
        let content = result["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["type"], "text");
        serde_json::from_str(content[0]["text"].as_str().unwrap()).unwrap()
    }

    #[tokio::test]
    #[serial]
    async fn test_initialize_handler() {
        let (handlers, _cass) = create_test_handlers();

        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: "initialize".to_string(),
            params: Some(json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {"tools": {}},
                "clientInfo": {"name": "test", "version": "1.0"}
            })),
        };

        let response = handlers.handle_initialize(request).await.unwrap();

        assert_eq!(response.jsonrpc, "2.0");
        assert!(response.error.is_none());

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "cass-mcp-server");
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
    }

    #[tokio::test]
    #[serial]
    async fn test_initialized_notification_has_no_response() {
        let (handlers, _cass) = create_test_handlers();

        for method in ["notifications/initialized", "initialized"] {
            let raw = json!({"jsonrpc": "2.0", "method": method}).to_string();
            let response = handlers.handle_message(&raw).await;
            assert!(response.is_empty());
        }
        assert!(handlers.is_initialized());
    }

    #[tokio::test]
    #[serial]
    async fn test_tools_list_has_all_tools() {
        let (handlers, _cass) = create_test_handlers();

        let response = handlers
            .handle_message(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
            .await;

        let result = response.result.unwrap();
        let tools = result["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 10);

        let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, TOOL_NAMES);

        for tool in tools {
            assert!(!tool["description"].as_str().unwrap().is_empty());
            assert_eq!(tool["inputSchema"]["type"], "object");
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_ping() {
        let (handlers, _cass) = create_test_handlers();
        let response = handlers
            .handle_message(r#"{"jsonrpc":"2.0","id":"abc","method":"ping"}"#)
            .await;
        assert_eq!(response.id, Some(json!("abc")));
        assert_eq!(response.result, Some(json!({})));
    }

    #[tokio::test]
    #[serial]
    async fn test_search_limit_is_clamped() {
        let (handlers, cass) = create_test_handlers();

        let result = call_tool(
            &handlers,
            "cass_search",
            json!({"query": "auth error", "limit": 250}),
        )
        .await;

        assert!(result.get("isError").is_none());
        assert_eq!(payload(&result), json!({"hits": [], "total": 0}));

        let args = cass.last_args();
        assert_eq!(args, vec!["search", "auth error", "--json", "--limit", "100"]);
        assert!(!args.contains(&"250".to_string()));
    }

    #[tokio::test]
    #[serial]
    async fn test_exit_code_failure_payload() {
        let (handlers, cass) = create_test_handlers();
        cass.set_flag("corrupt");

        let result = call_tool(&handlers, "cass_stats", json!({})).await;

        assert_eq!(result["isError"], true);
        assert_eq!(
            payload(&result),
            json!({"error": true, "exit_code": 2, "stderr": "index corrupted", "stdout": ""})
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_text_output_is_wrapped() {
        let (handlers, _cass) = create_test_handlers();

        let result = call_tool(&handlers, "cass_health", json!({})).await;
        assert_eq!(payload(&result), json!({"output": "index ok"}));
    }

    #[tokio::test]
    #[serial]
    async fn test_unknown_tool_is_structured_failure() {
        let (handlers, _cass) = create_test_handlers();

        let result = call_tool(&handlers, "cass_delete_everything", json!({})).await;

        assert_eq!(result["isError"], true);
        assert_eq!(
            payload(&result),
            json!({"error": true, "message": "Unknown tool: cass_delete_everything"})
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_invalid_enum_is_rejected_before_invocation() {
        let (handlers, cass) = create_test_handlers();

        let result = call_tool(
            &handlers,
            "cass_export",
            json!({"path": "/s.jsonl", "format": "pdf"}),
        )
        .await;

        assert_eq!(result["isError"], true);
        assert_eq!(payload(&result)["error"], true);
        assert!(cass.last_args().is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn test_missing_required_argument() {
        let (handlers, cass) = create_test_handlers();

        let result = call_tool(&handlers, "cass_expand", json!({"path": "/s.jsonl"})).await;

        assert_eq!(result["isError"], true);
        assert!(payload(&result)["message"]
            .as_str()
            .unwrap()
            .contains("line"));
        assert!(cass.last_args().is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn test_timeline_defaults() {
        let (handlers, cass) = create_test_handlers();

        call_tool(&handlers, "cass_timeline", Value::Null).await;
        assert_eq!(cass.last_args(), vec!["timeline", "--json", "--days", "7"]);
    }

    #[tokio::test]
    #[serial]
    async fn test_index_tool_full() {
        let (handlers, cass) = create_test_handlers();

        let result = call_tool(&handlers, "cass_index", json!({"full": true})).await;
        assert_eq!(payload(&result), json!({"indexed": true}));
        assert_eq!(cass.last_args(), vec!["index", "--full"]);
    }

    #[tokio::test]
    #[serial]
    async fn test_tools_call_without_params() {
        let (handlers, _cass) = create_test_handlers();

        let response = handlers
            .handle_message(r#"{"jsonrpc":"2.0","id":9,"method":"tools/call"}"#)
            .await;

        let error = response.error.unwrap();
        assert_eq!(error.code, INVALID_PARAMS);
        assert_eq!(response.id, Some(json!(9)));
    }
}
