//! Integration tests for the HTTP surface
//!
//! Covers the info, health and indexer endpoints, a full MCP round
//! trip over SSE and shutdown with a client still connected.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use cass_mcp::core::services::Services;
use cass_mcp::core::types::*;
use cass_mcp::http::{build_router, serve, AppState};
use cass_mcp::mcp::error::McpError;
use cass_mcp::mcp::handlers::ProtocolHandlers;
use cass_mcp::mcp::protocol::{ToolResult, ToolSchema};
use cass_mcp::mcp::tools::{McpToolHandler, ToolRegistry};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use serial_test::serial;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tower::ServiceExt as TowerServiceExt;

use crate::common::{is_alive, FakeCass};

/// Create a test application around a fake cass binary
fn create_test_app() -> (Router, Arc<Services>, FakeCass) {
    let cass = FakeCass::new();
    let services = cass.services();
    let app = build_router(AppState::new(Arc::clone(&services)));
    (app, services, cass)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post(app: &Router, uri: &str, body: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Read SSE frames until `needle` shows up
async fn read_until(body: &mut Body, needle: &str) -> String {
    let mut seen = String::new();
    let read = async {
        while !seen.contains(needle) {
            let frame = body.frame().await.expect("stream ended").unwrap();
            if let Ok(data) = frame.into_data() {
                seen.push_str(&String::from_utf8_lossy(&data));
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(10), read)
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {needle:?}"));
    seen
}

/// Open an SSE session, returning the stream body and its message endpoint
async fn open_session(app: &Router) -> (Body, String) {
    let response = get(app, "/sse").await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut body = response.into_body();
    let opening = read_until(&mut body, "session_id=").await;
    assert!(opening.contains("event: endpoint"));

    let endpoint = opening
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .expect("endpoint data")
        .trim()
        .to_string();
    (body, endpoint)
}

/// Find the `message` event answering request `id`
fn message_with_id(events: &str, id: u64) -> Value {
    let needle = format!("\"id\":{id}");
    let data = events
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .find(|line| line.contains(&needle))
        .expect("message event");
    serde_json::from_str(data).unwrap()
}

struct BrokenTool;

#[async_trait]
impl McpToolHandler for BrokenTool {
    fn name(&self) -> &str {
        "cass_broken"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "cass_broken".to_string(),
            description: "Always panics".to_string(),
            input_schema: json!({"type": "object", "properties": {}, "required": []}),
        }
    }

    async fn execute(&self, _args: Value) -> Result<ToolResult, McpError> {
        panic!("broken tool");
    }
}

#[tokio::test]
#[serial]
async fn test_health_before_initial_index() {
    let (app, services, cass) = create_test_app();
    cass.set_flag("slow_index");

    let mut rx = services.indexer.subscribe();
    let starter = {
        let services = Arc::clone(&services);
        tokio::spawn(async move { services.start_indexer().await })
    };
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.is_running))
        .await
        .unwrap()
        .unwrap();

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["server"], "cass-mcp-server");
    assert_eq!(body["background_indexer"]["is_running"], true);
    assert!(body["background_indexer"]["last_index_time"].is_null());

    services.indexer.stop().await;
    starter.await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_info_endpoint() {
    let (app, _services, cass) = create_test_app();

    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let info: InfoResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(info.name, "cass-mcp-server");
    assert_eq!(info.tools.len(), 10);
    assert_eq!(info.tools[0], "cass_search");
    assert_eq!(info.supported_agents.len(), SUPPORTED_AGENTS.len());
    assert!(info.config.watch_mode_enabled);
    assert_eq!(info.config.index_interval_seconds, 300);
    assert_eq!(info.config.binary, cass.binary().display().to_string());
    assert!(!info.background_indexer.is_running);
}

#[tokio::test]
#[serial]
async fn test_indexer_status_endpoint() {
    let (app, _services, _cass) = create_test_app();

    let response = get(&app, "/indexer/status").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["is_running"], false);
    assert_eq!(body["mode"], "stopped");
    assert_eq!(body["index_count"], 0);
}

#[tokio::test]
#[serial]
async fn test_trigger_full_rebuild() {
    let (app, services, cass) = create_test_app();
    let mut rx = services.indexer.subscribe();

    let response = post(&app, "/indexer/trigger", r#"{"full": true}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"status": "indexing", "full": true, "message": "Index operation triggered"})
    );

    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.index_count >= 1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cass.last_args(), vec!["index", "--full"]);
}

#[tokio::test]
#[serial]
async fn test_trigger_lenient_body() {
    let (app, services, _cass) = create_test_app();
    let mut rx = services.indexer.subscribe();

    let response = post(&app, "/indexer/trigger", "not json").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["full"], false);

    let response = get(&app, "/indexer/trigger").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["full"], false);

    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.index_count >= 2))
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
#[serial]
async fn test_message_for_unknown_session() {
    let (app, _services, _cass) = create_test_app();
    let ping = r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#;

    let response = post(
        &app,
        "/messages/?session_id=0123456789abcdef0123456789abcdef",
        ping,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post(&app, "/messages/?session_id=not-a-uuid", ping).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn test_sse_round_trip() {
    let (app, _services, cass) = create_test_app();

    let response = get(&app, "/sse").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    drop(response);

    let (mut body, endpoint) = open_session(&app).await;
    assert!(endpoint.starts_with("/messages/?session_id="));

    // Malformed body is rejected up front
    let response = post(&app, &endpoint, "{oops").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let call = json!({
        "jsonrpc": "2.0",
        "id": 42,
        "method": "tools/call",
        "params": {"name": "cass_search", "arguments": {"query": "auth error", "limit": 250}}
    });
    let response = post(&app, &endpoint, &call.to_string()).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let events = read_until(&mut body, "\"id\":42").await;
    assert!(events.contains("event: message"));

    let message = message_with_id(&events, 42);
    assert_eq!(message["jsonrpc"], "2.0");
    assert!(message["result"]["content"][0]["text"].is_string());
    assert!(cass.last_args().contains(&"100".to_string()));
}

#[tokio::test]
#[serial]
async fn test_panicking_tool_still_answers_on_stream() {
    let cass = FakeCass::new();
    let services = cass.services();
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(BrokenTool));
    let handlers = Arc::new(ProtocolHandlers::with_registry(registry));
    let app = build_router(AppState::with_handlers(services, handlers));

    let (mut body, endpoint) = open_session(&app).await;

    let call = json!({
        "jsonrpc": "2.0",
        "id": 9,
        "method": "tools/call",
        "params": {"name": "cass_broken", "arguments": {}}
    });
    let response = post(&app, &endpoint, &call.to_string()).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let events = read_until(&mut body, "\"id\":9").await;
    let message = message_with_id(&events, 9);
    assert_eq!(message["result"]["isError"], true);

    // The session keeps working after the failure
    let ping = r#"{"jsonrpc":"2.0","id":10,"method":"ping"}"#;
    assert_eq!(post(&app, &endpoint, ping).await.status(), StatusCode::ACCEPTED);
    let events = read_until(&mut body, "\"id\":10").await;
    assert_eq!(message_with_id(&events, 10)["result"], json!({}));
}

#[tokio::test]
#[serial]
async fn test_shutdown_with_open_sse_client() {
    let cass = FakeCass::new();
    let services = cass.services();
    services.indexer.start(true, false).await;
    let pid = cass.wait_for_watch_pids(1).await[0];
    assert!(is_alive(pid));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(serve(
        listener,
        AppState::new(Arc::clone(&services)),
        async move {
            rx.await.ok();
        },
    ));

    let mut client = TcpStream::connect(addr).await.unwrap();
    client
        .write_all(b"GET /sse HTTP/1.1\r\nHost: localhost\r\nAccept: text/event-stream\r\n\r\n")
        .await
        .unwrap();

    let mut seen = Vec::new();
    let mut buf = [0u8; 1024];
    tokio::time::timeout(Duration::from_secs(5), async {
        while !String::from_utf8_lossy(&seen).contains("session_id=") {
            let n = client.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before the endpoint event");
            seen.extend_from_slice(&buf[..n]);
        }
    })
    .await
    .expect("no endpoint event");
    assert!(String::from_utf8_lossy(&seen).starts_with("HTTP/1.1 200"));

    tx.send(()).unwrap();
    let served = tokio::time::timeout(Duration::from_secs(10), server)
        .await
        .expect("server kept running with an SSE client connected")
        .unwrap();
    assert!(served.is_ok());

    let status = services.indexer.get_status();
    assert!(!status.is_running);
    assert!(status.watch_pid.is_none());
    assert!(!is_alive(pid));

    // The client sees its stream end
    let mut rest = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), client.read_to_end(&mut rest))
        .await
        .expect("SSE stream still open after shutdown")
        .unwrap();
}
