//! HTTP request handlers
//!
//! Plain JSON endpoints for server info, liveness and the background
//! indexer, plus the two halves of the MCP SSE transport.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::{future, stream, FutureExt as _, Stream, StreamExt as _};
use serde::Deserialize;
use std::panic::AssertUnwindSafe;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::state::AppState;
use crate::core::types::*;
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR};
use crate::mcp::sse::endpoint_uri;

/// Server info handler
///
/// Returns name, version, tool names, supported agents, indexer status
/// and the effective indexer configuration.
pub async fn info_handler(State(state): State<AppState>) -> Json<InfoResponse> {
    let config = &state.services.config;

    Json(InfoResponse {
        name: SERVER_NAME.to_string(),
        description: "MCP server for Coding Agent Session Search".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tools: state.handlers.registry().names(),
        supported_agents: SUPPORTED_AGENTS.iter().map(|a| a.to_string()).collect(),
        background_indexer: state.services.indexer.get_status(),
        config: ConfigSummary {
            watch_mode_enabled: config.indexer.enable_watch,
            index_on_start: config.indexer.index_on_start,
            index_interval_seconds: config.indexer.interval_secs,
            binary: state.services.runner.binary().display().to_string(),
            data_dir: state.services.runner.data_dir().display().to_string(),
        },
    })
}

/// Health check handler
///
/// Always 200 while the process serves requests; the indexer snapshot
/// tells callers whether an index pass has completed yet.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        server: SERVER_NAME.to_string(),
        background_indexer: state.services.indexer.get_status(),
    })
}

/// Background indexer status handler
pub async fn indexer_status_handler(State(state): State<AppState>) -> Json<IndexerStatus> {
    Json(state.services.indexer.get_status())
}

/// Manual index trigger handler
///
/// Accepts GET or POST. A POST body of `{"full": true}` requests a full
/// rebuild; a missing or malformed body means an incremental pass. The
/// pass runs in the background and this returns immediately.
pub async fn trigger_handler(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Json<TriggerResponse> {
    let request = if method == Method::POST && !body.is_empty() {
        serde_json::from_slice::<TriggerRequest>(&body).unwrap_or_else(|e| {
            debug!("Ignoring malformed trigger body: {}", e);
            TriggerRequest::default()
        })
    } else {
        TriggerRequest::default()
    };

    // Detached: the pass outlives this request
    drop(state.services.indexer.trigger(request.full));

    Json(TriggerResponse {
        status: "indexing".to_string(),
        full: request.full,
        message: "Index operation triggered".to_string(),
    })
}

/// SSE endpoint for MCP clients
///
/// The first event is `endpoint`, naming the URI to POST messages to.
/// Every response for the session follows as a `message` event. The
/// stream ends when the server starts shutting down.
pub async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (session, rx) = state.sessions.open();
    info!("SSE client connected: session {}", session.id());

    let endpoint = Event::default()
        .event("endpoint")
        .data(endpoint_uri(session.id()));

    // The stream owns the guard, so a disconnect closes the session
    let messages = UnboundedReceiverStream::new(rx).map(move |payload| {
        let _session = &session;
        Ok(Event::default().event("message").data(payload))
    });

    let events = stream::once(future::ready(Ok::<_, Infallible>(endpoint)))
        .chain(messages)
        .take_until(state.shutdown.clone().cancelled_owned());

    Sse::new(events).keep_alive(KeepAlive::default().interval(Duration::from_secs(15)))
}

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub session_id: String,
}

/// Message endpoint for MCP clients
///
/// Validates the session and the JSON-RPC envelope, then answers 202
/// and processes the request on its own task. The response goes out on
/// the session's SSE stream.
pub async fn messages_handler(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: Bytes,
) -> Response {
    let Ok(session_id) = Uuid::parse_str(&query.session_id) else {
        warn!("Invalid session id: {}", query.session_id);
        return (StatusCode::BAD_REQUEST, "Invalid session ID").into_response();
    };

    if !state.sessions.contains(&session_id) {
        warn!("Message for unknown session {}", session_id);
        return (StatusCode::NOT_FOUND, "Could not find session").into_response();
    }

    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Invalid message for session {}: {}", session_id, e);
            return (StatusCode::BAD_REQUEST, "Could not parse message").into_response();
        }
    };

    tokio::spawn(async move {
        let id = request.id.clone();
        let dispatched = AssertUnwindSafe(state.handlers.dispatch(request))
            .catch_unwind()
            .await;

        let response = match dispatched {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!("Error processing message: {}", e);
                JsonRpcResponse::error(id, e.code(), e.to_string())
            }
            Err(_) => {
                error!("Handler panicked on message for session {}", session_id);
                JsonRpcResponse::error(id, INTERNAL_ERROR, "Internal error".to_string())
            }
        };

        if !state.sessions.send(&session_id, &response) {
            debug!("Session {} closed before response was sent", session_id);
        }
    });

    (StatusCode::ACCEPTED, "Accepted").into_response()
}
