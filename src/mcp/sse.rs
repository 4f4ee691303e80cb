//! SSE session registry
//!
//! Each `GET /sse` connection owns one session. Responses to messages
//! posted for that session are queued here and streamed back as
//! `message` events. The session is removed when its stream is dropped.

use crate::mcp::protocol::JsonRpcResponse;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Path clients POST messages to
pub const MESSAGES_PATH: &str = "/messages/";

/// Data of the initial `endpoint` event for a session
pub fn endpoint_uri(session_id: Uuid) -> String {
    format!("{MESSAGES_PATH}?session_id={}", session_id.simple())
}

/// Live SSE sessions keyed by id
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<Uuid, mpsc::UnboundedSender<String>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session
    ///
    /// The returned guard unregisters the session when dropped.
    pub fn open(self: &Arc<Self>) -> (SessionGuard, mpsc::UnboundedReceiver<String>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.sessions.insert(id, tx);
        debug!("SSE session {} opened ({} active)", id, self.sessions.len());

        let guard = SessionGuard {
            id,
            registry: Arc::clone(self),
        };
        (guard, rx)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Queue a response for a session
    ///
    /// Returns false if the session is gone. Empty responses
    /// (notifications) are dropped and count as delivered.
    pub fn send(&self, id: &Uuid, response: &JsonRpcResponse) -> bool {
        if response.is_empty() {
            return self.contains(id);
        }

        let Some(tx) = self.sessions.get(id) else {
            return false;
        };

        let payload = match serde_json::to_string(response) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to serialize response for session {}: {}", id, e);
                return false;
            }
        };

        tx.send(payload).is_ok()
    }

    fn close(&self, id: &Uuid) {
        if self.sessions.remove(id).is_some() {
            debug!("SSE session {} closed ({} active)", id, self.sessions.len());
        }
    }
}

/// Keeps a session registered while alive
pub struct SessionGuard {
    id: Uuid,
    registry: Arc<SessionRegistry>,
}

impl SessionGuard {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.close(&self.id);
    }
}
