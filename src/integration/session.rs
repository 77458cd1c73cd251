//! Session manager (C5)
//!
//! Tracks one [`Session`] per connection: its lifecycle state, the
//! negotiated protocol version, the peer's declared info/capabilities, its
//! logging threshold, its resource subscriptions, and the `reply!` closure
//! bound to its transport. §4.5 allows exactly these state transitions:
//!
//! ```text
//! disconnected -> initializing -> ready
//! initializing -> error
//! ready -> error | terminated
//! error -> disconnected
//! ```
//!
//! Any other transition is rejected with `McpError::InvalidStateTransition`.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::integration::error::{McpError, McpResult};
use crate::protocol::message::JsonRpcMessage;
use crate::protocol::types::{
    ClientCapabilities, ClientInfo, LogLevel, ProtocolVersion, ServerCapabilities, ServerInfo,
};

/// Lifecycle state of a session, per §4.5's transition diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Initializing,
    Ready,
    Error,
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Initializing => "initializing",
            SessionState::Ready => "ready",
            SessionState::Error => "error",
            SessionState::Terminated => "terminated",
        };
        write!(f, "{s}")
    }
}

impl SessionState {
    /// Whether moving from `self` to `to` is one of the §4.5 edges.
    fn can_transition_to(self, to: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, to),
            (Disconnected, Initializing)
                | (Initializing, Ready)
                | (Initializing, Error)
                | (Ready, Error)
                | (Ready, Terminated)
                | (Error, Disconnected)
        )
    }
}

/// The closure a session uses to write a message back over its owning
/// transport. Bound once at session creation; callers never need to know
/// which transport (stdio, HTTP/SSE, in-memory) is behind it.
pub type ReplySender =
    Arc<dyn Fn(JsonRpcMessage) -> BoxFuture<'static, McpResult<()>> + Send + Sync>;

/// Per-connection session record (§3).
pub struct Session {
    pub session_id: String,
    state: SessionState,
    pub protocol_version: Option<ProtocolVersion>,
    pub client_info: Option<ClientInfo>,
    pub client_capabilities: Option<ClientCapabilities>,
    pub server_info: ServerInfo,
    pub server_capabilities: ServerCapabilities,
    log_level: LogLevel,
    resource_subscriptions: HashSet<String>,
    pub error_info: Option<String>,
    reply: ReplySender,
}

impl Session {
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn resource_subscriptions(&self) -> &HashSet<String> {
        &self.resource_subscriptions
    }

    /// Send `message` through this session's bound transport.
    pub async fn reply(&self, message: JsonRpcMessage) -> McpResult<()> {
        (self.reply)(message).await
    }
}

/// Concurrent `session-id -> Session` table (§3's ownership: "co-owned by
/// the server via the session table, for notification fan-out").
#[derive(Clone, Default)]
pub struct SessionManager {
    sessions: Arc<DashMap<String, Mutex<Session>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Register a new session in `disconnected`, bound to `reply`.
    pub fn create_session(
        &self,
        session_id: impl Into<String>,
        server_info: ServerInfo,
        server_capabilities: ServerCapabilities,
        reply: ReplySender,
    ) -> String {
        let session_id = session_id.into();
        let session = Session {
            session_id: session_id.clone(),
            state: SessionState::Disconnected,
            protocol_version: None,
            client_info: None,
            client_capabilities: None,
            server_info,
            server_capabilities,
            log_level: LogLevel::default(),
            resource_subscriptions: HashSet::new(),
            error_info: None,
            reply,
        };
        self.sessions.insert(session_id.clone(), Mutex::new(session));
        session_id
    }

    pub fn remove_session(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Run `f` against the session's current state, returning `None` if the
    /// session is unknown.
    pub fn with_session<R>(&self, session_id: &str, f: impl FnOnce(&Session) -> R) -> Option<R> {
        self.sessions.get(session_id).map(|entry| f(&entry.value().lock()))
    }

    fn transition(&self, session_id: &str, to: SessionState) -> McpResult<()> {
        let entry = self
            .sessions
            .get(session_id)
            .ok_or_else(|| McpError::custom(format!("unknown session: {session_id}")))?;
        let mut session = entry.value().lock();
        if !session.state.can_transition_to(to) {
            return Err(McpError::invalid_state_transition(
                session.state.to_string(),
                to.to_string(),
            ));
        }
        session.state = to;
        Ok(())
    }

    /// Move a session to `initializing`, recording the negotiated version
    /// and the client's declared info/capabilities, per §4.5's handshake.
    pub fn begin_initialize(
        &self,
        session_id: &str,
        requested_version: &str,
        client_info: ClientInfo,
        client_capabilities: ClientCapabilities,
    ) -> McpResult<ProtocolVersion> {
        self.transition(session_id, SessionState::Initializing)?;
        let negotiated = ProtocolVersion::negotiate(requested_version);
        let entry = self
            .sessions
            .get(session_id)
            .ok_or_else(|| McpError::custom(format!("unknown session: {session_id}")))?;
        let mut session = entry.value().lock();
        session.protocol_version = Some(negotiated.clone());
        session.client_info = Some(client_info);
        session.client_capabilities = Some(client_capabilities);
        Ok(negotiated)
    }

    /// Move a session to `ready` on receipt of `notifications/initialized`.
    pub fn complete_initialize(&self, session_id: &str) -> McpResult<()> {
        self.transition(session_id, SessionState::Ready)
    }

    pub fn mark_error(&self, session_id: &str, reason: impl Into<String>) -> McpResult<()> {
        self.transition(session_id, SessionState::Error)?;
        if let Some(entry) = self.sessions.get(session_id) {
            entry.value().lock().error_info = Some(reason.into());
        }
        Ok(())
    }

    pub fn mark_terminated(&self, session_id: &str) -> McpResult<()> {
        self.transition(session_id, SessionState::Terminated)
    }

    pub fn reset_to_disconnected(&self, session_id: &str) -> McpResult<()> {
        self.transition(session_id, SessionState::Disconnected)
    }

    /// Reject any non-`initialize` request before the session reaches
    /// `ready`, per §4.5 ("clients MUST NOT send requests other than pings
    /// before the server has responded to `initialize`" applies symmetrically
    /// to the server's own dispatch).
    pub fn ensure_can_dispatch(&self, session_id: &str, method: &str) -> McpResult<()> {
        let state = self
            .with_session(session_id, |s| s.state())
            .ok_or_else(|| McpError::custom(format!("unknown session: {session_id}")))?;
        if matches!(state, SessionState::Initializing | SessionState::Disconnected)
            && method != crate::protocol::constants::methods::INITIALIZE
            && method != crate::protocol::constants::methods::INITIALIZED
        {
            return Err(McpError::invalid_request(format!(
                "session is not ready; rejecting {method}"
            )));
        }
        Ok(())
    }

    pub fn set_log_level(&self, session_id: &str, level: LogLevel) {
        if let Some(entry) = self.sessions.get(session_id) {
            entry.value().lock().log_level = level;
        }
    }

    pub fn log_level(&self, session_id: &str) -> LogLevel {
        self.with_session(session_id, |s| s.log_level())
            .unwrap_or_default()
    }

    pub fn subscribe_resource(&self, session_id: &str, uri: &str) {
        if let Some(entry) = self.sessions.get(session_id) {
            entry.value().lock().resource_subscriptions.insert(uri.to_string());
        }
    }

    pub fn unsubscribe_resource(&self, session_id: &str, uri: &str) {
        if let Some(entry) = self.sessions.get(session_id) {
            entry.value().lock().resource_subscriptions.remove(uri);
        }
    }

    /// Session-ids currently `ready` (i.e. "initialized" in spec terms) —
    /// the eligible audience for `*/list_changed` fan-out.
    pub fn ready_session_ids(&self) -> Vec<String> {
        self.sessions
            .iter()
            .filter(|e| e.value().lock().state == SessionState::Ready)
            .map(|e| e.key().clone())
            .collect()
    }

    /// Write `message` to `session_id`'s transport, if the session exists.
    pub async fn reply(&self, session_id: &str, message: JsonRpcMessage) -> McpResult<()> {
        let reply_fn = {
            let entry = self
                .sessions
                .get(session_id)
                .ok_or_else(|| McpError::custom(format!("unknown session: {session_id}")))?;
            entry.value().lock().reply.clone()
        };
        reply_fn(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::ServerCapabilities;

    fn noop_reply() -> ReplySender {
        Arc::new(|_msg| Box::pin(async { Ok(()) }))
    }

    fn manager_with_session(id: &str) -> SessionManager {
        let manager = SessionManager::new();
        manager.create_session(
            id,
            ServerInfo {
                name: "test".into(),
                version: "0.1".into(),
            },
            ServerCapabilities::default(),
            noop_reply(),
        );
        manager
    }

    #[test]
    fn full_handshake_transitions() {
        let manager = manager_with_session("s1");
        manager
            .begin_initialize(
                "s1",
                "2025-06-18",
                ClientInfo {
                    name: "t".into(),
                    version: "1".into(),
                },
                ClientCapabilities::default(),
            )
            .unwrap();
        assert_eq!(
            manager.with_session("s1", |s| s.state()).unwrap(),
            SessionState::Initializing
        );
        manager.complete_initialize("s1").unwrap();
        assert!(manager.with_session("s1", |s| s.is_ready()).unwrap());
    }

    #[test]
    fn illegal_transition_is_rejected() {
        let manager = manager_with_session("s1");
        let err = manager.complete_initialize("s1").unwrap_err();
        assert!(matches!(err, McpError::InvalidStateTransition { .. }));
    }

    #[test]
    fn version_fallback_on_unsupported_request() {
        let manager = manager_with_session("s1");
        let negotiated = manager
            .begin_initialize(
                "s1",
                "1999-01-01",
                ClientInfo {
                    name: "t".into(),
                    version: "1".into(),
                },
                ClientCapabilities::default(),
            )
            .unwrap();
        assert_eq!(negotiated, ProtocolVersion::current());
    }

    #[test]
    fn initializing_session_rejects_non_initialize_requests() {
        let manager = manager_with_session("s1");
        manager
            .begin_initialize(
                "s1",
                "2025-06-18",
                ClientInfo {
                    name: "t".into(),
                    version: "1".into(),
                },
                ClientCapabilities::default(),
            )
            .unwrap();
        assert!(manager.ensure_can_dispatch("s1", "tools/list").is_err());
        assert!(manager
            .ensure_can_dispatch("s1", "notifications/initialized")
            .is_ok());
    }

    #[test]
    fn ready_session_ids_excludes_non_ready() {
        let manager = manager_with_session("s1");
        manager.create_session(
            "s2",
            ServerInfo {
                name: "test".into(),
                version: "0.1".into(),
            },
            ServerCapabilities::default(),
            noop_reply(),
        );
        manager
            .begin_initialize(
                "s1",
                "2025-06-18",
                ClientInfo {
                    name: "t".into(),
                    version: "1".into(),
                },
                ClientCapabilities::default(),
            )
            .unwrap();
        manager.complete_initialize("s1").unwrap();
        assert_eq!(manager.ready_session_ids(), vec!["s1".to_string()]);
    }

    #[test]
    fn resource_subscription_tracking() {
        let manager = manager_with_session("s1");
        manager.subscribe_resource("s1", "file:///x");
        assert!(manager
            .with_session("s1", |s| s.resource_subscriptions().contains("file:///x"))
            .unwrap());
        manager.unsubscribe_resource("s1", "file:///x");
        assert!(manager
            .with_session("s1", |s| s.resource_subscriptions().is_empty())
            .unwrap());
    }
}
