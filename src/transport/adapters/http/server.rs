//! HTTP server transport (C3 / §4.3)
//!
//! One Axum router serves two routes per session:
//!
//! - `GET /sse` opens a Server-Sent Events stream, mints a session id, and
//!   immediately emits an `endpoint` event whose `data` is
//!   `/messages?session_id=<id>`.
//! - `POST /messages?session_id=<id>` accepts one JSON-RPC message per
//!   request body, hands it to the installed [`MessageHandler`], and replies
//!   `202 Accepted` without a body — the actual response (or any
//!   server-initiated notification) is delivered out-of-band over that
//!   session's SSE stream.
//!
//! `Transport::send` therefore targets whichever session
//! [`Transport::set_session_context`] last selected; callers (the dispatcher,
//! via `integration::server`) set the context to the session that owns the
//! in-flight request before sending its response.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};

use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use bytes::Bytes;
use dashmap::DashMap;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::protocol::{JsonRpcMessage, JsonRpcMessageTrait, MessageContext, MessageHandler, Transport, TransportBuilder, TransportError};

use super::config::HttpServerTransportConfig;

#[derive(Clone)]
struct AppState {
    handler: Arc<dyn MessageHandler<()>>,
    sessions: Arc<DashMap<String, mpsc::Sender<String>>>,
    allowed_origins: Option<Arc<Vec<String>>>,
    sse_channel_capacity: usize,
    sse_keep_alive: std::time::Duration,
}

fn check_origin(state: &AppState, headers: &HeaderMap) -> Option<Response> {
    let allowed = state.allowed_origins.as_ref()?;
    let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
    match origin {
        Some(origin) if allowed.iter().any(|allowed| allowed == origin) => None,
        _ => Some((StatusCode::FORBIDDEN, "origin not allowed").into_response()),
    }
}

/// Bridges a per-session [`mpsc::Receiver`] to an SSE [`Event`] stream and
/// removes the session from the shared table once the stream is dropped
/// (client disconnect, slow consumer, or server shutdown).
struct SessionStream {
    inner: ReceiverStream<String>,
    session_id: String,
    sessions: Arc<DashMap<String, mpsc::Sender<String>>>,
}

impl Stream for SessionStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        Pin::new(&mut this.inner)
            .poll_next(cx)
            .map(|item| item.map(|data| Ok(Event::default().data(data))))
    }
}

impl Drop for SessionStream {
    fn drop(&mut self) {
        self.sessions.remove(&self.session_id);
    }
}

async fn sse_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(rejection) = check_origin(&state, &headers) {
        return rejection;
    }

    let session_id = Uuid::new_v4().to_string();
    let (tx, rx) = mpsc::channel(state.sse_channel_capacity);
    state.sessions.insert(session_id.clone(), tx);

    let endpoint_path = format!("/messages?session_id={session_id}");
    let endpoint_event = stream::once(async move {
        Ok::<Event, Infallible>(Event::default().event("endpoint").data(endpoint_path))
    });

    let session_stream = SessionStream {
        inner: ReceiverStream::new(rx),
        session_id,
        sessions: state.sessions.clone(),
    };

    let keep_alive = KeepAlive::new().interval(state.sse_keep_alive);
    Sse::new(endpoint_event.chain(session_stream))
        .keep_alive(keep_alive)
        .into_response()
}

#[derive(Deserialize)]
struct MessagesQuery {
    session_id: String,
}

async fn messages_handler(
    State(state): State<AppState>,
    Query(query): Query<MessagesQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(rejection) = check_origin(&state, &headers) {
        return rejection;
    }

    if !state.sessions.contains_key(&query.session_id) {
        return (StatusCode::NOT_FOUND, "unknown session_id; GET /sse first").into_response();
    }

    let message: JsonRpcMessage = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(error) => {
            return (
                StatusCode::BAD_REQUEST,
                format!("invalid JSON-RPC message: {error}"),
            )
                .into_response();
        }
    };

    let context = MessageContext::<()>::new(query.session_id);
    state.handler.handle_message(message, context).await;
    StatusCode::ACCEPTED.into_response()
}

/// Builder for [`HttpServerTransport`]; the message handler must be installed
/// before `build()`.
pub struct HttpServerTransportBuilder {
    config: HttpServerTransportConfig,
    handler: Option<Arc<dyn MessageHandler<()>>>,
}

impl HttpServerTransportBuilder {
    pub fn new(config: HttpServerTransportConfig) -> Self {
        Self {
            config,
            handler: None,
        }
    }
}

impl Default for HttpServerTransportBuilder {
    fn default() -> Self {
        Self::new(HttpServerTransportConfig::default())
    }
}

impl TransportBuilder<()> for HttpServerTransportBuilder {
    type Transport = HttpServerTransport;
    type Error = TransportError;

    fn with_message_handler(mut self, handler: Arc<dyn MessageHandler<()>>) -> Self {
        self.handler = Some(handler);
        self
    }

    async fn build(self) -> Result<Self::Transport, Self::Error> {
        let handler = self.handler.ok_or_else(|| TransportError::Connection {
            message: "HttpServerTransportBuilder requires a message handler".to_string(),
        })?;

        Ok(HttpServerTransport {
            config: self.config,
            handler,
            sessions: Arc::new(DashMap::new()),
            current_session: None,
            server_handle: None,
            shutdown_tx: None,
            is_running: Arc::new(AtomicBool::new(false)),
        })
    }
}

/// Server-side HTTP transport: `POST /messages` in, SSE out, one session per
/// `GET /sse` connection.
pub struct HttpServerTransport {
    config: HttpServerTransportConfig,
    handler: Arc<dyn MessageHandler<()>>,
    sessions: Arc<DashMap<String, mpsc::Sender<String>>>,
    current_session: Option<String>,
    server_handle: Option<tokio::task::JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    is_running: Arc<AtomicBool>,
}

impl HttpServerTransport {
    pub fn config(&self) -> &HttpServerTransportConfig {
        &self.config
    }

    /// Number of live SSE subscribers (one per open session).
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}

#[async_trait]
impl Transport for HttpServerTransport {
    type Error = TransportError;

    async fn start(&mut self) -> Result<(), Self::Error> {
        if self.is_running.load(Ordering::SeqCst) {
            return Ok(());
        }

        let state = AppState {
            handler: self.handler.clone(),
            sessions: self.sessions.clone(),
            allowed_origins: self.config.allowed_origins.clone().map(Arc::new),
            sse_channel_capacity: self.config.sse_channel_capacity,
            sse_keep_alive: self.config.sse_keep_alive,
        };

        let app = Router::new()
            .route("/sse", get(sse_handler))
            .route("/messages", post(messages_handler))
            .with_state(state);

        let listener = TcpListener::bind(self.config.bind_address)
            .await
            .map_err(|error| TransportError::Connection {
                message: format!("failed to bind {}: {error}", self.config.bind_address),
            })?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let is_running = self.is_running.clone();
        is_running.store(true, Ordering::SeqCst);

        let server_handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            is_running.store(false, Ordering::SeqCst);
        });

        self.shutdown_tx = Some(shutdown_tx);
        self.server_handle = Some(server_handle);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(server_handle) = self.server_handle.take() {
            let _ = server_handle.await;
        }
        self.sessions.clear();
        self.is_running.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn send(&mut self, message: &JsonRpcMessage) -> Result<(), Self::Error> {
        let session_id = self.current_session.clone().ok_or_else(|| TransportError::Connection {
            message: "no active session; call set_session_context before send".to_string(),
        })?;

        let sender = self
            .sessions
            .get(&session_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| TransportError::Connection {
                message: format!("no SSE subscriber for session {session_id}"),
            })?;

        let payload = message.to_json().map_err(|source| TransportError::Serialization { source })?;

        sender.send(payload).await.map_err(|_| TransportError::Connection {
            message: format!("SSE channel closed for session {session_id}"),
        })
    }

    fn session_id(&self) -> Option<String> {
        self.current_session.clone()
    }

    fn set_session_context(&mut self, session_id: Option<String>) {
        self.current_session = session_id;
    }

    fn is_connected(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    fn transport_type(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopHandler;

    #[async_trait]
    impl MessageHandler<()> for NoopHandler {
        async fn handle_message(&self, _message: JsonRpcMessage, _context: MessageContext<()>) {}
        async fn handle_error(&self, _error: TransportError) {}
        async fn handle_close(&self) {}
    }

    #[tokio::test]
    async fn build_without_handler_fails() {
        let config = HttpServerTransportConfig::new().bind_address("127.0.0.1:0".parse().unwrap());
        let result = HttpServerTransportBuilder::new(config).build().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn send_without_session_context_fails() {
        let config = HttpServerTransportConfig::new().bind_address("127.0.0.1:0".parse().unwrap());
        let mut transport = HttpServerTransportBuilder::new(config)
            .with_message_handler(Arc::new(NoopHandler))
            .build()
            .await
            .unwrap();

        let notification = JsonRpcMessage::Notification(crate::protocol::JsonRpcNotification::new(
            "notifications/message",
            None,
        ));
        let result = transport.send(&notification).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn send_to_unknown_session_fails() {
        let config = HttpServerTransportConfig::new().bind_address("127.0.0.1:0".parse().unwrap());
        let mut transport = HttpServerTransportBuilder::new(config)
            .with_message_handler(Arc::new(NoopHandler))
            .build()
            .await
            .unwrap();

        transport.set_session_context(Some("missing-session".to_string()));
        let notification = JsonRpcMessage::Notification(crate::protocol::JsonRpcNotification::new(
            "notifications/message",
            None,
        ));
        let result = transport.send(&notification).await;
        assert!(result.is_err());
    }
}
