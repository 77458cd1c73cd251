//! HTTP client transport
//!
//! Mirrors [`super::server::HttpServerTransport`] from the caller's side:
//! `GET /sse` is opened first to learn the session id from the `endpoint`
//! event, then every outgoing message is `POST`ed to that path. Responses
//! and server-initiated notifications both arrive as subsequent SSE events
//! and are handed to the installed [`MessageHandler`].
//!
//! With [`HttpClientTransportConfig::use_sse`] set to `false` the client
//! reads only the initial `endpoint` event and drops the stream — it can
//! still `send`, but nothing delivers a response, so this mode only suits
//! fire-and-forget notifications.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Url};
use tokio::sync::{broadcast, oneshot, Mutex};

use crate::protocol::{JsonRpcMessage, JsonRpcMessageTrait, MessageContext, MessageHandler, Transport, TransportBuilder, TransportError};

use super::config::HttpClientTransportConfig;

fn origin_of(base_url: &str) -> Result<String, TransportError> {
    let url = Url::parse(base_url).map_err(|error| TransportError::Connection {
        message: format!("invalid base_url {base_url}: {error}"),
    })?;
    Ok(url.origin().ascii_serialization())
}

/// Splits one `data:`-delimited SSE event block into `(event name, data)`.
fn parse_sse_block(block: &str) -> (Option<String>, Option<String>) {
    let mut event_name = None;
    let mut data_lines = Vec::new();

    for line in block.lines() {
        if let Some(value) = line.strip_prefix("event:") {
            event_name = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.trim().to_string());
        }
    }

    let data = if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    };

    (event_name, data)
}

fn parse_endpoint(base_url: &str, data: &str) -> Result<(Url, String), String> {
    let joined = format!("{}{}", base_url.trim_end_matches('/'), data);
    let url = Url::parse(&joined).map_err(|error| format!("invalid endpoint path {data}: {error}"))?;
    let session_id = url
        .query_pairs()
        .find(|(key, _)| key == "session_id")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| format!("endpoint event missing session_id: {data}"))?;
    Ok((url, session_id))
}

/// Builder for [`HttpClientTransport`]; the message handler must be installed
/// before `build()`.
pub struct HttpClientTransportBuilder {
    config: HttpClientTransportConfig,
    handler: Option<Arc<dyn MessageHandler<()>>>,
}

impl HttpClientTransportBuilder {
    pub fn new(config: HttpClientTransportConfig) -> Self {
        Self {
            config,
            handler: None,
        }
    }
}

impl TransportBuilder<()> for HttpClientTransportBuilder {
    type Transport = HttpClientTransport;
    type Error = TransportError;

    fn with_message_handler(mut self, handler: Arc<dyn MessageHandler<()>>) -> Self {
        self.handler = Some(handler);
        self
    }

    async fn build(self) -> Result<Self::Transport, Self::Error> {
        let handler = self.handler.ok_or_else(|| TransportError::Connection {
            message: "HttpClientTransportBuilder requires a message handler".to_string(),
        })?;

        if let Some(allowed) = &self.config.allowed_origins {
            let origin = origin_of(&self.config.base_url)?;
            if !allowed.iter().any(|candidate| candidate == &origin) {
                return Err(TransportError::Connection {
                    message: format!("server origin {origin} is not in the allowed list"),
                });
            }
        }

        let http = Client::builder()
            .timeout(self.config.request_timeout)
            .build()
            .map_err(|error| TransportError::Connection {
                message: format!("failed to build HTTP client: {error}"),
            })?;

        Ok(HttpClientTransport {
            config: self.config,
            handler,
            http,
            messages_url: Arc::new(Mutex::new(None)),
            session_id: Arc::new(Mutex::new(None)),
            shutdown_tx: None,
            sse_task: None,
            is_connected: Arc::new(AtomicBool::new(false)),
        })
    }
}

/// Client-side HTTP transport: `GET /sse` for session discovery and inbound
/// delivery, `POST /messages` for outbound requests/notifications.
pub struct HttpClientTransport {
    config: HttpClientTransportConfig,
    handler: Arc<dyn MessageHandler<()>>,
    http: Client,
    messages_url: Arc<Mutex<Option<Url>>>,
    session_id: Arc<Mutex<Option<String>>>,
    shutdown_tx: Option<broadcast::Sender<()>>,
    sse_task: Option<tokio::task::JoinHandle<()>>,
    is_connected: Arc<AtomicBool>,
}

impl HttpClientTransport {
    pub fn config(&self) -> &HttpClientTransportConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpClientTransport {
    type Error = TransportError;

    async fn start(&mut self) -> Result<(), Self::Error> {
        if self.is_connected.load(Ordering::SeqCst) {
            return Ok(());
        }

        let sse_url = format!("{}/sse", self.config.base_url.trim_end_matches('/'));
        let response = self
            .http
            .get(&sse_url)
            .send()
            .await
            .map_err(|error| TransportError::Connection {
                message: format!("failed to open SSE stream at {sse_url}: {error}"),
            })?;

        if !response.status().is_success() {
            return Err(TransportError::Connection {
                message: format!("SSE endpoint returned {}", response.status()),
            });
        }

        let (ready_tx, ready_rx) = oneshot::channel::<Result<(), String>>();
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

        let handler = self.handler.clone();
        let is_connected = self.is_connected.clone();
        let messages_url = self.messages_url.clone();
        let session_id = self.session_id.clone();
        let base_url = self.config.base_url.clone();
        let use_sse = self.config.use_sse;

        let task_handle = tokio::spawn(async move {
            let mut buffer = String::new();
            let mut byte_stream = response.bytes_stream();
            let mut ready_tx = Some(ready_tx);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => break,
                    chunk = byte_stream.next() => {
                        match chunk {
                            Some(Ok(bytes)) => {
                                buffer.push_str(&String::from_utf8_lossy(&bytes));
                                let mut should_stop = false;
                                while let Some(pos) = buffer.find("\n\n") {
                                    let block: String = buffer.drain(..pos + 2).collect();
                                    let (event_name, data) = parse_sse_block(&block);
                                    let Some(data) = data else { continue };

                                    if event_name.as_deref() == Some("endpoint") {
                                        match parse_endpoint(&base_url, &data) {
                                            Ok((url, sid)) => {
                                                *messages_url.lock().await = Some(url);
                                                *session_id.lock().await = Some(sid);
                                                is_connected.store(true, Ordering::SeqCst);
                                                if let Some(tx) = ready_tx.take() {
                                                    let _ = tx.send(Ok(()));
                                                }
                                                if !use_sse {
                                                    should_stop = true;
                                                    break;
                                                }
                                            }
                                            Err(message) => {
                                                if let Some(tx) = ready_tx.take() {
                                                    let _ = tx.send(Err(message));
                                                }
                                                should_stop = true;
                                                break;
                                            }
                                        }
                                    } else {
                                        match JsonRpcMessage::from_json(&data) {
                                            Ok(message) => {
                                                let sid = session_id.lock().await.clone().unwrap_or_default();
                                                let context = MessageContext::<()>::new(sid);
                                                handler.handle_message(message, context).await;
                                            }
                                            Err(source) => {
                                                handler.handle_error(TransportError::Serialization { source }).await;
                                            }
                                        }
                                    }
                                }
                                if should_stop {
                                    break;
                                }
                            }
                            Some(Err(error)) => {
                                handler
                                    .handle_error(TransportError::Connection {
                                        message: format!("SSE stream error: {error}"),
                                    })
                                    .await;
                                break;
                            }
                            None => break,
                        }
                    }
                }
            }

            is_connected.store(false, Ordering::SeqCst);
            handler.handle_close().await;
        });

        self.shutdown_tx = Some(shutdown_tx);
        self.sse_task = Some(task_handle);

        let ready = ready_rx.await.map_err(|_| TransportError::Connection {
            message: "SSE stream closed before endpoint event".to_string(),
        })?;
        ready.map_err(|message| TransportError::Connection { message })
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(task_handle) = self.sse_task.take() {
            let _ = task_handle.await;
        }
        *self.messages_url.lock().await = None;
        *self.session_id.lock().await = None;
        self.is_connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn send(&mut self, message: &JsonRpcMessage) -> Result<(), Self::Error> {
        let messages_url = self.messages_url.lock().await.clone().ok_or_else(|| TransportError::Connection {
            message: "transport not started; call start() to discover the session endpoint".to_string(),
        })?;

        let body = message.to_json().map_err(|source| TransportError::Serialization { source })?;

        let response = self
            .http
            .post(messages_url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|error| TransportError::Connection {
                message: format!("POST /messages failed: {error}"),
            })?;

        if !response.status().is_success() {
            return Err(TransportError::Connection {
                message: format!("POST /messages returned {}", response.status()),
            });
        }

        Ok(())
    }

    fn session_id(&self) -> Option<String> {
        self.session_id.try_lock().ok().and_then(|guard| guard.clone())
    }

    fn set_session_context(&mut self, _session_id: Option<String>) {
        // The client learns its session id from the server's `endpoint` event;
        // it is not settable from the outside.
    }

    fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::SeqCst)
    }

    fn transport_type(&self) -> &'static str {
        "http-client"
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

    #[test]
    fn parses_endpoint_event() {
        let (url, session_id) = parse_endpoint("http://localhost:8080", "/messages?session_id=abc-123").unwrap();
        assert_eq!(session_id, "abc-123");
        assert_eq!(url.path(), "/messages");
    }

    #[test]
    fn parses_sse_block() {
        let block = "event: endpoint\ndata: /messages?session_id=xyz\n\n";
        let (event, data) = parse_sse_block(block);
        assert_eq!(event.as_deref(), Some("endpoint"));
        assert_eq!(data.as_deref(), Some("/messages?session_id=xyz"));
    }

    #[tokio::test]
    async fn build_without_handler_fails() {
        let config = HttpClientTransportConfig::new("http://localhost:8080");
        let result = HttpClientTransportBuilder::new(config).build().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn build_rejects_disallowed_origin() {
        let config = HttpClientTransportConfig::new("http://example.com")
            .allowed_origins(vec!["http://localhost:8080".to_string()]);
        let result = HttpClientTransportBuilder::new(config)
            .with_message_handler(Arc::new(NoopHandler))
            .build()
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn send_before_start_fails() {
        let config = HttpClientTransportConfig::new("http://localhost:8080");
        let mut transport = HttpClientTransportBuilder::new(config)
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
}
