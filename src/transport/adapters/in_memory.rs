//! In-memory transport (C3)
//!
//! Two bounded queues connecting a client and a server in the same process —
//! no serialization, no I/O, just `JsonRpcMessage` values moved through
//! `tokio::sync::mpsc`. Built for same-binary embedding and for exercising the
//! dispatcher/session/registry stack in tests without spawning a subprocess
//! or a socket.
//!
//! ```rust,no_run
//! use airs_mcp::protocol::{MessageHandler, TransportBuilder};
//! use airs_mcp::transport::adapters::in_memory::{self, InMemoryTransportBuilder};
//! # use airs_mcp::protocol::{JsonRpcMessage, MessageContext, TransportError};
//! # use async_trait::async_trait;
//! # use std::sync::Arc;
//! # struct NoopHandler;
//! # #[async_trait]
//! # impl MessageHandler<()> for NoopHandler {
//! #     async fn handle_message(&self, _m: JsonRpcMessage, _c: MessageContext<()>) {}
//! #     async fn handle_error(&self, _e: TransportError) {}
//! #     async fn handle_close(&self) {}
//! # }
//! # async fn example() -> Result<(), TransportError> {
//! let (client_end, server_end) = in_memory::pair(32);
//! let client = InMemoryTransportBuilder::new(client_end)
//!     .with_message_handler(Arc::new(NoopHandler))
//!     .build()
//!     .await?;
//! let server = InMemoryTransportBuilder::new(server_end)
//!     .with_message_handler(Arc::new(NoopHandler))
//!     .build()
//!     .await?;
//! # let _ = (client, server);
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, Mutex};

use crate::protocol::{JsonRpcMessage, MessageContext, MessageHandler, Transport, TransportBuilder, TransportError};

/// One side of an in-memory transport pair: a sender feeding the peer's
/// inbox and a receiver draining this side's own inbox.
pub struct InMemoryEndpoint {
    outbox: mpsc::Sender<JsonRpcMessage>,
    inbox: mpsc::Receiver<JsonRpcMessage>,
}

/// Create a pair of linked endpoints. Messages sent on one side's transport
/// arrive as `handle_message` calls on the other side's handler.
pub fn pair(capacity: usize) -> (InMemoryEndpoint, InMemoryEndpoint) {
    let (tx_a, rx_a) = mpsc::channel(capacity);
    let (tx_b, rx_b) = mpsc::channel(capacity);
    (
        InMemoryEndpoint {
            outbox: tx_b,
            inbox: rx_a,
        },
        InMemoryEndpoint {
            outbox: tx_a,
            inbox: rx_b,
        },
    )
}

/// Builder for [`InMemoryTransport`]. Follows the pre-configured pattern: the
/// handler must be installed before `build()` produces a usable transport.
pub struct InMemoryTransportBuilder {
    endpoint: InMemoryEndpoint,
    handler: Option<Arc<dyn MessageHandler<()>>>,
    session_id: String,
}

impl InMemoryTransportBuilder {
    pub fn new(endpoint: InMemoryEndpoint) -> Self {
        Self {
            endpoint,
            handler: None,
            session_id: "in-memory-session".to_string(),
        }
    }

    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }
}

impl TransportBuilder<()> for InMemoryTransportBuilder {
    type Transport = InMemoryTransport;
    type Error = TransportError;

    fn with_message_handler(mut self, handler: Arc<dyn MessageHandler<()>>) -> Self {
        self.handler = Some(handler);
        self
    }

    async fn build(self) -> Result<Self::Transport, Self::Error> {
        let handler = self.handler.ok_or_else(|| TransportError::Connection {
            message: "InMemoryTransportBuilder requires a message handler".to_string(),
        })?;

        Ok(InMemoryTransport {
            outbox: self.endpoint.outbox,
            inbox: Arc::new(Mutex::new(Some(self.endpoint.inbox))),
            handler,
            session_id: self.session_id,
            shutdown_tx: None,
            task_handle: None,
            is_running: Arc::new(AtomicBool::new(false)),
        })
    }
}

/// One end of an in-process client/server pair.
pub struct InMemoryTransport {
    outbox: mpsc::Sender<JsonRpcMessage>,
    inbox: Arc<Mutex<Option<mpsc::Receiver<JsonRpcMessage>>>>,
    handler: Arc<dyn MessageHandler<()>>,
    session_id: String,
    shutdown_tx: Option<broadcast::Sender<()>>,
    task_handle: Option<tokio::task::JoinHandle<()>>,
    is_running: Arc<AtomicBool>,
}

#[async_trait]
impl Transport for InMemoryTransport {
    type Error = TransportError;

    async fn start(&mut self) -> Result<(), Self::Error> {
        if self.is_running.load(Ordering::SeqCst) {
            return Ok(());
        }

        let mut inbox = self
            .inbox
            .lock()
            .await
            .take()
            .ok_or_else(|| TransportError::Connection {
                message: "transport already started".to_string(),
            })?;

        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        let handler = self.handler.clone();
        let session_id = self.session_id.clone();
        let is_running = self.is_running.clone();
        is_running.store(true, Ordering::SeqCst);

        let task_handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => break,
                    message = inbox.recv() => {
                        match message {
                            Some(message) => {
                                let context = MessageContext::<()>::new(session_id.clone());
                                handler.handle_message(message, context).await;
                            }
                            None => break,
                        }
                    }
                }
            }
            is_running.store(false, Ordering::SeqCst);
            handler.handle_close().await;
        });

        self.shutdown_tx = Some(shutdown_tx);
        self.task_handle = Some(task_handle);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(task_handle) = self.task_handle.take() {
            let _ = task_handle.await;
        }
        self.is_running.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn send(&mut self, message: &JsonRpcMessage) -> Result<(), Self::Error> {
        self.outbox
            .send(message.clone())
            .await
            .map_err(|_| TransportError::Connection {
                message: "peer endpoint dropped".to_string(),
            })
    }

    fn session_id(&self) -> Option<String> {
        Some(self.session_id.clone())
    }

    fn set_session_context(&mut self, session_id: Option<String>) {
        if let Some(session_id) = session_id {
            self.session_id = session_id;
        }
    }

    fn is_connected(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    fn transport_type(&self) -> &'static str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::RequestId;
    use std::sync::Mutex as StdMutex;

    struct CollectingHandler {
        received: Arc<StdMutex<Vec<JsonRpcMessage>>>,
    }

    #[async_trait]
    impl MessageHandler<()> for CollectingHandler {
        async fn handle_message(&self, message: JsonRpcMessage, _context: MessageContext<()>) {
            self.received.lock().unwrap().push(message);
        }

        async fn handle_error(&self, _error: TransportError) {}
        async fn handle_close(&self) {}
    }

    #[tokio::test]
    async fn messages_flow_between_paired_endpoints() {
        let (client_end, server_end) = pair(8);
        let server_received = Arc::new(StdMutex::new(Vec::new()));

        let mut client = InMemoryTransportBuilder::new(client_end)
            .with_message_handler(Arc::new(CollectingHandler {
                received: Arc::new(StdMutex::new(Vec::new())),
            }))
            .build()
            .await
            .unwrap();
        let mut server = InMemoryTransportBuilder::new(server_end)
            .with_message_handler(Arc::new(CollectingHandler {
                received: server_received.clone(),
            }))
            .build()
            .await
            .unwrap();

        client.start().await.unwrap();
        server.start().await.unwrap();

        let request = JsonRpcMessage::Request(crate::protocol::JsonRpcRequest::new(
            "ping",
            None,
            RequestId::new_number(1),
        ));
        client.send(&request).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(server_received.lock().unwrap().len(), 1);

        client.close().await.unwrap();
        server.close().await.unwrap();
    }

    #[tokio::test]
    async fn build_without_handler_fails() {
        let (client_end, _server_end) = pair(1);
        let err = InMemoryTransportBuilder::new(client_end).build().await;
        assert!(err.is_err());
    }
}
