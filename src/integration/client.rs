//! High-level MCP client core (C11)
//!
//! Drives the handshake and request/response plumbing described in §4.11:
//! a single outbound [`crate::protocol::transport::Transport`], owned by a
//! dedicated writer task once it is built and started, and a
//! [`CorrelationManager`] matching replies back to the caller that sent the
//! request. Server-initiated notifications (`*/list_changed`,
//! `resources/updated`, `notifications/message`) fan out over broadcast
//! channels callers can subscribe to independently of request/response calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};

use crate::correlation::{CorrelationConfig, CorrelationError, CorrelationManager};
use crate::integration::constants::{defaults, methods};
use crate::integration::error::{McpError, McpResult};
use crate::protocol::transport::{MessageContext, MessageHandler, Transport, TransportBuilder, TransportError};
use crate::protocol::types::{
    CallToolResult, ClientCapabilities, ClientInfo, GetPromptResult, ListPromptsResult,
    ListResourcesResult, ListToolsResult, LogLevel, Prompt, PromptMessage, ProtocolVersion,
    ReadResourceResult, Resource, ServerCapabilities, ServerInfo, Tool,
};
use crate::protocol::{JsonRpcMessage, JsonRpcNotification, JsonRpcRequest};

/// MCP-level connection state, distinct from transport connectivity: a
/// transport can be `is_connected()` while the handshake (§4.5) hasn't
/// happened yet, or has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Initializing,
    Ready,
    Failed,
}

/// Configuration for [`McpClient`], consumed by [`McpClientBuilder`].
#[derive(Debug, Clone)]
pub struct McpClientConfig {
    pub client_info: ClientInfo,
    pub capabilities: ClientCapabilities,
    pub protocol_version: ProtocolVersion,
    pub default_timeout: Duration,
}

impl Default for McpClientConfig {
    fn default() -> Self {
        Self {
            client_info: ClientInfo {
                name: defaults::CLIENT_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: ClientCapabilities::default(),
            protocol_version: ProtocolVersion::current(),
            default_timeout: Duration::from_secs(defaults::TIMEOUT_SECONDS),
        }
    }
}

/// Builder for [`McpClient`].
pub struct McpClientBuilder {
    config: McpClientConfig,
}

impl McpClientBuilder {
    pub fn new() -> Self {
        Self {
            config: McpClientConfig::default(),
        }
    }

    pub fn client_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.config.client_info = ClientInfo {
            name: name.into(),
            version: version.into(),
        };
        self
    }

    pub fn capabilities(mut self, capabilities: ClientCapabilities) -> Self {
        self.config.capabilities = capabilities;
        self
    }

    pub fn protocol_version(mut self, version: ProtocolVersion) -> Self {
        self.config.protocol_version = version;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    /// Build the client against a pre-configured transport builder. The
    /// transport's message handler is installed, the transport is started,
    /// and it is handed off to a dedicated writer task before this returns —
    /// callers still need to call [`McpClient::initialize`] to run the §4.5
    /// handshake.
    pub async fn build<B>(self, transport_builder: B) -> McpResult<McpClient>
    where
        B: TransportBuilder<()> + 'static,
    {
        McpClient::new_with_config(transport_builder, self.config).await
    }
}

impl Default for McpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Notifications a client can subscribe to independently of request/response
/// calls (§4.11's "wait for ready" / `subscribe_*` surface).
#[derive(Clone)]
struct NotificationChannels {
    tools_changed: broadcast::Sender<()>,
    prompts_changed: broadcast::Sender<()>,
    resources_changed: broadcast::Sender<()>,
    resource_updated: broadcast::Sender<String>,
    log_messages: broadcast::Sender<(LogLevel, Value)>,
}

impl NotificationChannels {
    fn new() -> Self {
        Self {
            tools_changed: broadcast::channel(16).0,
            prompts_changed: broadcast::channel(16).0,
            resources_changed: broadcast::channel(16).0,
            resource_updated: broadcast::channel(64).0,
            log_messages: broadcast::channel(256).0,
        }
    }
}

/// Routes inbound responses to the correlation manager and inbound
/// notifications to the broadcast channels above.
struct ClientMessageHandler {
    correlation: Arc<CorrelationManager>,
    notifications: NotificationChannels,
}

#[async_trait]
impl MessageHandler<()> for ClientMessageHandler {
    async fn handle_message(&self, message: JsonRpcMessage, _context: MessageContext<()>) {
        match message {
            JsonRpcMessage::Response(response) => {
                let Some(id) = response.id.clone() else {
                    return;
                };
                let outcome = match response.error {
                    Some(error) => Err(CorrelationError::Remote {
                        id: id.clone(),
                        code: error
                            .get("code")
                            .and_then(Value::as_i64)
                            .unwrap_or(0) as i32,
                        message: error
                            .get("message")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        data: error.get("data").cloned(),
                    }),
                    None => Ok(response.result.unwrap_or(Value::Null)),
                };
                let _ = self.correlation.correlate_response(&id, outcome).await;
            }
            JsonRpcMessage::Notification(notification) => {
                self.dispatch_notification(notification);
            }
            JsonRpcMessage::Request(_) => {
                tracing::debug!("client ignoring unexpected server-initiated request");
            }
        }
    }

    async fn handle_error(&self, error: TransportError) {
        tracing::warn!(%error, "client transport error");
    }

    async fn handle_close(&self) {
        tracing::debug!("client transport closed");
    }
}

impl ClientMessageHandler {
    fn dispatch_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            methods::NOTIFICATIONS_TOOLS_LIST_CHANGED => {
                let _ = self.notifications.tools_changed.send(());
            }
            methods::NOTIFICATIONS_PROMPTS_LIST_CHANGED => {
                let _ = self.notifications.prompts_changed.send(());
            }
            methods::NOTIFICATIONS_RESOURCES_LIST_CHANGED => {
                let _ = self.notifications.resources_changed.send(());
            }
            methods::NOTIFICATIONS_RESOURCES_UPDATED => {
                if let Some(uri) = notification
                    .params
                    .as_ref()
                    .and_then(|p| p.get("uri"))
                    .and_then(Value::as_str)
                {
                    let _ = self.notifications.resource_updated.send(uri.to_string());
                }
            }
            methods::NOTIFICATIONS_MESSAGE => {
                let params = notification.params.unwrap_or(Value::Null);
                let level = params
                    .get("level")
                    .and_then(Value::as_str)
                    .and_then(LogLevel::from_str_strict)
                    .unwrap_or_default();
                let data = params.get("data").cloned().unwrap_or(Value::Null);
                let _ = self.notifications.log_messages.send((level, data));
            }
            other => tracing::debug!(method = other, "unhandled server notification"),
        }
    }
}

/// Commands fed to the writer task that owns the transport after it starts.
enum WriterCommand {
    Send(JsonRpcMessage),
    Close(oneshot::Sender<McpResult<()>>),
}

async fn run_writer<T: Transport>(mut transport: T, mut commands: mpsc::Receiver<WriterCommand>) {
    while let Some(command) = commands.recv().await {
        match command {
            WriterCommand::Send(message) => {
                if let Err(error) = transport.send(&message).await {
                    tracing::warn!(%error, "failed to send message to server");
                }
            }
            WriterCommand::Close(ack) => {
                let result = transport
                    .close()
                    .await
                    .map_err(|e| McpError::custom(e.to_string()));
                let _ = ack.send(result);
                break;
            }
        }
    }
}

/// High-level client for a single MCP server connection (§4.11).
pub struct McpClient {
    config: McpClientConfig,
    correlation: Arc<CorrelationManager>,
    writer: mpsc::Sender<WriterCommand>,
    state: Arc<RwLock<ConnectionState>>,
    server_capabilities: Arc<RwLock<Option<ServerCapabilities>>>,
    server_info: Arc<RwLock<Option<ServerInfo>>>,
    notifications: NotificationChannels,
}

impl McpClient {
    /// Build a client with default configuration.
    pub async fn new<B>(transport_builder: B) -> McpResult<Self>
    where
        B: TransportBuilder<()> + 'static,
    {
        McpClientBuilder::new().build(transport_builder).await
    }

    async fn new_with_config<B>(transport_builder: B, config: McpClientConfig) -> McpResult<Self>
    where
        B: TransportBuilder<()> + 'static,
    {
        let correlation_config = CorrelationConfig {
            default_timeout: TimeDelta::from_std(config.default_timeout)
                .unwrap_or_else(|_| TimeDelta::seconds(defaults::TIMEOUT_SECONDS as i64)),
            ..Default::default()
        };
        let correlation = Arc::new(
            CorrelationManager::new(correlation_config)
                .await
                .map_err(McpError::from)?,
        );
        let notifications = NotificationChannels::new();

        let handler = Arc::new(ClientMessageHandler {
            correlation: correlation.clone(),
            notifications: notifications.clone_channels(),
        });

        let mut transport = transport_builder
            .with_message_handler(handler)
            .build()
            .await
            .map_err(|e| McpError::custom(format!("failed to build transport: {e}")))?;

        transport
            .start()
            .await
            .map_err(|e| McpError::custom(format!("failed to start transport: {e}")))?;

        let (writer, writer_rx) = mpsc::channel(64);
        tokio::spawn(run_writer(transport, writer_rx));

        Ok(Self {
            config,
            correlation,
            writer,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            server_capabilities: Arc::new(RwLock::new(None)),
            server_info: Arc::new(RwLock::new(None)),
            notifications,
        })
    }

    /// Run the §4.5 handshake: send `initialize`, store the negotiated
    /// version and server capabilities, then emit `notifications/initialized`.
    pub async fn initialize(&self) -> McpResult<ServerCapabilities> {
        {
            let state = self.state.read().await;
            match *state {
                ConnectionState::Ready => return Err(McpError::already_connected()),
                ConnectionState::Initializing => {
                    return Err(McpError::custom("initialization already in progress"))
                }
                ConnectionState::Failed => return Err(McpError::custom("mcp session failed")),
                ConnectionState::Disconnected => {}
            }
        }
        *self.state.write().await = ConnectionState::Initializing;

        let params = serde_json::json!({
            "protocolVersion": self.config.protocol_version.as_str(),
            "capabilities": self.config.capabilities,
            "clientInfo": self.config.client_info,
        });

        let result = match self.send_request(methods::INITIALIZE, Some(params)).await {
            Ok(result) => result,
            Err(err) => {
                *self.state.write().await = ConnectionState::Failed;
                return Err(err);
            }
        };

        let negotiated = result
            .get("protocolVersion")
            .and_then(Value::as_str)
            .map(ProtocolVersion::negotiate)
            .unwrap_or_else(ProtocolVersion::current);
        if negotiated.as_str() != self.config.protocol_version.as_str() && !negotiated.is_supported()
        {
            *self.state.write().await = ConnectionState::Failed;
            return Err(McpError::version_mismatch(
                self.config.protocol_version.as_str(),
                negotiated,
            ));
        }

        let server_caps: ServerCapabilities = result
            .get("capabilities")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::invalid_response(format!("invalid server capabilities: {e}")))?
            .unwrap_or_default();
        let server_info: Option<ServerInfo> = result
            .get("serverInfo")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::invalid_response(format!("invalid server info: {e}")))?;

        *self.server_capabilities.write().await = Some(server_caps.clone());
        *self.server_info.write().await = server_info;

        self.send_notification(methods::INITIALIZED, None).await?;
        *self.state.write().await = ConnectionState::Ready;

        Ok(server_caps)
    }

    /// Block until the handshake reaches `ready`, or `timeout` elapses.
    pub async fn wait_for_ready(&self, timeout: Duration) -> McpResult<()> {
        tokio::time::timeout(timeout, async {
            loop {
                match *self.state.read().await {
                    ConnectionState::Ready => return Ok(()),
                    ConnectionState::Failed => {
                        return Err(McpError::custom("mcp session failed"))
                    }
                    _ => tokio::time::sleep(Duration::from_millis(10)).await,
                }
            }
        })
        .await
        .map_err(|_| McpError::custom("timed out waiting for ready state"))?
    }

    pub async fn connection_state(&self) -> ConnectionState {
        *self.state.read().await
    }

    pub async fn is_ready(&self) -> bool {
        matches!(self.connection_state().await, ConnectionState::Ready)
    }

    pub async fn server_capabilities(&self) -> Option<ServerCapabilities> {
        self.server_capabilities.read().await.clone()
    }

    pub async fn server_info(&self) -> Option<ServerInfo> {
        self.server_info.read().await.clone()
    }

    pub async fn supports_capability(&self, check: impl Fn(&ServerCapabilities) -> bool) -> bool {
        self.server_capabilities()
            .await
            .as_ref()
            .is_some_and(check)
    }

    async fn ensure_ready(&self) -> McpResult<()> {
        if !self.is_ready().await {
            return Err(McpError::NotConnected);
        }
        Ok(())
    }

    // Resource operations (§4.9)

    pub async fn list_resources(&self) -> McpResult<Vec<Resource>> {
        self.ensure_ready().await?;
        if !self.supports_capability(|c| c.resources.is_some()).await {
            return Err(McpError::unsupported_capability("resources"));
        }
        let result = self.send_request(methods::RESOURCES_LIST, None).await?;
        let list: ListResourcesResult = serde_json::from_value(result)
            .map_err(|e| McpError::invalid_response(format!("invalid resources/list result: {e}")))?;
        Ok(list.resources)
    }

    pub async fn read_resource(&self, uri: impl Into<String>) -> McpResult<ReadResourceResult> {
        self.ensure_ready().await?;
        let params = serde_json::json!({ "uri": uri.into() });
        let result = self
            .send_request(methods::RESOURCES_READ, Some(params))
            .await?;
        serde_json::from_value(result)
            .map_err(|e| McpError::invalid_response(format!("invalid resources/read result: {e}")))
    }

    pub async fn subscribe_resource(&self, uri: impl Into<String>) -> McpResult<()> {
        self.ensure_ready().await?;
        if !self
            .supports_capability(|c| c.resources.as_ref().is_some_and(|r| r.subscribe.unwrap_or(false)))
            .await
        {
            return Err(McpError::unsupported_capability("resource subscriptions"));
        }
        let params = serde_json::json!({ "uri": uri.into() });
        self.send_request(methods::RESOURCES_SUBSCRIBE, Some(params))
            .await?;
        Ok(())
    }

    pub async fn unsubscribe_resource(&self, uri: impl Into<String>) -> McpResult<()> {
        self.ensure_ready().await?;
        let params = serde_json::json!({ "uri": uri.into() });
        self.send_request(methods::RESOURCES_UNSUBSCRIBE, Some(params))
            .await?;
        Ok(())
    }

    // Tool operations (§4.7)

    pub async fn list_tools(&self) -> McpResult<Vec<Tool>> {
        self.ensure_ready().await?;
        if !self.supports_capability(|c| c.tools.is_some()).await {
            return Err(McpError::unsupported_capability("tools"));
        }
        let result = self.send_request(methods::TOOLS_LIST, None).await?;
        let list: ListToolsResult = serde_json::from_value(result)
            .map_err(|e| McpError::invalid_response(format!("invalid tools/list result: {e}")))?;
        Ok(list.tools)
    }

    pub async fn call_tool(
        &self,
        name: impl Into<String>,
        arguments: Option<Value>,
    ) -> McpResult<CallToolResult> {
        self.ensure_ready().await?;
        let params = serde_json::json!({
            "name": name.into(),
            "arguments": arguments.unwrap_or(Value::Null),
        });
        let result = self.send_request(methods::TOOLS_CALL, Some(params)).await?;
        serde_json::from_value(result)
            .map_err(|e| McpError::invalid_response(format!("invalid tools/call result: {e}")))
    }

    // Prompt operations (§4.8)

    pub async fn list_prompts(&self) -> McpResult<Vec<Prompt>> {
        self.ensure_ready().await?;
        if !self.supports_capability(|c| c.prompts.is_some()).await {
            return Err(McpError::unsupported_capability("prompts"));
        }
        let result = self.send_request(methods::PROMPTS_LIST, None).await?;
        let list: ListPromptsResult = serde_json::from_value(result)
            .map_err(|e| McpError::invalid_response(format!("invalid prompts/list result: {e}")))?;
        Ok(list.prompts)
    }

    pub async fn get_prompt(
        &self,
        name: impl Into<String>,
        arguments: HashMap<String, String>,
    ) -> McpResult<Vec<PromptMessage>> {
        self.ensure_ready().await?;
        let params = serde_json::json!({
            "name": name.into(),
            "arguments": arguments,
        });
        let result = self.send_request(methods::PROMPTS_GET, Some(params)).await?;
        let get: GetPromptResult = serde_json::from_value(result)
            .map_err(|e| McpError::invalid_response(format!("invalid prompts/get result: {e}")))?;
        Ok(get.messages)
    }

    // Logging operations (§4.10)

    pub async fn set_log_level(&self, level: LogLevel) -> McpResult<()> {
        self.ensure_ready().await?;
        if !self.supports_capability(|c| c.logging.is_some()).await {
            return Err(McpError::unsupported_capability("logging"));
        }
        let params = serde_json::json!({ "level": level.as_str() });
        self.send_request(methods::LOGGING_SET_LEVEL, Some(params))
            .await?;
        Ok(())
    }

    pub async fn ping(&self) -> McpResult<()> {
        self.send_request(methods::PING, None).await?;
        Ok(())
    }

    // Notification subscriptions

    pub fn subscribe_tools_changed(&self) -> broadcast::Receiver<()> {
        self.notifications.tools_changed.subscribe()
    }

    pub fn subscribe_prompts_changed(&self) -> broadcast::Receiver<()> {
        self.notifications.prompts_changed.subscribe()
    }

    pub fn subscribe_resources_changed(&self) -> broadcast::Receiver<()> {
        self.notifications.resources_changed.subscribe()
    }

    pub fn subscribe_resource_updates(&self) -> broadcast::Receiver<String> {
        self.notifications.resource_updated.subscribe()
    }

    pub fn subscribe_log_messages(&self) -> broadcast::Receiver<(LogLevel, Value)> {
        self.notifications.log_messages.subscribe()
    }

    /// Close the connection. Idempotent.
    pub async fn close(&self) -> McpResult<()> {
        *self.state.write().await = ConnectionState::Disconnected;
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.writer.send(WriterCommand::Close(ack_tx)).await.is_err() {
            return Ok(()); // writer task already gone
        }
        ack_rx.await.map_err(|_| McpError::custom("writer task dropped before acking close"))?
    }

    async fn send_notification(&self, method: &str, params: Option<Value>) -> McpResult<()> {
        let notification = JsonRpcNotification::new(method, params);
        self.writer
            .send(WriterCommand::Send(JsonRpcMessage::Notification(
                notification,
            )))
            .await
            .map_err(|_| McpError::custom("transport writer task has stopped"))
    }

    async fn send_request(&self, method: &str, params: Option<Value>) -> McpResult<Value> {
        let (id, receiver) = self
            .correlation
            .register_request(None, params.clone().unwrap_or(Value::Null))
            .await
            .map_err(McpError::from)?;

        let request = JsonRpcRequest::new(method, params, id);
        self.writer
            .send(WriterCommand::Send(JsonRpcMessage::Request(request)))
            .await
            .map_err(|_| McpError::custom("transport writer task has stopped"))?;

        match receiver.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(McpError::from(err)),
            Err(_) => Err(McpError::custom("response channel closed before reply arrived")),
        }
    }
}

impl NotificationChannels {
    fn clone_channels(&self) -> Self {
        Self {
            tools_changed: self.tools_changed.clone(),
            prompts_changed: self.prompts_changed.clone(),
            resources_changed: self.resources_changed.clone(),
            resource_updated: self.resource_updated.clone(),
            log_messages: self.log_messages.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::adapters::in_memory::{self, InMemoryTransportBuilder};

    #[test]
    fn config_defaults() {
        let config = McpClientConfig::default();
        assert_eq!(config.client_info.name, "airs-mcp-client");
        assert_eq!(config.default_timeout, Duration::from_secs(30));
    }

    #[test]
    fn builder_pattern() {
        let builder = McpClientBuilder::new()
            .client_info("test-client", "1.0.0")
            .timeout(Duration::from_secs(5));
        assert_eq!(builder.config.client_info.name, "test-client");
        assert_eq!(builder.config.default_timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn builds_and_starts_against_in_memory_transport() {
        let (client_end, _server_end) = in_memory::pair(8);
        let client = McpClient::new(InMemoryTransportBuilder::new(client_end))
            .await
            .unwrap();
        assert_eq!(client.connection_state().await, ConnectionState::Disconnected);
        assert!(!client.is_ready().await);
        assert!(client.server_capabilities().await.is_none());
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let (client_end, _server_end) = in_memory::pair(8);
        let client = McpClient::new(InMemoryTransportBuilder::new(client_end))
            .await
            .unwrap();
        let err = client.list_tools().await.unwrap_err();
        assert!(matches!(err, McpError::NotConnected));
    }
}
