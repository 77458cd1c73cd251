//! High-level MCP server core (C12)
//!
//! Assembles the session manager (C5), the dispatcher (C6) and the four
//! capability registries (C7-C10) behind a single [`Transport`]. Mirrors
//! `integration::client`'s writer-task pattern: the transport is owned
//! exclusively by one task once it is built and started, and every reply is
//! funnelled through it. Multi-session transports (HTTP/SSE) route an
//! outbound write to the right connection via `Transport::set_session_context`
//! — see `transport::adapters::http::server`'s doc comment for that contract —
//! so the writer task sets the context to the target session before every send.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::integration::constants::{integration_defaults, methods};
use crate::protocol::constants::defaults;
use crate::integration::dispatcher::{Dispatcher, DispatcherConfig};
use crate::integration::error::{McpError, McpResult};
use crate::integration::session::{ReplySender, SessionManager};
use crate::protocol::transport::{
    MessageContext, MessageHandler, Transport, TransportBuilder, TransportError,
};
use crate::protocol::types::{
    CallToolRequest, ClientCapabilities, GetPromptRequest, InitializeRequest, ListPromptsResult,
    ListResourcesResult, ListToolsResult, LogLevel, LoggingCapabilities, Prompt,
    PromptCapabilities, ReadResourceRequest, Resource, ResourceCapabilities,
    ServerCapabilities, ServerInfo, SetLoggingRequest, SubscribeResourceRequest, Tool,
    ToolCapabilities, UnsubscribeResourceRequest,
};
use crate::protocol::{JsonRpcMessage, JsonRpcNotification};
use crate::registry::{
    LoggingRegistry, PromptContext, PromptRegistry, ResourceContext, ResourceHandler,
    ResourceRegistry, ToolContext, ToolHandler, ToolRegistry,
};

/// Configuration for [`McpServer`], consumed by [`McpServerBuilder`].
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    pub server_info: ServerInfo,
    pub instructions: Option<String>,
    /// Whether to advertise the `logging` capability and admit
    /// `logging/setLevel` (§4.10).
    pub enable_logging: bool,
    pub dispatcher: DispatcherConfig,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            server_info: ServerInfo {
                name: defaults::SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: None,
            enable_logging: false,
            dispatcher: DispatcherConfig::default(),
        }
    }
}

/// Builder for [`McpServer`].
#[derive(Default)]
pub struct McpServerBuilder {
    config: McpServerConfig,
    tools: ToolRegistry,
    prompts: PromptRegistry,
    resources: ResourceRegistry,
}

impl McpServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.config.server_info = ServerInfo {
            name: name.into(),
            version: version.into(),
        };
        self
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.config.instructions = Some(instructions.into());
        self
    }

    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.config.enable_logging = enabled;
        self
    }

    pub fn dispatcher_config(mut self, config: DispatcherConfig) -> Self {
        self.config.dispatcher = config;
        self
    }

    /// Register a tool available at build time. Tools can also be added
    /// after the server is built via [`McpServer::add_tool`].
    ///
    /// Fails if `tool.name` is empty or `tool.input_schema` is not a JSON
    /// object.
    pub fn with_tool(self, tool: Tool, handler: ToolHandler) -> McpResult<Self> {
        self.tools.add_tool(tool, handler)?;
        Ok(self)
    }

    pub fn with_prompt(self, prompt: Prompt) -> Self {
        self.prompts.add_prompt(prompt);
        self
    }

    pub fn with_resource(self, resource: Resource, handler: ResourceHandler) -> Self {
        self.resources.add_resource(resource, handler);
        self
    }

    /// Build the server against a pre-configured transport builder. The
    /// transport's message handler is installed, the transport is started,
    /// and it is handed off to a dedicated writer task before this returns.
    pub async fn build<B>(self, transport_builder: B) -> McpResult<McpServer>
    where
        B: TransportBuilder<()> + 'static,
    {
        McpServer::new_with_parts(transport_builder, self.config, self.tools, self.prompts, self.resources).await
    }
}

/// Commands fed to the writer task that owns the transport after it starts.
enum ServerWriterCommand {
    Send {
        session_id: String,
        message: JsonRpcMessage,
    },
    Close(oneshot::Sender<McpResult<()>>),
}

async fn run_server_writer<T: Transport>(
    mut transport: T,
    mut commands: mpsc::Receiver<ServerWriterCommand>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            ServerWriterCommand::Send { session_id, message } => {
                transport.set_session_context(Some(session_id));
                if let Err(error) = transport.send(&message).await {
                    tracing::warn!(%error, "failed to send message to client");
                }
            }
            ServerWriterCommand::Close(ack) => {
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

/// Routes inbound requests through the dispatcher and inbound
/// `notifications/initialized` into the session's handshake completion.
struct ServerMessageHandler {
    sessions: SessionManager,
    dispatcher: Dispatcher,
    server_info: ServerInfo,
    capabilities: ServerCapabilities,
    writer: mpsc::Sender<ServerWriterCommand>,
}

impl ServerMessageHandler {
    fn reply_sender(&self, session_id: String) -> ReplySender {
        let writer = self.writer.clone();
        Arc::new(move |message: JsonRpcMessage| {
            let writer = writer.clone();
            let session_id = session_id.clone();
            Box::pin(async move {
                writer
                    .send(ServerWriterCommand::Send { session_id, message })
                    .await
                    .map_err(|_| McpError::custom("server transport writer has stopped"))
            })
        })
    }

    /// Lazily register a session the first time a message arrives on it.
    /// Stdio transports have one long-lived session-id for the connection;
    /// HTTP mints one per SSE stream and this is the first the server core
    /// hears of it.
    fn ensure_session(&self, session_id: &str) {
        if !self.sessions.contains(session_id) {
            self.sessions.create_session(
                session_id.to_string(),
                self.server_info.clone(),
                self.capabilities.clone(),
                self.reply_sender(session_id.to_string()),
            );
        }
    }
}

#[async_trait]
impl MessageHandler<()> for ServerMessageHandler {
    async fn handle_message(&self, message: JsonRpcMessage, context: MessageContext<()>) {
        let session_id = context.session_id().unwrap_or("default").to_string();
        self.ensure_session(&session_id);

        match message {
            JsonRpcMessage::Request(request) => {
                if let Err(err) = self.sessions.ensure_can_dispatch(&session_id, &request.method) {
                    let response = crate::protocol::message::JsonRpcResponse::error(
                        serde_json::json!({ "code": err.error_code(), "message": err.to_string() }),
                        Some(request.id),
                    );
                    if let Err(error) = self
                        .sessions
                        .reply(&session_id, JsonRpcMessage::Response(response))
                        .await
                    {
                        tracing::warn!(%error, %session_id, "failed to deliver rejection response");
                    }
                    return;
                }

                let response = self.dispatcher.dispatch(request, session_id.clone()).await;
                if let Err(error) = self
                    .sessions
                    .reply(&session_id, JsonRpcMessage::Response(response))
                    .await
                {
                    tracing::warn!(%error, %session_id, "failed to deliver response");
                }
            }
            JsonRpcMessage::Notification(notification) => {
                if notification.method == methods::INITIALIZED {
                    if let Err(error) = self.sessions.complete_initialize(&session_id) {
                        tracing::warn!(%error, %session_id, "initialized notification rejected");
                    }
                } else {
                    tracing::debug!(method = %notification.method, "server ignoring notification");
                }
            }
            JsonRpcMessage::Response(_) => {
                tracing::debug!("server ignoring unexpected response");
            }
        }
    }

    async fn handle_error(&self, error: TransportError) {
        tracing::warn!(%error, "server transport error");
    }

    async fn handle_close(&self) {
        tracing::debug!("server transport closed");
    }
}

/// High-level server for MCP sessions over a single transport (§4.12).
pub struct McpServer {
    sessions: SessionManager,
    dispatcher: Dispatcher,
    tools: ToolRegistry,
    prompts: PromptRegistry,
    resources: ResourceRegistry,
    logging: LoggingRegistry,
    writer: mpsc::Sender<ServerWriterCommand>,
}

impl McpServer {
    /// Build a server with default configuration and no tools/prompts/resources.
    pub async fn new<B>(transport_builder: B) -> McpResult<Self>
    where
        B: TransportBuilder<()> + 'static,
    {
        McpServerBuilder::new().build(transport_builder).await
    }

    async fn new_with_parts<B>(
        transport_builder: B,
        config: McpServerConfig,
        tools: ToolRegistry,
        prompts: PromptRegistry,
        resources: ResourceRegistry,
    ) -> McpResult<Self>
    where
        B: TransportBuilder<()> + 'static,
    {
        let logging = LoggingRegistry::new();
        let sessions = SessionManager::new();
        let dispatcher = Dispatcher::new(config.dispatcher.clone());

        let capabilities = ServerCapabilities {
            experimental: None,
            logging: if config.enable_logging {
                Some(LoggingCapabilities {})
            } else {
                None
            },
            prompts: Some(PromptCapabilities {
                list_changed: Some(true),
            }),
            resources: Some(ResourceCapabilities {
                subscribe: Some(true),
                list_changed: Some(true),
            }),
            tools: Some(ToolCapabilities {
                list_changed: Some(true),
            }),
        };

        register_handlers(
            &dispatcher,
            sessions.clone(),
            tools.clone(),
            prompts.clone(),
            resources.clone(),
            logging.clone(),
            config.server_info.clone(),
            capabilities.clone(),
            config.instructions.clone(),
        );

        let (writer, writer_rx) = mpsc::channel(64);

        let handler = Arc::new(ServerMessageHandler {
            sessions: sessions.clone(),
            dispatcher: dispatcher.clone(),
            server_info: config.server_info.clone(),
            capabilities,
            writer: writer.clone(),
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

        tokio::spawn(run_server_writer(transport, writer_rx));

        Ok(Self {
            sessions,
            dispatcher,
            tools,
            prompts,
            resources,
            logging,
            writer,
        })
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    // Dynamic registry mutation + change notifications (§4.7-§4.9)

    pub async fn add_tool(&self, tool: Tool, handler: ToolHandler) -> McpResult<()> {
        self.tools.add_tool(tool, handler)?;
        self.broadcast(methods::NOTIFICATIONS_TOOLS_LIST_CHANGED).await;
        Ok(())
    }

    pub async fn remove_tool(&self, name: &str) -> bool {
        let removed = self.tools.remove_tool(name);
        if removed {
            self.broadcast(methods::NOTIFICATIONS_TOOLS_LIST_CHANGED).await;
        }
        removed
    }

    pub async fn add_prompt(&self, prompt: Prompt) {
        self.prompts.add_prompt(prompt);
        self.broadcast(methods::NOTIFICATIONS_PROMPTS_LIST_CHANGED).await;
    }

    pub async fn remove_prompt(&self, name: &str) -> bool {
        let removed = self.prompts.remove_prompt(name);
        if removed {
            self.broadcast(methods::NOTIFICATIONS_PROMPTS_LIST_CHANGED).await;
        }
        removed
    }

    pub async fn add_resource(&self, resource: Resource, handler: ResourceHandler) {
        self.resources.add_resource(resource, handler);
        self.broadcast(methods::NOTIFICATIONS_RESOURCES_LIST_CHANGED).await;
    }

    pub async fn remove_resource(&self, uri: &str) -> bool {
        let removed = self.resources.remove_resource(uri);
        if removed {
            self.broadcast(methods::NOTIFICATIONS_RESOURCES_LIST_CHANGED).await;
        }
        removed
    }

    /// Notify every subscriber of `uri` that its contents changed (§4.9).
    /// Only sessions that are both `ready` and currently subscribed receive it.
    pub async fn notify_resource_updated(&self, uri: &str) {
        let ready: std::collections::HashSet<String> =
            self.sessions.ready_session_ids().into_iter().collect();
        for session_id in self.resources.subscribers_of(uri) {
            if !ready.contains(&session_id) {
                continue;
            }
            let notification = JsonRpcNotification::new(
                methods::NOTIFICATIONS_RESOURCES_UPDATED,
                Some(serde_json::json!({ "uri": uri })),
            );
            if let Err(error) = self
                .sessions
                .reply(&session_id, JsonRpcMessage::Notification(notification))
                .await
            {
                tracing::warn!(%error, %session_id, %uri, "failed to deliver resources/updated");
            }
        }
    }

    /// Emit a `notifications/message` log entry (§4.10) to every `ready`
    /// session whose `logging/setLevel` threshold admits `level`.
    pub async fn log(&self, level: LogLevel, logger: Option<String>, data: Value) {
        for session_id in self.sessions.ready_session_ids() {
            if !self.logging.admits(&session_id, level) {
                continue;
            }
            let mut params = serde_json::json!({ "level": level.as_str(), "data": data });
            if let Some(logger) = &logger {
                params["logger"] = serde_json::json!(logger);
            }
            let notification = JsonRpcNotification::new(methods::NOTIFICATIONS_MESSAGE, Some(params));
            if let Err(error) = self
                .sessions
                .reply(&session_id, JsonRpcMessage::Notification(notification))
                .await
            {
                tracing::warn!(%error, %session_id, "failed to deliver log message");
            }
        }
    }

    async fn broadcast(&self, method: &str) {
        for session_id in self.sessions.ready_session_ids() {
            let notification = JsonRpcNotification::new(method, None);
            if let Err(error) = self
                .sessions
                .reply(&session_id, JsonRpcMessage::Notification(notification))
                .await
            {
                tracing::warn!(%error, %session_id, %method, "failed to deliver list_changed notification");
            }
        }
    }

    /// Shut the server down: mark every `ready` session `terminated`, wait up
    /// to the §5 grace window for in-flight dispatcher work to drain, then
    /// close the transport regardless of whether it drained in time.
    pub async fn stop(&self) -> McpResult<()> {
        for session_id in self.sessions.ready_session_ids() {
            let _ = self.sessions.mark_terminated(&session_id);
        }

        let grace = Duration::from_secs(integration_defaults::SHUTDOWN_GRACE_SECONDS);
        let deadline = tokio::time::Instant::now() + grace;
        while !self.dispatcher.is_idle() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        let (ack_tx, ack_rx) = oneshot::channel();
        if self.writer.send(ServerWriterCommand::Close(ack_tx)).await.is_err() {
            return Ok(()); // writer task already gone
        }
        ack_rx
            .await
            .map_err(|_| McpError::custom("server writer task dropped before acking close"))?
    }
}

#[allow(clippy::too_many_arguments)]
fn register_handlers(
    dispatcher: &Dispatcher,
    sessions: SessionManager,
    tools: ToolRegistry,
    prompts: PromptRegistry,
    resources: ResourceRegistry,
    logging: LoggingRegistry,
    server_info: ServerInfo,
    capabilities: ServerCapabilities,
    instructions: Option<String>,
) {
    dispatcher.register(methods::INITIALIZE, {
        let sessions = sessions.clone();
        Arc::new(move |params, session_id| {
            let sessions = sessions.clone();
            let server_info = server_info.clone();
            let capabilities = capabilities.clone();
            let instructions = instructions.clone();
            Box::pin(async move {
                let params = params
                    .ok_or_else(|| McpError::invalid_params("initialize requires params"))?;
                let request: InitializeRequest = serde_json::from_value(params)
                    .map_err(|e| McpError::invalid_params(format!("invalid initialize params: {e}")))?;
                let client_capabilities: ClientCapabilities = serde_json::from_value(
                    request.capabilities.clone(),
                )
                .unwrap_or_default();
                let negotiated = sessions.begin_initialize(
                    &session_id,
                    request.protocol_version.as_str(),
                    request.client_info,
                    client_capabilities,
                )?;
                Ok(serde_json::json!({
                    "protocolVersion": negotiated.as_str(),
                    "serverInfo": server_info,
                    "capabilities": capabilities,
                    "instructions": instructions,
                }))
            })
        })
    });

    dispatcher.register(methods::PING, Arc::new(|_params, _session_id| {
        Box::pin(async move { Ok(serde_json::json!({})) })
    }));

    dispatcher.register(methods::TOOLS_LIST, {
        let tools = tools.clone();
        let sessions = sessions.clone();
        Arc::new(move |_params, session_id| {
            let tools = tools.clone();
            let sessions = sessions.clone();
            Box::pin(async move {
                let version = sessions
                    .with_session(&session_id, |s| s.protocol_version.clone())
                    .flatten()
                    .unwrap_or_else(crate::protocol::types::ProtocolVersion::current);
                let listed: Vec<Tool> = tools
                    .list_tools()
                    .into_iter()
                    .map(|t| t.for_version(&version))
                    .collect();
                serde_json::to_value(ListToolsResult::new(listed))
                    .map_err(|e| McpError::internal_error(e.to_string()))
            })
        })
    });

    dispatcher.register(methods::TOOLS_CALL, {
        let tools = tools.clone();
        Arc::new(move |params, session_id| {
            let tools = tools.clone();
            Box::pin(async move {
                let params = params
                    .ok_or_else(|| McpError::invalid_params("tools/call requires params"))?;
                let request: CallToolRequest = serde_json::from_value(params)
                    .map_err(|e| McpError::invalid_params(format!("invalid tools/call params: {e}")))?;
                let ctx = ToolContext { session_id };
                let result = tools.call_tool(&request.name, ctx, request.arguments).await?;
                serde_json::to_value(result).map_err(|e| McpError::internal_error(e.to_string()))
            })
        })
    });

    dispatcher.register(methods::PROMPTS_LIST, {
        let prompts = prompts.clone();
        let sessions = sessions.clone();
        Arc::new(move |_params, session_id| {
            let prompts = prompts.clone();
            let sessions = sessions.clone();
            Box::pin(async move {
                let version = sessions
                    .with_session(&session_id, |s| s.protocol_version.clone())
                    .flatten()
                    .unwrap_or_else(crate::protocol::types::ProtocolVersion::current);
                let listed: Vec<Prompt> = prompts
                    .list_prompts()
                    .into_iter()
                    .map(|p| p.for_version(&version))
                    .collect();
                serde_json::to_value(ListPromptsResult::new(listed))
                    .map_err(|e| McpError::internal_error(e.to_string()))
            })
        })
    });

    dispatcher.register(methods::PROMPTS_GET, {
        let prompts = prompts.clone();
        Arc::new(move |params, session_id| {
            let prompts = prompts.clone();
            Box::pin(async move {
                let params = params
                    .ok_or_else(|| McpError::invalid_params("prompts/get requires params"))?;
                let request: GetPromptRequest = serde_json::from_value(params)
                    .map_err(|e| McpError::invalid_params(format!("invalid prompts/get params: {e}")))?;
                let ctx = PromptContext { session_id };
                let result = prompts
                    .get_prompt(&request.name, ctx, request.arguments)
                    .await?;
                serde_json::to_value(result).map_err(|e| McpError::internal_error(e.to_string()))
            })
        })
    });

    dispatcher.register(methods::RESOURCES_LIST, {
        let resources = resources.clone();
        let sessions = sessions.clone();
        Arc::new(move |_params, session_id| {
            let resources = resources.clone();
            let sessions = sessions.clone();
            Box::pin(async move {
                let version = sessions
                    .with_session(&session_id, |s| s.protocol_version.clone())
                    .flatten()
                    .unwrap_or_else(crate::protocol::types::ProtocolVersion::current);
                let listed: Vec<Resource> = resources
                    .list_resources()
                    .into_iter()
                    .map(|r| r.for_version(&version))
                    .collect();
                serde_json::to_value(ListResourcesResult::new(listed))
                    .map_err(|e| McpError::internal_error(e.to_string()))
            })
        })
    });

    dispatcher.register(methods::RESOURCES_READ, {
        let resources = resources.clone();
        Arc::new(move |params, session_id| {
            let resources = resources.clone();
            Box::pin(async move {
                let params = params
                    .ok_or_else(|| McpError::invalid_params("resources/read requires params"))?;
                let request: ReadResourceRequest = serde_json::from_value(params)
                    .map_err(|e| McpError::invalid_params(format!("invalid resources/read params: {e}")))?;
                let ctx = ResourceContext { session_id };
                let result = resources.read_resource(request.uri.as_str(), ctx).await?;
                serde_json::to_value(result).map_err(|e| McpError::internal_error(e.to_string()))
            })
        })
    });

    dispatcher.register(methods::RESOURCES_SUBSCRIBE, {
        let resources = resources.clone();
        let sessions = sessions.clone();
        Arc::new(move |params, session_id| {
            let resources = resources.clone();
            let sessions = sessions.clone();
            Box::pin(async move {
                let params = params.ok_or_else(|| {
                    McpError::invalid_params("resources/subscribe requires params")
                })?;
                let request: SubscribeResourceRequest = serde_json::from_value(params).map_err(|e| {
                    McpError::invalid_params(format!("invalid resources/subscribe params: {e}"))
                })?;
                resources.subscribe(request.uri.as_str(), &session_id)?;
                sessions.subscribe_resource(&session_id, request.uri.as_str());
                Ok(serde_json::json!({}))
            })
        })
    });

    dispatcher.register(methods::RESOURCES_UNSUBSCRIBE, {
        let resources = resources.clone();
        let sessions = sessions.clone();
        Arc::new(move |params, session_id| {
            let resources = resources.clone();
            let sessions = sessions.clone();
            Box::pin(async move {
                let params = params.ok_or_else(|| {
                    McpError::invalid_params("resources/unsubscribe requires params")
                })?;
                let request: UnsubscribeResourceRequest =
                    serde_json::from_value(params).map_err(|e| {
                        McpError::invalid_params(format!(
                            "invalid resources/unsubscribe params: {e}"
                        ))
                    })?;
                resources.unsubscribe(request.uri.as_str(), &session_id);
                sessions.unsubscribe_resource(&session_id, request.uri.as_str());
                Ok(serde_json::json!({}))
            })
        })
    });

    dispatcher.register(methods::LOGGING_SET_LEVEL, {
        let sessions = sessions.clone();
        let logging = logging.clone();
        Arc::new(move |params, session_id| {
            let sessions = sessions.clone();
            let logging = logging.clone();
            Box::pin(async move {
                let params = params.ok_or_else(|| {
                    McpError::invalid_params("logging/setLevel requires params")
                })?;
                let request: SetLoggingRequest = serde_json::from_value(params).map_err(|e| {
                    McpError::invalid_params(format!("invalid logging/setLevel params: {e}"))
                })?;
                logging.set_level(&session_id, request.level);
                sessions.set_log_level(&session_id, request.level);
                Ok(serde_json::json!({}))
            })
        })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::adapters::in_memory::{self, InMemoryTransportBuilder};

    fn echo_tool() -> Tool {
        Tool {
            name: "echo".to_string(),
            title: None,
            description: Some("Echoes its input".to_string()),
            input_schema: serde_json::json!({"type": "object"}),
            output_schema: None,
            annotations: None,
        }
    }

    fn echo_handler() -> ToolHandler {
        Arc::new(|_ctx, args| {
            Box::pin(async move {
                Ok(crate::protocol::types::CallToolResult::success(vec![
                    crate::protocol::types::Content::text(args.to_string()),
                ]))
            })
        })
    }

    #[tokio::test]
    async fn builds_and_starts_against_in_memory_transport() {
        let (_client_end, server_end) = in_memory::pair(8);
        let server = McpServer::new(InMemoryTransportBuilder::new(server_end))
            .await
            .unwrap();
        assert_eq!(server.session_count(), 0);
    }

    #[tokio::test]
    async fn builder_registers_tool_before_build() {
        let (_client_end, server_end) = in_memory::pair(8);
        let server = McpServerBuilder::new()
            .server_info("test-server", "0.1.0")
            .with_tool(echo_tool(), echo_handler())
            .unwrap()
            .build(InMemoryTransportBuilder::new(server_end))
            .await
            .unwrap();
        assert!(server.dispatcher.is_registered(methods::TOOLS_CALL));
        assert_eq!(server.tools.len(), 1);
    }

    #[tokio::test]
    async fn add_tool_after_build_is_visible_to_registry() {
        let (_client_end, server_end) = in_memory::pair(8);
        let server = McpServer::new(InMemoryTransportBuilder::new(server_end))
            .await
            .unwrap();
        server.add_tool(echo_tool(), echo_handler()).await.unwrap();
        assert_eq!(server.tools.len(), 1);
    }

    #[tokio::test]
    async fn stop_closes_without_panicking_when_idle() {
        let (_client_end, server_end) = in_memory::pair(8);
        let server = McpServer::new(InMemoryTransportBuilder::new(server_end))
            .await
            .unwrap();
        server.stop().await.unwrap();
    }
}
