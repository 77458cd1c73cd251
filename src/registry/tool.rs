//! Tool registry (C7)
//!
//! Holds the dynamic set of tools a server advertises. Tools are added and
//! removed at runtime; callers of `add_tool`/`remove_tool` are responsible
//! for emitting `notifications/tools/list_changed` to initialized sessions
//! (the registry itself has no notion of sessions — see `integration::server`).

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;

use crate::integration::error::{McpError, McpResult};
use crate::protocol::types::{CallToolResult, Tool};

/// Per-call context handed to a tool handler.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub session_id: String,
}

/// A tool's implementation.
///
/// Handlers never propagate a `McpError` as a protocol failure: any `Err`
/// returned here is caught by the registry and folded into an
/// application-level `CallToolResult::error(..)`, matching §7's two failure
/// channels (unknown tool name is the only protocol-level error this layer
/// produces).
pub type ToolHandler = Arc<
    dyn Fn(ToolContext, serde_json::Value) -> BoxFuture<'static, McpResult<CallToolResult>>
        + Send
        + Sync,
>;

struct RegisteredTool {
    tool: Tool,
    handler: ToolHandler,
}

/// Dynamic registry of callable tools.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Arc<DashMap<String, RegisteredTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Arc::new(DashMap::new()),
        }
    }

    /// Register or replace a tool. Returns `true` if this replaced an
    /// existing registration under the same name.
    ///
    /// Rejects a registration whose `name` is empty or whose `input_schema`
    /// is not a JSON object (§4.7's insertion-time validation requirement).
    pub fn add_tool(&self, tool: Tool, handler: ToolHandler) -> McpResult<bool> {
        if tool.name.trim().is_empty() {
            return Err(McpError::invalid_params("tool name must not be empty"));
        }
        if !tool.input_schema.is_object() {
            return Err(McpError::invalid_params(format!(
                "tool '{}' input_schema must be a JSON object",
                tool.name
            )));
        }
        Ok(self
            .tools
            .insert(tool.name.clone(), RegisteredTool { tool, handler })
            .is_some())
    }

    /// Remove a tool by name. Returns `true` if it was present.
    pub fn remove_tool(&self, name: &str) -> bool {
        self.tools.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// List all registered tool definitions, sorted by name for stable pagination.
    pub fn list_tools(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self.tools.iter().map(|e| e.value().tool.clone()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Invoke a tool by name.
    ///
    /// Returns `Err(McpError::ToolNotFound)` (protocol error, `-32602`) if
    /// the name is unknown. Otherwise always returns `Ok`: handler-side
    /// failures are converted to `CallToolResult::error(..)`.
    pub async fn call_tool(
        &self,
        name: &str,
        ctx: ToolContext,
        arguments: serde_json::Value,
    ) -> McpResult<CallToolResult> {
        let handler = {
            let entry = self
                .tools
                .get(name)
                .ok_or_else(|| McpError::tool_not_found(name))?;
            entry.value().handler.clone()
        };

        match handler(ctx, arguments).await {
            Ok(result) => Ok(result),
            Err(err) => Ok(CallToolResult::error(vec![
                crate::protocol::types::Content::text(err.to_string()),
            ])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::Content;

    fn echo_tool() -> Tool {
        Tool {
            name: "echo".to_string(),
            title: None,
            description: Some("Echoes the message argument".to_string()),
            input_schema: serde_json::json!({"type": "object"}),
            output_schema: None,
            annotations: None,
        }
    }

    fn echo_handler() -> ToolHandler {
        Arc::new(|_ctx, args| {
            Box::pin(async move {
                let text = args
                    .get("message")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                Ok(CallToolResult::success(vec![Content::text(text)]))
            })
        })
    }

    #[tokio::test]
    async fn add_and_call_tool() {
        let registry = ToolRegistry::new();
        registry.add_tool(echo_tool(), echo_handler()).unwrap();

        let ctx = ToolContext {
            session_id: "s1".to_string(),
        };
        let result = registry
            .call_tool("echo", ctx, serde_json::json!({"message": "hi"}))
            .await
            .unwrap();

        assert!(!result.is_error);
        assert_eq!(result.content[0].as_text(), Some("hi"));
    }

    #[tokio::test]
    async fn unknown_tool_is_protocol_error() {
        let registry = ToolRegistry::new();
        let ctx = ToolContext {
            session_id: "s1".to_string(),
        };
        let err = registry
            .call_tool("missing", ctx, serde_json::json!({}))
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), -32602);
    }

    #[tokio::test]
    async fn handler_error_becomes_application_error() {
        let registry = ToolRegistry::new();
        let handler: ToolHandler = Arc::new(|_ctx, _args| {
            Box::pin(async move { Err(McpError::tool_execution_failed("boom", "failed")) })
        });
        registry
            .add_tool(
                Tool {
                    name: "boom".to_string(),
                    title: None,
                    description: None,
                    input_schema: serde_json::json!({"type": "object"}),
                    output_schema: None,
                    annotations: None,
                },
                handler,
            )
            .unwrap();

        let ctx = ToolContext {
            session_id: "s1".to_string(),
        };
        let result = registry
            .call_tool("boom", ctx, serde_json::json!({}))
            .await
            .unwrap();

        assert!(result.is_error);
    }

    #[test]
    fn remove_tool_triggers_list_changed_upstream() {
        let registry = ToolRegistry::new();
        registry.add_tool(echo_tool(), echo_handler()).unwrap();
        assert!(registry.remove_tool("echo"));
        assert!(registry.list_tools().is_empty());
    }

    #[test]
    fn empty_name_is_rejected() {
        let registry = ToolRegistry::new();
        let mut tool = echo_tool();
        tool.name = "".to_string();
        let err = registry.add_tool(tool, echo_handler()).unwrap_err();
        assert_eq!(err.error_code(), -32602);
    }

    #[test]
    fn non_object_input_schema_is_rejected() {
        let registry = ToolRegistry::new();
        let mut tool = echo_tool();
        tool.input_schema = serde_json::json!("not an object");
        let err = registry.add_tool(tool, echo_handler()).unwrap_err();
        assert_eq!(err.error_code(), -32602);
    }
}
