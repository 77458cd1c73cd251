//! Integration-layer error types
//!
//! `McpError` is the error type surfaced by the client and server cores.
//! It is distinct from [`crate::protocol::errors::ProtocolError`] (wire/envelope
//! failures) and from [`crate::correlation::CorrelationError`] (client-side
//! pending-request failures) even though it wraps both at its boundary.

use thiserror::Error;

use crate::correlation::CorrelationError;
use crate::protocol::errors::ProtocolError;
use crate::protocol::ProtocolVersion;

/// Errors internal to the integration layer that don't originate from the
/// wire protocol or the correlation core (e.g. transport plumbing failures).
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// Catch-all for integration-layer failures that don't warrant their own variant.
    #[error("{message}")]
    Other { message: String },
}

/// Top-level error type for the MCP client and server cores.
///
/// Handler exceptions are caught at the dispatcher boundary and converted to
/// `internal-error` JSON-RPC responses; this type is what crosses that
/// boundary internally before being shaped into a wire error or an
/// application-level `{isError: true, ...}` result.
#[derive(Debug, Error)]
pub enum McpError {
    /// Wraps a protocol/envelope-level failure (wire codec, JSON-RPC error taxonomy).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Wraps a client-side correlation failure (timeout, cancelled, channel closed).
    #[error(transparent)]
    Correlation(#[from] CorrelationError),

    /// Wraps a miscellaneous integration-layer failure.
    #[error(transparent)]
    Integration(#[from] IntegrationError),

    /// No active transport/session connection for this operation.
    #[error("not connected")]
    NotConnected,

    /// Attempted to connect/initialize a client that is already connected.
    #[error("already connected")]
    AlreadyConnected,

    /// Session is not yet in the `ready` state for the requested operation.
    #[error("session not ready")]
    NotReady,

    /// An illegal session lifecycle state transition was attempted.
    #[error("invalid session state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    /// Client and server could not agree on a mutually supported protocol version.
    #[error("protocol version mismatch: client requested {requested}, server negotiated {negotiated}")]
    VersionMismatch {
        requested: String,
        negotiated: ProtocolVersion,
    },

    /// Requested capability was not negotiated/advertised by the peer.
    #[error("unsupported capability: {capability}")]
    UnsupportedCapability { capability: String },

    /// `tools/call` referenced an unknown tool name.
    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    /// A tool implementation returned an application-level failure.
    #[error("tool execution failed for {name}: {message}")]
    ToolExecutionFailed { name: String, message: String },

    /// `prompts/get` referenced an unknown prompt name.
    #[error("prompt not found: {name}")]
    PromptNotFound { name: String },

    /// `resources/read`, `/subscribe`, or `/unsubscribe` referenced an unknown URI.
    #[error("resource not found: {uri}")]
    ResourceNotFound { uri: String },

    /// A request carried a malformed envelope or failed MCP-level validation
    /// (bad `jsonrpc`/`method`, not a `params` shape problem — see
    /// [`McpError::InvalidParams`] for that).
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// A request's `params` were missing a required field or had the wrong type.
    #[error("invalid params: {message}")]
    InvalidParams { message: String },

    /// A response/notification from the peer failed to parse into the expected shape.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// `logging/setLevel` (or any other call) rejected by the remote as a server error.
    #[error("server error: {message}")]
    ServerError { message: String },

    /// Generic catch-all constructor for ad hoc failures.
    #[error("{0}")]
    Custom(String),
}

/// Convenience result alias for the integration layer.
pub type McpResult<T> = Result<T, McpError>;

impl McpError {
    pub fn custom(message: impl Into<String>) -> Self {
        McpError::Custom(message.into())
    }

    pub fn already_connected() -> Self {
        McpError::AlreadyConnected
    }

    pub fn not_ready() -> Self {
        McpError::NotReady
    }

    pub fn invalid_state_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        McpError::InvalidStateTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn version_mismatch(requested: impl Into<String>, negotiated: ProtocolVersion) -> Self {
        McpError::VersionMismatch {
            requested: requested.into(),
            negotiated,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        McpError::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        McpError::InvalidParams {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        McpError::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn method_not_found(method: impl Into<String>) -> Self {
        McpError::Protocol(ProtocolError::mcp(format!(
            "method not found: {}",
            method.into()
        )))
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        McpError::Protocol(ProtocolError::mcp(message.into()))
    }

    pub fn unsupported_capability(capability: impl Into<String>) -> Self {
        McpError::UnsupportedCapability {
            capability: capability.into(),
        }
    }

    pub fn tool_not_found(name: impl Into<String>) -> Self {
        McpError::ToolNotFound { name: name.into() }
    }

    pub fn tool_execution_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        McpError::ToolExecutionFailed {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn prompt_not_found(name: impl Into<String>) -> Self {
        McpError::PromptNotFound { name: name.into() }
    }

    pub fn resource_not_found(uri: impl Into<String>) -> Self {
        McpError::ResourceNotFound { uri: uri.into() }
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        McpError::ServerError {
            message: message.into(),
        }
    }

    /// Maps this error onto the JSON-RPC 2.0 error taxonomy.
    pub fn error_code(&self) -> i32 {
        use crate::protocol::constants::error_codes::*;
        match self {
            McpError::UnsupportedCapability { .. } => INVALID_PARAMS,
            McpError::ToolNotFound { .. }
            | McpError::PromptNotFound { .. }
            | McpError::ResourceNotFound { .. }
            | McpError::InvalidParams { .. } => INVALID_PARAMS,
            McpError::InvalidRequest { .. } => INVALID_REQUEST,
            McpError::Protocol(e) => e.error_code(),
            _ => INTERNAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_not_found_maps_to_invalid_params() {
        let err = McpError::tool_not_found("missing-tool");
        assert_eq!(err.error_code(), -32602);
        assert!(err.to_string().contains("missing-tool"));
    }

    #[test]
    fn custom_preserves_message() {
        let err = McpError::custom("boom");
        assert_eq!(err.to_string(), "boom");
    }
}
