//! Integration Layer Constants
//!
//! Re-exports protocol constants and adds the integration-specific defaults
//! that `McpClientConfig`/`McpServerConfig` fall back to.

// Re-export protocol constants
pub use crate::protocol::constants::*;

/// Default configuration values for [`super::client::McpClient`].
pub mod defaults {
    /// Default client name
    pub const CLIENT_NAME: &str = "airs-mcp-client";

    /// Default timeout in seconds
    pub const TIMEOUT_SECONDS: u64 = 30;
}

/// Default configuration values for [`super::server::McpServer`].
pub mod integration_defaults {
    /// Default client configuration timeout
    pub const CLIENT_TIMEOUT_MS: u64 = 30_000;

    /// Default maximum pending requests tracked by the correlation manager
    pub const MAX_PENDING_REQUESTS: usize = 1000;

    /// Default strict validation setting
    pub const STRICT_VALIDATION: bool = true;

    /// Default log operations setting
    pub const LOG_OPERATIONS: bool = false;

    /// Grace window for in-flight handlers to finish during `McpServer::stop`.
    pub const SHUTDOWN_GRACE_SECONDS: u64 = 5;
}
