//! Integration layer (C5, C6, C11, C12)
//!
//! Wires the protocol, transport, correlation, and registry layers into the
//! two user-facing entry points: [`client::McpClient`] and [`server::McpServer`].
//! [`session::SessionManager`] and [`dispatcher::Dispatcher`] are the shared
//! machinery the server core needs to track connections and route requests;
//! the client core uses [`crate::correlation::CorrelationManager`] instead,
//! since it only ever has one outstanding session to track.

pub mod client;
pub mod constants;
pub mod dispatcher;
pub mod error;
pub mod server;
pub mod session;

pub use client::{ConnectionState, McpClient, McpClientBuilder, McpClientConfig};
pub use dispatcher::{Dispatcher, DispatcherConfig, DispatchHandler};
pub use error::{IntegrationError, McpError, McpResult};
pub use server::{McpServer, McpServerBuilder, McpServerConfig};
pub use session::{ReplySender, Session, SessionManager, SessionState};

/// Convenience result alias for call sites that only deal in
/// integration-layer plumbing failures, not the full [`McpError`] union.
pub type IntegrationResult<T> = Result<T, IntegrationError>;
