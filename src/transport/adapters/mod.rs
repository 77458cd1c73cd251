//! Transport Adapters
//!
//! Concrete [`crate::protocol::transport::Transport`] implementations. Each
//! adapter is built through its own `*TransportBuilder`, which takes a
//! [`crate::protocol::transport::MessageHandler`] up front — there is no
//! `set_message_handler` escape hatch, so a running transport can never be
//! missing its handler.
//!
//! - [`stdio`]: newline-delimited JSON-RPC over stdin/stdout (process-local MCP).
//! - [`http`]: `POST /messages` + `GET /sse` per §4.3 (remote MCP over HTTP).
//! - [`in_memory`]: paired in-process queues, for tests and same-binary client/server.

pub mod http;
pub mod in_memory;
pub mod stdio;

pub use http::{HttpClientTransport, HttpClientTransportBuilder, HttpServerTransport, HttpServerTransportBuilder};
pub use in_memory::{InMemoryTransport, InMemoryTransportBuilder};
pub use stdio::{StdioTransport, StdioTransportBuilder};
