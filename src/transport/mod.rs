//! Transport Layer
//!
//! Concrete, pluggable implementations of [`crate::protocol::transport::Transport`]
//! (C3). Every adapter under [`adapters`] is event-driven: it is constructed
//! through a pre-configured [`crate::protocol::transport::TransportBuilder`]
//! that installs the [`crate::protocol::transport::MessageHandler`] before the
//! transport starts, so there is no window where a message could arrive with
//! no handler attached.
//!
//! [`buffer`] provides the pooled-buffer plumbing adapters use for their own
//! message framing (stdio's newline-delimited reads, HTTP's body buffering).
//!
//! # Transports
//!
//! - **stdio** ([`adapters::stdio`]): newline-delimited JSON-RPC over stdin/stdout.
//! - **HTTP** ([`adapters::http`]): `POST /messages` + `GET /sse` per §4.3.
//! - **in-memory** ([`adapters::in_memory`]): paired queues for same-process testing.

pub mod adapters;
pub mod buffer;

pub use crate::protocol::transport::TransportError;
pub use buffer::{BufferConfig, BufferManager, BufferMetrics, PooledBuffer};
