//! HTTP transport (C3 / §4.3)
//!
//! `POST /messages?session_id=<id>` carries one JSON-RPC message per request
//! body; `GET /sse` opens the per-session event stream and announces the
//! former as its first `endpoint` event. See [`server`] and [`client`] for
//! the two sides of that exchange.

pub mod client;
pub mod config;
pub mod server;

pub use client::{HttpClientTransport, HttpClientTransportBuilder};
pub use config::{HttpClientTransportConfig, HttpServerTransportConfig};
pub use server::{HttpServerTransport, HttpServerTransportBuilder};
