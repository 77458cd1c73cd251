//! HTTP transport configuration
//!
//! Builder-pattern configuration shared by [`super::server::HttpServerTransport`]
//! and [`super::client::HttpClientTransport`], following the same progressive
//! `Config::new().with_x().with_y()` shape used throughout this crate's other
//! transport configs.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Configuration for the server side of the HTTP transport (C3 / §4.3).
#[derive(Debug, Clone, PartialEq)]
pub struct HttpServerTransportConfig {
    /// Address the Axum listener binds to.
    pub bind_address: SocketAddr,
    /// Capacity of each session's SSE outbound channel.
    pub sse_channel_capacity: usize,
    /// `Keep-Alive` interval for idle SSE streams.
    pub sse_keep_alive: Duration,
    /// Optional allowlist of `Origin` header values. `None` disables the check.
    pub allowed_origins: Option<Vec<String>>,
}

impl HttpServerTransportConfig {
    pub fn new() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            sse_channel_capacity: 64,
            sse_keep_alive: Duration::from_secs(15),
            allowed_origins: None,
        }
    }

    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    pub fn sse_channel_capacity(mut self, capacity: usize) -> Self {
        self.sse_channel_capacity = capacity;
        self
    }

    pub fn sse_keep_alive(mut self, interval: Duration) -> Self {
        self.sse_keep_alive = interval;
        self
    }

    pub fn allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = Some(origins);
        self
    }
}

impl Default for HttpServerTransportConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the client side of the HTTP transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpClientTransportConfig {
    /// Base URL of the remote MCP server, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Whether to keep the SSE stream open for server-pushed notifications
    /// after the initial `endpoint` event. When `false` the client learns its
    /// session id and then drops the stream, so it can only fire requests
    /// that don't require a correlated response.
    pub use_sse: bool,
    /// Per-request timeout for `POST /messages`.
    pub request_timeout: Duration,
    /// Optional allowlist the server's origin must appear in before connecting.
    pub allowed_origins: Option<Vec<String>>,
}

impl HttpClientTransportConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            use_sse: true,
            request_timeout: Duration::from_secs(30),
            allowed_origins: None,
        }
    }

    pub fn use_sse(mut self, use_sse: bool) -> Self {
        self.use_sse = use_sse;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = Some(origins);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_defaults() {
        let config = HttpServerTransportConfig::new();
        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
        assert_eq!(config.sse_channel_capacity, 64);
        assert!(config.allowed_origins.is_none());
    }

    #[test]
    fn server_config_builder() {
        let config = HttpServerTransportConfig::new()
            .bind_address("0.0.0.0:9000".parse().unwrap())
            .sse_channel_capacity(128)
            .allowed_origins(vec!["https://example.com".to_string()]);

        assert_eq!(config.bind_address.to_string(), "0.0.0.0:9000");
        assert_eq!(config.sse_channel_capacity, 128);
        assert_eq!(
            config.allowed_origins,
            Some(vec!["https://example.com".to_string()])
        );
    }

    #[test]
    fn client_config_defaults() {
        let config = HttpClientTransportConfig::new("http://localhost:8080");
        assert!(config.use_sse);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
