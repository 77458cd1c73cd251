//! Dispatcher (C6)
//!
//! A handler table mapping JSON-RPC method names to async closures, run on a
//! bounded worker pool with a per-request timeout. Every dispatch produces
//! exactly one [`JsonRpcResponse`] — §4.6's steps 1-5 collapse into
//! [`Dispatcher::dispatch`]: validate, look up, submit to the pool, catch
//! exceptions, and hand the result back to the caller (who writes it through
//! the session's `reply!`).

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::integration::error::McpError;
use crate::protocol::constants::error_codes;
use crate::protocol::message::{JsonRpcRequest, JsonRpcResponse};
use crate::protocol::RequestId;

/// A registered method implementation. Takes the request's `params` and the
/// session-id it arrived on, returns the would-be `result` value or an
/// `McpError` to be mapped onto the §4.2 error taxonomy.
pub type DispatchHandler =
    Arc<dyn Fn(Option<Value>, String) -> BoxFuture<'static, Result<Value, McpError>> + Send + Sync>;

/// Runtime configuration for the dispatcher's worker pool.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Bounded worker pool size. Defaults to 2x CPU cores (§5).
    pub max_concurrent_requests: usize,
    /// Wall-clock deadline per dispatched handler (§4.6, default 30s).
    pub request_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 2 * num_cpus::get(),
            request_timeout: Duration::from_secs(
                crate::protocol::constants::defaults::TIMEOUT_SECONDS,
            ),
        }
    }
}

/// Handler-table method router with a bounded worker pool (C6).
#[derive(Clone)]
pub struct Dispatcher {
    handlers: Arc<DashMap<String, DispatchHandler>>,
    pool: Arc<Semaphore>,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            handlers: Arc::new(DashMap::new()),
            pool: Arc::new(Semaphore::new(config.max_concurrent_requests)),
            config,
        }
    }

    /// Register (or replace) the handler for `method`.
    pub fn register(&self, method: impl Into<String>, handler: DispatchHandler) {
        self.handlers.insert(method.into(), handler);
    }

    pub fn is_registered(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Whether every worker slot is currently free. Polled by
    /// [`crate::integration::server::McpServer::stop`] while it waits out its
    /// grace window for in-flight requests to finish.
    pub fn is_idle(&self) -> bool {
        self.pool.available_permits() == self.config.max_concurrent_requests
    }

    /// Dispatch a single request, always returning a response (§4.6 step 5
    /// is left to the caller, which owns the session's `reply!`).
    pub async fn dispatch(&self, request: JsonRpcRequest, session_id: String) -> JsonRpcResponse {
        let handler = match self.handlers.get(&request.method) {
            Some(h) => h.value().clone(),
            None => {
                return error_response(
                    request.id,
                    error_codes::METHOD_NOT_FOUND,
                    format!("method not found: {}", request.method),
                    None,
                );
            }
        };

        let permit = match self.pool.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                return error_response(
                    request.id,
                    error_codes::SERVER_ERROR,
                    "server overloaded".to_string(),
                    None,
                );
            }
        };

        let params = request.params.clone();
        let id = request.id.clone();
        let task = tokio::spawn(async move {
            let _permit = permit;
            handler(params, session_id).await
        });

        match tokio::time::timeout(self.config.request_timeout, task).await {
            Ok(Ok(Ok(result))) => JsonRpcResponse::success(result, id),
            Ok(Ok(Err(err))) => error_response(
                Some(id),
                err.error_code(),
                err.to_string(),
                Some(serde_json::json!({ "detail": err.to_string() })),
            ),
            Ok(Err(join_err)) => error_response(
                Some(id),
                error_codes::INTERNAL_ERROR,
                "handler panicked".to_string(),
                Some(serde_json::json!({ "detail": join_err.to_string() })),
            ),
            Err(_elapsed) => error_response(
                Some(id),
                error_codes::INTERNAL_ERROR,
                "request timed out".to_string(),
                Some(serde_json::json!({ "detail": "deadline exceeded" })),
            ),
        }
    }
}

fn error_response(
    id: Option<RequestId>,
    code: i32,
    message: String,
    data: Option<Value>,
) -> JsonRpcResponse {
    let mut error = serde_json::json!({ "code": code, "message": message });
    if let Some(data) = data {
        error["data"] = data;
    }
    JsonRpcResponse::error(error, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_handler() -> DispatchHandler {
        Arc::new(|params, _session_id| Box::pin(async move { Ok(params.unwrap_or(Value::Null)) }))
    }

    #[tokio::test]
    async fn dispatches_registered_method() {
        let dispatcher = Dispatcher::new(DispatcherConfig::default());
        dispatcher.register("echo", echo_handler());

        let request = JsonRpcRequest::new(
            "echo",
            Some(serde_json::json!({"hi": "there"})),
            RequestId::new_number(1),
        );
        let response = dispatcher.dispatch(request, "s1".to_string()).await;
        assert_eq!(response.result, Some(serde_json::json!({"hi": "there"})));
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let dispatcher = Dispatcher::new(DispatcherConfig::default());
        let request = JsonRpcRequest::new("missing", None, RequestId::new_number(1));
        let response = dispatcher.dispatch(request, "s1".to_string()).await;
        let error = response.error.unwrap();
        assert_eq!(error["code"], error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn handler_error_maps_to_its_error_code_with_detail() {
        let dispatcher = Dispatcher::new(DispatcherConfig::default());
        dispatcher.register(
            "fails",
            Arc::new(|_params, _session_id| {
                Box::pin(async move { Err(McpError::tool_not_found("x")) })
            }),
        );
        let request = JsonRpcRequest::new("fails", None, RequestId::new_number(2));
        let response = dispatcher.dispatch(request, "s1".to_string()).await;
        let error = response.error.unwrap();
        assert_eq!(error["code"], error_codes::INVALID_PARAMS);
        assert!(error["data"]["detail"].as_str().unwrap().contains('x'));
    }

    #[tokio::test]
    async fn saturated_pool_returns_overloaded() {
        let config = DispatcherConfig {
            max_concurrent_requests: 1,
            request_timeout: Duration::from_secs(5),
        };
        let dispatcher = Dispatcher::new(config);
        dispatcher.register(
            "slow",
            Arc::new(|_params, _session_id| {
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok(Value::Null)
                })
            }),
        );

        let d1 = dispatcher.clone();
        let first = tokio::spawn(async move {
            d1.dispatch(
                JsonRpcRequest::new("slow", None, RequestId::new_number(1)),
                "s1".to_string(),
            )
            .await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = dispatcher
            .dispatch(
                JsonRpcRequest::new("slow", None, RequestId::new_number(2)),
                "s1".to_string(),
            )
            .await;
        let error = second.error.unwrap();
        assert_eq!(error["code"], error_codes::SERVER_ERROR);

        first.await.unwrap();
    }
}
