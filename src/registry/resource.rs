//! Resource registry (C9)
//!
//! Like `registry::tool`, a dynamic name-keyed map — keyed here by URI — plus
//! a read handler. Additionally tracks, per URI, the set of session-ids
//! subscribed to update notifications (§4.9). Subscribe/unsubscribe are
//! idempotent: subscribing twice or unsubscribing a non-subscriber is a no-op
//! success, never an error.
//!
//! `read_resource` and `subscribe` disagree on how an unknown URI fails:
//! reading one is an application-level result (`{isError: true, ...}`),
//! while subscribing to one is a protocol-level `invalid-params` error.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::integration::error::{McpError, McpResult};
use crate::protocol::types::{ReadResourceResult, Resource};

/// Per-call context handed to a resource read handler.
#[derive(Debug, Clone)]
pub struct ResourceContext {
    pub session_id: String,
}

pub type ResourceHandler = Arc<
    dyn Fn(ResourceContext) -> BoxFuture<'static, McpResult<ReadResourceResult>> + Send + Sync,
>;

struct RegisteredResource {
    resource: Resource,
    handler: ResourceHandler,
}

/// Dynamic registry of readable, subscribable resources.
#[derive(Clone, Default)]
pub struct ResourceRegistry {
    resources: Arc<DashMap<String, RegisteredResource>>,
    subscribers: Arc<DashMap<String, Mutex<HashSet<String>>>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self {
            resources: Arc::new(DashMap::new()),
            subscribers: Arc::new(DashMap::new()),
        }
    }

    pub fn add_resource(&self, resource: Resource, handler: ResourceHandler) -> bool {
        let uri = resource.uri.as_str().to_string();
        self.resources
            .insert(uri, RegisteredResource { resource, handler })
            .is_some()
    }

    /// Remove a resource. Also drops its subscriber set — a deleted resource
    /// has nothing left to notify.
    pub fn remove_resource(&self, uri: &str) -> bool {
        self.subscribers.remove(uri);
        self.resources.remove(uri).is_some()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn list_resources(&self) -> Vec<Resource> {
        let mut resources: Vec<Resource> = self
            .resources
            .iter()
            .map(|e| e.value().resource.clone())
            .collect();
        resources.sort_by(|a, b| a.uri.as_str().cmp(b.uri.as_str()));
        resources
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.resources.contains_key(uri)
    }

    /// Read `uri`. An unknown URI is an application-level failure
    /// (`{isError: true, ...}`), not a protocol error — §4.9's resolution of
    /// the `resources/read` Open Question, kept distinct from `subscribe`'s
    /// invalid-params behavior below.
    pub async fn read_resource(
        &self,
        uri: &str,
        ctx: ResourceContext,
    ) -> McpResult<ReadResourceResult> {
        let handler = {
            let Some(entry) = self.resources.get(uri) else {
                return Ok(ReadResourceResult::error());
            };
            entry.value().handler.clone()
        };
        handler(ctx).await
    }

    /// Subscribe `session_id` to updates for `uri`. Idempotent.
    ///
    /// Returns `Err(ResourceNotFound)` if the URI isn't registered, matching
    /// §4.9's "unknown URI -> invalid-params" rule for `resources/subscribe`.
    pub fn subscribe(&self, uri: &str, session_id: &str) -> McpResult<()> {
        if !self.resources.contains_key(uri) {
            return Err(McpError::resource_not_found(uri));
        }
        self.subscribers
            .entry(uri.to_string())
            .or_default()
            .lock()
            .insert(session_id.to_string());
        Ok(())
    }

    /// Unsubscribe `session_id` from `uri`. Idempotent: unsubscribing an
    /// unknown URI or a session that was never subscribed both succeed.
    pub fn unsubscribe(&self, uri: &str, session_id: &str) {
        if let Some(set) = self.subscribers.get(uri) {
            set.lock().remove(session_id);
        }
    }

    /// Drop every subscription held by `session_id` (e.g. on disconnect).
    pub fn unsubscribe_all(&self, session_id: &str) {
        for entry in self.subscribers.iter() {
            entry.value().lock().remove(session_id);
        }
    }

    /// Session-ids currently subscribed to `uri`. Callers (the server core)
    /// are responsible for filtering this against live/initialized sessions
    /// before sending `notifications/resources/updated`.
    pub fn subscribers_of(&self, uri: &str) -> Vec<String> {
        self.subscribers
            .get(uri)
            .map(|set| set.lock().iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::{Content, Uri};

    fn file_resource() -> Resource {
        Resource {
            uri: Uri::new_unchecked("file:///tmp/data.txt"),
            name: "data".to_string(),
            description: None,
            mime_type: None,
            annotations: None,
        }
    }

    fn file_handler() -> ResourceHandler {
        Arc::new(|_ctx| {
            Box::pin(async move { Ok(ReadResourceResult::new(vec![Content::text("contents")])) })
        })
    }

    #[tokio::test]
    async fn add_and_read_resource() {
        let registry = ResourceRegistry::new();
        registry.add_resource(file_resource(), file_handler());

        let ctx = ResourceContext {
            session_id: "s1".to_string(),
        };
        let result = registry
            .read_resource("file:///tmp/data.txt", ctx)
            .await
            .unwrap();
        assert!(!result.is_error);
        assert_eq!(result.contents[0].as_text(), Some("contents"));
    }

    #[tokio::test]
    async fn read_unknown_uri_is_application_error() {
        let registry = ResourceRegistry::new();
        let ctx = ResourceContext {
            session_id: "s1".to_string(),
        };
        let result = registry
            .read_resource("file:///missing", ctx)
            .await
            .unwrap();
        assert!(result.is_error);
        assert!(result.contents.is_empty());
    }

    #[test]
    fn subscribe_is_idempotent() {
        let registry = ResourceRegistry::new();
        registry.add_resource(file_resource(), file_handler());

        registry.subscribe("file:///tmp/data.txt", "s1").unwrap();
        registry.subscribe("file:///tmp/data.txt", "s1").unwrap();
        assert_eq!(registry.subscribers_of("file:///tmp/data.txt"), vec!["s1"]);
    }

    #[test]
    fn unsubscribe_unknown_session_is_noop() {
        let registry = ResourceRegistry::new();
        registry.add_resource(file_resource(), file_handler());
        registry.unsubscribe("file:///tmp/data.txt", "never-subscribed");
        assert!(registry.subscribers_of("file:///tmp/data.txt").is_empty());
    }

    #[test]
    fn subscribe_unknown_uri_is_invalid_params() {
        let registry = ResourceRegistry::new();
        let err = registry.subscribe("file:///missing", "s1").unwrap_err();
        assert_eq!(err.error_code(), -32602);
    }

    #[test]
    fn remove_resource_drops_subscribers() {
        let registry = ResourceRegistry::new();
        registry.add_resource(file_resource(), file_handler());
        registry.subscribe("file:///tmp/data.txt", "s1").unwrap();
        registry.remove_resource("file:///tmp/data.txt");
        assert!(registry.subscribers_of("file:///tmp/data.txt").is_empty());
    }
}
