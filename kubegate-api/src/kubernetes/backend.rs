//! Seams between the gateway and a cluster
//!
//! `ResourceBackend` is the per-context object store the dispatcher talks to;
//! `ClientFactory` builds one for a context. The live implementations are in
//! `client.rs`; tests substitute in-memory ones.

use async_trait::async_trait;
use kube::core::ApiResource;
use serde_json::Value;
use std::sync::Arc;

use super::error::GatewayResult;
use super::types::ClusterContext;

/// Dynamic CRUD over any resource kind
///
/// `namespace` is `None` for cluster-scoped kinds and for listing across all
/// namespaces.
#[async_trait]
pub trait ResourceBackend: Send + Sync {
    async fn list(&self, resource: &ApiResource, namespace: Option<&str>) -> GatewayResult<Vec<Value>>;

    async fn get(&self, resource: &ApiResource, namespace: Option<&str>, name: &str) -> GatewayResult<Value>;

    async fn create(&self, resource: &ApiResource, namespace: Option<&str>, object: Value) -> GatewayResult<Value>;

    /// Full replace; the object must carry the resourceVersion it was read at
    async fn replace(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
        name: &str,
        object: Value,
    ) -> GatewayResult<Value>;

    async fn delete(&self, resource: &ApiResource, namespace: Option<&str>, name: &str) -> GatewayResult<()>;
}

/// Builds a backend for a context
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn connect(&self, context: &ClusterContext) -> GatewayResult<Arc<dyn ResourceBackend>>;
}
