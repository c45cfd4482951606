//! Kubernetes client wrapper
//!
//! Wraps the kube-rs Client with its context and implements the dynamic
//! resource backend on top of `Api<DynamicObject>`.

use async_trait::async_trait;
use kube::api::{Api, DeleteParams, DynamicObject, ListParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::{ApiResource, TypeMeta};
use kube::{Client, Config};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use super::backend::{ClientFactory, ResourceBackend};
use super::error::{GatewayError, GatewayResult};
use super::types::{ClusterContext, Connection};

/// Wrapper around kube-rs Client with cluster context
#[derive(Clone)]
pub struct K8sClient {
    inner: Client,
    context_id: String,
    api_server: String,
}

impl K8sClient {
    /// Create client from a kubeconfig file with optional context
    pub async fn from_kubeconfig(
        path: &Path,
        context: Option<&str>,
        context_id: String,
    ) -> GatewayResult<Self> {
        let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
            GatewayError::ConnectionFailure(format!(
                "Failed to read kubeconfig {}: {}",
                path.display(),
                e
            ))
        })?;

        let api_server = Self::extract_api_server(&kubeconfig, context)?;

        let config = Config::from_custom_kubeconfig(
            kubeconfig,
            &KubeConfigOptions {
                context: context.map(String::from),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| GatewayError::ConnectionFailure(format!("Failed to create config: {}", e)))?;

        let client = Client::try_from(config)
            .map_err(|e| GatewayError::ConnectionFailure(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            inner: client,
            context_id,
            api_server,
        })
    }

    /// Create client from in-cluster configuration (for running inside K8s)
    pub async fn from_incluster(context_id: String) -> GatewayResult<Self> {
        let config = Config::incluster().map_err(|e| {
            GatewayError::ConnectionFailure(format!("Failed to get in-cluster config: {}", e))
        })?;

        let api_server = config.cluster_url.to_string();

        let client = Client::try_from(config)
            .map_err(|e| GatewayError::ConnectionFailure(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            inner: client,
            context_id,
            api_server,
        })
    }

    /// Extract API server URL from kubeconfig
    fn extract_api_server(kubeconfig: &Kubeconfig, context_name: Option<&str>) -> GatewayResult<String> {
        let invalid = |msg: String| GatewayError::ConnectionFailure(msg);

        let context_name = context_name
            .map(String::from)
            .or_else(|| kubeconfig.current_context.clone())
            .ok_or_else(|| invalid("No context specified and no current-context".into()))?;

        let context = kubeconfig
            .contexts
            .iter()
            .find(|c| c.name == context_name)
            .ok_or_else(|| invalid(format!("Context '{}' not found", context_name)))?;

        let cluster_name = context
            .context
            .as_ref()
            .map(|c| c.cluster.as_str())
            .ok_or_else(|| invalid("Context has no cluster reference".into()))?;

        let cluster = kubeconfig
            .clusters
            .iter()
            .find(|c| c.name == cluster_name)
            .ok_or_else(|| invalid(format!("Cluster '{}' not found", cluster_name)))?;

        cluster
            .cluster
            .as_ref()
            .and_then(|c| c.server.clone())
            .ok_or_else(|| invalid("Cluster has no server URL".into()))
    }

    pub fn api_server(&self) -> &str {
        &self.api_server
    }

    fn api(&self, resource: &ApiResource, namespace: Option<&str>) -> Api<DynamicObject> {
        match namespace {
            Some(ns) => Api::namespaced_with(self.inner.clone(), ns, resource),
            None => Api::all_with(self.inner.clone(), resource),
        }
    }
}

/// Decode a JSON body into a dynamic object
fn decode(object: Value) -> GatewayResult<DynamicObject> {
    serde_json::from_value(object)
        .map_err(|e| GatewayError::ValidationFailure(format!("Malformed object: {}", e)))
}

/// Encode a dynamic object, filling in type information the list API omits
fn encode(resource: &ApiResource, mut object: DynamicObject) -> GatewayResult<Value> {
    object.types.get_or_insert_with(|| TypeMeta {
        api_version: resource.api_version.clone(),
        kind: resource.kind.clone(),
    });
    serde_json::to_value(object).map_err(|e| GatewayError::ClusterApi {
        code: 500,
        message: format!("Failed to encode object: {}", e),
    })
}

#[async_trait]
impl ResourceBackend for K8sClient {
    async fn list(&self, resource: &ApiResource, namespace: Option<&str>) -> GatewayResult<Vec<Value>> {
        let list = self.api(resource, namespace).list(&ListParams::default()).await?;
        list.items.into_iter().map(|obj| encode(resource, obj)).collect()
    }

    async fn get(&self, resource: &ApiResource, namespace: Option<&str>, name: &str) -> GatewayResult<Value> {
        let object = self.api(resource, namespace).get(name).await?;
        encode(resource, object)
    }

    async fn create(&self, resource: &ApiResource, namespace: Option<&str>, object: Value) -> GatewayResult<Value> {
        let object = decode(object)?;
        let created = self
            .api(resource, namespace)
            .create(&PostParams::default(), &object)
            .await?;
        encode(resource, created)
    }

    async fn replace(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
        name: &str,
        object: Value,
    ) -> GatewayResult<Value> {
        let object = decode(object)?;
        let replaced = self
            .api(resource, namespace)
            .replace(name, &PostParams::default(), &object)
            .await?;
        encode(resource, replaced)
    }

    async fn delete(&self, resource: &ApiResource, namespace: Option<&str>, name: &str) -> GatewayResult<()> {
        self.api(resource, namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for K8sClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("K8sClient")
            .field("context_id", &self.context_id)
            .field("api_server", &self.api_server)
            .finish()
    }
}

/// Builds live kube-rs clients
#[derive(Debug, Clone, Default)]
pub struct KubeClientFactory;

#[async_trait]
impl ClientFactory for KubeClientFactory {
    async fn connect(&self, context: &ClusterContext) -> GatewayResult<Arc<dyn ResourceBackend>> {
        let client = match &context.connection {
            Connection::InCluster => K8sClient::from_incluster(context.id.clone()).await?,
            Connection::Kubeconfig { path, context: kube_context } => {
                K8sClient::from_kubeconfig(path, kube_context.as_deref(), context.id.clone()).await?
            }
        };

        tracing::info!(
            context = %context.id,
            api_server = %client.api_server(),
            "Kubernetes client ready"
        );

        Ok(Arc::new(client))
    }
}
