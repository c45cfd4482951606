//! Common test utilities and helpers
//!
//! An in-memory cluster standing in for the API server, a client factory
//! that counts constructions, and gateway builders wired to both.

#![allow(dead_code)]

use async_trait::async_trait;
use kube::core::ApiResource;
use kubegate_api::kubernetes::backend::{ClientFactory, ResourceBackend};
use kubegate_api::kubernetes::describe::{DescribeTarget, DescribeTool, KubectlDescriber};
use kubegate_api::kubernetes::error::{GatewayError, GatewayResult};
use kubegate_api::kubernetes::types::ClusterContext;
use kubegate_api::kubernetes::{Gateway, GatewayOptions};
use kubegate_common::{AccessLevel, Principal};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const STAGING: &str = "staging";

/// (plural, namespace or "", name)
type ObjectKey = (String, String, String);

/// In-memory object store with API-server-like semantics
#[derive(Default)]
pub struct FakeCluster {
    objects: Mutex<BTreeMap<ObjectKey, Value>>,
    calls: AtomicUsize,
    revision: AtomicU64,
    latency: Mutex<Option<Duration>>,
    fail_next_connection: AtomicBool,
}

impl FakeCluster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of backend calls served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    /// Make the next call fail as if the connection dropped
    pub fn fail_next_connection(&self) {
        self.fail_next_connection.store(true, Ordering::SeqCst);
    }

    fn next_revision(&self) -> String {
        (self.revision.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    fn key(resource: &ApiResource, namespace: Option<&str>, name: &str) -> ObjectKey {
        (
            resource.plural.clone(),
            namespace.unwrap_or_default().to_string(),
            name.to_string(),
        )
    }

    /// Store an object directly, bypassing the call counter
    pub fn seed(&self, plural: &str, mut object: Value) {
        let namespace = object["metadata"]["namespace"].as_str().unwrap_or_default().to_string();
        let name = object["metadata"]["name"].as_str().unwrap().to_string();
        object["metadata"]["resourceVersion"] = json!(self.next_revision());
        self.objects
            .lock()
            .unwrap()
            .insert((plural.to_string(), namespace, name), object);
    }

    pub fn contains(&self, plural: &str, namespace: &str, name: &str) -> bool {
        self.objects
            .lock()
            .unwrap()
            .contains_key(&(plural.to_string(), namespace.to_string(), name.to_string()))
    }

    async fn enter(&self) -> GatewayResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.fail_next_connection.swap(false, Ordering::SeqCst) {
            return Err(GatewayError::ConnectionFailure("connection reset by peer".into()));
        }
        Ok(())
    }

    fn not_found(resource: &ApiResource, name: &str) -> GatewayError {
        GatewayError::NotFound(format!("{} \"{}\" not found", resource.plural, name))
    }
}

#[async_trait]
impl ResourceBackend for FakeCluster {
    async fn list(&self, resource: &ApiResource, namespace: Option<&str>) -> GatewayResult<Vec<Value>> {
        self.enter().await?;
        let objects = self.objects.lock().unwrap();
        Ok(objects
            .iter()
            .filter(|((plural, ns, _), _)| {
                plural == &resource.plural && namespace.map_or(true, |wanted| ns == wanted)
            })
            .map(|(_, object)| object.clone())
            .collect())
    }

    async fn get(&self, resource: &ApiResource, namespace: Option<&str>, name: &str) -> GatewayResult<Value> {
        self.enter().await?;
        self.objects
            .lock()
            .unwrap()
            .get(&Self::key(resource, namespace, name))
            .cloned()
            .ok_or_else(|| Self::not_found(resource, name))
    }

    async fn create(&self, resource: &ApiResource, namespace: Option<&str>, mut object: Value) -> GatewayResult<Value> {
        self.enter().await?;
        let name = match object["metadata"]["name"].as_str() {
            Some(name) => name.to_string(),
            None => {
                let prefix = object["metadata"]["generateName"].as_str().unwrap_or("object-");
                format!("{}{}", prefix, self.revision.load(Ordering::SeqCst))
            }
        };

        let key = Self::key(resource, namespace, &name);
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&key) {
            return Err(GatewayError::AlreadyExists(format!(
                "{} \"{}\" already exists",
                resource.plural, name
            )));
        }

        object["metadata"]["name"] = json!(name);
        object["metadata"]["resourceVersion"] = json!(self.next_revision());
        object["metadata"]["uid"] = json!(format!("uid-{}", name));
        object["metadata"]["creationTimestamp"] = json!("2026-01-01T00:00:00Z");
        objects.insert(key, object.clone());
        Ok(object)
    }

    async fn replace(
        &self,
        resource: &ApiResource,
        namespace: Option<&str>,
        name: &str,
        mut object: Value,
    ) -> GatewayResult<Value> {
        self.enter().await?;
        let key = Self::key(resource, namespace, name);
        let mut objects = self.objects.lock().unwrap();
        let current = objects.get(&key).ok_or_else(|| Self::not_found(resource, name))?;

        if current["metadata"]["resourceVersion"] != object["metadata"]["resourceVersion"] {
            return Err(GatewayError::Conflict(format!(
                "Operation cannot be fulfilled on {} \"{}\": the object has been modified",
                resource.plural, name
            )));
        }

        object["metadata"]["resourceVersion"] = json!(self.next_revision());
        objects.insert(key, object.clone());
        Ok(object)
    }

    async fn delete(&self, resource: &ApiResource, namespace: Option<&str>, name: &str) -> GatewayResult<()> {
        self.enter().await?;
        self.objects
            .lock()
            .unwrap()
            .remove(&Self::key(resource, namespace, name))
            .map(|_| ())
            .ok_or_else(|| Self::not_found(resource, name))
    }
}

/// Hands out the shared fake cluster and counts constructions per context
pub struct CountingFactory {
    cluster: Arc<FakeCluster>,
    built: Mutex<BTreeMap<String, usize>>,
    delay: Duration,
}

impl CountingFactory {
    pub fn new(cluster: Arc<FakeCluster>) -> Arc<Self> {
        Arc::new(Self {
            cluster,
            built: Mutex::new(BTreeMap::new()),
            delay: Duration::from_millis(25),
        })
    }

    pub fn built(&self, context: &str) -> usize {
        self.built.lock().unwrap().get(context).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ClientFactory for CountingFactory {
    async fn connect(&self, context: &ClusterContext) -> GatewayResult<Arc<dyn ResourceBackend>> {
        *self.built.lock().unwrap().entry(context.id.clone()).or_default() += 1;
        tokio::time::sleep(self.delay).await;
        if context.id.starts_with("unreachable") {
            return Err(GatewayError::ConnectionFailure(format!("{}: connection refused", context.id)));
        }
        Ok(self.cluster.clone())
    }
}

/// Describer that counts invocations and never succeeds
#[derive(Default)]
pub struct CountingDescriber {
    pub calls: AtomicUsize,
}

#[async_trait]
impl DescribeTool for CountingDescriber {
    async fn describe(&self, target: &DescribeTarget<'_>) -> GatewayResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(GatewayError::ExternalToolFailure {
            message: format!("describe {} unavailable", target.descriptor.kind),
            output: String::new(),
        })
    }
}

/// Shell stand-in for kubectl: the name is the last argument; names starting with "missing" fail
pub fn script_describer() -> KubectlDescriber {
    KubectlDescriber::new(
        "sh",
        vec![
            "-c".to_string(),
            r#"for last; do :; done; case "$last" in missing*) echo "Error from server (NotFound): \"$last\" not found" >&2; exit 1;; *) echo "Name: $last";; esac"#
                .to_string(),
            "kubectl".to_string(),
        ],
    )
}

pub fn options() -> GatewayOptions {
    GatewayOptions::new(ClusterContext::in_cluster("default"))
        .with_context(ClusterContext::kubeconfig(STAGING, "/etc/kubegate/staging.yaml", None))
        .with_context(ClusterContext::kubeconfig("unreachable-east", "/etc/kubegate/east.yaml", None))
        .ignoring(["kube-system"])
}

pub struct Harness {
    pub gateway: Gateway,
    pub cluster: Arc<FakeCluster>,
    pub factory: Arc<CountingFactory>,
}

pub async fn harness_with(options: GatewayOptions, describer: Arc<dyn DescribeTool>) -> Harness {
    let cluster = FakeCluster::new();
    let factory = CountingFactory::new(cluster.clone());
    let gateway = Gateway::with_parts(options, factory.clone(), describer)
        .await
        .expect("gateway should start");
    Harness {
        gateway,
        cluster,
        factory,
    }
}

pub async fn harness() -> Harness {
    harness_with(options(), Arc::new(script_describer())).await
}

pub fn reader() -> Principal {
    Principal::new("rita", AccessLevel::Reader)
}

pub fn user() -> Principal {
    Principal::new("ursula", AccessLevel::User)
}

pub fn admin() -> Principal {
    Principal::new("ada", AccessLevel::Admin)
}

pub fn pod(namespace: &str, name: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": { "name": name, "namespace": namespace },
        "spec": { "containers": [{ "name": "app", "image": "nginx:1.25" }] }
    })
}

pub fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .expect("list result")
        .iter()
        .map(|item| item["metadata"]["name"].as_str().unwrap_or_default().to_string())
        .collect()
}
