//! CRUD dispatcher
//!
//! Executes one verb against any descriptor through a context's backend.
//! Namespace rules, payload preparation and the ignore-list live here so
//! every kind behaves the same way.

use kubegate_common::{OperationRequest, Verb};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use super::contexts::ResolvedContext;
use super::describe::{DescribeTarget, DescribeTool};
use super::descriptors::ResourceDescriptor;
use super::error::{GatewayError, GatewayResult};

/// Namespaces hidden from every list result
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    namespaces: HashSet<String>,
}

impl IgnoreSet {
    pub fn new<I, S>(namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            namespaces: namespaces
                .into_iter()
                .map(Into::into)
                .filter(|ns: &String| !ns.trim().is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.namespaces.contains(namespace)
    }

    /// Whether a listed object may be shown
    pub fn admits(&self, descriptor: &ResourceDescriptor, object: &Value) -> bool {
        if self.namespaces.is_empty() {
            return true;
        }
        let field = if descriptor.is_namespace_kind() {
            "name"
        } else if descriptor.is_namespaced() {
            "namespace"
        } else {
            return true;
        };
        metadata_str(object, field).map_or(true, |ns| !self.contains(ns))
    }
}

/// Run `operation` until `deadline`, reporting expiry as `Cancelled`
pub async fn bounded<T, F>(deadline: Option<Instant>, what: &str, operation: F) -> GatewayResult<T>
where
    F: Future<Output = GatewayResult<T>>,
{
    match deadline {
        None => operation.await,
        Some(deadline) => tokio::time::timeout_at(tokio::time::Instant::from_std(deadline), operation)
            .await
            .map_err(|_| GatewayError::Cancelled(format!("{} exceeded the request deadline", what)))?,
    }
}

fn metadata_str<'a>(object: &'a Value, field: &str) -> Option<&'a str> {
    object
        .get("metadata")?
        .get(field)?
        .as_str()
        .filter(|s| !s.is_empty())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Object names end up as URL path segments and describe arguments
fn valid_name(name: &str) -> GatewayResult<&str> {
    let malformed = name.len() > 253
        || name == "."
        || name == ".."
        || name.starts_with('-')
        || name.chars().any(|c| matches!(c, '/' | '%') || c.is_whitespace() || c.is_control());
    if malformed {
        return Err(GatewayError::ValidationFailure(format!("invalid object name '{}'", name)));
    }
    Ok(name)
}

/// Namespaces must be DNS-1123 labels
fn valid_namespace(namespace: &str) -> GatewayResult<&str> {
    let bytes = namespace.as_bytes();
    let edge_ok = |b: Option<&u8>| b.is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    let valid = namespace.len() <= 63
        && edge_ok(bytes.first())
        && edge_ok(bytes.last())
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-');
    if !valid {
        return Err(GatewayError::ValidationFailure(format!("invalid namespace '{}'", namespace)));
    }
    Ok(namespace)
}

fn metadata_mut(payload: &mut Value) -> GatewayResult<&mut Map<String, Value>> {
    let object = payload
        .as_object_mut()
        .ok_or_else(|| GatewayError::ValidationFailure("payload must be an object".into()))?;
    let metadata = object
        .entry("metadata")
        .or_insert_with(|| Value::Object(Map::new()));
    if metadata.is_null() {
        *metadata = Value::Object(Map::new());
    }
    metadata
        .as_object_mut()
        .ok_or_else(|| GatewayError::ValidationFailure("metadata must be an object".into()))
}

pub struct Dispatcher {
    ignored: IgnoreSet,
    describer: Arc<dyn DescribeTool>,
}

impl Dispatcher {
    pub fn new(ignored: IgnoreSet, describer: Arc<dyn DescribeTool>) -> Self {
        Self { ignored, describer }
    }

    /// Execute an authorized request, bounded by its deadline
    pub async fn execute(
        &self,
        descriptor: &ResourceDescriptor,
        resolved: &ResolvedContext,
        request: OperationRequest,
    ) -> GatewayResult<Value> {
        let verb = request.verb;
        if !descriptor.supports(verb) {
            return Err(GatewayError::VerbUnsupportedForKind {
                kind: descriptor.kind.to_string(),
                verb,
            });
        }

        let what = format!("{} {}", verb, descriptor.kind);
        let deadline = request.deadline;
        bounded(deadline, &what, self.run(descriptor, resolved, request)).await
    }

    async fn run(
        &self,
        descriptor: &ResourceDescriptor,
        resolved: &ResolvedContext,
        request: OperationRequest,
    ) -> GatewayResult<Value> {
        match request.verb {
            Verb::List => self.list(descriptor, resolved, &request).await,
            Verb::Get => self.get(descriptor, resolved, &request).await,
            Verb::Describe => self.describe(descriptor, resolved, &request).await,
            Verb::Create => self.create(descriptor, resolved, request).await,
            Verb::Update => self.update(descriptor, resolved, request).await,
            Verb::Delete => self.delete(descriptor, resolved, &request).await,
        }
    }

    /// Namespace to address for a single-object verb
    fn target_namespace<'a>(
        descriptor: &ResourceDescriptor,
        namespace: Option<&'a str>,
    ) -> GatewayResult<Option<&'a str>> {
        if !descriptor.is_namespaced() {
            return Ok(None);
        }
        let namespace = non_empty(namespace).ok_or_else(|| {
            GatewayError::ValidationFailure(format!("namespace is required for {}", descriptor.kind))
        })?;
        valid_namespace(namespace).map(Some)
    }

    fn target_name<'a>(descriptor: &ResourceDescriptor, name: Option<&'a str>) -> GatewayResult<&'a str> {
        let name = non_empty(name).ok_or_else(|| {
            GatewayError::ValidationFailure(format!("name is required for {}", descriptor.kind))
        })?;
        valid_name(name)
    }

    async fn list(
        &self,
        descriptor: &ResourceDescriptor,
        resolved: &ResolvedContext,
        request: &OperationRequest,
    ) -> GatewayResult<Value> {
        let namespace = if descriptor.is_namespaced() {
            non_empty(request.namespace.as_deref()).map(valid_namespace).transpose()?
        } else {
            None
        };

        let items = resolved
            .client
            .list(&descriptor.api_resource(), namespace)
            .await?;
        let total = items.len();

        let visible: Vec<Value> = items
            .into_iter()
            .filter(|item| self.ignored.admits(descriptor, item))
            .collect();

        tracing::debug!(
            kind = descriptor.kind,
            namespace = namespace.unwrap_or("*"),
            total,
            visible = visible.len(),
            "Listed objects"
        );

        Ok(Value::Array(visible))
    }

    async fn get(
        &self,
        descriptor: &ResourceDescriptor,
        resolved: &ResolvedContext,
        request: &OperationRequest,
    ) -> GatewayResult<Value> {
        let namespace = Self::target_namespace(descriptor, request.namespace.as_deref())?;
        let name = Self::target_name(descriptor, request.name.as_deref())?;

        resolved
            .client
            .get(&descriptor.api_resource(), namespace, name)
            .await
    }

    async fn describe(
        &self,
        descriptor: &ResourceDescriptor,
        resolved: &ResolvedContext,
        request: &OperationRequest,
    ) -> GatewayResult<Value> {
        let namespace = Self::target_namespace(descriptor, request.namespace.as_deref())?;
        let name = Self::target_name(descriptor, request.name.as_deref())?;

        let text = self
            .describer
            .describe(&DescribeTarget {
                descriptor,
                context: &resolved.context,
                namespace,
                name,
            })
            .await?;

        Ok(Value::String(text))
    }

    /// Normalize a create/update body: type fields, namespace placement
    ///
    /// Returns the namespace the object lives in.
    fn prepare_body(
        descriptor: &ResourceDescriptor,
        request_namespace: Option<&str>,
        payload: &mut Value,
    ) -> GatewayResult<Option<String>> {
        let api_version = descriptor.api_version();
        let object = payload
            .as_object_mut()
            .ok_or_else(|| GatewayError::ValidationFailure("payload must be an object".into()))?;

        for (field, expected) in [("apiVersion", api_version.as_str()), ("kind", descriptor.api_kind)] {
            match object.get(field).and_then(Value::as_str) {
                None => {
                    object.insert(field.to_string(), json!(expected));
                }
                Some(actual) if actual == expected => {}
                Some(actual) => {
                    return Err(GatewayError::ValidationFailure(format!(
                        "payload {} '{}' does not match {} ({})",
                        field, actual, descriptor.kind, expected
                    )));
                }
            }
        }

        let metadata = metadata_mut(payload)?;

        if !descriptor.is_namespaced() {
            metadata.remove("namespace");
            return Ok(None);
        }

        let payload_namespace = metadata
            .get("namespace")
            .and_then(Value::as_str)
            .and_then(|ns| non_empty(Some(ns)))
            .map(String::from);

        let namespace = payload_namespace
            .or_else(|| non_empty(request_namespace).map(String::from))
            .ok_or_else(|| {
                GatewayError::ValidationFailure(format!("namespace is required for {}", descriptor.kind))
            })?;
        valid_namespace(&namespace)?;

        metadata.insert("namespace".to_string(), json!(namespace));
        Ok(Some(namespace))
    }

    async fn create(
        &self,
        descriptor: &ResourceDescriptor,
        resolved: &ResolvedContext,
        request: OperationRequest,
    ) -> GatewayResult<Value> {
        let mut payload = request
            .payload
            .ok_or_else(|| GatewayError::ValidationFailure("create requires a payload".into()))?;

        let namespace = Self::prepare_body(descriptor, request.namespace.as_deref(), &mut payload)?;

        match metadata_str(&payload, "name") {
            Some(name) => {
                valid_name(name)?;
            }
            None if metadata_str(&payload, "generateName").is_none() => {
                return Err(GatewayError::ValidationFailure(
                    "metadata.name or metadata.generateName is required".into(),
                ));
            }
            None => {}
        }

        let created = resolved
            .client
            .create(&descriptor.api_resource(), namespace.as_deref(), payload)
            .await?;

        tracing::info!(
            kind = descriptor.kind,
            namespace = namespace.as_deref().unwrap_or(""),
            name = metadata_str(&created, "name").unwrap_or(""),
            "Created object"
        );

        Ok(created)
    }

    async fn update(
        &self,
        descriptor: &ResourceDescriptor,
        resolved: &ResolvedContext,
        request: OperationRequest,
    ) -> GatewayResult<Value> {
        let mut payload = request
            .payload
            .ok_or_else(|| GatewayError::ValidationFailure("update requires a payload".into()))?;

        let namespace = Self::prepare_body(descriptor, request.namespace.as_deref(), &mut payload)?;

        let name = metadata_str(&payload, "name")
            .ok_or_else(|| GatewayError::ValidationFailure("metadata.name is required".into()))
            .and_then(valid_name)?
            .to_string();

        if metadata_str(&payload, "resourceVersion").is_none() {
            return Err(GatewayError::ValidationFailure(
                "metadata.resourceVersion is required for update".into(),
            ));
        }

        if let Some(requested) = non_empty(request.name.as_deref()) {
            if requested != name {
                return Err(GatewayError::ValidationFailure(format!(
                    "request name '{}' does not match metadata.name '{}'",
                    requested, name
                )));
            }
        }

        let updated = resolved
            .client
            .replace(&descriptor.api_resource(), namespace.as_deref(), &name, payload)
            .await?;

        tracing::info!(
            kind = descriptor.kind,
            namespace = namespace.as_deref().unwrap_or(""),
            name = %name,
            "Updated object"
        );

        Ok(updated)
    }

    async fn delete(
        &self,
        descriptor: &ResourceDescriptor,
        resolved: &ResolvedContext,
        request: &OperationRequest,
    ) -> GatewayResult<Value> {
        let match_key = request.payload.as_ref();
        let name = non_empty(request.name.as_deref())
            .or_else(|| match_key.and_then(|p| metadata_str(p, "name")));
        let namespace = non_empty(request.namespace.as_deref())
            .or_else(|| match_key.and_then(|p| metadata_str(p, "namespace")));

        let name = Self::target_name(descriptor, name)?;
        let namespace = Self::target_namespace(descriptor, namespace)?;

        resolved
            .client
            .delete(&descriptor.api_resource(), namespace, name)
            .await?;

        tracing::info!(
            kind = descriptor.kind,
            namespace = namespace.unwrap_or(""),
            name,
            "Deleted object"
        );

        Ok(json!({
            "status": "deleted",
            "kind": descriptor.kind,
            "name": name,
            "namespace": namespace,
        }))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("ignored", &self.ignored)
            .finish_non_exhaustive()
    }
}
