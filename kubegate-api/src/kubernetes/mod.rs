//! Kubernetes resource gateway
//!
//! Uniform list/get/describe/create/update/delete over every kind in the
//! descriptor table, across one or more cluster contexts:
//! - Descriptor registry (kinds, scopes, per-verb access levels, templates)
//! - Context registry (lazily built, cached clients per context)
//! - Access gate, dispatcher and result normalizer
//! - Describe delegate (external kubectl)

pub mod access;
pub mod backend;
pub mod client;
pub mod contexts;
pub mod describe;
pub mod descriptors;
pub mod dispatcher;
pub mod error;
pub mod result;
pub mod templates;
pub mod types;

use kubegate_common::{AccessLevel, OperationRequest, Principal, WorkloadResult};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

use access::AccessGate;
use backend::ClientFactory;
use client::KubeClientFactory;
use contexts::ContextRegistry;
use describe::{DescribeTool, KubectlDescriber};
use descriptors::DescriptorRegistry;
use dispatcher::{bounded, Dispatcher, IgnoreSet};
use error::{GatewayResult, StartupError};
use result::normalize;
use types::{ClusterContext, DEFAULT_CONTEXT};

/// Everything the gateway needs from configuration
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    pub default_context: ClusterContext,
    pub contexts: Vec<ClusterContext>,
    pub ignore_namespaces: Vec<String>,
    /// Deadline applied to requests that carry none
    pub request_timeout: Option<Duration>,
}

impl GatewayOptions {
    pub fn new(default_context: ClusterContext) -> Self {
        Self {
            default_context,
            contexts: Vec::new(),
            ignore_namespaces: Vec::new(),
            request_timeout: None,
        }
    }

    pub fn with_context(mut self, context: ClusterContext) -> Self {
        self.contexts.push(context);
        self
    }

    pub fn ignoring<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_namespaces.extend(namespaces.into_iter().map(Into::into));
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self::new(ClusterContext::in_cluster(DEFAULT_CONTEXT))
    }
}

/// Entry point for every workload operation
///
/// Flow: access gate, context resolve, dispatcher, normalizer.
#[derive(Debug)]
pub struct Gateway {
    registry: Arc<DescriptorRegistry>,
    gate: AccessGate,
    contexts: ContextRegistry,
    dispatcher: Dispatcher,
    request_timeout: Option<Duration>,
}

impl Gateway {
    /// Connect with live kube-rs clients and the given describer
    pub async fn connect(options: GatewayOptions, describer: KubectlDescriber) -> Result<Self, StartupError> {
        Self::with_parts(options, Arc::new(KubeClientFactory), Arc::new(describer)).await
    }

    pub async fn with_parts(
        options: GatewayOptions,
        factory: Arc<dyn ClientFactory>,
        describer: Arc<dyn DescribeTool>,
    ) -> Result<Self, StartupError> {
        let registry = Arc::new(DescriptorRegistry::builtin().map_err(StartupError::Descriptors)?);
        let contexts = ContextRegistry::connect(factory, options.default_context, options.contexts).await?;

        tracing::info!(
            kinds = registry.len(),
            ignored_namespaces = options.ignore_namespaces.len(),
            "Workload gateway ready"
        );

        Ok(Self {
            gate: AccessGate::new(registry.clone()),
            registry,
            contexts,
            dispatcher: Dispatcher::new(IgnoreSet::new(options.ignore_namespaces), describer),
            request_timeout: options.request_timeout,
        })
    }

    pub fn registry(&self) -> &DescriptorRegistry {
        &self.registry
    }

    /// Execute one request and fold the outcome into the envelope
    pub async fn execute(&self, principal: &Principal, request: OperationRequest) -> WorkloadResult {
        let span = tracing::info_span!(
            "workload",
            principal = %principal.id,
            verb = %request.verb,
            kind = %request.kind,
            context = request.context.as_deref().unwrap_or(DEFAULT_CONTEXT),
            namespace = request.namespace.as_deref().unwrap_or(""),
        );

        async move {
            let outcome = self.run(principal, request).await;
            if let Err(err) = &outcome {
                tracing::warn!(error_kind = err.kind().as_str(), error = %err, "Workload request failed");
            }
            normalize(outcome)
        }
        .instrument(span)
        .await
    }

    async fn run(&self, principal: &Principal, mut request: OperationRequest) -> GatewayResult<Value> {
        let descriptor = self.gate.authorize(principal, &request.kind, request.verb)?;

        if request.deadline.is_none() {
            // a timeout too large to represent means no deadline
            request.deadline = self
                .request_timeout
                .and_then(|timeout| Instant::now().checked_add(timeout));
        }

        let resolved = bounded(
            request.deadline,
            "context resolve",
            self.contexts.resolve(request.context.as_deref()),
        )
        .await?;

        let outcome = self.dispatcher.execute(descriptor, &resolved, request).await;

        if let Err(err) = &outcome {
            if err.is_connection_failure() {
                self.contexts
                    .invalidate_client(&resolved.context.id, &resolved.client)
                    .await;
            }
        }
        outcome
    }

    /// Starter templates for every kind
    pub fn templates(&self, principal: &Principal) -> WorkloadResult {
        normalize(
            self.gate
                .require(principal, AccessLevel::User)
                .and_then(|()| to_value(self.registry.templates())),
        )
    }

    /// Kinds the caller may list and get
    pub fn available_kinds(&self, principal: &Principal) -> WorkloadResult {
        normalize(to_value(self.registry.list_supported_kinds(principal.access_level)))
    }

    /// Registered cluster contexts
    pub async fn contexts(&self, principal: &Principal) -> WorkloadResult {
        let outcome = match self.gate.require(principal, AccessLevel::Reader) {
            Ok(()) => to_value(self.contexts.contexts().await),
            Err(err) => Err(err),
        };
        normalize(outcome)
    }

    /// Drop a context's cached client
    pub async fn invalidate(&self, context: &str) -> bool {
        self.contexts.invalidate(context).await
    }
}

fn to_value<T: serde::Serialize>(value: T) -> GatewayResult<Value> {
    serde_json::to_value(value).map_err(|e| error::GatewayError::ClusterApi {
        code: 500,
        message: format!("Failed to encode response: {}", e),
    })
}
