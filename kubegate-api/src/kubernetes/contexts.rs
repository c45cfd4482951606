//! Context registry
//!
//! Maps context ids to lazily built, cached cluster clients. The default
//! context is built eagerly at startup; named contexts are built on first
//! resolve and shared by every caller after that.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

use super::backend::{ClientFactory, ResourceBackend};
use super::error::{GatewayError, GatewayResult, StartupError};
use super::types::{ClusterContext, ContextSummary};

type ClientSlot = Arc<OnceCell<Arc<dyn ResourceBackend>>>;

struct ContextEntry {
    context: Arc<ClusterContext>,
    slot: ClientSlot,
}

/// A context together with its live client
#[derive(Clone)]
pub struct ResolvedContext {
    pub context: Arc<ClusterContext>,
    pub client: Arc<dyn ResourceBackend>,
}

impl std::fmt::Debug for ResolvedContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedContext")
            .field("context", &self.context.id)
            .finish_non_exhaustive()
    }
}

pub struct ContextRegistry {
    factory: Arc<dyn ClientFactory>,
    default_id: String,
    /// Registration order, default first
    order: Vec<String>,
    entries: RwLock<HashMap<String, ContextEntry>>,
}

impl ContextRegistry {
    /// Build the default client and register the named contexts
    ///
    /// Fails if the default client cannot be built or an id is declared twice.
    pub async fn connect(
        factory: Arc<dyn ClientFactory>,
        default: ClusterContext,
        named: Vec<ClusterContext>,
    ) -> Result<Self, StartupError> {
        let default_client = factory
            .connect(&default)
            .await
            .map_err(|source| StartupError::DefaultContext {
                context: default.id.clone(),
                source,
            })?;

        let default_id = default.id.clone();
        let mut order = vec![default_id.clone()];
        let mut entries = HashMap::new();
        entries.insert(
            default_id.clone(),
            ContextEntry {
                context: Arc::new(default),
                slot: Arc::new(OnceCell::new_with(Some(default_client))),
            },
        );

        for context in named {
            if entries.contains_key(&context.id) {
                return Err(StartupError::DuplicateContext(context.id));
            }
            order.push(context.id.clone());
            entries.insert(
                context.id.clone(),
                ContextEntry {
                    context: Arc::new(context),
                    slot: Arc::new(OnceCell::new()),
                },
            );
        }

        tracing::info!(
            default = %default_id,
            contexts = order.len(),
            "Context registry initialized"
        );

        Ok(Self {
            factory,
            default_id,
            order,
            entries: RwLock::new(entries),
        })
    }

    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    /// Resolve a context id to its client; `None` or blank selects the default
    pub async fn resolve(&self, id: Option<&str>) -> GatewayResult<ResolvedContext> {
        let id = match id.map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => self.default_id.as_str(),
        };

        let (context, slot) = {
            let entries = self.entries.read().await;
            let entry = entries
                .get(id)
                .ok_or_else(|| GatewayError::UnknownContext(id.to_string()))?;
            (entry.context.clone(), entry.slot.clone())
        };

        // concurrent first resolves share one construction; a failed one leaves the slot empty
        let client = slot
            .get_or_try_init(|| async {
                tracing::info!(context = %context.id, "Building cluster client");
                self.factory.connect(&context).await.map_err(|e| {
                    tracing::warn!(context = %context.id, error = %e, "Cluster client construction failed");
                    e
                })
            })
            .await?
            .clone();

        Ok(ResolvedContext { context, client })
    }

    /// Drop the cached client so the next resolve rebuilds it
    pub async fn invalidate(&self, id: &str) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(id) {
            Some(entry) => {
                entry.slot = Arc::new(OnceCell::new());
                tracing::info!(context = %id, "Cluster client invalidated");
                true
            }
            None => false,
        }
    }

    /// Drop the cached client only while it is still `failed`
    ///
    /// A failure reported on a client that was already replaced leaves the
    /// newer client in place.
    pub async fn invalidate_client(&self, id: &str, failed: &Arc<dyn ResourceBackend>) -> bool {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(id) else {
            return false;
        };

        let current = entry.slot.get().is_some_and(|client| Arc::ptr_eq(client, failed));
        if current {
            entry.slot = Arc::new(OnceCell::new());
            tracing::info!(context = %id, "Cluster client invalidated after connection failure");
        }
        current
    }

    /// Registered contexts in registration order
    pub async fn contexts(&self) -> Vec<ContextSummary> {
        let entries = self.entries.read().await;
        self.order
            .iter()
            .filter_map(|id| entries.get(id))
            .map(|entry| entry.context.summary())
            .collect()
    }
}

impl std::fmt::Debug for ContextRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextRegistry")
            .field("default_id", &self.default_id)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}
