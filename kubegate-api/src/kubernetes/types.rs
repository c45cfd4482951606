//! Kubernetes types for the gateway
//!
//! Context definitions and the serializable views handed to API consumers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Id under which the process's default context is registered
pub const DEFAULT_CONTEXT: &str = "default";

/// Whether instances of a kind live inside a namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    Namespaced,
    ClusterScoped,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Namespaced => write!(f, "namespaced"),
            Self::ClusterScoped => write!(f, "cluster"),
        }
    }
}

/// How a client for a context is built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Connection {
    /// Service-account credentials mounted into the pod
    InCluster,
    /// Local kubeconfig file, optionally pinned to one of its contexts
    Kubeconfig {
        path: PathBuf,
        #[serde(default)]
        context: Option<String>,
    },
}

/// One reachable cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterContext {
    pub id: String,
    #[serde(flatten)]
    pub connection: Connection,
}

impl ClusterContext {
    pub fn in_cluster(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            connection: Connection::InCluster,
        }
    }

    pub fn kubeconfig(id: impl Into<String>, path: impl Into<PathBuf>, context: Option<String>) -> Self {
        Self {
            id: id.into(),
            connection: Connection::Kubeconfig {
                path: path.into(),
                context,
            },
        }
    }

    /// Extra CLI flags that point kubectl at this context
    pub fn cli_args(&self) -> Vec<String> {
        match &self.connection {
            Connection::InCluster => Vec::new(),
            Connection::Kubeconfig { path, context } => {
                let mut args = vec!["--kubeconfig".to_string(), path.display().to_string()];
                if let Some(context) = context {
                    args.push("--context".to_string());
                    args.push(context.clone());
                }
                args
            }
        }
    }

    pub fn summary(&self) -> ContextSummary {
        ContextSummary {
            id: self.id.clone(),
            connection: match &self.connection {
                Connection::InCluster => "in_cluster".to_string(),
                Connection::Kubeconfig { .. } => "kubeconfig".to_string(),
            },
        }
    }
}

/// Context listing entry; never exposes credential paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSummary {
    pub id: String,
    pub connection: String,
}

/// Starter manifest for a kind, as served by the templates endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadTemplate {
    pub kind: String,
    pub template: String,
    pub description: String,
}
