//! Common types shared between kubegate-api and its consumers

pub mod auth;

pub use auth::{AccessLevel, Principal, Verb};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Errors raised while parsing common types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Invalid access level: {0}")]
    InvalidAccessLevel(String),

    #[error("Invalid verb: {0}")]
    InvalidVerb(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A single gateway operation, as resolved by the request layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRequest {
    pub verb: Verb,
    pub kind: String,
    /// Cluster context id; `None` or empty selects the default context
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Object body for create/update, or match key for delete
    #[serde(default)]
    pub payload: Option<Value>,
    /// Instant after which cluster I/O for this request is abandoned
    #[serde(skip)]
    pub deadline: Option<Instant>,
}

impl OperationRequest {
    pub fn new(verb: Verb, kind: impl Into<String>) -> Self {
        Self {
            verb,
            kind: kind.into(),
            context: None,
            namespace: None,
            name: None,
            payload: None,
            deadline: None,
        }
    }

    pub fn in_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Machine-readable error category carried by a failed [`WorkloadResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    UnsupportedKind,
    VerbUnsupportedForKind,
    InsufficientAccess,
    UnknownContext,
    ConnectionFailure,
    NotFound,
    AlreadyExists,
    ValidationFailure,
    Conflict,
    ExternalToolFailure,
    Cancelled,
    ClusterApi,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedKind => "UNSUPPORTED_KIND",
            Self::VerbUnsupportedForKind => "VERB_UNSUPPORTED_FOR_KIND",
            Self::InsufficientAccess => "INSUFFICIENT_ACCESS",
            Self::UnknownContext => "UNKNOWN_CONTEXT",
            Self::ConnectionFailure => "CONNECTION_FAILURE",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::ValidationFailure => "VALIDATION_FAILURE",
            Self::Conflict => "CONFLICT",
            Self::ExternalToolFailure => "EXTERNAL_TOOL_FAILURE",
            Self::Cancelled => "CANCELLED",
            Self::ClusterApi => "CLUSTER_API",
        }
    }
}

/// Error half of the workload envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadError {
    pub kind: ErrorKind,
    pub message: String,
    /// Diagnostic output, e.g. the stderr of a failed describe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Status code reported by the cluster API, for `ClusterApi` errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl WorkloadError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
            code: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }
}

/// Canonical outcome of every gateway operation
///
/// Serializes as `{"result": ...}` on success or `{"error": {...}}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkloadResult {
    #[serde(rename = "result")]
    Success(Value),
    #[serde(rename = "error")]
    Failure(WorkloadError),
}

impl WorkloadResult {
    pub fn success(value: Value) -> Self {
        Self::Success(value)
    }

    pub fn failure(error: WorkloadError) -> Self {
        Self::Failure(error)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&WorkloadError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(err) => Some(err),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error().map(|e| e.kind)
    }

    pub fn into_result(self) -> std::result::Result<Value, WorkloadError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(err) => Err(err),
        }
    }
}
