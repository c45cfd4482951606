//! Gateway error types and kube-rs error mapping
//!
//! Every failure the gateway can report is a `GatewayError`. Cluster API
//! errors are classified by status code so callers see the same taxonomy
//! regardless of which resource kind produced them.

use kubegate_common::{AccessLevel, ErrorKind, Verb};
use thiserror::Error;

/// Errors returned by gateway operations
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Kind is not in the descriptor table
    #[error("Unsupported resource kind: {0}")]
    UnsupportedKind(String),

    /// Kind exists but never accepts this verb
    #[error("{verb} is not available for {kind}")]
    VerbUnsupportedForKind { kind: String, verb: Verb },

    /// Caller level is below the kind's requirement for the verb
    #[error("{verb} on {kind} requires {required} access (caller has {actual})")]
    InsufficientAccess {
        kind: String,
        verb: Verb,
        required: AccessLevel,
        actual: AccessLevel,
    },

    /// Context id was never registered
    #[error("Unknown cluster context: {0}")]
    UnknownContext(String),

    /// Could not build or reach a cluster client
    #[error("Cluster connection failed: {0}")]
    ConnectionFailure(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation failed: {0}")]
    ValidationFailure(String),

    /// Stale resourceVersion on update
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Describe tool exited non-zero or could not be started
    #[error("External tool failed: {message}")]
    ExternalToolFailure { message: String, output: String },

    /// Request deadline expired before the round trip finished
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// Any other status returned by the cluster API
    #[error("Kubernetes API error ({code}): {message}")]
    ClusterApi { code: u16, message: String },
}

impl GatewayError {
    /// Envelope category for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedKind(_) => ErrorKind::UnsupportedKind,
            Self::VerbUnsupportedForKind { .. } => ErrorKind::VerbUnsupportedForKind,
            Self::InsufficientAccess { .. } => ErrorKind::InsufficientAccess,
            Self::UnknownContext(_) => ErrorKind::UnknownContext,
            Self::ConnectionFailure(_) => ErrorKind::ConnectionFailure,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::ValidationFailure(_) => ErrorKind::ValidationFailure,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::ExternalToolFailure { .. } => ErrorKind::ExternalToolFailure,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::ClusterApi { .. } => ErrorKind::ClusterApi,
        }
    }

    /// Diagnostic detail kept apart from the message
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::ExternalToolFailure { output, .. } => Some(output.as_str()),
            _ => None,
        }
    }

    /// Status code the cluster API answered with, when it is passed through
    pub fn cluster_code(&self) -> Option<u16> {
        match self {
            Self::ClusterApi { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the cached client for the context should be rebuilt
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::ConnectionFailure(_))
    }
}

impl From<kube::Error> for GatewayError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) => {
                let message = response.message;
                match (response.code, response.reason.as_str()) {
                    (404, _) => Self::NotFound(message),
                    (409, "AlreadyExists") => Self::AlreadyExists(message),
                    (409, _) => Self::Conflict(message),
                    (400, _) | (422, _) => Self::ValidationFailure(message),
                    (code, _) => Self::ClusterApi { code, message },
                }
            }
            // malformed requests or bodies; the connection itself is fine
            kube::Error::SerdeError(e) => Self::ValidationFailure(format!("Malformed object: {}", e)),
            kube::Error::BuildRequest(e) => Self::ValidationFailure(e.to_string()),
            kube::Error::HttpError(e) => Self::ValidationFailure(e.to_string()),
            err @ (kube::Error::FromUtf8(_)
            | kube::Error::LinesCodecMaxLineLengthExceeded
            | kube::Error::ReadEvents(_)
            | kube::Error::Discovery(_)) => Self::ClusterApi {
                code: 502,
                message: err.to_string(),
            },
            // transport, TLS, auth and config
            other => Self::ConnectionFailure(other.to_string()),
        }
    }
}

/// Failures that stop the process before it can serve requests
#[derive(Debug, Error)]
pub enum StartupError {
    /// The default client could not be built; nothing can be served without it
    #[error("Failed to initialize default cluster context '{context}': {source}")]
    DefaultContext {
        context: String,
        #[source]
        source: GatewayError,
    },

    #[error("Cluster context '{0}' is declared more than once")]
    DuplicateContext(String),

    #[error("Invalid resource descriptor table: {0}")]
    Descriptors(#[source] GatewayError),
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
