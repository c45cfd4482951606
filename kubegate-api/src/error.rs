//! Standardized error handling for API responses
//!
//! Failures outside the workload envelope (bad request bodies, missing
//! credentials) use `ApiError`; workload outcomes use `WorkloadResponse`,
//! whose status code follows the envelope's error kind.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kubegate_common::{ErrorKind, WorkloadResult};
use serde::{Deserialize, Serialize};

/// Standard API error response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status code
    pub status: u16,

    /// Error code for programmatic handling
    pub error: String,

    /// Human-readable error message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(status: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Errors raised by the HTTP layer itself
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request
    BadRequest(String),

    /// 401 Unauthorized
    AuthenticationFailed(String),

    /// 415 Unsupported Media Type
    UnsupportedMediaType(String),
}

impl ApiError {
    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            ApiError::BadRequest(msg) => ErrorResponse::new(400, "BAD_REQUEST", msg),
            ApiError::AuthenticationFailed(msg) => {
                ErrorResponse::new(401, "AUTHENTICATION_FAILED", "Authentication credentials are invalid or missing")
                    .with_details(msg)
            }
            ApiError::UnsupportedMediaType(msg) => ErrorResponse::new(415, "UNSUPPORTED_MEDIA_TYPE", msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_response = self.to_error_response();
        let status_code =
            StatusCode::from_u16(error_response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status_code, Json(error_response)).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("Invalid JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for ApiError {
    fn from(err: serde_yaml::Error) -> Self {
        ApiError::BadRequest(format!("Invalid YAML: {}", err))
    }
}

/// HTTP status for a workload error kind
///
/// `code` is the cluster API's own status, carried on `ClusterApi` errors.
pub fn status_for(kind: ErrorKind, code: Option<u16>) -> StatusCode {
    match kind {
        ErrorKind::UnsupportedKind => StatusCode::BAD_REQUEST,
        ErrorKind::VerbUnsupportedForKind => StatusCode::METHOD_NOT_ALLOWED,
        ErrorKind::InsufficientAccess => StatusCode::FORBIDDEN,
        ErrorKind::UnknownContext => StatusCode::NOT_FOUND,
        ErrorKind::ConnectionFailure => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::AlreadyExists | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::ValidationFailure => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::ExternalToolFailure => StatusCode::BAD_GATEWAY,
        ErrorKind::Cancelled => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::ClusterApi => match code {
            Some(code @ (401 | 403 | 429)) => StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY),
            _ => StatusCode::BAD_GATEWAY,
        },
    }
}

/// Envelope as an HTTP response
#[derive(Debug)]
pub struct WorkloadResponse(pub WorkloadResult);

impl IntoResponse for WorkloadResponse {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            WorkloadResult::Success(_) => StatusCode::OK,
            WorkloadResult::Failure(err) => status_for(err.kind, err.code),
        };
        (status, Json(self.0)).into_response()
    }
}
