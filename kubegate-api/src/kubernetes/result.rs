//! Result normalizer
//!
//! Every gateway path ends here: a dispatcher or describe outcome becomes a
//! `WorkloadResult` envelope.

use kubegate_common::{WorkloadError, WorkloadResult};
use serde_json::Value;

use super::error::{GatewayError, GatewayResult};

impl From<GatewayError> for WorkloadError {
    fn from(err: GatewayError) -> Self {
        let mut error = WorkloadError::new(err.kind(), err.to_string());
        if let Some(detail) = err.detail().filter(|d| !d.is_empty()) {
            error = error.with_detail(detail);
        }
        if let Some(code) = err.cluster_code() {
            error = error.with_code(code);
        }
        error
    }
}

/// Fold an outcome into the envelope
pub fn normalize(outcome: GatewayResult<Value>) -> WorkloadResult {
    match outcome {
        Ok(value) => WorkloadResult::success(value),
        Err(err) => WorkloadResult::failure(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubegate_common::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_success_wraps_value() {
        let result = normalize(Ok(json!({ "metadata": { "name": "web" } })));
        assert_eq!(result.payload().unwrap()["metadata"]["name"], "web");
    }

    #[test]
    fn test_failure_preserves_message() {
        let result = normalize(Err(GatewayError::Conflict(
            "the object has been modified".to_string(),
        )));
        let error = result.error().unwrap();
        assert_eq!(error.kind, ErrorKind::Conflict);
        assert_eq!(error.message, "Conflict: the object has been modified");
        assert!(error.detail.is_none());
    }

    #[test]
    fn test_cluster_code_carried() {
        let result = normalize(Err(GatewayError::ClusterApi {
            code: 429,
            message: "too many requests".to_string(),
        }));
        let error = result.error().unwrap();
        assert_eq!(error.kind, ErrorKind::ClusterApi);
        assert_eq!(error.code, Some(429));
        assert!(normalize(Err(GatewayError::NotFound("web".into()))).error().unwrap().code.is_none());
    }

    #[test]
    fn test_tool_output_goes_to_detail() {
        let result = normalize(Err(GatewayError::ExternalToolFailure {
            message: "kubectl describe pod ghost failed".to_string(),
            output: "Error from server (NotFound)".to_string(),
        }));
        assert!(result.payload().is_none());
        let error = result.error().unwrap();
        assert_eq!(error.kind, ErrorKind::ExternalToolFailure);
        assert_eq!(error.detail.as_deref(), Some("Error from server (NotFound)"));
    }
}
