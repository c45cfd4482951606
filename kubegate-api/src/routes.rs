//! HTTP routes for the workload gateway
//!
//! Handlers translate path, query and body into an `OperationRequest` and
//! return the gateway envelope unchanged.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method},
    middleware as axum_middleware,
    routing::get,
    Extension, Json, Router,
};
use kubegate_common::{OperationRequest, Principal, Verb};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, WorkloadResponse};
use crate::middleware;
use crate::state::AppState;

/// Query parameters shared by the workload routes
#[derive(Debug, Default, Deserialize)]
pub struct WorkloadQuery {
    pub context: Option<String>,
    pub namespace: Option<String>,
    pub name: Option<String>,
}

impl WorkloadQuery {
    fn into_request(self, verb: Verb, kind: String) -> OperationRequest {
        OperationRequest {
            context: self.context,
            namespace: self.namespace,
            name: self.name,
            ..OperationRequest::new(verb, kind)
        }
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let workload_routes = Router::new()
        .route("/workload/templates", get(templates))
        .route("/workload/available-resources", get(available_resources))
        .route("/workload/contexts", get(contexts))
        .route(
            "/workload/:kind",
            get(list_workloads)
                .post(create_workload)
                .patch(update_workload)
                .delete(delete_workload),
        )
        .route("/workload/:kind/describe", get(describe_workload))
        .route("/workload/:kind/:name", get(get_workload))
        .with_state(state.clone())
        .layer(axum_middleware::from_fn_with_state(
            state,
            middleware::auth::auth_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_check))
        .merge(workload_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Decode a JSON or YAML body; empty bodies carry no payload
fn parse_body(headers: &HeaderMap, body: &Bytes) -> Result<Option<Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    let value = if content_type.contains("json") {
        serde_json::from_slice(body)?
    } else if content_type.is_empty() || content_type.contains("yaml") || content_type.starts_with("text/") {
        serde_yaml::from_slice(body)?
    } else {
        return Err(ApiError::UnsupportedMediaType(format!(
            "Expected JSON or YAML body, got {}",
            content_type
        )));
    };

    Ok(Some(value))
}

async fn templates(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> WorkloadResponse {
    WorkloadResponse(state.gateway.templates(&principal))
}

async fn available_resources(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> WorkloadResponse {
    WorkloadResponse(state.gateway.available_kinds(&principal))
}

async fn contexts(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> WorkloadResponse {
    WorkloadResponse(state.gateway.contexts(&principal).await)
}

async fn list_workloads(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(kind): Path<String>,
    Query(query): Query<WorkloadQuery>,
) -> WorkloadResponse {
    let request = query.into_request(Verb::List, kind);
    WorkloadResponse(state.gateway.execute(&principal, request).await)
}

async fn get_workload(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path((kind, name)): Path<(String, String)>,
    Query(query): Query<WorkloadQuery>,
) -> WorkloadResponse {
    let request = query.into_request(Verb::Get, kind).named(name);
    WorkloadResponse(state.gateway.execute(&principal, request).await)
}

async fn describe_workload(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(kind): Path<String>,
    Query(query): Query<WorkloadQuery>,
) -> WorkloadResponse {
    let request = query.into_request(Verb::Describe, kind);
    WorkloadResponse(state.gateway.execute(&principal, request).await)
}

async fn create_workload(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(kind): Path<String>,
    Query(query): Query<WorkloadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<WorkloadResponse, ApiError> {
    let mut request = query.into_request(Verb::Create, kind);
    request.payload = parse_body(&headers, &body)?;
    Ok(WorkloadResponse(state.gateway.execute(&principal, request).await))
}

async fn update_workload(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(kind): Path<String>,
    Query(query): Query<WorkloadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<WorkloadResponse, ApiError> {
    let mut request = query.into_request(Verb::Update, kind);
    request.payload = parse_body(&headers, &body)?;
    Ok(WorkloadResponse(state.gateway.execute(&principal, request).await))
}

async fn delete_workload(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(kind): Path<String>,
    Query(query): Query<WorkloadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<WorkloadResponse, ApiError> {
    let mut request = query.into_request(Verb::Delete, kind);
    request.payload = parse_body(&headers, &body)?;
    Ok(WorkloadResponse(state.gateway.execute(&principal, request).await))
}
