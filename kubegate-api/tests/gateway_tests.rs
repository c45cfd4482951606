//! End-to-end gateway behavior against an in-memory cluster

mod common;

use common::*;
use futures::future::join_all;
use kubegate_api::kubernetes::describe::KubectlDescriber;
use kubegate_common::{ErrorKind, OperationRequest, Verb};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn strip_server_fields(mut object: Value) -> Value {
    if let Some(metadata) = object["metadata"].as_object_mut() {
        for field in ["uid", "creationTimestamp", "resourceVersion"] {
            metadata.remove(field);
        }
    }
    object
}

#[tokio::test]
async fn test_reader_cannot_delete_admin_kind_and_cluster_untouched() {
    let h = harness().await;
    h.cluster.seed(
        "clusterroles",
        json!({ "apiVersion": "rbac.authorization.k8s.io/v1", "kind": "ClusterRole", "metadata": { "name": "viewer" } }),
    );

    let result = h
        .gateway
        .execute(
            &reader(),
            OperationRequest::new(Verb::Delete, "cluster_role")
                .in_context(STAGING)
                .named("viewer"),
        )
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::InsufficientAccess));
    assert_eq!(h.cluster.calls(), 0);
    assert_eq!(h.factory.built(STAGING), 0);
    assert!(h.cluster.contains("clusterroles", "", "viewer"));
}

#[tokio::test]
async fn test_ignored_namespaces_never_listed() {
    let h = harness().await;
    h.cluster.seed("pods", pod("apps", "web-0"));
    h.cluster.seed("pods", pod("kube-system", "coredns-0"));

    let all = h
        .gateway
        .execute(&user(), OperationRequest::new(Verb::List, "pod"))
        .await;
    assert_eq!(names(all.payload().unwrap()), vec!["web-0"]);

    let direct = h
        .gateway
        .execute(&user(), OperationRequest::new(Verb::List, "pod").in_namespace("kube-system"))
        .await;
    assert!(names(direct.payload().unwrap()).is_empty());
}

#[tokio::test]
async fn test_ignored_namespace_objects_filtered_by_name() {
    let h = harness().await;
    for name in ["apps", "kube-system"] {
        h.cluster.seed(
            "namespaces",
            json!({ "apiVersion": "v1", "kind": "Namespace", "metadata": { "name": name } }),
        );
    }

    let result = h
        .gateway
        .execute(&user(), OperationRequest::new(Verb::List, "namespace"))
        .await;
    assert_eq!(names(result.payload().unwrap()), vec!["apps"]);
}

#[tokio::test]
async fn test_namespace_ignored_for_cluster_scoped_kinds() {
    let h = harness().await;
    h.cluster.seed(
        "nodes",
        json!({ "apiVersion": "v1", "kind": "Node", "metadata": { "name": "worker-1" } }),
    );

    let plain = h
        .gateway
        .execute(&user(), OperationRequest::new(Verb::List, "node"))
        .await;
    let scoped = h
        .gateway
        .execute(&user(), OperationRequest::new(Verb::List, "node").in_namespace("apps"))
        .await;
    assert_eq!(plain, scoped);
    assert_eq!(names(plain.payload().unwrap()), vec!["worker-1"]);

    let got = h
        .gateway
        .execute(
            &user(),
            OperationRequest::new(Verb::Get, "node").in_namespace("apps").named("worker-1"),
        )
        .await;
    assert!(got.is_success());
}

#[tokio::test]
async fn test_create_then_get_returns_payload() {
    let h = harness().await;
    let payload = pod("apps", "web-0");

    let created = h
        .gateway
        .execute(
            &user(),
            OperationRequest::new(Verb::Create, "pod").with_payload(payload.clone()),
        )
        .await;
    assert!(created.is_success(), "{:?}", created);

    let fetched = h
        .gateway
        .execute(
            &user(),
            OperationRequest::new(Verb::Get, "pod").in_namespace("apps").named("web-0"),
        )
        .await
        .into_result()
        .unwrap();
    assert_eq!(strip_server_fields(fetched), payload);
}

#[tokio::test]
async fn test_create_fills_type_fields_and_request_namespace() {
    let h = harness().await;
    let payload = json!({ "metadata": { "name": "settings" }, "data": { "mode": "fast" } });

    let created = h
        .gateway
        .execute(
            &user(),
            OperationRequest::new(Verb::Create, "configmap")
                .in_namespace("apps")
                .with_payload(payload),
        )
        .await
        .into_result()
        .unwrap();

    assert_eq!(created["apiVersion"], "v1");
    assert_eq!(created["kind"], "ConfigMap");
    assert_eq!(created["metadata"]["namespace"], "apps");
    assert!(h.cluster.contains("configmaps", "apps", "settings"));
}

#[tokio::test]
async fn test_create_without_namespace_rejected() {
    let h = harness().await;
    let result = h
        .gateway
        .execute(
            &user(),
            OperationRequest::new(Verb::Create, "configmap")
                .with_payload(json!({ "metadata": { "name": "settings" } })),
        )
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::ValidationFailure));
    assert_eq!(h.cluster.calls(), 0);
}

#[tokio::test]
async fn test_create_twice_already_exists() {
    let h = harness().await;
    let request = OperationRequest::new(Verb::Create, "pod").with_payload(pod("apps", "web-0"));

    assert!(h.gateway.execute(&user(), request.clone()).await.is_success());
    let again = h.gateway.execute(&user(), request).await;
    assert_eq!(again.error_kind(), Some(ErrorKind::AlreadyExists));
}

#[tokio::test]
async fn test_delete_twice_not_found() {
    let h = harness().await;
    h.cluster.seed("pods", pod("apps", "web-0"));
    let request = OperationRequest::new(Verb::Delete, "pod").in_namespace("apps").named("web-0");

    let first = h.gateway.execute(&user(), request.clone()).await.into_result().unwrap();
    assert_eq!(first["status"], "deleted");
    assert_eq!(first["name"], "web-0");
    assert!(!h.cluster.contains("pods", "apps", "web-0"));

    let second = h.gateway.execute(&user(), request).await;
    assert_eq!(second.error_kind(), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_delete_by_payload_match_key() {
    let h = harness().await;
    h.cluster.seed("pods", pod("apps", "web-0"));

    let result = h
        .gateway
        .execute(
            &user(),
            OperationRequest::new(Verb::Delete, "pod").with_payload(pod("apps", "web-0")),
        )
        .await;

    assert!(result.is_success(), "{:?}", result);
    assert!(!h.cluster.contains("pods", "apps", "web-0"));
}

#[tokio::test]
async fn test_stale_update_conflicts() {
    let h = harness().await;
    h.cluster.seed("pods", pod("apps", "web-0"));
    let get = OperationRequest::new(Verb::Get, "pod").in_namespace("apps").named("web-0");

    let current = h.gateway.execute(&user(), get).await.into_result().unwrap();

    let mut fresh = current.clone();
    fresh["metadata"]["labels"] = json!({ "tier": "web" });
    let updated = h
        .gateway
        .execute(&user(), OperationRequest::new(Verb::Update, "pod").with_payload(fresh))
        .await
        .into_result()
        .unwrap();
    assert_eq!(updated["metadata"]["labels"]["tier"], "web");

    let mut stale = current;
    stale["metadata"]["labels"] = json!({ "tier": "stale" });
    let result = h
        .gateway
        .execute(&user(), OperationRequest::new(Verb::Update, "pod").with_payload(stale))
        .await;
    assert_eq!(result.error_kind(), Some(ErrorKind::Conflict));
}

#[tokio::test]
async fn test_update_without_resource_version_rejected() {
    let h = harness().await;
    h.cluster.seed("pods", pod("apps", "web-0"));

    let result = h
        .gateway
        .execute(
            &user(),
            OperationRequest::new(Verb::Update, "pod").with_payload(pod("apps", "web-0")),
        )
        .await;
    assert_eq!(result.error_kind(), Some(ErrorKind::ValidationFailure));
}

#[tokio::test]
async fn test_snapshot_update_unsupported() {
    let h = harness().await;
    let result = h
        .gateway
        .execute(
            &admin(),
            OperationRequest::new(Verb::Update, "volume_snapshot")
                .with_payload(json!({ "metadata": { "name": "nightly", "namespace": "apps" } })),
        )
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::VerbUnsupportedForKind));
    assert_eq!(h.cluster.calls(), 0);
}

#[tokio::test]
async fn test_unknown_kind_and_context() {
    let h = harness().await;

    let kind = h
        .gateway
        .execute(&admin(), OperationRequest::new(Verb::List, "gizmo"))
        .await;
    assert_eq!(kind.error_kind(), Some(ErrorKind::UnsupportedKind));

    let context = h
        .gateway
        .execute(&admin(), OperationRequest::new(Verb::List, "pod").in_context("nowhere"))
        .await;
    assert_eq!(context.error_kind(), Some(ErrorKind::UnknownContext));
}

#[tokio::test]
async fn test_unreachable_context_connection_failure() {
    let h = harness().await;
    let result = h
        .gateway
        .execute(
            &user(),
            OperationRequest::new(Verb::List, "pod").in_context("unreachable-east"),
        )
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::ConnectionFailure));
    assert_eq!(h.cluster.calls(), 0);
}

#[tokio::test]
async fn test_concurrent_first_use_builds_one_client() {
    let h = harness().await;
    h.cluster.seed("pods", pod("apps", "web-0"));

    let principal = user();
    let requests = (0..16).map(|_| {
        h.gateway.execute(
            &principal,
            OperationRequest::new(Verb::List, "pod").in_context(STAGING),
        )
    });
    let results = join_all(requests).await;

    assert!(results.iter().all(|r| r.is_success()));
    assert_eq!(h.factory.built(STAGING), 1);
}

#[tokio::test]
async fn test_connection_failure_rebuilds_client() {
    let h = harness().await;
    assert_eq!(h.factory.built("default"), 1);

    h.cluster.fail_next_connection();
    let failed = h
        .gateway
        .execute(&user(), OperationRequest::new(Verb::List, "pod"))
        .await;
    assert_eq!(failed.error_kind(), Some(ErrorKind::ConnectionFailure));

    let retried = h
        .gateway
        .execute(&user(), OperationRequest::new(Verb::List, "pod"))
        .await;
    assert!(retried.is_success());
    assert_eq!(h.factory.built("default"), 2);
}

#[tokio::test]
async fn test_deadline_cancels_slow_call() {
    let h = harness().await;
    h.cluster.set_latency(Duration::from_millis(500));

    let result = h
        .gateway
        .execute(
            &user(),
            OperationRequest::new(Verb::List, "pod")
                .with_deadline(Instant::now() + Duration::from_millis(50)),
        )
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Cancelled));
}

#[tokio::test]
async fn test_default_request_timeout_applies() {
    let h = harness_with(
        options().with_request_timeout(Duration::from_millis(50)),
        Arc::new(script_describer()),
    )
    .await;
    h.cluster.set_latency(Duration::from_millis(500));

    let result = h
        .gateway
        .execute(&user(), OperationRequest::new(Verb::List, "pod"))
        .await;
    assert_eq!(result.error_kind(), Some(ErrorKind::Cancelled));
}

#[tokio::test]
async fn test_describe_returns_text() {
    let h = harness().await;
    let result = h
        .gateway
        .execute(
            &user(),
            OperationRequest::new(Verb::Describe, "pod").in_namespace("apps").named("web-0"),
        )
        .await
        .into_result()
        .unwrap();

    assert!(result.as_str().unwrap().contains("Name: web-0"));
}

#[tokio::test]
async fn test_describe_failure_carries_tool_output() {
    let h = harness().await;
    let result = h
        .gateway
        .execute(
            &user(),
            OperationRequest::new(Verb::Describe, "pod").in_namespace("apps").named("missing-x"),
        )
        .await;

    assert!(result.payload().is_none());
    let error = result.error().unwrap();
    assert_eq!(error.kind, ErrorKind::ExternalToolFailure);
    assert!(error.detail.as_deref().unwrap().contains("NotFound"));
}

#[tokio::test]
async fn test_describe_denied_before_tool_runs() {
    let describer = Arc::new(CountingDescriber::default());
    let h = harness_with(options(), describer.clone()).await;

    let result = h
        .gateway
        .execute(
            &user(),
            OperationRequest::new(Verb::Describe, "secret").in_namespace("apps").named("db"),
        )
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::InsufficientAccess));
    assert_eq!(describer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_templates_require_user() {
    let h = harness().await;

    let denied = h.gateway.templates(&reader());
    assert_eq!(denied.error_kind(), Some(ErrorKind::InsufficientAccess));

    let templates = h.gateway.templates(&user()).into_result().unwrap();
    let templates = templates.as_array().unwrap();
    assert_eq!(templates.len(), h.gateway.registry().len());
    assert!(templates.iter().any(|t| t["kind"] == "pod"));
}

#[tokio::test]
async fn test_available_kinds_follow_access_level() {
    let h = harness().await;

    let for_user = h.gateway.available_kinds(&user()).into_result().unwrap();
    let for_admin = h.gateway.available_kinds(&admin()).into_result().unwrap();
    let contains = |list: &Value, kind: &str| list.as_array().unwrap().iter().any(|k| k == kind);

    assert!(contains(&for_user, "pod"));
    assert!(!contains(&for_user, "secret"));
    assert!(contains(&for_admin, "secret"));
    assert!(for_admin.as_array().unwrap().len() > for_user.as_array().unwrap().len());
}

#[tokio::test]
async fn test_contexts_listed_for_reader() {
    let h = harness().await;
    let contexts = h.gateway.contexts(&reader()).await.into_result().unwrap();
    let ids: Vec<&str> = contexts
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["id"].as_str())
        .collect();

    assert!(ids.contains(&"default"));
    assert!(ids.contains(&STAGING));
    assert!(ids.contains(&"unreachable-east"));
}

#[tokio::test]
async fn test_flag_like_names_never_reach_describe_tool() {
    let describer = Arc::new(CountingDescriber::default());
    let h = harness_with(options(), describer.clone()).await;

    for name in ["--all-namespaces", "--context=prod"] {
        let result = h
            .gateway
            .execute(
                &user(),
                OperationRequest::new(Verb::Describe, "pod").in_namespace("apps").named(name),
            )
            .await;
        assert_eq!(result.error_kind(), Some(ErrorKind::ValidationFailure), "{}", name);
    }
    assert_eq!(describer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_describe_name_follows_separator() {
    let echo = KubectlDescriber::new(
        "sh",
        vec![
            "-c".to_string(),
            r#"for arg; do echo "ARG[$arg]"; done"#.to_string(),
            "kubectl".to_string(),
        ],
    );
    let h = harness_with(options(), Arc::new(echo)).await;

    let text = h
        .gateway
        .execute(
            &user(),
            OperationRequest::new(Verb::Describe, "pod")
                .in_context(STAGING)
                .in_namespace("apps")
                .named("web-0"),
        )
        .await
        .into_result()
        .unwrap();

    let args: Vec<&str> = text.as_str().unwrap().lines().collect();
    assert_eq!(args.first(), Some(&"ARG[describe]"));
    assert!(args.ends_with(&["ARG[--]", "ARG[pods]", "ARG[web-0]"]));
}

#[tokio::test]
async fn test_path_like_names_rejected_before_cluster() {
    let h = harness().await;

    let get = h
        .gateway
        .execute(
            &user(),
            OperationRequest::new(Verb::Get, "pod").in_namespace("apps").named("../secrets/admin"),
        )
        .await;
    assert_eq!(get.error_kind(), Some(ErrorKind::ValidationFailure));

    let list = h
        .gateway
        .execute(&user(), OperationRequest::new(Verb::List, "pod").in_namespace("apps/../kube-system"))
        .await;
    assert_eq!(list.error_kind(), Some(ErrorKind::ValidationFailure));

    let mut payload = pod("apps", "web-0");
    payload["metadata"]["name"] = json!("../web");
    payload["metadata"]["resourceVersion"] = json!("1");
    let update = h
        .gateway
        .execute(&user(), OperationRequest::new(Verb::Update, "pod").with_payload(payload))
        .await;
    assert_eq!(update.error_kind(), Some(ErrorKind::ValidationFailure));

    assert_eq!(h.cluster.calls(), 0);
}

#[tokio::test]
async fn test_repeated_list_keeps_order() {
    let h = harness().await;
    for (namespace, name) in [("apps", "web-1"), ("batch", "worker-0"), ("apps", "web-0"), ("web", "api-0")] {
        h.cluster.seed("pods", pod(namespace, name));
    }

    let first = h
        .gateway
        .execute(&user(), OperationRequest::new(Verb::List, "pod"))
        .await
        .into_result()
        .unwrap();
    let second = h
        .gateway
        .execute(&user(), OperationRequest::new(Verb::List, "pod"))
        .await
        .into_result()
        .unwrap();

    assert_eq!(names(&first).len(), 4);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_oversized_request_timeout_does_not_panic() {
    let h = harness_with(
        options().with_request_timeout(Duration::MAX),
        Arc::new(script_describer()),
    )
    .await;
    h.cluster.seed("pods", pod("apps", "web-0"));

    let result = h
        .gateway
        .execute(&user(), OperationRequest::new(Verb::List, "pod"))
        .await;
    assert!(result.is_success(), "{:?}", result);
}
