//! End-to-end tests of the HTTP surface over the in-memory store.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use scp_core::ScpDeletePolicy;
use scp_database::MemoryStore;
use scp_integrity::ReferenceManager;
use scp_server::{AppState, PageLimits, router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app(policy: ScpDeletePolicy) -> Router {
    let manager = ReferenceManager::new(Arc::new(MemoryStore::new())).with_delete_policy(policy);
    router(AppState::new(manager, PageLimits::new(2, 3)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_scp(app: &Router, scp_id: &str) {
    let (status, _) = send(
        app,
        Method::POST,
        "/scps",
        Some(json!({ "scp_id": scp_id, "title": format!("Entry {}", scp_id) })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_health_reports_ok() {
    let app = app(ScpDeletePolicy::Tolerate);
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_tale_lifecycle_keeps_back_references() {
    let app = app(ScpDeletePolicy::Tolerate);
    create_scp(&app, "001").await;
    create_scp(&app, "002").await;

    let (status, tale) = send(
        &app,
        Method::POST,
        "/tales",
        Some(json!({ "title": "T", "scp_refs": ["001", "002"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = tale["id"].as_str().unwrap().to_string();

    let (_, scp) = send(&app, Method::GET, "/scps/001", None).await;
    assert_eq!(scp["referencing_tale_ids"], json!([id]));

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/tales/{}", id),
        Some(json!({ "scp_refs": ["002"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "T");

    let (_, scp) = send(&app, Method::GET, "/scps/001", None).await;
    assert_eq!(scp["referencing_tale_ids"], json!([]));

    let (status, _) = send(&app, Method::DELETE, &format!("/tales/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, scp) = send(&app, Method::GET, "/scps/002", None).await;
    assert_eq!(scp["referencing_tale_ids"], json!([]));

    let (status, _) = send(&app, Method::GET, &format!("/tales/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_reference_is_bad_request() {
    let app = app(ScpDeletePolicy::Tolerate);

    let (status, body) = send(
        &app,
        Method::POST,
        "/tales",
        Some(json!({ "title": "T2", "scp_refs": ["999"] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["missing"], json!(["999"]));
    let (_, page) = send(&app, Method::GET, "/tales", None).await;
    assert_eq!(page["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_empty_patch_is_bad_request() {
    let app = app(ScpDeletePolicy::Tolerate);
    create_scp(&app, "001").await;

    let (status, body) = send(&app, Method::PATCH, "/scps/001", Some(json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No fields provided for update");
    assert!(body.get("missing").is_none());
}

#[tokio::test]
async fn test_malformed_input_is_bad_request() {
    let app = app(ScpDeletePolicy::Tolerate);

    let (status, _) = send(&app, Method::GET, "/tales/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/scps",
        Some(json!({ "scp_id": "001", "title": "x", "referencing_tale_ids": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/scps",
        Some(json!({ "scp_id": " ", "title": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "scp_id must not be blank");

    let (status, _) = send(&app, Method::GET, "/scps?limit=lots", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_scp_is_conflict() {
    let app = app(ScpDeletePolicy::Tolerate);
    create_scp(&app, "173").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/scps",
        Some(json!({ "scp_id": "173", "title": "Again" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_block_policy_is_conflict() {
    let app = app(ScpDeletePolicy::Block);
    create_scp(&app, "001").await;
    send(
        &app,
        Method::POST,
        "/tales",
        Some(json!({ "title": "Pin", "scp_refs": ["001"] })),
    )
    .await;

    let (status, _) = send(&app, Method::DELETE, "/scps/001", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::GET, "/scps/001", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_list_applies_default_and_max_limit() {
    let app = app(ScpDeletePolicy::Tolerate);
    for key in ["a", "b", "c", "d", "e"] {
        create_scp(&app, key).await;
    }

    let (status, page) = send(&app, Method::GET, "/scps", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"].as_array().unwrap().len(), 2);
    assert_eq!(page["pagination"]["total_pages"], 3);

    let (_, page) = send(&app, Method::GET, "/scps?page=2&limit=50", None).await;
    let keys: Vec<_> = page["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|scp| scp["scp_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(keys, vec!["d", "e"]);
    assert_eq!(page["pagination"]["limit"], 3);
}

#[tokio::test]
async fn test_audit_and_reconcile_endpoints() {
    let app = app(ScpDeletePolicy::Tolerate);
    create_scp(&app, "001").await;
    send(
        &app,
        Method::POST,
        "/tales",
        Some(json!({ "title": "Dangling soon", "scp_refs": ["001"] })),
    )
    .await;
    send(&app, Method::DELETE, "/scps/001", None).await;

    let (status, report) = send(&app, Method::GET, "/admin/audit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["dangling_references"].as_array().unwrap().len(), 1);

    let (status, report) = send(&app, Method::POST, "/admin/reconcile", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["tales_scanned"], 1);
    assert_eq!(report["repaired_scps"], json!([]));
}
