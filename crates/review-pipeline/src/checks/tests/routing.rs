use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::checks::check_router;

async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[tokio::test]
async fn list_filters_by_category_query() {
    let router = check_router(Arc::new(standard_executor()));

    let response = router
        .oneshot(
            Request::get("/api/v1/checks?category=availability")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let ids: Vec<&str> = body
        .as_array()
        .expect("array payload")
        .iter()
        .filter_map(|definition| definition["id"].as_str())
        .collect();
    assert_eq!(
        ids,
        vec!["data-availability-exists", "code-availability-exists"]
    );
}

#[tokio::test]
async fn unknown_definition_returns_not_found() {
    let router = check_router(Arc::new(standard_executor()));

    let response = router
        .oneshot(
            Request::get("/api/v1/checks/does-not-exist")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn run_endpoint_returns_report() {
    let router = check_router(Arc::new(standard_executor()));
    let payload = json!({
        "document": complete_document(),
        "selection": { "ids": ["abstract-exists", "title-exists"] },
    });

    let response = router
        .oneshot(
            Request::post("/api/v1/checks/run")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "pass");
    assert_eq!(body["results"][0]["category"], "abstract");
    assert_eq!(body["results"][1]["category"], "title");
}
