use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::scopes::SUBMIT;
use crate::workflows::submission_router;

async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

async fn create(router: &Router, workflow: &str) -> String {
    let response = router
        .clone()
        .oneshot(post_json(
            "/api/v1/submissions",
            json!({ "workflow": workflow }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    body["submission"]["id"]
        .as_str()
        .expect("submission id")
        .to_string()
}

fn transition_request(id: &str, trigger: &str, scopes: &[&str]) -> Request<Body> {
    post_json(
        &format!("/api/v1/submissions/{id}/transitions"),
        json!({
            "trigger": trigger,
            "principal": { "id": "user-42", "scopes": scopes },
        }),
    )
}

#[tokio::test]
async fn create_returns_submission_in_initial_state() {
    let router = submission_router(Arc::new(service()));

    let response = router
        .oneshot(post_json(
            "/api/v1/submissions",
            json!({ "workflow": "open-review" }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["submission"]["current_state"], "intake");
    assert_eq!(body["submission"]["version"], 0);
}

#[tokio::test]
async fn unknown_workflow_returns_not_found() {
    let router = submission_router(Arc::new(service()));

    let response = router
        .oneshot(
            Request::get("/api/v1/workflows/peer-panel")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_scope_returns_forbidden_with_detail() {
    let router = submission_router(Arc::new(service()));
    let id = create(&router, "simple-public").await;

    let response = router
        .oneshot(transition_request(&id, "submit", &[]))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = read_json_body(response).await;
    assert_eq!(body["missing_scopes"], json!([SUBMIT]));
}

#[tokio::test]
async fn unchecked_submission_returns_unprocessable() {
    let router = submission_router(Arc::new(service()));
    let id = create(&router, "simple-public").await;

    let response = router
        .oneshot(transition_request(&id, "submit", &[SUBMIT]))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    let unsatisfied = body["unsatisfied"].as_array().expect("detail list");
    assert_eq!(unsatisfied.len(), 3);
    assert_eq!(unsatisfied[0]["kind"], "category");
    assert_eq!(unsatisfied[0]["status"], Value::Null);
}

#[tokio::test]
async fn unknown_trigger_returns_conflict() {
    let router = submission_router(Arc::new(service()));
    let id = create(&router, "simple-public").await;

    let response = router
        .oneshot(transition_request(&id, "archive", &[SUBMIT]))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn checks_then_submit_over_http() {
    let router = submission_router(Arc::new(service()));
    let id = create(&router, "simple-public").await;

    let document = serde_json::to_value(manuscript()).expect("document serializes");
    let response = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/submissions/{id}/checks"),
            json!({ "document": document }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["submission"]["version"], 1);
    assert!(body["latest_report"]["results"].is_array());

    let response = router
        .clone()
        .oneshot(transition_request(&id, "submit", &[SUBMIT]))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["submission"]["current_state"], "submitted");
    assert_eq!(body["transition"]["trigger"], "submit");

    let response = router
        .oneshot(
            Request::get(format!(
                "/api/v1/submissions/{id}/transitions?principal=user-42&scopes=submission:withdraw"
            ))
            .body(Body::empty())
            .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let available = body.as_array().expect("array payload");
    assert_eq!(available.len(), 2);
    assert_eq!(available[0]["transition"]["name"], "publish");
    assert_eq!(available[0]["admissible"], false);
    assert_eq!(available[1]["transition"]["name"], "withdraw");
    assert_eq!(available[1]["admissible"], true);
}
