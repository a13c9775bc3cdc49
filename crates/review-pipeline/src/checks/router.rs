use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::executor::{CheckExecutor, CheckSelection, RunOptions};
use super::registry::{CheckFilter, RegistryError};
use crate::document::ResolvedDocument;

/// Router exposing the check catalog and ad hoc check runs.
pub fn check_router(executor: Arc<CheckExecutor>) -> Router {
    Router::new()
        .route("/api/v1/checks", get(list_handler))
        .route("/api/v1/checks/run", post(run_handler))
        .route("/api/v1/checks/:check_id", get(definition_handler))
        .with_state(executor)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CheckQuery {
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RunChecksRequest {
    pub document: ResolvedDocument,
    #[serde(default)]
    pub selection: CheckSelection,
    #[serde(default)]
    pub options: RunOptions,
}

pub(crate) async fn list_handler(
    State(executor): State<Arc<CheckExecutor>>,
    Query(query): Query<CheckQuery>,
) -> Response {
    let filter = CheckFilter {
        tags: query.tag.into_iter().collect(),
        category: query.category,
    };
    let definitions = executor.registry().list(&filter);
    (StatusCode::OK, axum::Json(definitions)).into_response()
}

pub(crate) async fn definition_handler(
    State(executor): State<Arc<CheckExecutor>>,
    Path(check_id): Path<String>,
) -> Response {
    match executor.registry().get(&check_id) {
        Ok(definition) => (StatusCode::OK, axum::Json(definition)).into_response(),
        Err(error) => registry_error_response(error),
    }
}

pub(crate) async fn run_handler(
    State(executor): State<Arc<CheckExecutor>>,
    axum::Json(request): axum::Json<RunChecksRequest>,
) -> Response {
    let RunChecksRequest {
        document,
        selection,
        options,
    } = request;

    match executor
        .run(Arc::new(document), &selection, &options)
        .await
    {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => registry_error_response(error),
    }
}

pub(crate) fn registry_error_response(error: RegistryError) -> Response {
    let status = match error {
        RegistryError::CheckNotFound(_) | RegistryError::CategoryNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        RegistryError::DuplicateCheckId(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
