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

use super::engine::TransitionError;
use super::repository::{RepositoryError, SubmissionRepository};
use super::scope::{Principal, ScopeChecker};
use super::service::{ReviewService, ReviewServiceError};
use super::submission::SubmissionId;
use crate::checks::router::registry_error_response;
use crate::checks::{CheckSelection, RunOptions};
use crate::document::ResolvedDocument;

/// Router exposing workflow definitions and the submission lifecycle.
pub fn submission_router<R, S>(service: Arc<ReviewService<R, S>>) -> Router
where
    R: SubmissionRepository + 'static,
    S: ScopeChecker + 'static,
{
    Router::new()
        .route("/api/v1/workflows", get(workflows_handler::<R, S>))
        .route("/api/v1/workflows/:name", get(workflow_handler::<R, S>))
        .route(
            "/api/v1/submissions",
            get(list_handler::<R, S>).post(create_handler::<R, S>),
        )
        .route(
            "/api/v1/submissions/:submission_id",
            get(submission_handler::<R, S>),
        )
        .route(
            "/api/v1/submissions/:submission_id/checks",
            post(checks_handler::<R, S>),
        )
        .route(
            "/api/v1/submissions/:submission_id/transitions",
            get(available_handler::<R, S>).post(transition_handler::<R, S>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct CreateSubmissionRequest {
    pub workflow: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SubmissionQuery {
    #[serde(default)]
    workflow: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionChecksRequest {
    pub document: ResolvedDocument,
    #[serde(default)]
    pub selection: CheckSelection,
    #[serde(default)]
    pub options: RunOptions,
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub trigger: String,
    pub principal: Principal,
}

/// Principal passed on the query string when listing available transitions.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PrincipalQuery {
    #[serde(default)]
    principal: String,
    /// Comma separated scope list.
    #[serde(default)]
    scopes: String,
}

impl PrincipalQuery {
    fn into_principal(self) -> Principal {
        let scopes: Vec<&str> = self
            .scopes
            .split(',')
            .map(str::trim)
            .filter(|scope| !scope.is_empty())
            .collect();
        Principal::new(self.principal.as_str()).with_scopes(&scopes)
    }
}

pub(crate) async fn workflows_handler<R, S>(
    State(service): State<Arc<ReviewService<R, S>>>,
) -> Response
where
    R: SubmissionRepository + 'static,
    S: ScopeChecker + 'static,
{
    let definitions: Vec<_> = service.workflows().definitions().collect();
    (StatusCode::OK, axum::Json(definitions)).into_response()
}

pub(crate) async fn workflow_handler<R, S>(
    State(service): State<Arc<ReviewService<R, S>>>,
    Path(name): Path<String>,
) -> Response
where
    R: SubmissionRepository + 'static,
    S: ScopeChecker + 'static,
{
    match service.workflows().get(&name) {
        Some(definition) => (StatusCode::OK, axum::Json(definition)).into_response(),
        None => service_error_response(ReviewServiceError::UnknownWorkflow(name)),
    }
}

pub(crate) async fn list_handler<R, S>(
    State(service): State<Arc<ReviewService<R, S>>>,
    Query(query): Query<SubmissionQuery>,
) -> Response
where
    R: SubmissionRepository + 'static,
    S: ScopeChecker + 'static,
{
    match service.submissions(query.workflow.as_deref()) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn create_handler<R, S>(
    State(service): State<Arc<ReviewService<R, S>>>,
    axum::Json(request): axum::Json<CreateSubmissionRequest>,
) -> Response
where
    R: SubmissionRepository + 'static,
    S: ScopeChecker + 'static,
{
    match service.create_submission(&request.workflow) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn submission_handler<R, S>(
    State(service): State<Arc<ReviewService<R, S>>>,
    Path(submission_id): Path<String>,
) -> Response
where
    R: SubmissionRepository + 'static,
    S: ScopeChecker + 'static,
{
    match service.submission(&SubmissionId(submission_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn checks_handler<R, S>(
    State(service): State<Arc<ReviewService<R, S>>>,
    Path(submission_id): Path<String>,
    axum::Json(request): axum::Json<SubmissionChecksRequest>,
) -> Response
where
    R: SubmissionRepository + 'static,
    S: ScopeChecker + 'static,
{
    let SubmissionChecksRequest {
        document,
        selection,
        options,
    } = request;
    let id = SubmissionId(submission_id);

    match service.run_checks(&id, document, &selection, &options).await {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn available_handler<R, S>(
    State(service): State<Arc<ReviewService<R, S>>>,
    Path(submission_id): Path<String>,
    Query(query): Query<PrincipalQuery>,
) -> Response
where
    R: SubmissionRepository + 'static,
    S: ScopeChecker + 'static,
{
    let principal = query.into_principal();
    match service.available_transitions(&SubmissionId(submission_id), &principal) {
        Ok(transitions) => (StatusCode::OK, axum::Json(transitions)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn transition_handler<R, S>(
    State(service): State<Arc<ReviewService<R, S>>>,
    Path(submission_id): Path<String>,
    axum::Json(request): axum::Json<TransitionRequest>,
) -> Response
where
    R: SubmissionRepository + 'static,
    S: ScopeChecker + 'static,
{
    let id = SubmissionId(submission_id);
    match service.transition(&id, &request.trigger, &request.principal) {
        Ok((record, outcome)) => {
            let payload = json!({
                "submission": record.submission,
                "transition": outcome.record,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) fn service_error_response(error: ReviewServiceError) -> Response {
    let error = match error {
        ReviewServiceError::Registry(inner) => return registry_error_response(inner),
        other => other,
    };

    let status = match &error {
        ReviewServiceError::Registry(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ReviewServiceError::UnknownWorkflow(_) => StatusCode::NOT_FOUND,
        ReviewServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ReviewServiceError::Repository(RepositoryError::Conflict)
        | ReviewServiceError::Repository(RepositoryError::VersionConflict { .. }) => {
            StatusCode::CONFLICT
        }
        ReviewServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ReviewServiceError::Transition(TransitionError::Forbidden { .. }) => StatusCode::FORBIDDEN,
        ReviewServiceError::Transition(TransitionError::ChecksNotSatisfied { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ReviewServiceError::Transition(
            TransitionError::UnknownTransition { .. }
            | TransitionError::ConcurrentModification { .. }
            | TransitionError::WorkflowMismatch { .. },
        ) => StatusCode::CONFLICT,
    };

    let mut payload = json!({ "error": error.to_string() });
    match error {
        ReviewServiceError::Transition(TransitionError::Forbidden { missing_scopes, .. }) => {
            payload["missing_scopes"] = json!(missing_scopes);
        }
        ReviewServiceError::Transition(TransitionError::ChecksNotSatisfied {
            unsatisfied, ..
        }) => {
            payload["unsatisfied"] = json!(unsatisfied);
        }
        _ => {}
    }
    (status, axum::Json(payload)).into_response()
}
