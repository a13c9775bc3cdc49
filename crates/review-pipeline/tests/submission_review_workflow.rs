//! End-to-end review scenarios driven through the public service facade and HTTP routers.
//!
//! Documents arrive as JSON the way the rendering layer hands them over, so these tests also pin
//! the wire shape of resolved documents, reports, and workflow specs.

mod common {
    use std::sync::Arc;

    use serde_json::json;

    use review_pipeline::checks::{CheckExecutor, CheckRegistry, ExecutorConfig};
    use review_pipeline::document::ResolvedDocument;
    use review_pipeline::workflows::{
        InMemorySubmissionRepository, Principal, ReviewService, WorkflowCatalog,
    };

    pub(super) type Service = ReviewService<InMemorySubmissionRepository>;

    pub(super) fn executor() -> Arc<CheckExecutor> {
        Arc::new(CheckExecutor::new(
            Arc::new(CheckRegistry::standard().expect("standard catalog registers")),
            ExecutorConfig::default(),
        ))
    }

    pub(super) fn service() -> Arc<Service> {
        Arc::new(
            ReviewService::new(
                executor(),
                Arc::new(WorkflowCatalog::standard().expect("standard workflows load")),
                Arc::new(InMemorySubmissionRepository::new()),
            )
            .expect("service assembles"),
        )
    }

    pub(super) fn principal(id: &str, scopes: &[&str]) -> Principal {
        Principal::new(id).with_scopes(scopes)
    }

    /// Manuscript that satisfies every built-in check, as JSON.
    pub(super) fn manuscript_json() -> serde_json::Value {
        let abstract_text = vec!["evidence"; 90].join(" ");
        json!({
            "frontmatter": {
                "title": "Open review of reproducible pipelines",
                "authors": [{
                    "name": "Katherine Johnson",
                    "email": "kj@example.org",
                    "orcid": "https://orcid.org/0000-0002-1825-0097",
                    "affiliations": ["Langley Research Center"],
                    "corresponding": true
                }],
                "keywords": ["review", "reproducibility"],
                "doi": "10.5281/zenodo.1000001"
            },
            "parts": {
                "abstract": {
                    "kind": "paragraph",
                    "children": [{ "kind": "text", "value": abstract_text }]
                },
                "data_availability": {
                    "kind": "paragraph",
                    "children": [{ "kind": "text", "value": "Data are archived on Zenodo." }]
                },
                "code_availability": {
                    "kind": "paragraph",
                    "children": [{ "kind": "text", "value": "Code is public on GitHub." }]
                }
            },
            "body": {
                "kind": "root",
                "children": [
                    {
                        "kind": "paragraph",
                        "children": [{ "kind": "text", "value": "See the dataset." }]
                    },
                    {
                        "kind": "link",
                        "url": "https://zenodo.org/records/1000001",
                        "position": {
                            "start": { "line": 12, "column": 1 },
                            "end": { "line": 12, "column": 40 }
                        }
                    }
                ]
            }
        })
    }

    pub(super) fn manuscript() -> ResolvedDocument {
        serde_json::from_value(manuscript_json()).expect("document deserializes")
    }
}

mod review_flow {
    use review_pipeline::checks::{CheckSelection, CheckStatus, RunOptions};
    use review_pipeline::workflows::scopes::{EDIT, PUBLISH, REVIEW, SUBMIT};
    use review_pipeline::workflows::{ReviewServiceError, TransitionError};

    use super::common::*;

    #[tokio::test]
    async fn open_review_runs_a_revision_round_before_publication() {
        let service = service();
        let editor = principal("editor-7", &[EDIT, PUBLISH]);
        let reviewer = principal("reviewer-3", &[REVIEW]);
        let author = principal("author-1", &[SUBMIT]);

        let created = service
            .create_submission("open-review")
            .expect("workflow exists");
        let id = created.submission.id.clone();

        let checked = service
            .run_checks(&id, manuscript(), &CheckSelection::all(), &RunOptions::new())
            .await
            .expect("checks run");
        let report = checked.latest_report.as_ref().expect("report stored");
        assert_eq!(report.status, CheckStatus::Pass, "{report:#?}");

        for (trigger, who) in [
            ("send-to-review", &editor),
            ("request-revision", &reviewer),
            ("resubmit", &author),
            ("resume-review", &editor),
            ("accept", &editor),
            ("publish", &editor),
        ] {
            service
                .transition(&id, trigger, who)
                .unwrap_or_else(|err| panic!("{trigger} should be admissible: {err}"));
        }

        let record = service.submission(&id).expect("stored");
        assert_eq!(record.submission.current_state, "published");
        let triggers: Vec<&str> = record
            .submission
            .history
            .iter()
            .map(|entry| entry.trigger.as_str())
            .collect();
        assert_eq!(
            triggers,
            vec![
                "send-to-review",
                "request-revision",
                "resubmit",
                "resume-review",
                "accept",
                "publish",
            ]
        );
        assert_eq!(record.submission.version, 7);

        let err = service
            .transition(&id, "withdraw", &principal("author-1", &[]))
            .expect_err("published is terminal");
        assert!(matches!(
            err,
            ReviewServiceError::Transition(TransitionError::UnknownTransition { .. })
        ));
    }

    #[tokio::test]
    async fn broken_link_blocks_publication_until_rechecked() {
        let service = service();
        let editor = principal("editor-7", &[EDIT, PUBLISH]);

        let created = service
            .create_submission("open-review")
            .expect("workflow exists");
        let id = created.submission.id.clone();

        let mut broken = manuscript_json();
        broken["body"]["children"][1]["url"] = "htp//zenodo".into();
        let broken = serde_json::from_value(broken).expect("document deserializes");
        let checked = service
            .run_checks(&id, broken, &CheckSelection::all(), &RunOptions::new())
            .await
            .expect("checks run");
        let report = checked.latest_report.expect("report stored");
        assert_eq!(report.check_status("links-valid"), Some(CheckStatus::Fail));
        let link = report
            .entries()
            .find(|entry| entry.result.id == "links-valid")
            .expect("link result");
        assert_eq!(
            link.result.position.map(|position| position.start.line),
            Some(12)
        );

        service
            .transition(&id, "send-to-review", &editor)
            .expect("links are not gated at intake");
        service
            .transition(&id, "accept", &editor)
            .expect("acceptance is ungated");
        let err = service
            .transition(&id, "publish", &editor)
            .expect_err("links-valid failed");
        match err {
            ReviewServiceError::Transition(TransitionError::ChecksNotSatisfied {
                unsatisfied,
                ..
            }) => {
                let names: Vec<&str> = unsatisfied.iter().map(|req| req.name.as_str()).collect();
                assert_eq!(names, vec!["links-valid"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        service
            .run_checks(&id, manuscript(), &CheckSelection::all(), &RunOptions::new())
            .await
            .expect("checks rerun");
        let (record, _) = service
            .transition(&id, "publish", &editor)
            .expect("fixed link passes");
        assert_eq!(record.submission.current_state, "published");
    }
}

mod workflow_specs {
    use review_pipeline::checks::{CheckRegistry, RegistryError};
    use review_pipeline::workflows::{InvalidWorkflowReason, WorkflowDefinition, WorkflowError};

    #[test]
    fn json_spec_loads_and_cross_checks_against_registry() {
        let raw = r#"{
            "name": "editorial-board",
            "version": 2,
            "states": ["received", "approved", "declined"],
            "initial_state": "received",
            "transitions": [
                {
                    "name": "approve",
                    "from": "received",
                    "to": "approved",
                    "required_scopes": ["board:vote"],
                    "required_check_ids": ["doi-exists", "ethics-statement"]
                },
                { "name": "decline", "from": "received", "to": "declined" }
            ]
        }"#;

        let definition = WorkflowDefinition::from_json(raw).expect("spec is well formed");
        assert_eq!(definition.version(), 2);
        assert_eq!(definition.terminal_states(), vec!["approved", "declined"]);

        let registry = CheckRegistry::standard().expect("standard catalog registers");
        let err = definition
            .ensure_checks_registered(&registry)
            .expect_err("ethics-statement is unknown");
        assert_eq!(
            err,
            RegistryError::CheckNotFound("ethics-statement".to_string())
        );
    }

    #[test]
    fn blank_state_is_rejected() {
        let raw = r#"{
            "name": "blank",
            "states": ["draft", " "],
            "initial_state": "draft"
        }"#;

        let err = WorkflowDefinition::from_json(raw).expect_err("blank state");
        assert_eq!(
            err,
            WorkflowError::InvalidWorkflow {
                workflow: "blank".to_string(),
                reason: InvalidWorkflowReason::BlankState,
            }
        );
    }
}

mod http {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use review_pipeline::checks::check_router;

    use super::common::*;

    #[tokio::test]
    async fn ad_hoc_run_reports_categories_in_selection_order() {
        let router = check_router(executor());
        let payload = json!({
            "document": manuscript_json(),
            "selection": { "ids": ["doi-exists", "title-exists"] }
        });

        let response = router
            .oneshot(
                Request::post("/api/v1/checks/run")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        let report: Value = serde_json::from_slice(&body).expect("json payload");
        assert_eq!(report["status"], "pass");
        let categories: Vec<&str> = report["results"]
            .as_array()
            .expect("category list")
            .iter()
            .filter_map(|group| group["category"].as_str())
            .collect();
        assert_eq!(categories, vec!["doi", "title"]);
    }
}
