use std::sync::Arc;

use crate::checks::{
    CheckDefinition, CheckExecutor, CheckRegistry, CheckReport, CheckResult, CheckStatus,
    CompiledCheckResult, ExecutedCheck, ExecutorConfig,
};
use crate::document::{Author, Frontmatter, Node, NodeKind, ResolvedDocument};
use crate::workflows::scopes::{EDIT, PUBLISH, SUBMIT, WITHDRAW};
use crate::workflows::{
    InMemorySubmissionRepository, Principal, ReviewService, Submission, SubmissionId, Transition,
    WorkflowCatalog, WorkflowDefinition, WorkflowSpec,
};

/// draft -> submitted (scope `submit`) -> published (category `abstract` must pass).
pub(super) fn example_workflow() -> WorkflowDefinition {
    WorkflowDefinition::load(WorkflowSpec {
        name: "example".to_string(),
        version: 1,
        description: String::new(),
        states: vec![
            "draft".to_string(),
            "submitted".to_string(),
            "published".to_string(),
        ],
        initial_state: "draft".to_string(),
        transitions: vec![
            Transition::new("submit", "draft", "submitted").scopes(&["submit"]),
            Transition::new("publish", "submitted", "published").check_categories(&["abstract"]),
        ],
    })
    .expect("example workflow is valid")
}

pub(super) fn submission_in(definition: &WorkflowDefinition, state: &str) -> Submission {
    let mut submission = Submission::new(SubmissionId("sub-fixture".to_string()), definition);
    submission.current_state = state.to_string();
    submission
}

pub(super) fn principal(scopes: &[&str]) -> Principal {
    Principal::new("user-42").with_scopes(scopes)
}

pub(super) fn editor() -> Principal {
    principal(&[SUBMIT, EDIT, PUBLISH, WITHDRAW])
}

/// Report built from `(check id, category, status)` triples, one result each.
pub(super) fn report(entries: &[(&str, &str, CheckStatus)]) -> CheckReport {
    let executed = entries
        .iter()
        .map(|(id, category, _)| ExecutedCheck {
            id: id.to_string(),
            category: category.to_string(),
        })
        .collect();
    let compiled = entries
        .iter()
        .map(|(id, category, status)| CompiledCheckResult {
            definition: CheckDefinition::new(*id, *id, "fixture", *category),
            result: CheckResult {
                id: id.to_string(),
                status: *status,
                message: format!("{id} is {status}"),
                help: None,
                position: None,
                category: category.to_string(),
            },
        })
        .collect();
    CheckReport::compile(executed, compiled)
}

pub(super) fn standard_executor() -> Arc<CheckExecutor> {
    let registry = CheckRegistry::standard().expect("standard catalog registers");
    Arc::new(CheckExecutor::new(
        Arc::new(registry),
        ExecutorConfig::default(),
    ))
}

pub(super) fn service() -> ReviewService<InMemorySubmissionRepository> {
    ReviewService::new(
        standard_executor(),
        Arc::new(WorkflowCatalog::standard().expect("standard workflows load")),
        Arc::new(InMemorySubmissionRepository::new()),
    )
    .expect("workflows reference registered checks")
}

/// Manuscript whose title, authors, and abstract categories all pass.
pub(super) fn manuscript() -> ResolvedDocument {
    let mut document = ResolvedDocument {
        frontmatter: Frontmatter {
            title: Some("Checking manuscripts before review".to_string()),
            authors: vec![Author {
                name: "Grace Hopper".to_string(),
                email: Some("grace@example.org".to_string()),
                orcid: Some("0000-0002-1825-0097".to_string()),
                affiliations: vec!["Harvard Computation Lab".to_string()],
                corresponding: true,
            }],
            ..Frontmatter::default()
        },
        body: Node::new(NodeKind::Root),
        ..ResolvedDocument::default()
    };
    document.parts.insert(
        "abstract".to_string(),
        Node::new(NodeKind::Paragraph)
            .with_children(vec![Node::text(vec!["result"; 60].join(" "))]),
    );
    document
}
