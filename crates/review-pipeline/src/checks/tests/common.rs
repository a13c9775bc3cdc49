use std::sync::Arc;
use std::time::Duration;

use crate::checks::{
    Check, CheckDefinition, CheckExecutor, CheckFailure, CheckOptions, CheckRegistry,
    ExecutorConfig, RawCheckResult,
};
use crate::document::{Author, Frontmatter, Node, NodeKind, ResolvedDocument};

type Outcome = Result<Vec<RawCheckResult>, CheckFailure>;

pub(super) fn definition(id: &str, category: &str) -> CheckDefinition {
    CheckDefinition::new(id, format!("{id} title"), format!("{id} purpose"), category)
}

fn always_pass(_document: &ResolvedDocument, _options: &CheckOptions) -> Outcome {
    Ok(vec![RawCheckResult::pass("ok")])
}

fn always_fail(_document: &ResolvedDocument, _options: &CheckOptions) -> Outcome {
    Ok(vec![RawCheckResult::fail("not ok")])
}

fn raises(_document: &ResolvedDocument, _options: &CheckOptions) -> Outcome {
    Err(CheckFailure::message("lookup table unavailable"))
}

fn panics(_document: &ResolvedDocument, _options: &CheckOptions) -> Outcome {
    panic!("validator exploded")
}

fn sleeps(_document: &ResolvedDocument, _options: &CheckOptions) -> Outcome {
    std::thread::sleep(Duration::from_millis(500));
    Ok(vec![RawCheckResult::pass("eventually")])
}

fn hangs(_document: &ResolvedDocument, _options: &CheckOptions) -> Outcome {
    std::thread::sleep(Duration::from_secs(2));
    Ok(vec![RawCheckResult::pass("far too late")])
}

fn finds_nothing(_document: &ResolvedDocument, _options: &CheckOptions) -> Outcome {
    Ok(Vec::new())
}

fn per_paragraph(document: &ResolvedDocument, _options: &CheckOptions) -> Outcome {
    Ok(document
        .body
        .find_all(NodeKind::Paragraph)
        .into_iter()
        .map(|_| RawCheckResult::pass("paragraph seen"))
        .collect())
}

pub(super) fn passing(id: &str, category: &str) -> Check {
    Check::new(definition(id, category), always_pass)
}

pub(super) fn failing(id: &str, category: &str) -> Check {
    Check::new(definition(id, category), always_fail)
}

pub(super) fn raising(id: &str, category: &str) -> Check {
    Check::new(definition(id, category), raises)
}

pub(super) fn panicking(id: &str, category: &str) -> Check {
    Check::new(definition(id, category), panics)
}

pub(super) fn slow(id: &str, category: &str) -> Check {
    Check::new(definition(id, category), sleeps)
}

pub(super) fn hanging(id: &str, category: &str) -> Check {
    Check::new(definition(id, category), hangs)
}

pub(super) fn silent(id: &str, category: &str) -> Check {
    Check::new(definition(id, category), finds_nothing)
}

pub(super) fn paragraph_counter(id: &str, category: &str) -> Check {
    Check::new(definition(id, category), per_paragraph)
}

pub(super) fn registry_with(checks: Vec<Check>) -> Arc<CheckRegistry> {
    let mut registry = CheckRegistry::new();
    registry.register(checks).expect("unique ids");
    Arc::new(registry)
}

pub(super) fn executor_with(checks: Vec<Check>) -> CheckExecutor {
    CheckExecutor::new(
        registry_with(checks),
        ExecutorConfig {
            concurrency: 4,
            timeout: Duration::from_secs(5),
        },
    )
}

pub(super) fn standard_executor() -> CheckExecutor {
    CheckExecutor::new(
        Arc::new(CheckRegistry::standard().expect("standard catalog registers")),
        ExecutorConfig::default(),
    )
}

fn paragraph(text: &str) -> Node {
    Node::new(NodeKind::Paragraph).with_children(vec![Node::text(text)])
}

/// Manuscript satisfying every built-in check.
pub(super) fn complete_document() -> ResolvedDocument {
    let abstract_text = vec!["finding"; 80].join(" ");
    let mut document = ResolvedDocument {
        frontmatter: Frontmatter {
            title: Some("Reproducible review pipelines".to_string()),
            subtitle: None,
            authors: vec![Author {
                name: "Ada Lovelace".to_string(),
                email: Some("ada@example.org".to_string()),
                orcid: Some("0000-0002-1825-0097".to_string()),
                affiliations: vec!["Analytical Engine Society".to_string()],
                corresponding: true,
            }],
            keywords: vec!["review".to_string(), "workflow".to_string()],
            doi: Some("10.5281/zenodo.1234567".to_string()),
            license: Some("CC-BY-4.0".to_string()),
        },
        body: Node::new(NodeKind::Root).with_children(vec![
            paragraph("Introduction text."),
            Node {
                kind: NodeKind::Link,
                url: Some("https://example.org/data".to_string()),
                ..Node::default()
            },
            Node {
                kind: NodeKind::Math,
                value: Some("e = mc^2".to_string()),
                ..Node::default()
            },
            Node {
                kind: NodeKind::Figure,
                label: Some("fig-1".to_string()),
                ..Node::default()
            }
            .with_children(vec![Node::new(NodeKind::Caption)
                .with_children(vec![Node::text("Pipeline overview")])]),
        ]),
        ..ResolvedDocument::default()
    };
    document.parts.insert(
        "abstract".to_string(),
        Node::new(NodeKind::Root).with_children(vec![Node::text(abstract_text)]),
    );
    document.parts.insert(
        "data_availability".to_string(),
        paragraph("Data are deposited on Zenodo."),
    );
    document.parts.insert(
        "code_availability".to_string(),
        paragraph("Code is available on GitHub."),
    );
    document
}

pub(super) fn two_paragraph_document() -> ResolvedDocument {
    ResolvedDocument {
        body: Node::new(NodeKind::Root)
            .with_children(vec![paragraph("first"), paragraph("second")]),
        ..ResolvedDocument::default()
    }
}
