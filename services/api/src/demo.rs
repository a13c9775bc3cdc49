use clap::Args;
use review_pipeline::checks::{CheckSelection, RunOptions};
use review_pipeline::document::{Author, Frontmatter, Node, NodeKind, ResolvedDocument};
use review_pipeline::error::AppError;
use review_pipeline::workflows::catalog::SIMPLE_PUBLIC;
use review_pipeline::workflows::scopes::{PUBLISH, SUBMIT};
use review_pipeline::workflows::{Principal, SubmissionId};

use crate::infra::{Pipeline, SubmissionService};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Leave the abstract out so the submission gate refuses the manuscript
    #[arg(long)]
    pub(crate) without_abstract: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let pipeline = Pipeline::from_env()?;
    let service = pipeline.service;
    let author = Principal::new("author-1").with_scopes(&[SUBMIT]);
    let editor = Principal::new("editor-1").with_scopes(&[PUBLISH]);

    println!("Submission review demo ({SIMPLE_PUBLIC})");
    let created = service.create_submission(SIMPLE_PUBLIC)?;
    let id = created.submission.id.clone();
    println!(
        "  Created {} in state '{}'",
        id, created.submission.current_state
    );

    attempt(&service, &id, "submit", &author);

    let document = sample_manuscript(!args.without_abstract);
    let checked = service
        .run_checks(&id, document, &CheckSelection::all(), &RunOptions::new())
        .await?;
    if let Some(report) = &checked.latest_report {
        let counts = report.counts();
        println!(
            "\nChecks: {} ({} pass, {} fail, {} error)",
            report.status, counts.pass, counts.fail, counts.error
        );
        for category in &report.results {
            println!("  {:<14} {}", category.category, category.status);
        }
    }

    println!();
    if attempt(&service, &id, "submit", &author) {
        attempt(&service, &id, "publish", &editor);
    }

    let record = service.submission(&id)?;
    println!(
        "\nFinal state: '{}' (version {})",
        record.submission.current_state, record.submission.version
    );
    for entry in &record.submission.history {
        println!(
            "  {} {} -> {} by {} at {}",
            entry.trigger,
            entry.from,
            entry.to,
            entry.principal,
            entry.at.to_rfc3339()
        );
    }
    Ok(())
}

fn attempt(
    service: &SubmissionService,
    id: &SubmissionId,
    trigger: &str,
    principal: &Principal,
) -> bool {
    match service.transition(id, trigger, principal) {
        Ok((_, outcome)) => {
            println!("  {trigger}: moved to '{}'", outcome.state);
            true
        }
        Err(err) => {
            println!("  {trigger}: refused, {err}");
            false
        }
    }
}

fn paragraph(text: &str) -> Node {
    Node::new(NodeKind::Paragraph).with_children(vec![Node::text(text)])
}

fn sample_manuscript(with_abstract: bool) -> ResolvedDocument {
    let mut document = ResolvedDocument {
        frontmatter: Frontmatter {
            title: Some("Gating publication on automated manuscript checks".to_string()),
            authors: vec![Author {
                name: "Rosalind Franklin".to_string(),
                email: Some("r.franklin@example.org".to_string()),
                orcid: Some("0000-0002-1825-0097".to_string()),
                affiliations: vec!["King's College London".to_string()],
                corresponding: true,
            }],
            keywords: vec!["peer review".to_string(), "automation".to_string()],
            doi: Some("10.5281/zenodo.7654321".to_string()),
            ..Frontmatter::default()
        },
        body: Node::new(NodeKind::Root).with_children(vec![
            paragraph("We describe a pipeline that checks manuscripts before review."),
            Node {
                kind: NodeKind::Link,
                url: Some("https://example.org/pipeline".to_string()),
                ..Node::default()
            },
        ]),
        ..ResolvedDocument::default()
    };
    if with_abstract {
        let text = "Manuscripts are checked for structure and metadata before editors see them. "
            .repeat(6);
        document
            .parts
            .insert("abstract".to_string(), paragraph(text.trim()));
    }
    document
}
