use std::path::Path;
use std::sync::Arc;

use review_pipeline::checks::{CheckFilter, CheckRegistry, CheckSelection, RunOptions};
use review_pipeline::error::AppError;
use review_pipeline::workflows::{ReviewServiceError, WorkflowCatalog, WorkflowDefinition};

use crate::cli::{ListChecksArgs, RunChecksArgs};
use crate::infra::{read_document, Pipeline};

pub(crate) fn list_checks(args: ListChecksArgs) -> Result<(), AppError> {
    let registry = CheckRegistry::standard()?;
    let filter = CheckFilter {
        tags: args.tag,
        category: args.category,
    };

    for definition in registry.list(&filter) {
        println!(
            "{:<28} {:<14} {}",
            definition.id, definition.category, definition.title
        );
    }
    Ok(())
}

pub(crate) async fn run_checks(args: RunChecksArgs) -> Result<(), AppError> {
    let document = read_document(&args.document)?;
    let pipeline = Pipeline::from_env()?;
    let selection = CheckSelection {
        ids: args.id,
        tags: args.tag,
        category: args.category,
    };

    let report = pipeline
        .executor
        .run(Arc::new(document), &selection, &RunOptions::new())
        .await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) fn show_workflow(name: &str) -> Result<(), AppError> {
    let catalog = WorkflowCatalog::standard()?;
    let definition = catalog
        .get(name)
        .ok_or_else(|| ReviewServiceError::UnknownWorkflow(name.to_string()))?;
    println!("{}", serde_json::to_string_pretty(definition)?);
    Ok(())
}

pub(crate) fn validate_workflow(path: &Path) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(path)?;
    let definition = WorkflowDefinition::from_json(&raw)?;
    definition.ensure_checks_registered(&CheckRegistry::standard()?)?;

    println!(
        "{} v{}: {} states, {} transitions",
        definition.name(),
        definition.version(),
        definition.states().len(),
        definition.transitions().len()
    );
    println!("  initial: {}", definition.initial_state());
    println!("  terminal: {}", definition.terminal_states().join(", "));
    Ok(())
}
