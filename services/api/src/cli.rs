use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use review_pipeline::error::AppError;

use crate::commands;
use crate::demo::{run_demo, DemoArgs};
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "review-pipeline",
    about = "Run document checks and drive submissions through review workflows",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect the check catalog or run checks against a document
    Checks {
        #[command(subcommand)]
        command: ChecksCommand,
    },
    /// Inspect or validate workflow definitions
    Workflow {
        #[command(subcommand)]
        command: WorkflowCommand,
    },
    /// Walk a sample manuscript through a workflow end to end
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ChecksCommand {
    /// List registered checks
    List(ListChecksArgs),
    /// Run checks against a resolved document (JSON) and print the report
    Run(RunChecksArgs),
}

#[derive(Subcommand, Debug)]
enum WorkflowCommand {
    /// Print a built-in workflow as JSON
    Show { name: String },
    /// Validate a workflow spec file against the check catalog
    Validate { path: PathBuf },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ListChecksArgs {
    /// Only checks carrying this tag (repeatable)
    #[arg(long)]
    pub(crate) tag: Vec<String>,
    #[arg(long)]
    pub(crate) category: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct RunChecksArgs {
    /// Path to a resolved document in JSON form
    #[arg(long)]
    pub(crate) document: PathBuf,
    /// Check id to run (repeatable); all checks run when no selector is given
    #[arg(long)]
    pub(crate) id: Vec<String>,
    #[arg(long)]
    pub(crate) tag: Vec<String>,
    #[arg(long)]
    pub(crate) category: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Checks {
            command: ChecksCommand::List(args),
        } => commands::list_checks(args),
        Command::Checks {
            command: ChecksCommand::Run(args),
        } => commands::run_checks(args).await,
        Command::Workflow {
            command: WorkflowCommand::Show { name },
        } => commands::show_workflow(&name),
        Command::Workflow {
            command: WorkflowCommand::Validate { path },
        } => commands::validate_workflow(&path),
        Command::Demo(args) => run_demo(args).await,
    }
}
