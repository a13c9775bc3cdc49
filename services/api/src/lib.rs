mod cli;
mod commands;
mod demo;
mod infra;
mod routes;
mod server;

use review_pipeline::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
