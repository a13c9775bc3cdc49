use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use review_pipeline::checks::{CheckExecutor, CheckRegistry, ExecutorConfig};
use review_pipeline::config::AppConfig;
use review_pipeline::document::ResolvedDocument;
use review_pipeline::error::AppError;
use review_pipeline::workflows::{InMemorySubmissionRepository, ReviewService, WorkflowCatalog};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type SubmissionService = ReviewService<InMemorySubmissionRepository>;

/// Registry, executor, and review service wired with the built-in catalogs.
pub(crate) struct Pipeline {
    pub(crate) executor: Arc<CheckExecutor>,
    pub(crate) service: Arc<SubmissionService>,
}

impl Pipeline {
    pub(crate) fn standard(config: ExecutorConfig) -> Result<Self, AppError> {
        let registry = Arc::new(CheckRegistry::standard()?);
        let executor = Arc::new(CheckExecutor::new(registry, config));
        let catalog = Arc::new(WorkflowCatalog::standard()?);
        let repository = Arc::new(InMemorySubmissionRepository::new());
        let service = Arc::new(ReviewService::new(
            Arc::clone(&executor),
            catalog,
            repository,
        )?);
        Ok(Self { executor, service })
    }

    /// Standard pipeline sized by the `CHECKS_*` settings of the loaded configuration.
    pub(crate) fn from_env() -> Result<Self, AppError> {
        let config = AppConfig::load()?;
        Self::standard(config.checks)
    }
}

pub(crate) fn read_document(path: &Path) -> Result<ResolvedDocument, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::time::Duration;

    use super::*;

    #[test]
    fn pipeline_from_env_honours_check_settings() {
        env::set_var("CHECKS_CONCURRENCY", "3");
        env::set_var("CHECKS_TIMEOUT_MS", "750");
        let pipeline = Pipeline::from_env();
        env::remove_var("CHECKS_CONCURRENCY");
        env::remove_var("CHECKS_TIMEOUT_MS");

        let config = pipeline.expect("pipeline assembles").executor.config();
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.timeout, Duration::from_millis(750));
    }
}
