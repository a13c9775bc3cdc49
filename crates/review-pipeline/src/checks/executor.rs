use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::definition::{Check, CheckDefinition, CheckFailure, CheckResult};
use super::options::{resolve_options, CheckOptions};
use super::registry::{CheckFilter, CheckRegistry, RegistryError};
use super::report::{CheckReport, CompiledCheckResult, ExecutedCheck};
use crate::document::ResolvedDocument;

const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Worker pool sizing and per-check deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub concurrency: usize,
    pub timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout: DEFAULT_CHECK_TIMEOUT,
        }
    }
}

pub(crate) fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|cores| cores.get())
        .unwrap_or(1)
}

/// Which checks to run. Explicit ids come first, in the order given, followed by every
/// registered check matching the tag/category filter. An empty selection runs everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSelection {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl CheckSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.tags.is_empty() && self.category.is_none()
    }

    fn filter(&self) -> CheckFilter {
        CheckFilter {
            tags: self.tags.clone(),
            category: self.category.clone(),
        }
    }
}

/// Caller-supplied option values keyed by check id.
pub type RunOptions = BTreeMap<String, Map<String, Value>>;

/// Runs selected checks against a document and compiles the report.
#[derive(Debug, Clone)]
pub struct CheckExecutor {
    registry: Arc<CheckRegistry>,
    config: ExecutorConfig,
    permits: Arc<Semaphore>,
}

impl CheckExecutor {
    pub fn new(registry: Arc<CheckRegistry>, config: ExecutorConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.concurrency.max(1)));
        Self {
            registry,
            config,
            permits,
        }
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    pub fn config(&self) -> ExecutorConfig {
        self.config
    }

    /// Resolve a selection to a concrete, de-duplicated list of definitions.
    pub fn resolve(
        &self,
        selection: &CheckSelection,
    ) -> Result<Vec<&CheckDefinition>, RegistryError> {
        Ok(self
            .resolve_checks(selection)?
            .into_iter()
            .map(|check| &check.definition)
            .collect())
    }

    fn resolve_checks(&self, selection: &CheckSelection) -> Result<Vec<&Check>, RegistryError> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();

        for id in &selection.ids {
            let check = self.registry.check(id)?;
            if seen.insert(check.definition.id.as_str()) {
                resolved.push(check);
            }
        }

        let filter = selection.filter();
        if selection.ids.is_empty() || !filter.is_empty() {
            for check in self.registry.checks() {
                if filter.matches(&check.definition) && seen.insert(check.definition.id.as_str()) {
                    resolved.push(check);
                }
            }
        }

        Ok(resolved)
    }

    /// Run every selected check and compile the report.
    ///
    /// Fails only when the selection (or the options map) names an unregistered check; any
    /// failure inside a check becomes an `error` result for that check.
    pub async fn run(
        &self,
        document: Arc<ResolvedDocument>,
        selection: &CheckSelection,
        options: &RunOptions,
    ) -> Result<CheckReport, RegistryError> {
        for id in options.keys() {
            self.registry.check(id)?;
        }

        let checks: Vec<Check> = self
            .resolve_checks(selection)?
            .into_iter()
            .cloned()
            .collect();
        info!(checks = checks.len(), "running document checks");

        let mut pending = Vec::with_capacity(checks.len());
        for check in checks {
            let resolved = resolve_options(&check.definition, options.get(&check.definition.id));
            let definition = check.definition.clone();
            let handle = tokio::spawn(execute(
                check,
                Arc::clone(&document),
                resolved,
                Arc::clone(&self.permits),
                self.config.timeout,
            ));
            pending.push((definition, handle));
        }

        let executed = pending
            .iter()
            .map(|(definition, _)| ExecutedCheck::from(definition))
            .collect();
        let mut compiled = Vec::new();
        for (definition, handle) in pending {
            let results = match handle.await {
                Ok(results) => results,
                Err(err) => vec![CheckResult::error(&definition, join_failure(&err))],
            };
            compiled.extend(results.into_iter().map(|result| CompiledCheckResult {
                definition: definition.clone(),
                result,
            }));
        }

        let report = CheckReport::compile(executed, compiled);
        debug!(status = %report.status, "check report compiled");
        Ok(report)
    }
}

async fn execute(
    check: Check,
    document: Arc<ResolvedDocument>,
    options: Result<CheckOptions, CheckFailure>,
    permits: Arc<Semaphore>,
    limit: Duration,
) -> Vec<CheckResult> {
    let Check {
        definition,
        validator,
    } = check;

    let options = match options {
        Ok(options) => options,
        Err(failure) => {
            warn!(check = %definition.id, error = %failure, "check options rejected");
            return vec![CheckResult::error(&definition, failure.to_string())];
        }
    };

    // Waiting for a worker counts against the same deadline as the work itself.
    let deadline = Instant::now() + limit;
    let permit = match tokio::time::timeout_at(deadline, permits.acquire_owned()).await {
        Ok(Ok(permit)) => permit,
        Ok(Err(_)) => return vec![CheckResult::error(&definition, "check executor is closed")],
        Err(_) => {
            warn!(
                check = %definition.id,
                timeout_ms = limit.as_millis() as u64,
                "no worker freed up before the check deadline"
            );
            return vec![CheckResult::error(
                &definition,
                "check timed out waiting for a worker",
            )];
        }
    };

    // The permit travels with the blocking task so a check that outlives its deadline still
    // occupies a worker slot until it actually returns.
    let task = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        validator.validate(&document, &options)
    });

    match tokio::time::timeout_at(deadline, task).await {
        Ok(Ok(Ok(raw))) => {
            debug!(check = %definition.id, results = raw.len(), "check completed");
            raw.into_iter()
                .map(|result| CheckResult::from_raw(&definition, result))
                .collect()
        }
        Ok(Ok(Err(failure))) => {
            warn!(check = %definition.id, error = %failure, "check raised an error");
            vec![CheckResult::error(&definition, failure.to_string())]
        }
        Ok(Err(err)) => {
            let message = join_failure(&err);
            warn!(check = %definition.id, error = %message, "check aborted");
            vec![CheckResult::error(&definition, message)]
        }
        Err(_) => {
            warn!(
                check = %definition.id,
                timeout_ms = limit.as_millis() as u64,
                "check timed out"
            );
            vec![CheckResult::error(&definition, "check timed out")]
        }
    }
}

fn join_failure(err: &JoinError) -> String {
    if !err.is_panic() {
        return "check was cancelled".to_string();
    }
    format!("check panicked: {err}")
}
