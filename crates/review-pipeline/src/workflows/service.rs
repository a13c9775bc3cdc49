use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::catalog::WorkflowCatalog;
use super::definition::WorkflowDefinition;
use super::engine::{AvailableTransition, TransitionError, TransitionOutcome, WorkflowEngine};
use super::repository::{RepositoryError, SubmissionRecord, SubmissionRepository};
use super::scope::{Principal, PrincipalScopes, ScopeChecker};
use super::submission::{Submission, SubmissionId};
use crate::checks::{CheckExecutor, CheckSelection, RegistryError, RunOptions};
use crate::document::ResolvedDocument;

/// Service composing the check executor, workflow catalog, engine, and submission store.
pub struct ReviewService<R, S = PrincipalScopes> {
    executor: Arc<CheckExecutor>,
    catalog: Arc<WorkflowCatalog>,
    engine: WorkflowEngine<S>,
    repository: Arc<R>,
}

static SUBMISSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_submission_id() -> SubmissionId {
    let id = SUBMISSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SubmissionId(format!("sub-{id:06}"))
}

impl<R> ReviewService<R, PrincipalScopes>
where
    R: SubmissionRepository + 'static,
{
    pub fn new(
        executor: Arc<CheckExecutor>,
        catalog: Arc<WorkflowCatalog>,
        repository: Arc<R>,
    ) -> Result<Self, ReviewServiceError> {
        Self::with_engine(executor, catalog, WorkflowEngine::new(), repository)
    }
}

impl<R, S> ReviewService<R, S>
where
    R: SubmissionRepository + 'static,
    S: ScopeChecker + 'static,
{
    /// Fails when a workflow gates on a check id the executor's registry does not know.
    pub fn with_engine(
        executor: Arc<CheckExecutor>,
        catalog: Arc<WorkflowCatalog>,
        engine: WorkflowEngine<S>,
        repository: Arc<R>,
    ) -> Result<Self, ReviewServiceError> {
        catalog.ensure_checks_registered(executor.registry())?;
        Ok(Self {
            executor,
            catalog,
            engine,
            repository,
        })
    }

    pub fn executor(&self) -> &CheckExecutor {
        &self.executor
    }

    pub fn workflows(&self) -> &WorkflowCatalog {
        &self.catalog
    }

    fn workflow(&self, name: &str) -> Result<&WorkflowDefinition, ReviewServiceError> {
        self.catalog
            .get(name)
            .ok_or_else(|| ReviewServiceError::UnknownWorkflow(name.to_string()))
    }

    fn record(&self, id: &SubmissionId) -> Result<SubmissionRecord, ReviewServiceError> {
        Ok(self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    /// Start a submission in the workflow's initial state.
    pub fn create_submission(
        &self,
        workflow: &str,
    ) -> Result<SubmissionRecord, ReviewServiceError> {
        let definition = self.workflow(workflow)?;
        let submission = Submission::new(next_submission_id(), definition);
        let stored = self.repository.insert(SubmissionRecord::new(submission))?;
        info!(
            submission = %stored.submission.id,
            workflow,
            state = %stored.submission.current_state,
            "submission created"
        );
        Ok(stored)
    }

    pub fn submission(&self, id: &SubmissionId) -> Result<SubmissionRecord, ReviewServiceError> {
        self.record(id)
    }

    pub fn submissions(
        &self,
        workflow: Option<&str>,
    ) -> Result<Vec<SubmissionRecord>, ReviewServiceError> {
        Ok(self.repository.list(workflow)?)
    }

    /// Run checks against the submission's document and keep the report as its latest.
    pub async fn run_checks(
        &self,
        id: &SubmissionId,
        document: ResolvedDocument,
        selection: &CheckSelection,
        options: &RunOptions,
    ) -> Result<SubmissionRecord, ReviewServiceError> {
        let mut record = self.record(id)?;
        let expected = record.submission.version;

        let report = self
            .executor
            .run(Arc::new(document), selection, options)
            .await?;
        info!(submission = %id, status = %report.status, "checks recorded");

        record.latest_report = Some(report);
        record.checked_at = Some(Utc::now());
        Ok(self.repository.save(record, expected)?)
    }

    /// Fetch, attempt against the stored latest report, then compare-and-swap the result.
    pub fn transition(
        &self,
        id: &SubmissionId,
        trigger: &str,
        principal: &Principal,
    ) -> Result<(SubmissionRecord, TransitionOutcome), ReviewServiceError> {
        let mut record = self.record(id)?;
        let expected = record.submission.version;
        let definition = self.workflow(&record.submission.workflow)?;

        let outcome = self.engine.attempt_transition(
            definition,
            &mut record.submission,
            trigger,
            principal,
            record.latest_report.as_ref(),
        )?;

        match self.repository.save(record, expected) {
            Ok(stored) => Ok((stored, outcome)),
            Err(RepositoryError::VersionConflict { expected, found }) => {
                warn!(submission = %id, trigger, expected, found, "transition lost race");
                Err(TransitionError::ConcurrentModification {
                    submission: id.clone(),
                    expected,
                    found,
                }
                .into())
            }
            Err(other) => Err(other.into()),
        }
    }

    pub fn available_transitions(
        &self,
        id: &SubmissionId,
        principal: &Principal,
    ) -> Result<Vec<AvailableTransition>, ReviewServiceError> {
        let record = self.record(id)?;
        let definition = self.workflow(&record.submission.workflow)?;
        Ok(self.engine.available_transitions(
            definition,
            &record.submission,
            principal,
            record.latest_report.as_ref(),
        ))
    }
}

/// Error raised by the review service.
#[derive(Debug, thiserror::Error)]
pub enum ReviewServiceError {
    #[error("workflow '{0}' is not registered")]
    UnknownWorkflow(String),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
