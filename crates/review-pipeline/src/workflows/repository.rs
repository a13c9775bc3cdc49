use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::submission::{Submission, SubmissionId};
use crate::checks::CheckReport;

/// Stored submission plus the most recent check report run against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub submission: Submission,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_report: Option<CheckReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
}

impl SubmissionRecord {
    pub fn new(submission: Submission) -> Self {
        Self {
            submission,
            latest_report: None,
            checked_at: None,
        }
    }

    pub fn id(&self) -> &SubmissionId {
        &self.submission.id
    }
}

/// Storage abstraction so the service can be exercised without a database.
pub trait SubmissionRepository: Send + Sync {
    fn insert(&self, record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError>;
    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError>;
    /// Persist `record` only if the stored version still equals `expected_version`; the stored
    /// copy (with its advanced version) is returned.
    fn save(
        &self,
        record: SubmissionRecord,
        expected_version: u64,
    ) -> Result<SubmissionRecord, RepositoryError>;
    fn list(&self, workflow: Option<&str>) -> Result<Vec<SubmissionRecord>, RepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record was modified concurrently (expected version {expected}, found {found})")]
    VersionConflict { expected: u64, found: u64 },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Mutex-guarded map; good enough for tests, demos, and single-node deployments.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubmissionRepository {
    records: Arc<Mutex<HashMap<SubmissionId, SubmissionRecord>>>,
}

impl InMemorySubmissionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<SubmissionId, SubmissionRecord>>, RepositoryError>
    {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("submission store poisoned".to_string()))
    }
}

impl SubmissionRepository for InMemorySubmissionRepository {
    fn insert(&self, record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(record.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id().clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.get(id).cloned())
    }

    fn save(
        &self,
        mut record: SubmissionRecord,
        expected_version: u64,
    ) -> Result<SubmissionRecord, RepositoryError> {
        let mut guard = self.lock()?;
        let stored = guard
            .get_mut(record.id())
            .ok_or(RepositoryError::NotFound)?;
        if stored.submission.version != expected_version {
            return Err(RepositoryError::VersionConflict {
                expected: expected_version,
                found: stored.submission.version,
            });
        }

        record.submission.version = expected_version + 1;
        *stored = record.clone();
        Ok(record)
    }

    fn list(&self, workflow: Option<&str>) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        let guard = self.lock()?;
        let mut records: Vec<SubmissionRecord> = guard
            .values()
            .filter(|record| workflow.map_or(true, |name| record.submission.workflow == name))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.submission.id.cmp(&b.submission.id));
        Ok(records)
    }
}
