use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::definition::WorkflowDefinition;
use crate::checks::CheckReportSummary;

/// Identifier wrapper for submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Workflow-facing slice of a submission: where it is and how it got there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub workflow: String,
    pub current_state: String,
    /// Optimistic-concurrency token, advanced by the repository on every save.
    pub version: u64,
    #[serde(default)]
    pub history: Vec<WorkflowTransitionRecord>,
}

impl Submission {
    /// A fresh submission sitting in the workflow's initial state.
    pub fn new(id: SubmissionId, workflow: &WorkflowDefinition) -> Self {
        Self {
            id,
            workflow: workflow.name().to_string(),
            current_state: workflow.initial_state().to_string(),
            version: 0,
            history: Vec::new(),
        }
    }
}

/// Audit entry appended for every applied transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTransitionRecord {
    pub from: String,
    pub to: String,
    pub trigger: String,
    pub at: DateTime<Utc>,
    pub principal: String,
    /// Whether the transition was gated on check outcomes.
    pub checks_required: bool,
    /// Report summary the caller supplied when the transition was applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<CheckReportSummary>,
}
