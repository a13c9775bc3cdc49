use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::definition::{Transition, WorkflowDefinition};
use super::scope::{Principal, PrincipalScopes, ScopeChecker};
use super::submission::{Submission, SubmissionId, WorkflowTransitionRecord};
use crate::checks::{CheckReport, CheckStatus};

/// Check requirement that blocked a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsatisfiedRequirement {
    pub kind: RequirementKind,
    pub name: String,
    /// Rolled-up status found in the report; `None` when the report lacks it or was not supplied.
    pub status: Option<CheckStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    Category,
    Check,
}

impl std::fmt::Display for UnsatisfiedRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            RequirementKind::Category => "category",
            RequirementKind::Check => "check",
        };
        match self.status {
            Some(status) => write!(f, "{kind} '{}' is {status}", self.name),
            None => write!(f, "{kind} '{}' was not run", self.name),
        }
    }
}

fn describe(requirements: &[UnsatisfiedRequirement]) -> String {
    requirements
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reasons a transition attempt is refused. None of them modify the submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("no transition '{trigger}' from state '{state}'")]
    UnknownTransition { state: String, trigger: String },
    #[error("transition '{trigger}' requires scopes: {}", .missing_scopes.join(", "))]
    Forbidden {
        trigger: String,
        missing_scopes: Vec<String>,
    },
    #[error("transition '{trigger}' blocked by checks: {}", describe(.unsatisfied))]
    ChecksNotSatisfied {
        trigger: String,
        unsatisfied: Vec<UnsatisfiedRequirement>,
    },
    #[error(
        "submission {submission} was modified concurrently (expected version {expected}, found {found})"
    )]
    ConcurrentModification {
        submission: SubmissionId,
        expected: u64,
        found: u64,
    },
    #[error("submission follows workflow '{found}', not '{expected}'")]
    WorkflowMismatch { expected: String, found: String },
}

/// Result of an applied transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub state: String,
    pub record: WorkflowTransitionRecord,
}

/// Outgoing transition annotated with whether it could be taken right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableTransition {
    pub transition: Transition,
    pub admissible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<String>,
}

/// Interprets any `WorkflowDefinition`; holds no per-submission state.
#[derive(Debug, Clone, Default)]
pub struct WorkflowEngine<S = PrincipalScopes> {
    scopes: S,
}

impl WorkflowEngine<PrincipalScopes> {
    pub fn new() -> Self {
        Self::with_scopes(PrincipalScopes)
    }
}

impl<S> WorkflowEngine<S>
where
    S: ScopeChecker,
{
    pub fn with_scopes(scopes: S) -> Self {
        Self { scopes }
    }

    /// Resolve `trigger` from the submission's current state and run both guards.
    pub fn admit<'d>(
        &self,
        definition: &'d WorkflowDefinition,
        submission: &Submission,
        trigger: &str,
        principal: &Principal,
        report: Option<&CheckReport>,
    ) -> Result<&'d Transition, TransitionError> {
        if submission.workflow != definition.name() {
            return Err(TransitionError::WorkflowMismatch {
                expected: definition.name().to_string(),
                found: submission.workflow.clone(),
            });
        }

        let transition = definition
            .transition(&submission.current_state, trigger)
            .ok_or_else(|| TransitionError::UnknownTransition {
                state: submission.current_state.clone(),
                trigger: trigger.to_string(),
            })?;

        self.check_scopes(transition, &submission.id, principal)?;
        check_requirements(transition, report)?;

        Ok(transition)
    }

    /// Apply `trigger` to `submission`. On any error the submission is left untouched.
    pub fn attempt_transition(
        &self,
        definition: &WorkflowDefinition,
        submission: &mut Submission,
        trigger: &str,
        principal: &Principal,
        report: Option<&CheckReport>,
    ) -> Result<TransitionOutcome, TransitionError> {
        let transition = match self.admit(definition, submission, trigger, principal, report) {
            Ok(transition) => transition,
            Err(error) => {
                debug!(
                    submission = %submission.id,
                    state = %submission.current_state,
                    trigger,
                    %error,
                    "transition refused"
                );
                return Err(error);
            }
        };

        let record = WorkflowTransitionRecord {
            from: transition.from.clone(),
            to: transition.to.clone(),
            trigger: transition.name.clone(),
            at: Utc::now(),
            principal: principal.id.clone(),
            checks_required: transition.requires_checks(),
            report: report.map(CheckReport::summary),
        };

        submission.current_state = transition.to.clone();
        submission.history.push(record.clone());

        info!(
            submission = %submission.id,
            from = %record.from,
            to = %record.to,
            trigger,
            principal = %principal.id,
            "transition applied"
        );

        Ok(TransitionOutcome {
            state: submission.current_state.clone(),
            record,
        })
    }

    /// Every outgoing transition from the current state with its admissibility.
    pub fn available_transitions(
        &self,
        definition: &WorkflowDefinition,
        submission: &Submission,
        principal: &Principal,
        report: Option<&CheckReport>,
    ) -> Vec<AvailableTransition> {
        definition
            .transitions_from(&submission.current_state)
            .into_iter()
            .map(|transition| {
                let verdict = self
                    .check_scopes(transition, &submission.id, principal)
                    .and_then(|()| check_requirements(transition, report));
                AvailableTransition {
                    transition: transition.clone(),
                    admissible: verdict.is_ok(),
                    blocked_by: verdict.err().map(|error| error.to_string()),
                }
            })
            .collect()
    }

    fn check_scopes(
        &self,
        transition: &Transition,
        submission: &SubmissionId,
        principal: &Principal,
    ) -> Result<(), TransitionError> {
        let missing_scopes: Vec<String> = transition
            .required_scopes
            .iter()
            .filter(|scope| !self.scopes.has_scope(principal, scope, &submission.0))
            .cloned()
            .collect();

        if missing_scopes.is_empty() {
            Ok(())
        } else {
            Err(TransitionError::Forbidden {
                trigger: transition.name.clone(),
                missing_scopes,
            })
        }
    }
}

fn check_requirements(
    transition: &Transition,
    report: Option<&CheckReport>,
) -> Result<(), TransitionError> {
    if !transition.requires_checks() {
        return Ok(());
    }

    let categories = transition
        .required_check_categories
        .iter()
        .map(|name| {
            (
                RequirementKind::Category,
                name,
                report.and_then(|report| report.category_status(name)),
            )
        });
    let checks = transition.required_check_ids.iter().map(|name| {
        (
            RequirementKind::Check,
            name,
            report.and_then(|report| report.check_status(name)),
        )
    });

    let unsatisfied: Vec<UnsatisfiedRequirement> = categories
        .chain(checks)
        .filter(|(_, _, status)| *status != Some(CheckStatus::Pass))
        .map(|(kind, name, status)| UnsatisfiedRequirement {
            kind,
            name: name.clone(),
            status,
        })
        .collect();

    if unsatisfied.is_empty() {
        Ok(())
    } else {
        Err(TransitionError::ChecksNotSatisfied {
            trigger: transition.name.clone(),
            unsatisfied,
        })
    }
}
