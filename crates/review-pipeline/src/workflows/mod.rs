//! Submission review workflows.
//!
//! A workflow is plain data: states, an initial state, and named transitions guarded by scopes and
//! check outcomes. One `WorkflowEngine` interprets every definition. The service layer adds
//! persistence through `SubmissionRepository`, where each save is a compare-and-swap on the
//! submission's version so two racing transitions can never both land.

pub mod catalog;
mod definition;
mod engine;
mod repository;
pub mod router;
mod scope;
mod service;
mod submission;

#[cfg(test)]
mod tests;

pub use catalog::WorkflowCatalog;
pub use definition::{
    InvalidWorkflowReason, Transition, WorkflowDefinition, WorkflowError, WorkflowSpec,
};
pub use engine::{
    AvailableTransition, RequirementKind, TransitionError, TransitionOutcome,
    UnsatisfiedRequirement, WorkflowEngine,
};
pub use repository::{
    InMemorySubmissionRepository, RepositoryError, SubmissionRecord, SubmissionRepository,
};
pub use router::submission_router;
pub use scope::{scopes, Principal, PrincipalScopes, ScopeChecker};
pub use service::{ReviewService, ReviewServiceError};
pub use submission::{Submission, SubmissionId, WorkflowTransitionRecord};
