use std::collections::BTreeMap;

use super::definition::{Transition, WorkflowDefinition, WorkflowError, WorkflowSpec};
use super::scope::scopes::{EDIT, PUBLISH, REVIEW, REVIEW_ASSIGNED, SUBMIT, WITHDRAW};
use crate::checks::builtin::{ABSTRACT, AUTHORS, AVAILABILITY, DOI, TITLE};
use crate::checks::{CheckRegistry, RegistryError};

pub const SIMPLE_PUBLIC: &str = "simple-public";
pub const PRIVATE_SITE: &str = "private-site";
pub const OPEN_REVIEW: &str = "open-review";
pub const CLOSED_REVIEW: &str = "closed-review";

fn states(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Withdrawal edges from each listed state.
fn withdrawals(from: &[&str]) -> Vec<Transition> {
    from.iter()
        .map(|state| {
            Transition::new("withdraw", *state, "withdrawn")
                .titled("Withdraw submission")
                .scopes(&[WITHDRAW])
        })
        .collect()
}

pub fn simple_public() -> WorkflowSpec {
    let mut transitions = vec![
        Transition::new("submit", "draft", "submitted")
            .titled("Submit for publication")
            .scopes(&[SUBMIT])
            .check_categories(&[TITLE, AUTHORS, ABSTRACT]),
        Transition::new("publish", "submitted", "published")
            .titled("Publish")
            .scopes(&[PUBLISH])
            .check_categories(&[ABSTRACT]),
    ];
    transitions.extend(withdrawals(&["draft", "submitted"]));

    WorkflowSpec {
        name: SIMPLE_PUBLIC.to_string(),
        version: 1,
        description: "Authors submit, an editor publishes without peer review.".to_string(),
        states: states(&["draft", "submitted", "published", "withdrawn"]),
        initial_state: "draft".to_string(),
        transitions,
    }
}

pub fn private_site() -> WorkflowSpec {
    let mut transitions = vec![
        Transition::new("submit", "draft", "submitted")
            .titled("Submit to site")
            .scopes(&[SUBMIT])
            .check_categories(&[TITLE, AUTHORS]),
        Transition::new("approve", "submitted", "approved")
            .titled("Approve")
            .scopes(&[PUBLISH])
            .check_categories(&[TITLE, AUTHORS, ABSTRACT]),
        Transition::new("reject", "submitted", "rejected")
            .titled("Reject")
            .scopes(&[EDIT]),
        Transition::new("return", "submitted", "draft")
            .titled("Return to author")
            .scopes(&[EDIT]),
    ];
    transitions.extend(withdrawals(&["draft", "submitted"]));

    WorkflowSpec {
        name: PRIVATE_SITE.to_string(),
        version: 1,
        description: "Site members submit; site editors approve or reject.".to_string(),
        states: states(&["draft", "submitted", "approved", "rejected", "withdrawn"]),
        initial_state: "draft".to_string(),
        transitions,
    }
}

const REVIEW_STATES: &[&str] = &[
    "intake",
    "under-review",
    "revision-requested",
    "resubmitted",
    "accepted",
    "rejected",
    "published",
    "withdrawn",
];

/// Peer-review cycle shared by the open and closed variants.
fn review_cycle(review_scopes: &[&str]) -> Vec<Transition> {
    let mut transitions = vec![
        Transition::new("send-to-review", "intake", "under-review")
            .titled("Send to review")
            .scopes(&[EDIT])
            .check_categories(&[TITLE, AUTHORS, ABSTRACT]),
        Transition::new("request-revision", "under-review", "revision-requested")
            .titled("Request revisions")
            .scopes(review_scopes),
        Transition::new("resubmit", "revision-requested", "resubmitted")
            .titled("Resubmit revised manuscript")
            .scopes(&[SUBMIT])
            .check_categories(&[ABSTRACT]),
        Transition::new("resume-review", "resubmitted", "under-review")
            .titled("Resume review")
            .scopes(&[EDIT]),
        Transition::new("accept", "under-review", "accepted")
            .titled("Accept")
            .scopes(&[EDIT]),
        Transition::new("reject", "under-review", "rejected")
            .titled("Reject")
            .scopes(&[EDIT]),
        Transition::new("publish", "accepted", "published")
            .titled("Publish")
            .scopes(&[PUBLISH])
            .check_categories(&[TITLE, AUTHORS, ABSTRACT, AVAILABILITY, DOI])
            .check_ids(&["links-valid"]),
    ];
    transitions.extend(withdrawals(&[
        "intake",
        "under-review",
        "revision-requested",
        "resubmitted",
        "accepted",
    ]));
    transitions
}

pub fn open_review() -> WorkflowSpec {
    WorkflowSpec {
        name: OPEN_REVIEW.to_string(),
        version: 1,
        description: "Open peer review with revision rounds before acceptance.".to_string(),
        states: states(REVIEW_STATES),
        initial_state: "intake".to_string(),
        transitions: review_cycle(&[REVIEW]),
    }
}

pub fn closed_review() -> WorkflowSpec {
    let mut transitions = vec![Transition::new("desk-reject", "intake", "rejected")
        .titled("Desk reject")
        .scopes(&[EDIT])];
    transitions.extend(review_cycle(&[REVIEW, REVIEW_ASSIGNED]));

    WorkflowSpec {
        name: CLOSED_REVIEW.to_string(),
        version: 1,
        description: "Closed review by assigned reviewers, with desk rejection at intake."
            .to_string(),
        states: states(REVIEW_STATES),
        initial_state: "intake".to_string(),
        transitions,
    }
}

/// Named, validated workflows available to submissions.
#[derive(Debug, Clone, Default)]
pub struct WorkflowCatalog {
    definitions: BTreeMap<String, WorkflowDefinition>,
}

impl WorkflowCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four built-in workflows, loaded through the same validation as user specs.
    pub fn standard() -> Result<Self, WorkflowError> {
        let mut catalog = Self::new();
        for spec in [simple_public(), private_site(), open_review(), closed_review()] {
            catalog.register(WorkflowDefinition::load(spec)?)?;
        }
        Ok(catalog)
    }

    pub fn register(&mut self, definition: WorkflowDefinition) -> Result<(), WorkflowError> {
        if self.definitions.contains_key(definition.name()) {
            return Err(WorkflowError::DuplicateWorkflow(
                definition.name().to_string(),
            ));
        }
        self.definitions
            .insert(definition.name().to_string(), definition);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&WorkflowDefinition> {
        self.definitions.get(name)
    }

    /// Definitions sorted by name.
    pub fn definitions(&self) -> impl Iterator<Item = &WorkflowDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn ensure_checks_registered(&self, registry: &CheckRegistry) -> Result<(), RegistryError> {
        self.definitions
            .values()
            .try_for_each(|definition| definition.ensure_checks_registered(registry))
    }
}
