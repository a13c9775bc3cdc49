use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::checks::{CheckRegistry, RegistryError};

/// Guarded edge between two states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub name: String,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub required_scopes: Vec<String>,
    #[serde(default)]
    pub required_check_categories: Vec<String>,
    #[serde(default)]
    pub required_check_ids: Vec<String>,
}

impl Transition {
    pub fn new(name: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            from: from.into(),
            to: to.into(),
            title: None,
            required_scopes: Vec::new(),
            required_check_categories: Vec::new(),
            required_check_ids: Vec::new(),
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn scopes(mut self, scopes: &[&str]) -> Self {
        self.required_scopes = scopes.iter().map(|scope| scope.to_string()).collect();
        self
    }

    pub fn check_categories(mut self, categories: &[&str]) -> Self {
        self.required_check_categories = categories.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn check_ids(mut self, ids: &[&str]) -> Self {
        self.required_check_ids = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn requires_checks(&self) -> bool {
        !self.required_check_categories.is_empty() || !self.required_check_ids.is_empty()
    }
}

/// Declarative, unvalidated workflow description as read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSpec {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub description: String,
    pub states: Vec<String>,
    pub initial_state: String,
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

fn default_version() -> u32 {
    1
}

/// Why a workflow spec was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidWorkflowReason {
    #[error("workflow declares no states")]
    NoStates,
    #[error("state '{0}' is declared more than once")]
    DuplicateState(String),
    #[error("state names must not be blank")]
    BlankState,
    #[error("initial state '{0}' is not declared")]
    UndeclaredInitialState(String),
    #[error("transition '{transition}' references undeclared state '{state}'")]
    UndeclaredState { transition: String, state: String },
    #[error("transition '{name}' is defined more than once from state '{from}'")]
    AmbiguousTrigger { from: String, name: String },
    #[error("transition names must not be blank")]
    BlankTransitionName,
    #[error("malformed workflow document: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("workflow '{workflow}' is invalid: {reason}")]
    InvalidWorkflow {
        workflow: String,
        reason: InvalidWorkflowReason,
    },
    #[error("workflow '{0}' is already registered")]
    DuplicateWorkflow(String),
}

impl WorkflowError {
    fn invalid(workflow: &str, reason: InvalidWorkflowReason) -> Self {
        Self::InvalidWorkflow {
            workflow: workflow.to_string(),
            reason,
        }
    }
}

/// Validated workflow. Only obtainable through `load`, so every instance is well formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WorkflowSpec")]
pub struct WorkflowDefinition {
    name: String,
    version: u32,
    description: String,
    states: Vec<String>,
    initial_state: String,
    transitions: Vec<Transition>,
}

impl TryFrom<WorkflowSpec> for WorkflowDefinition {
    type Error = WorkflowError;

    fn try_from(spec: WorkflowSpec) -> Result<Self, Self::Error> {
        Self::load(spec)
    }
}

impl WorkflowDefinition {
    /// Validate a spec. Nothing is constructed unless every state and transition checks out.
    pub fn load(spec: WorkflowSpec) -> Result<Self, WorkflowError> {
        let name = spec.name.as_str();
        if spec.states.is_empty() {
            return Err(WorkflowError::invalid(name, InvalidWorkflowReason::NoStates));
        }

        let mut states = HashSet::new();
        for state in &spec.states {
            if state.trim().is_empty() {
                return Err(WorkflowError::invalid(name, InvalidWorkflowReason::BlankState));
            }
            if !states.insert(state.as_str()) {
                return Err(WorkflowError::invalid(
                    name,
                    InvalidWorkflowReason::DuplicateState(state.clone()),
                ));
            }
        }

        if !states.contains(spec.initial_state.as_str()) {
            return Err(WorkflowError::invalid(
                name,
                InvalidWorkflowReason::UndeclaredInitialState(spec.initial_state.clone()),
            ));
        }

        let mut triggers = HashSet::new();
        for transition in &spec.transitions {
            if transition.name.trim().is_empty() {
                return Err(WorkflowError::invalid(
                    name,
                    InvalidWorkflowReason::BlankTransitionName,
                ));
            }
            for state in [&transition.from, &transition.to] {
                if !states.contains(state.as_str()) {
                    return Err(WorkflowError::invalid(
                        name,
                        InvalidWorkflowReason::UndeclaredState {
                            transition: transition.name.clone(),
                            state: state.clone(),
                        },
                    ));
                }
            }
            if !triggers.insert((transition.from.as_str(), transition.name.as_str())) {
                return Err(WorkflowError::invalid(
                    name,
                    InvalidWorkflowReason::AmbiguousTrigger {
                        from: transition.from.clone(),
                        name: transition.name.clone(),
                    },
                ));
            }
        }

        Ok(Self {
            name: spec.name,
            version: spec.version,
            description: spec.description,
            states: spec.states,
            initial_state: spec.initial_state,
            transitions: spec.transitions,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, WorkflowError> {
        let spec: WorkflowSpec = serde_json::from_str(raw).map_err(|err| {
            let reason = InvalidWorkflowReason::Malformed(err.to_string());
            WorkflowError::invalid("<unnamed>", reason)
        })?;
        Self::load(spec)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.states.iter().any(|candidate| candidate == state)
    }

    pub fn transitions_from(&self, state: &str) -> Vec<&Transition> {
        self.transitions
            .iter()
            .filter(|transition| transition.from == state)
            .collect()
    }

    pub fn transition(&self, from: &str, trigger: &str) -> Option<&Transition> {
        self.transitions
            .iter()
            .find(|transition| transition.from == from && transition.name == trigger)
    }

    /// States without outgoing transitions.
    pub fn is_terminal(&self, state: &str) -> bool {
        self.has_state(state) && self.transitions_from(state).is_empty()
    }

    pub fn terminal_states(&self) -> Vec<&str> {
        self.states
            .iter()
            .map(String::as_str)
            .filter(|state| self.is_terminal(state))
            .collect()
    }

    /// Every check id and category a transition gates on must be known to the registry.
    /// Ids are checked across all transitions before categories.
    pub fn ensure_checks_registered(&self, registry: &CheckRegistry) -> Result<(), RegistryError> {
        for transition in &self.transitions {
            for id in &transition.required_check_ids {
                registry.get(id)?;
            }
        }

        let categories = registry.categories();
        for transition in &self.transitions {
            if let Some(unknown) = transition
                .required_check_categories
                .iter()
                .find(|category| !categories.contains(category.as_str()))
            {
                return Err(RegistryError::CategoryNotFound(unknown.clone()));
            }
        }
        Ok(())
    }
}
