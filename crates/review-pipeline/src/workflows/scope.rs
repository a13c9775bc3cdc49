use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Capability strings used by the built-in workflows.
pub mod scopes {
    pub const SUBMIT: &str = "submission:submit";
    pub const EDIT: &str = "submission:edit";
    pub const REVIEW: &str = "submission:review";
    pub const REVIEW_ASSIGNED: &str = "submission:review:assigned";
    pub const PUBLISH: &str = "submission:publish";
    pub const WITHDRAW: &str = "submission:withdraw";
}

/// Acting user or service account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    #[serde(default)]
    pub scopes: BTreeSet<String>,
}

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scopes: BTreeSet::new(),
        }
    }

    pub fn with_scopes(mut self, scopes: &[&str]) -> Self {
        self.scopes.extend(scopes.iter().map(|scope| scope.to_string()));
        self
    }
}

/// Permission predicate supplied by the surrounding auth system.
pub trait ScopeChecker: Send + Sync {
    fn has_scope(&self, principal: &Principal, scope: &str, resource_id: &str) -> bool;
}

/// Trusts the scopes carried on the principal itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrincipalScopes;

impl ScopeChecker for PrincipalScopes {
    fn has_scope(&self, principal: &Principal, scope: &str, _resource_id: &str) -> bool {
        principal.scopes.contains(scope)
    }
}
