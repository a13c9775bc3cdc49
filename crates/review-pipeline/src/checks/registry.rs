use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Deserialize;

use super::definition::{Check, CheckDefinition};

/// Registry construction and lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("check id '{0}' is already registered")]
    DuplicateCheckId(String),
    #[error("check '{0}' is not registered")]
    CheckNotFound(String),
    #[error("no registered check belongs to category '{0}'")]
    CategoryNotFound(String),
}

/// Classification filter for `CheckRegistry::list`.
///
/// Tags match when a definition carries any of them; when both tags and a category are given a
/// definition must satisfy both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CheckFilter {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl CheckFilter {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.category.is_none()
    }

    pub fn matches(&self, definition: &CheckDefinition) -> bool {
        let tag_match =
            self.tags.is_empty() || self.tags.iter().any(|tag| definition.has_tag(tag));
        let category_match = self
            .category
            .as_deref()
            .map(|category| definition.category == category)
            .unwrap_or(true);
        tag_match && category_match
    }
}

/// Closed catalog of checks, populated during start-up and shared read-only afterwards.
///
/// Registration needs `&mut self`; once the registry is wrapped in an `Arc` it can only be read.
#[derive(Debug, Default, Clone)]
pub struct CheckRegistry {
    checks: Vec<Check>,
    index: HashMap<String, usize>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in manuscript checks.
    pub fn standard() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(super::builtin::standard_checks())?;
        Ok(registry)
    }

    /// Append checks. Either every check is added or, on a duplicate id, none are.
    pub fn register<I>(&mut self, checks: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Check>,
    {
        let checks: Vec<Check> = checks.into_iter().collect();

        let mut batch = HashSet::new();
        for check in &checks {
            let id = &check.definition.id;
            if self.index.contains_key(id) || !batch.insert(id.clone()) {
                return Err(RegistryError::DuplicateCheckId(id.clone()));
            }
        }

        for check in checks {
            self.index
                .insert(check.definition.id.clone(), self.checks.len());
            self.checks.push(check);
        }

        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&CheckDefinition, RegistryError> {
        self.check(id).map(|check| &check.definition)
    }

    pub(crate) fn check(&self, id: &str) -> Result<&Check, RegistryError> {
        self.index
            .get(id)
            .map(|position| &self.checks[*position])
            .ok_or_else(|| RegistryError::CheckNotFound(id.to_string()))
    }

    /// Definitions matching `filter`, in registration order.
    pub fn list(&self, filter: &CheckFilter) -> Vec<&CheckDefinition> {
        self.checks
            .iter()
            .map(|check| &check.definition)
            .filter(|definition| filter.matches(definition))
            .collect()
    }

    pub(crate) fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub fn categories(&self) -> BTreeSet<&str> {
        self.checks
            .iter()
            .map(|check| check.definition.category.as_str())
            .collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}
