use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::options::{CheckOptionDefinition, CheckOptions};
use crate::document::{ResolvedDocument, SourcePosition};

/// Catalog entry describing a single validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckDefinition {
    pub id: String,
    pub title: String,
    pub purpose: String,
    pub category: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CheckOptionDefinition>,
}

impl CheckDefinition {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        purpose: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            purpose: purpose.into(),
            category: category.into(),
            tags: BTreeSet::new(),
            options: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_option(mut self, option: CheckOptionDefinition) -> Self {
        self.options.push(option);
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Outcome of a single check result. Ordered by severity so roll-ups can take the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Fail,
    Error,
}

impl CheckStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Error => "error",
        }
    }

    /// Worst status wins; an empty input rolls up to `Pass`.
    pub fn rollup<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = CheckStatus>,
    {
        statuses.into_iter().max().unwrap_or(CheckStatus::Pass)
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Verdict emitted by a check implementation before the executor stamps id and category on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCheckResult {
    pub status: CheckStatus,
    pub message: String,
    pub help: Option<String>,
    pub position: Option<SourcePosition>,
}

impl RawCheckResult {
    pub fn new(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            help: None,
            position: None,
        }
    }

    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Pass, message)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Fail, message)
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn at(mut self, position: Option<SourcePosition>) -> Self {
        self.position = position;
        self
    }
}

/// Result of one check execution as surfaced to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub id: String,
    pub status: CheckStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<SourcePosition>,
    pub category: String,
}

impl CheckResult {
    pub(crate) fn from_raw(definition: &CheckDefinition, raw: RawCheckResult) -> Self {
        Self {
            id: definition.id.clone(),
            status: raw.status,
            message: raw.message,
            help: raw.help,
            position: raw.position,
            category: definition.category.clone(),
        }
    }

    pub(crate) fn error(definition: &CheckDefinition, message: impl Into<String>) -> Self {
        Self {
            id: definition.id.clone(),
            status: CheckStatus::Error,
            message: message.into(),
            help: None,
            position: None,
            category: definition.category.clone(),
        }
    }
}

/// Unexpected failure inside a check. Never a verdict: the executor turns it into an `error` result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckFailure {
    #[error("{0}")]
    Message(String),
    #[error("option '{option}' is invalid: {reason}")]
    InvalidOption { option: String, reason: String },
    #[error("required option '{0}' was not supplied")]
    MissingOption(String),
    #[error("check does not accept option '{0}'")]
    UnknownOption(String),
}

impl CheckFailure {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Validation logic bound to a definition.
///
/// Implementations receive a shared read-only document and their resolved options, and run on
/// the blocking pool; they must not assume anything about other checks in the batch.
pub trait CheckValidator: Send + Sync {
    fn validate(
        &self,
        document: &ResolvedDocument,
        options: &CheckOptions,
    ) -> Result<Vec<RawCheckResult>, CheckFailure>;
}

impl<F> CheckValidator for F
where
    F: Fn(&ResolvedDocument, &CheckOptions) -> Result<Vec<RawCheckResult>, CheckFailure>
        + Send
        + Sync,
{
    fn validate(
        &self,
        document: &ResolvedDocument,
        options: &CheckOptions,
    ) -> Result<Vec<RawCheckResult>, CheckFailure> {
        self(document, options)
    }
}

/// Definition paired with its implementation, as registered.
#[derive(Clone)]
pub struct Check {
    pub definition: CheckDefinition,
    pub validator: Arc<dyn CheckValidator>,
}

impl Check {
    pub fn new<V>(definition: CheckDefinition, validator: V) -> Self
    where
        V: CheckValidator + 'static,
    {
        Self {
            definition,
            validator: Arc::new(validator),
        }
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}
