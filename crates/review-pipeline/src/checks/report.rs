use serde::{Deserialize, Serialize};

use super::definition::{CheckDefinition, CheckResult, CheckStatus};

/// One executed result joined with the definition that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledCheckResult {
    pub definition: CheckDefinition,
    pub result: CheckResult,
}

pub type CompiledCheckResults = Vec<CompiledCheckResult>;

/// Results of a single category with their rolled-up status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub category: String,
    pub status: CheckStatus,
    pub results: CompiledCheckResults,
}

/// A check that ran in a batch, whether or not it emitted any results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutedCheck {
    pub id: String,
    pub category: String,
}

impl From<&CheckDefinition> for ExecutedCheck {
    fn from(definition: &CheckDefinition) -> Self {
        Self {
            id: definition.id.clone(),
            category: definition.category.clone(),
        }
    }
}

/// Aggregate report produced by the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub status: CheckStatus,
    pub results: Vec<CategoryReport>,
    #[serde(default)]
    pub executed: Vec<ExecutedCheck>,
}

/// Status per category, kept on transition records as the evidence behind a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReportSummary {
    pub status: CheckStatus,
    pub categories: Vec<CategoryStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStatus {
    pub category: String,
    pub status: CheckStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pass: usize,
    pub fail: usize,
    pub error: usize,
}

impl CheckReport {
    /// Group compiled results by category (first-seen order) and roll statuses up.
    ///
    /// `executed` lists every check that ran, including those that emitted nothing.
    pub fn compile(executed: Vec<ExecutedCheck>, compiled: CompiledCheckResults) -> Self {
        let mut groups: Vec<CategoryReport> = Vec::new();

        for entry in compiled {
            let category = entry.result.category.clone();
            match groups.iter_mut().find(|group| group.category == category) {
                Some(group) => group.results.push(entry),
                None => groups.push(CategoryReport {
                    category,
                    status: CheckStatus::Pass,
                    results: vec![entry],
                }),
            }
        }

        for group in &mut groups {
            group.status =
                CheckStatus::rollup(group.results.iter().map(|entry| entry.result.status));
        }

        let status = CheckStatus::rollup(groups.iter().map(|group| group.status));

        Self {
            status,
            results: groups,
            executed,
        }
    }

    pub fn was_executed(&self, id: &str) -> bool {
        self.executed.iter().any(|check| check.id == id)
    }

    pub fn category(&self, category: &str) -> Option<&CategoryReport> {
        self.results.iter().find(|group| group.category == category)
    }

    /// Rolled-up status of a category. A category whose checks ran without emitting anything
    /// passes; `None` means no check of that category ran.
    pub fn category_status(&self, category: &str) -> Option<CheckStatus> {
        if let Some(group) = self.category(category) {
            return Some(group.status);
        }
        self.executed
            .iter()
            .any(|check| check.category == category)
            .then_some(CheckStatus::Pass)
    }

    /// Rolled-up status of every result emitted by `id`; `None` when the check did not run.
    pub fn check_status(&self, id: &str) -> Option<CheckStatus> {
        let mut statuses = self
            .entries()
            .filter(|entry| entry.result.id == id)
            .map(|entry| entry.result.status)
            .peekable();
        if statuses.peek().is_none() {
            return self.was_executed(id).then_some(CheckStatus::Pass);
        }
        Some(CheckStatus::rollup(statuses))
    }

    pub fn entries(&self) -> impl Iterator<Item = &CompiledCheckResult> {
        self.results.iter().flat_map(|group| group.results.iter())
    }

    pub fn counts(&self) -> StatusCounts {
        self.entries()
            .fold(StatusCounts::default(), |mut counts, entry| {
                match entry.result.status {
                    CheckStatus::Pass => counts.pass += 1,
                    CheckStatus::Fail => counts.fail += 1,
                    CheckStatus::Error => counts.error += 1,
                }
                counts
            })
    }

    pub fn summary(&self) -> CheckReportSummary {
        CheckReportSummary {
            status: self.status,
            categories: self
                .results
                .iter()
                .map(|group| CategoryStatus {
                    category: group.category.clone(),
                    status: group.status,
                })
                .collect(),
        }
    }
}
