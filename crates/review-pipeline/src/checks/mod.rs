//! Check registry, executor, and report compilation.
//!
//! Definitions are registered once at start-up together with their validation logic. The
//! executor resolves a selection against the registry, runs each check on the blocking pool with
//! its own deadline, and rolls results up per category (worst status wins).

pub mod builtin;
mod definition;
mod executor;
mod options;
mod registry;
mod report;
pub mod router;

#[cfg(test)]
mod tests;

pub use definition::{
    Check, CheckDefinition, CheckFailure, CheckResult, CheckStatus, CheckValidator, RawCheckResult,
};
pub(crate) use executor::default_concurrency;
pub use executor::{CheckExecutor, CheckSelection, ExecutorConfig, RunOptions};
pub use options::{CheckOptionDefinition, CheckOptions, OptionKind};
pub use registry::{CheckFilter, CheckRegistry, RegistryError};
pub use report::{
    CategoryReport, CategoryStatus, CheckReport, CheckReportSummary, CompiledCheckResult,
    CompiledCheckResults, ExecutedCheck, StatusCounts,
};
pub use router::check_router;
