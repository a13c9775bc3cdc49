//! Submission review pipeline.
//!
//! [`checks`] holds the check registry and the executor that turns a resolved document into a
//! [`checks::CheckReport`]. [`workflows`] interprets declarative review workflows and gates each
//! transition on the principal's scopes and the latest report.

pub mod checks;
pub mod config;
pub mod document;
pub mod error;
pub mod telemetry;
pub mod workflows;
