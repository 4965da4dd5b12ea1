//! Submission verification report types.
//!
//! Before a snapshot is persisted, the verifier checks it. Only a passing
//! `VerificationReport` lets the submission proceed.

use serde::{Deserialize, Serialize};

/// The result of running every check against a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True only if all checks passed.
    pub passed: bool,
    /// All failures collected during this run. Empty on pass.
    pub failures: Vec<VerificationFailure>,
}

impl VerificationReport {
    pub fn from_failures(failures: Vec<VerificationFailure>) -> Self {
        Self { passed: failures.is_empty(), failures }
    }

    /// `[check] message; [check] message`, used in error reasons and logs.
    pub fn failure_summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("[{}] {}", f.check_id, f.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationFailure {
    /// Identifier of the check that failed.
    pub check_id: String,
    /// Human-readable explanation of why the check failed.
    pub message: String,
}
