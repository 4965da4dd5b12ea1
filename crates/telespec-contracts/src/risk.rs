//! Risk flag types.
//!
//! Flags are always derived by a risk engine from recorded answers. Patients
//! never enter them directly.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::question::QuestionId;

/// Severity tier of a risk flag.
///
/// Variants are declared from least to most severe, so the derived `Ord`
/// sorts `Informational < Warning < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Informational,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Informational => "informational",
            Self::Warning => "warning",
            Self::Critical => "critical",
        };
        f.write_str(name)
    }
}

/// A derived indicator that answers meet a clinically significant pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFlag {
    /// Id of the rule that produced this flag.
    pub rule_id: String,
    /// Label shown to the specialist, e.g. "Cardiac risk factors".
    pub label: String,
    pub severity: Severity,
    /// Tie-breaker within a severity tier. Lower values sort first.
    pub priority: u32,
    /// The answered questions the rule's predicate read, in id order.
    pub triggered_by: Vec<QuestionId>,
}

impl RiskFlag {
    /// Display order: most severe first, then lower priority, then rule id.
    pub fn urgency_cmp(&self, other: &Self) -> Ordering {
        other
            .severity
            .cmp(&self.severity)
            .then(self.priority.cmp(&other.priority))
            .then_with(|| self.rule_id.cmp(&other.rule_id))
    }
}
