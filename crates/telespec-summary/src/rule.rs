//! Extraction rule types and configuration schema.
//!
//! Every statement in a summary comes from one `SummaryRule`. A rule is
//! either an answer rule (it lists `sources`) or a flag rule (it names a
//! `flag` rule id or a `min_severity`). Rules within a section emit in
//! declaration order.
//!
//! ```toml
//! [[rules]]
//! id = "situation-complaint"
//! section = "situation"
//! template = "Presenting with {chief_complaint} for {duration}."
//! sources = ["chief_complaint", "duration"]
//!
//! [[rules]]
//! id = "assessment-flags"
//! section = "assessment"
//! template = "{label} ({severity})."
//! min_severity = "warning"
//! ```

use serde::{Deserialize, Serialize};

use telespec_contracts::{
    condition::Condition,
    question::QuestionId,
    risk::{RiskFlag, Severity},
    summary::IsbarSection,
};

/// A single extraction rule loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRule {
    /// Stable identifier, recorded on each statement the rule emits.
    pub id: String,

    pub section: IsbarSection,

    /// Text with `{name}` placeholders. Answer rules may reference their
    /// sources; flag rules may reference `label` and `severity`.
    pub template: String,

    /// Questions whose answers the statement is built from. All must be
    /// answered for the rule to emit.
    #[serde(default)]
    pub sources: Vec<QuestionId>,

    /// Extra gate for answer rules.
    #[serde(default)]
    pub when: Option<Condition>,

    /// Emit one statement for the flag produced by this risk rule id.
    #[serde(default)]
    pub flag: Option<String>,

    /// Emit one statement per flag at or above this severity.
    #[serde(default)]
    pub min_severity: Option<Severity>,
}

/// Top-level summary rule document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default)]
    pub rules: Vec<SummaryRule>,
}

/// Which flags a flag rule speaks about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagSelector {
    Rule(String),
    AtLeast(Severity),
}

impl FlagSelector {
    pub fn matches(&self, flag: &RiskFlag) -> bool {
        match self {
            Self::Rule(rule_id) => &flag.rule_id == rule_id,
            Self::AtLeast(min) => flag.severity >= *min,
        }
    }
}
