//! Risk rule types and configuration schema.
//!
//! A `RiskRuleConfig` is deserialized from TOML and holds a list of
//! `RiskRule`s. Unlike a first-match policy, every rule is evaluated
//! independently: all rules whose condition holds produce a flag.

use serde::{Deserialize, Serialize};

use telespec_contracts::{condition::Condition, risk::Severity};

/// Priority given to rules that do not declare one.
pub const DEFAULT_PRIORITY: u32 = 100;

/// A single risk rule loaded from TOML.
///
/// ```toml
/// [[rules]]
/// id = "cardiac-exertional"
/// label = "Exertional symptoms"
/// severity = "critical"
/// priority = 10
/// when = { all = [
///     { equals = { question = "chest_symptoms", value = "Yes" } },
///     { includes = { question = "cardiac_detail", value = "On exertion" } },
/// ] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskRule {
    /// Stable identifier, carried on the flag and cited by summary provenance.
    pub id: String,

    /// Text shown to the specialist.
    pub label: String,

    #[serde(default)]
    pub description: Option<String>,

    pub severity: Severity,

    /// Order within a severity tier; lower first.
    #[serde(default = "default_priority")]
    pub priority: u32,

    pub when: Condition,
}

fn default_priority() -> u32 {
    DEFAULT_PRIORITY
}

/// Top-level rule document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskRuleConfig {
    #[serde(default)]
    pub rules: Vec<RiskRule>,
}
