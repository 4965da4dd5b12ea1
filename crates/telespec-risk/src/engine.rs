//! TOML-driven risk rule engine.
//!
//! `TomlRiskEngine` loads a `RiskRuleConfig` and implements the `RiskEngine`
//! trait from telespec-core.
//!
//! Evaluation algorithm:
//!
//! 1. Evaluate every rule's condition against the answer set. A condition
//!    that reads an unanswered question does not match.
//! 2. Each matching rule yields one `RiskFlag` whose `triggered_by` lists
//!    the answered questions the condition read. A match that reads no
//!    answered question (only `not answered` tests) raises nothing, since a
//!    flag must point at the answers behind it.
//! 3. Sort flags by severity (most severe first), then priority, then rule
//!    id, so the result does not depend on declaration order.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use telespec_contracts::{
    answer::AnswerSet,
    error::{TelespecError, TelespecResult},
    risk::RiskFlag,
};
use telespec_core::{condition::evaluate, traits::QuestionCatalog, traits::RiskEngine};

use crate::rule::{RiskRule, RiskRuleConfig};

/// A `RiskEngine` implementation that reads rules from a TOML document.
///
/// ```rust,ignore
/// use telespec_risk::TomlRiskEngine;
///
/// let engine = TomlRiskEngine::from_file(Path::new("config/risk_rules.toml"))?;
/// ```
#[derive(Debug)]
pub struct TomlRiskEngine {
    rules: Vec<RiskRule>,
}

impl TomlRiskEngine {
    /// Parse `s` as TOML and build a `TomlRiskEngine`.
    ///
    /// Returns `TelespecError::ConfigError` if the TOML is malformed, does
    /// not match `RiskRuleConfig`, or repeats a rule id.
    pub fn from_toml_str(s: &str) -> TelespecResult<Self> {
        let config: RiskRuleConfig = toml::from_str(s).map_err(|e| TelespecError::ConfigError {
            reason: format!("failed to parse risk rule TOML: {}", e),
        })?;
        Self::from_rules(config.rules)
    }

    /// Read the file at `path` and parse it as a risk rule document.
    pub fn from_file(path: &Path) -> TelespecResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| TelespecError::ConfigError {
            reason: format!("failed to read risk rule file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Build from rules constructed in code.
    pub fn from_rules(rules: Vec<RiskRule>) -> TelespecResult<Self> {
        let mut seen = BTreeSet::new();
        for rule in &rules {
            if rule.id.trim().is_empty() {
                return Err(TelespecError::ConfigError {
                    reason: "risk rule with an empty id".to_string(),
                });
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(TelespecError::ConfigError {
                    reason: format!("duplicate risk rule id '{}'", rule.id),
                });
            }
            if rule.label.trim().is_empty() {
                return Err(TelespecError::ConfigError {
                    reason: format!("risk rule '{}' has an empty label", rule.id),
                });
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[RiskRule] {
        &self.rules
    }

    /// Confirm every question a rule reads exists in `catalog`.
    ///
    /// A rule that names a missing question could never fire; catching it at
    /// startup turns a silent gap into a `ConfigError`.
    pub fn check_against(&self, catalog: &dyn QuestionCatalog) -> TelespecResult<()> {
        for rule in &self.rules {
            for question in rule.when.questions() {
                if catalog.question(question).is_err() {
                    return Err(TelespecError::ConfigError {
                        reason: format!(
                            "risk rule '{}' reads question '{}' which is not in the catalog",
                            rule.id, question
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

impl RiskEngine for TomlRiskEngine {
    /// Evaluate every rule and return all matches, most severe first.
    ///
    /// Pure: no state is kept between calls.
    fn evaluate(&self, answers: &AnswerSet) -> TelespecResult<Vec<RiskFlag>> {
        let mut flags = Vec::new();

        for rule in &self.rules {
            if !evaluate(&rule.when, answers).is_satisfied() {
                continue;
            }

            let triggered_by: BTreeSet<_> = rule
                .when
                .questions()
                .into_iter()
                .filter(|q| answers.contains(q))
                .cloned()
                .collect();

            if triggered_by.is_empty() {
                debug!(rule_id = %rule.id, "risk rule matched without any answered input; no flag raised");
                continue;
            }

            debug!(
                rule_id = %rule.id,
                severity = %rule.severity,
                triggered_by = triggered_by.len(),
                "risk rule matched"
            );

            flags.push(RiskFlag {
                rule_id: rule.id.clone(),
                label: rule.label.clone(),
                severity: rule.severity,
                priority: rule.priority,
                triggered_by: triggered_by.into_iter().collect(),
            });
        }

        flags.sort_by(RiskFlag::urgency_cmp);
        Ok(flags)
    }
}
