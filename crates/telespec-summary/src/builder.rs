//! The ISBAR summary builder.
//!
//! `IsbarBuilder` compiles a `SummaryConfig` once, rejecting any rule that
//! could produce a statement without provenance, and implements the
//! `SummaryBuilder` trait from telespec-core.
//!
//! Build algorithm:
//!
//! 1. No answers at all → `EmptySession`.
//! 2. For each rule in declaration order:
//!    - answer rule: skip unless every source is answered and the optional
//!      `when` gate is satisfied; emit one statement citing each source
//!      answer at its current revision;
//!    - flag rule: emit one statement per selected flag, in flag order,
//!      citing the flag's rule id.
//! 3. Append each statement to its rule's section.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use telespec_contracts::{
    answer::AnswerSet,
    error::{TelespecError, TelespecResult},
    question::QuestionId,
    risk::RiskFlag,
    summary::{IsbarSection, IsbarSummary, Provenance, Statement},
};
use telespec_core::{
    condition::evaluate,
    traits::{QuestionCatalog, SummaryBuilder},
};

use crate::{
    rule::{FlagSelector, SummaryConfig, SummaryRule},
    template::Template,
};

const FLAG_PLACEHOLDERS: [&str; 2] = ["label", "severity"];

#[derive(Debug)]
enum RuleKind {
    Answer {
        sources: Vec<QuestionId>,
        when: Option<telespec_contracts::condition::Condition>,
    },
    Flag(FlagSelector),
}

#[derive(Debug)]
struct CompiledRule {
    id: String,
    section: IsbarSection,
    template: Template,
    kind: RuleKind,
}

/// A `SummaryBuilder` driven by declarative extraction rules.
///
/// ```rust,ignore
/// use telespec_summary::IsbarBuilder;
///
/// let builder = IsbarBuilder::from_file(Path::new("config/summary.toml"))?;
/// let summary = builder.build(&answers, &flags)?;
/// ```
#[derive(Debug)]
pub struct IsbarBuilder {
    rules: Vec<CompiledRule>,
}

impl IsbarBuilder {
    /// Parse `s` as TOML and compile the rules.
    pub fn from_toml_str(s: &str) -> TelespecResult<Self> {
        let config: SummaryConfig = toml::from_str(s).map_err(|e| TelespecError::ConfigError {
            reason: format!("failed to parse summary rule TOML: {}", e),
        })?;
        Self::from_config(config)
    }

    /// Read the file at `path` and compile it as summary rules.
    pub fn from_file(path: &Path) -> TelespecResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| TelespecError::ConfigError {
            reason: format!("failed to read summary rule file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Compile an already-parsed document.
    ///
    /// Returns `ConfigError` for duplicate ids, a rule that is neither or
    /// both kinds, a flag rule outside Assessment/Recommendation, or a
    /// template placeholder the rule cannot fill.
    pub fn from_config(config: SummaryConfig) -> TelespecResult<Self> {
        let mut seen = BTreeSet::new();
        let mut rules = Vec::with_capacity(config.rules.len());
        for rule in config.rules {
            if !seen.insert(rule.id.clone()) {
                return Err(config_error(format!("duplicate summary rule id '{}'", rule.id)));
            }
            rules.push(compile(rule)?);
        }
        Ok(Self { rules })
    }

    /// Confirm every question a rule reads exists in `catalog`.
    pub fn check_against(&self, catalog: &dyn QuestionCatalog) -> TelespecResult<()> {
        for rule in &self.rules {
            if let RuleKind::Answer { sources, when } = &rule.kind {
                let gated = when.iter().flat_map(|w| w.questions());
                for question in sources.iter().chain(gated) {
                    if catalog.question(question).is_err() {
                        return Err(config_error(format!(
                            "summary rule '{}' reads question '{}' which is not in the catalog",
                            rule.id, question
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Flag rule ids referenced by `flag = "..."` rules.
    pub fn referenced_flags(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().filter_map(|r| match &r.kind {
            RuleKind::Flag(FlagSelector::Rule(id)) => Some(id.as_str()),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn compile(rule: SummaryRule) -> TelespecResult<CompiledRule> {
    let id = rule.id;
    if id.trim().is_empty() {
        return Err(config_error("summary rule with an empty id".to_string()));
    }

    let template = Template::parse(&rule.template)
        .map_err(|reason| config_error(format!("summary rule '{id}': {reason}")))?;

    let is_flag_rule = rule.flag.is_some() || rule.min_severity.is_some();
    let kind = match (rule.flag, rule.min_severity) {
        (Some(_), Some(_)) => {
            return Err(config_error(format!(
                "summary rule '{id}' sets both 'flag' and 'min_severity'"
            )))
        }
        (Some(flag), None) => RuleKind::Flag(FlagSelector::Rule(flag)),
        (None, Some(min)) => RuleKind::Flag(FlagSelector::AtLeast(min)),
        (None, None) => {
            if rule.sources.is_empty() {
                return Err(config_error(format!(
                    "summary rule '{id}' has no sources and selects no flags"
                )));
            }
            RuleKind::Answer { sources: rule.sources.clone(), when: rule.when.clone() }
        }
    };

    if is_flag_rule {
        if !rule.sources.is_empty() || rule.when.is_some() {
            return Err(config_error(format!(
                "flag rule '{id}' cannot also declare 'sources' or 'when'"
            )));
        }
        if !rule.section.accepts_flags() {
            return Err(config_error(format!(
                "flag rule '{id}' targets section {}; flags belong in Assessment or Recommendation",
                rule.section
            )));
        }
    }

    for placeholder in template.placeholders() {
        let known = match &kind {
            RuleKind::Answer { sources, .. } => sources.iter().any(|s| s.as_str() == placeholder),
            RuleKind::Flag(_) => FLAG_PLACEHOLDERS.contains(&placeholder),
        };
        if !known {
            return Err(config_error(format!(
                "summary rule '{id}' template references '{{{placeholder}}}' which it does not source"
            )));
        }
    }

    Ok(CompiledRule { id, section: rule.section, template, kind })
}

fn config_error(reason: String) -> TelespecError {
    TelespecError::ConfigError { reason }
}

impl SummaryBuilder for IsbarBuilder {
    fn build(&self, answers: &AnswerSet, flags: &[RiskFlag]) -> TelespecResult<IsbarSummary> {
        if answers.is_empty() {
            return Err(TelespecError::EmptySession);
        }

        let mut summary = IsbarSummary::default();

        for rule in &self.rules {
            match &rule.kind {
                RuleKind::Answer { sources, when } => {
                    if let Some(gate) = when {
                        if !evaluate(gate, answers).is_satisfied() {
                            continue;
                        }
                    }
                    let Some(provenance) = sources
                        .iter()
                        .map(|q| {
                            answers.get(q).map(|a| Provenance::Answer {
                                question_id: a.question_id.clone(),
                                revision: a.revision,
                            })
                        })
                        .collect::<Option<Vec<_>>>()
                    else {
                        continue;
                    };

                    let text = rule.template.render(|name| {
                        answers.value(&QuestionId::new(name)).map(|v| v.to_string())
                    });
                    if let Some(text) = text {
                        debug!(rule_id = %rule.id, section = %rule.section, "answer statement emitted");
                        summary.push(
                            rule.section,
                            Statement { rule_id: rule.id.clone(), text, provenance },
                        );
                    }
                }

                RuleKind::Flag(selector) => {
                    for flag in flags.iter().filter(|f| selector.matches(f)) {
                        let text = rule.template.render(|name| match name {
                            "label" => Some(flag.label.clone()),
                            "severity" => Some(flag.severity.to_string()),
                            _ => None,
                        });
                        if let Some(text) = text {
                            debug!(
                                rule_id = %rule.id,
                                flag = %flag.rule_id,
                                section = %rule.section,
                                "flag statement emitted"
                            );
                            summary.push(
                                rule.section,
                                Statement {
                                    rule_id: rule.id.clone(),
                                    text,
                                    provenance: vec![Provenance::Flag { rule_id: flag.rule_id.clone() }],
                                },
                            );
                        }
                    }
                }
            }
        }

        Ok(summary)
    }
}
