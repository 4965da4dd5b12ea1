//! # telespec-summary
//!
//! Builds the five-section ISBAR handover summary from a session's answers
//! and risk flags.
//!
//! [`IsbarBuilder`] implements
//! [`SummaryBuilder`](telespec_core::traits::SummaryBuilder). Nothing in the
//! summary is written by hand: every statement is produced by an extraction
//! rule from answers or flags, and carries provenance links back to them.
//! A rule with a missing source contributes nothing rather than a
//! placeholder.

pub mod builder;
pub mod rule;
pub mod template;

pub use builder::IsbarBuilder;
pub use rule::{FlagSelector, SummaryConfig, SummaryRule};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use telespec_contracts::{
        answer::{Answer, AnswerSet, AnswerValue},
        error::TelespecError,
        question::QuestionId,
        risk::{RiskFlag, Severity},
        summary::{IsbarSection, Provenance},
    };
    use telespec_core::traits::SummaryBuilder;

    use crate::IsbarBuilder;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn answers(pairs: &[(&str, AnswerValue)]) -> AnswerSet {
        pairs
            .iter()
            .enumerate()
            .map(|(i, (id, value))| Answer {
                question_id: QuestionId::new(*id),
                value: value.clone(),
                recorded_at: Utc::now(),
                revision: i as u64 + 1,
            })
            .collect()
    }

    fn flag(rule_id: &str, label: &str, severity: Severity) -> RiskFlag {
        RiskFlag {
            rule_id: rule_id.into(),
            label: label.into(),
            severity,
            priority: 10,
            triggered_by: vec![],
        }
    }

    const RULES: &str = r#"
        [[rules]]
        id = "intro-age"
        section = "introduction"
        template = "{age}-year-old patient."
        sources = ["age"]

        [[rules]]
        id = "situation-complaint"
        section = "situation"
        template = "Presenting with {chief_complaint} for {duration}."
        sources = ["chief_complaint", "duration"]

        [[rules]]
        id = "situation-chest"
        section = "situation"
        template = "Reports chest pain, shortness of breath, or palpitations."
        sources = ["chest_symptoms"]
        when = { equals = { question = "chest_symptoms", value = "Yes" } }

        [[rules]]
        id = "background-meds"
        section = "background"
        template = "Medications: {medications}."
        sources = ["medications"]

        [[rules]]
        id = "assessment-flags"
        section = "assessment"
        template = "{label} ({severity})."
        min_severity = "warning"

        [[rules]]
        id = "recommend-cardiac"
        section = "recommendation"
        template = "Prioritise cardiology review: {label}."
        flag = "cardiac-symptoms"
    "#;

    fn builder() -> IsbarBuilder {
        IsbarBuilder::from_toml_str(RULES).unwrap()
    }

    fn texts(summary: &telespec_contracts::summary::IsbarSummary, section: IsbarSection) -> Vec<&str> {
        summary.section(section).iter().map(|s| s.text.as_str()).collect()
    }

    fn expect_config_error(toml: &str, needle: &str) {
        match IsbarBuilder::from_toml_str(toml) {
            Err(TelespecError::ConfigError { reason }) => {
                assert!(reason.contains(needle), "expected '{needle}' in reason, got: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other.map(|b| b.len())),
        }
    }

    // ── 1. Building ───────────────────────────────────────────────────────────

    #[test]
    fn full_session_fills_every_section() {
        let set = answers(&[
            ("age", AnswerValue::Number(54.0)),
            ("chief_complaint", AnswerValue::text("chest pain on exertion")),
            ("duration", AnswerValue::text("3 months")),
            ("chest_symptoms", AnswerValue::choice("Yes")),
            ("medications", AnswerValue::text("Lisinopril 10mg")),
        ]);
        let flags = vec![
            flag("cardiac-symptoms", "Cardiac risk factors", Severity::Critical),
            flag("age-over-65", "Age >65", Severity::Warning),
            flag("no-allergies", "Allergies not recorded", Severity::Informational),
        ];

        let summary = builder().build(&set, &flags).unwrap();

        assert_eq!(texts(&summary, IsbarSection::Introduction), vec!["54-year-old patient."]);
        assert_eq!(
            texts(&summary, IsbarSection::Situation),
            vec![
                "Presenting with chest pain on exertion for 3 months.",
                "Reports chest pain, shortness of breath, or palpitations.",
            ]
        );
        assert_eq!(texts(&summary, IsbarSection::Background), vec!["Medications: Lisinopril 10mg."]);
        // Informational flag is below the threshold.
        assert_eq!(
            texts(&summary, IsbarSection::Assessment),
            vec!["Cardiac risk factors (critical).", "Age >65 (warning)."]
        );
        assert_eq!(
            texts(&summary, IsbarSection::Recommendation),
            vec!["Prioritise cardiology review: Cardiac risk factors."]
        );
    }

    #[test]
    fn statements_cite_answer_revisions() {
        let set = answers(&[
            ("chief_complaint", AnswerValue::text("rash")),
            ("duration", AnswerValue::text("2 days")),
        ]);

        let summary = builder().build(&set, &[]).unwrap();
        let statement = &summary.situation[0];

        assert_eq!(statement.rule_id, "situation-complaint");
        assert_eq!(
            statement.provenance,
            vec![
                Provenance::Answer { question_id: QuestionId::new("chief_complaint"), revision: 1 },
                Provenance::Answer { question_id: QuestionId::new("duration"), revision: 2 },
            ]
        );
    }

    /// A rule whose source is missing contributes nothing, not a placeholder.
    #[test]
    fn missing_source_contributes_nothing() {
        let set = answers(&[("chief_complaint", AnswerValue::text("rash"))]);

        let summary = builder().build(&set, &[]).unwrap();

        assert!(summary.situation.is_empty());
        assert!(summary.is_empty());
    }

    #[test]
    fn gated_rule_skips_when_condition_fails() {
        let set = answers(&[("chest_symptoms", AnswerValue::choice("No"))]);
        let summary = builder().build(&set, &[]).unwrap();
        assert!(summary.situation.is_empty());
    }

    #[test]
    fn empty_answers_is_empty_session() {
        let flags = vec![flag("cardiac-symptoms", "Cardiac risk factors", Severity::Critical)];
        assert!(matches!(
            builder().build(&AnswerSet::new(), &flags),
            Err(TelespecError::EmptySession)
        ));
    }

    #[test]
    fn multi_choice_values_are_joined() {
        let toml = r#"
            [[rules]]
            id = "background-conditions"
            section = "background"
            template = "Known conditions: {conditions}."
            sources = ["conditions"]
        "#;
        let builder = IsbarBuilder::from_toml_str(toml).unwrap();
        let set = answers(&[("conditions", AnswerValue::choices(["Diabetes", "Hypertension"]))]);

        let summary = builder.build(&set, &[]).unwrap();

        assert_eq!(summary.background[0].text, "Known conditions: Diabetes, Hypertension.");
    }

    // ── 2. Configuration ──────────────────────────────────────────────────────

    #[test]
    fn flag_rule_outside_assessment_is_rejected() {
        expect_config_error(
            r#"
            [[rules]]
            id = "bad"
            section = "situation"
            template = "{label}"
            min_severity = "critical"
            "#,
            "Assessment or Recommendation",
        );
    }

    #[test]
    fn unsourced_placeholder_is_rejected() {
        expect_config_error(
            r#"
            [[rules]]
            id = "bad"
            section = "situation"
            template = "Presenting with {chief_complaint} for {duration}."
            sources = ["chief_complaint"]
            "#,
            "'{duration}'",
        );
    }

    #[test]
    fn rule_without_sources_or_flags_is_rejected() {
        expect_config_error(
            r#"
            [[rules]]
            id = "bad"
            section = "recommendation"
            template = "Schedule a consult."
            "#,
            "no sources",
        );
    }

    #[test]
    fn duplicate_rule_id_is_rejected() {
        expect_config_error(
            r#"
            [[rules]]
            id = "a"
            section = "situation"
            template = "{x}"
            sources = ["x"]

            [[rules]]
            id = "a"
            section = "background"
            template = "{y}"
            sources = ["y"]
            "#,
            "duplicate",
        );
    }

    // ── 3. Properties ─────────────────────────────────────────────────────────

    mod properties {
        use proptest::prelude::*;

        use super::*;

        const QUESTIONS: [&str; 5] = ["age", "chief_complaint", "duration", "chest_symptoms", "medications"];

        fn answer_subset() -> impl Strategy<Value = AnswerSet> {
            proptest::collection::vec(any::<bool>(), QUESTIONS.len()).prop_map(|mask| {
                let pairs: Vec<(&str, AnswerValue)> = QUESTIONS
                    .iter()
                    .zip(mask)
                    .filter(|(_, keep)| *keep)
                    .map(|(id, _)| {
                        let value = match *id {
                            "age" => AnswerValue::Number(70.0),
                            "chest_symptoms" => AnswerValue::choice("Yes"),
                            _ => AnswerValue::text("something"),
                        };
                        (*id, value)
                    })
                    .collect();
                answers(&pairs)
            })
        }

        fn flag_subset() -> impl Strategy<Value = Vec<RiskFlag>> {
            (any::<bool>(), any::<bool>()).prop_map(|(cardiac, age)| {
                let mut flags = vec![];
                if cardiac {
                    flags.push(flag("cardiac-symptoms", "Cardiac risk factors", Severity::Critical));
                }
                if age {
                    flags.push(flag("age-over-65", "Age >65", Severity::Warning));
                }
                flags
            })
        }

        proptest! {
            /// Every statement cites only answers and flags that were supplied.
            #[test]
            fn never_fabricates(set in answer_subset(), flags in flag_subset()) {
                let result = builder().build(&set, &flags);
                if set.is_empty() {
                    prop_assert!(matches!(result, Err(TelespecError::EmptySession)));
                    return Ok(());
                }
                let summary = result.unwrap();
                for (_, statements) in summary.sections() {
                    for statement in statements {
                        prop_assert!(!statement.provenance.is_empty());
                        for link in &statement.provenance {
                            match link {
                                Provenance::Answer { question_id, revision } => {
                                    let answer = set.get(question_id);
                                    prop_assert!(answer.is_some_and(|a| a.revision == *revision));
                                }
                                Provenance::Flag { rule_id } => {
                                    prop_assert!(flags.iter().any(|f| &f.rule_id == rule_id));
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
