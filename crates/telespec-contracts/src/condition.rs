//! Declarative predicates over recorded answers.
//!
//! The same `Condition` grammar drives question branching and risk rules.
//! Evaluation lives in `telespec-core`; this module only defines the
//! serializable shape.
//!
//! Example in TOML:
//! ```toml
//! when = { equals = { question = "chest_symptoms", value = "Yes" } }
//! when = { at-least = { question = "age", value = 65 } }
//! when = { any = [
//!     { contains = { question = "chief_complaint", value = "chest pain" } },
//!     { includes = { question = "conditions", value = "Diabetes" } },
//! ] }
//! ```

use serde::{Deserialize, Serialize};

use crate::question::QuestionId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    /// The question has any recorded answer.
    Answered { question: QuestionId },
    /// A text or choice answer equals `value` (case-insensitive, trimmed).
    /// A numeric answer equals `value` parsed as a number.
    Equals { question: QuestionId, value: String },
    /// Negation of `Equals` that is still pending while the question is unanswered.
    NotEquals { question: QuestionId, value: String },
    /// A text answer contains `value` as a case-insensitive substring.
    Contains { question: QuestionId, value: String },
    /// A multi-choice answer includes `value` among its selections.
    Includes { question: QuestionId, value: String },
    /// A numeric answer is strictly greater than `value`.
    GreaterThan { question: QuestionId, value: f64 },
    /// A numeric answer is greater than or equal to `value`.
    AtLeast { question: QuestionId, value: f64 },
    /// A numeric answer is strictly less than `value`.
    LessThan { question: QuestionId, value: f64 },
    /// Every member holds.
    All(Vec<Condition>),
    /// At least one member holds.
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// Every question id this condition reads, in declaration order, with duplicates.
    pub fn questions(&self) -> Vec<&QuestionId> {
        let mut out = Vec::new();
        self.collect_questions(&mut out);
        out
    }

    fn collect_questions<'a>(&'a self, out: &mut Vec<&'a QuestionId>) {
        match self {
            Self::Answered { question }
            | Self::Equals { question, .. }
            | Self::NotEquals { question, .. }
            | Self::Contains { question, .. }
            | Self::Includes { question, .. }
            | Self::GreaterThan { question, .. }
            | Self::AtLeast { question, .. }
            | Self::LessThan { question, .. } => out.push(question),
            Self::All(members) | Self::Any(members) => {
                for member in members {
                    member.collect_questions(out);
                }
            }
            Self::Not(inner) => inner.collect_questions(out),
        }
    }
}
