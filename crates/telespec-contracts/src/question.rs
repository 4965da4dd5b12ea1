//! Question catalog types.
//!
//! A `Question` is one node of the intake interview graph. Its outgoing edges
//! are an ordered list of conditional `Branch`es followed by a default `next`.
//! The catalog implementation decides how these are loaded and resolved; this
//! module only defines the shape.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// Stable identifier for a question.
///
/// Ids are used as answer keys, in branch targets, in risk rules, and in
/// summary provenance. Example: `QuestionId("chest_symptoms")`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl QuestionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The kind of value a question accepts.
///
/// Expressed in kebab-case in catalog TOML:
/// ```toml
/// answer_type = "free-text"
/// answer_type = "single-choice"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnswerType {
    /// Multi-line narrative text.
    FreeText,
    /// A single line of text (durations, names).
    ShortText,
    /// Exactly one of the question's options.
    SingleChoice,
    /// Any non-empty subset of the question's options.
    MultiChoice,
    /// A finite number.
    Numeric,
}

impl AnswerType {
    pub fn is_text(self) -> bool {
        matches!(self, Self::FreeText | Self::ShortText)
    }

    pub fn is_choice(self) -> bool {
        matches!(self, Self::SingleChoice | Self::MultiChoice)
    }
}

/// Validation constraints an answer must satisfy before it is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// When true the session will not advance past the question without an answer.
    pub required: bool,
    /// Regular expression the whole text answer must match.
    pub pattern: Option<String>,
    /// Allowed options for choice questions, in display order.
    pub options: Vec<String>,
    /// Inclusive lower bound for numeric answers.
    pub min: Option<f64>,
    /// Inclusive upper bound for numeric answers.
    pub max: Option<f64>,
    /// Maximum number of characters for text answers.
    pub max_length: Option<usize>,
}

/// Names the constraint an invalid answer violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintKind {
    Required,
    AnswerType,
    Pattern,
    AllowedOptions,
    Min,
    Max,
    MaxLength,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Required => "required",
            Self::AnswerType => "answer-type",
            Self::Pattern => "pattern",
            Self::AllowedOptions => "allowed-options",
            Self::Min => "min",
            Self::Max => "max",
            Self::MaxLength => "max-length",
        };
        f.write_str(name)
    }
}

/// A conditional edge: when `when` is satisfied, the interview continues at `goto`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub when: Condition,
    pub goto: QuestionId,
}

/// A single intake question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    /// Position of the question in catalog declaration order (0-based).
    pub ordinal: u32,
    /// The text shown to the patient.
    pub prompt: String,
    /// Placeholder / example text for the input control.
    pub hint: Option<String>,
    pub answer_type: AnswerType,
    pub constraint: Constraint,
    /// Conditional edges, tested in order. The first satisfied one wins.
    pub branches: Vec<Branch>,
    /// Default successor when no branch is satisfied. `None` ends the interview.
    pub next: Option<QuestionId>,
}

/// The result of resolving a question's outgoing edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextStep {
    /// Continue at this question.
    Question(QuestionId),
    /// The interview is over.
    End,
}
