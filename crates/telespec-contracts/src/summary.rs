//! Structured ISBAR handover summary.
//!
//! The summary is a set of statements, never opaque prose. Each statement
//! carries the provenance links that justify it, so a reviewer (or the
//! verifier) can trace every line back to patient input.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::question::QuestionId;

/// One of the five ISBAR sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IsbarSection {
    Introduction,
    Situation,
    Background,
    Assessment,
    Recommendation,
}

impl IsbarSection {
    /// All sections in handover order.
    pub const ALL: [IsbarSection; 5] = [
        Self::Introduction,
        Self::Situation,
        Self::Background,
        Self::Assessment,
        Self::Recommendation,
    ];

    /// True for the sections that may cite risk flags.
    pub fn accepts_flags(self) -> bool {
        matches!(self, Self::Assessment | Self::Recommendation)
    }
}

impl fmt::Display for IsbarSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Introduction => "Introduction",
            Self::Situation => "Situation",
            Self::Background => "Background",
            Self::Assessment => "Assessment",
            Self::Recommendation => "Recommendation",
        };
        f.write_str(name)
    }
}

/// A link from a statement to the input that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum Provenance {
    /// A specific revision of a recorded answer.
    Answer { question_id: QuestionId, revision: u64 },
    /// A derived risk flag, identified by its rule id.
    Flag { rule_id: String },
}

/// A single summary line plus its justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Id of the extraction rule that produced this statement.
    pub rule_id: String,
    pub text: String,
    pub provenance: Vec<Provenance>,
}

/// The five-section handover summary for one submitted session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsbarSummary {
    pub introduction: Vec<Statement>,
    pub situation: Vec<Statement>,
    pub background: Vec<Statement>,
    pub assessment: Vec<Statement>,
    pub recommendation: Vec<Statement>,
}

impl IsbarSummary {
    pub fn section(&self, section: IsbarSection) -> &[Statement] {
        match section {
            IsbarSection::Introduction => &self.introduction,
            IsbarSection::Situation => &self.situation,
            IsbarSection::Background => &self.background,
            IsbarSection::Assessment => &self.assessment,
            IsbarSection::Recommendation => &self.recommendation,
        }
    }

    /// Append `statement` to the end of `section`.
    pub fn push(&mut self, section: IsbarSection, statement: Statement) {
        let target = match section {
            IsbarSection::Introduction => &mut self.introduction,
            IsbarSection::Situation => &mut self.situation,
            IsbarSection::Background => &mut self.background,
            IsbarSection::Assessment => &mut self.assessment,
            IsbarSection::Recommendation => &mut self.recommendation,
        };
        target.push(statement);
    }

    /// Iterate `(section, statements)` pairs in handover order.
    pub fn sections(&self) -> impl Iterator<Item = (IsbarSection, &[Statement])> {
        IsbarSection::ALL.into_iter().map(move |s| (s, self.section(s)))
    }

    pub fn statement_count(&self) -> usize {
        self.sections().map(|(_, statements)| statements.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.statement_count() == 0
    }
}
