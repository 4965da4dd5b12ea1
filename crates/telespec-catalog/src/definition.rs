//! Catalog file schema.
//!
//! A catalog is a TOML document naming the start question and listing every
//! question as a `[[questions]]` table. Constraint fields sit flat on the
//! question table; branches are nested `[[questions.branches]]` tables tested
//! in order.
//!
//! ```toml
//! start = "chief_complaint"
//!
//! [[questions]]
//! id = "chest_symptoms"
//! prompt = "Have you had any recent chest pain, shortness of breath, or palpitations?"
//! answer_type = "single-choice"
//! required = true
//! options = ["Yes", "No"]
//! next = "conditions"
//!
//! [[questions.branches]]
//! when = { equals = { question = "chest_symptoms", value = "Yes" } }
//! goto = "cardiac_detail"
//! ```

use serde::{Deserialize, Serialize};

use telespec_contracts::question::{AnswerType, Branch, Constraint, Question, QuestionId};

/// Top-level catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Id of the question every session starts at.
    pub start: QuestionId,

    #[serde(default)]
    pub questions: Vec<QuestionSpec>,
}

/// One question as written in the catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSpec {
    pub id: QuestionId,
    pub prompt: String,

    #[serde(default)]
    pub hint: Option<String>,

    pub answer_type: AnswerType,

    #[serde(default)]
    pub required: bool,

    /// Regular expression a text answer must match in full.
    #[serde(default)]
    pub pattern: Option<String>,

    #[serde(default)]
    pub options: Vec<String>,

    #[serde(default)]
    pub min: Option<f64>,

    #[serde(default)]
    pub max: Option<f64>,

    #[serde(default)]
    pub max_length: Option<usize>,

    #[serde(default)]
    pub branches: Vec<Branch>,

    /// Default successor. Omit to end the interview after this question.
    #[serde(default)]
    pub next: Option<QuestionId>,
}

impl QuestionSpec {
    /// Convert into the runtime `Question` at catalog position `ordinal`.
    pub fn into_question(self, ordinal: u32) -> Question {
        Question {
            id: self.id,
            ordinal,
            prompt: self.prompt,
            hint: self.hint,
            answer_type: self.answer_type,
            constraint: Constraint {
                required: self.required,
                pattern: self.pattern,
                options: self.options,
                min: self.min,
                max: self.max,
                max_length: self.max_length,
            },
            branches: self.branches,
            next: self.next,
        }
    }
}
