//! The per-session answer store.
//!
//! Every write is validated against the catalog before it touches the
//! stored set. A rejected write leaves the store exactly as it was.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use telespec_contracts::{
    answer::{Answer, AnswerSet, AnswerValue},
    error::TelespecResult,
    question::{ConstraintKind, QuestionId},
};

use crate::{
    traits::QuestionCatalog,
    validate::{validate_answer, violation},
};

/// Validated answers for one session, keyed by question id.
pub struct AnswerStore {
    catalog: Arc<dyn QuestionCatalog>,
    answers: AnswerSet,
    /// Revision assigned to the next successful write.
    next_revision: u64,
}

impl AnswerStore {
    pub fn new(catalog: Arc<dyn QuestionCatalog>) -> Self {
        Self {
            catalog,
            answers: AnswerSet::new(),
            next_revision: 1,
        }
    }

    /// Validate `value` and store it as the answer to `question_id`,
    /// replacing any previous answer. Returns the stored record.
    ///
    /// # Errors
    ///
    /// - `UnknownQuestion` if the id is not in the catalog.
    /// - `Validation` naming the violated constraint; nothing is written.
    /// - `ConfigError` if the question's pattern was never compiled.
    pub fn set(&mut self, question_id: &QuestionId, value: AnswerValue) -> TelespecResult<Answer> {
        let question = self.catalog.question(question_id)?;
        let value = validate_answer(question, self.catalog.pattern(question_id), value)?;

        let answer = Answer {
            question_id: question_id.clone(),
            value,
            recorded_at: Utc::now(),
            revision: self.next_revision,
        };
        self.next_revision += 1;

        debug!(question_id = %question_id, revision = answer.revision, "answer recorded");

        self.answers.insert(answer.clone());
        Ok(answer)
    }

    pub fn get(&self, question_id: &QuestionId) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    /// Withdraw the answer to an optional question. Returns the removed answer.
    ///
    /// Required questions cannot be cleared (`Validation` with `required`).
    pub fn clear(&mut self, question_id: &QuestionId) -> TelespecResult<Option<Answer>> {
        let question = self.catalog.question(question_id)?;
        if question.constraint.required {
            return Err(violation(
                question,
                ConstraintKind::Required,
                "a required answer can be changed but not removed",
            ));
        }
        let removed = self.answers.remove(question_id);
        if removed.is_some() {
            debug!(question_id = %question_id, "answer cleared");
        }
        Ok(removed)
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn catalog(&self) -> &Arc<dyn QuestionCatalog> {
        &self.catalog
    }
}
