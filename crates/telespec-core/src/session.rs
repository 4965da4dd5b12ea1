//! The intake session state machine.
//!
//! ```text
//!            advance (next = question)
//!           ┌──────────────┐
//!           ▼              │
//!   InProgress(current) ───┘───── advance (next = END) ────▶ Completed
//!           ▲    │
//!           └────┘ retreat (history > 1)
//! ```
//!
//! A session is owned by exactly one caller; every mutation takes
//! `&mut self`, so two writers cannot interleave on the same session.
//! Once `Completed`, every mutating call fails with `SessionClosed`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use telespec_contracts::{
    answer::{Answer, AnswerSet, AnswerValue},
    error::{TelespecError, TelespecResult},
    question::{ConstraintKind, NextStep, Question, QuestionId},
    session::{PatientId, SessionId},
};

use crate::{answers::AnswerStore, traits::QuestionCatalog, validate::violation};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    InProgress { current: QuestionId },
    Completed { completed_at: DateTime<Utc> },
}

/// Progress through the interview: "question `visited` of `estimated_total`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Questions visited so far, including the current one.
    pub visited: usize,
    /// Length of the longest path still reachable from the start question.
    pub estimated_total: usize,
}

impl Progress {
    /// Completed fraction in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.estimated_total == 0 {
            return 1.0;
        }
        (self.visited as f64 / self.estimated_total as f64).min(1.0)
    }

    /// Completed percentage rounded to the nearest whole number.
    pub fn percent(&self) -> u8 {
        (self.fraction() * 100.0).round() as u8
    }
}

/// One recorded interaction, used to rebuild a session deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum IntakeStep {
    Answer { question_id: QuestionId, value: AnswerValue },
    Advance,
    Retreat,
}

/// One patient's traversal of the questionnaire.
pub struct IntakeSession {
    id: SessionId,
    patient_id: PatientId,
    store: AnswerStore,
    /// Visited question ids; the last entry is the current question while in progress.
    history: Vec<QuestionId>,
    state: SessionState,
    estimated_total: usize,
    started_at: DateTime<Utc>,
    submitted: bool,
}

impl IntakeSession {
    /// Begin a new session positioned at the catalog's start question.
    pub fn new(catalog: Arc<dyn QuestionCatalog>, patient_id: PatientId) -> TelespecResult<Self> {
        let start = catalog.start().clone();
        catalog.question(&start)?;
        let estimated_total = catalog.longest_path_len(&start, &AnswerSet::new())?;

        let session = Self {
            id: SessionId::new(),
            patient_id,
            store: AnswerStore::new(catalog),
            history: vec![start.clone()],
            state: SessionState::InProgress { current: start },
            estimated_total,
            started_at: Utc::now(),
            submitted: false,
        };

        info!(
            session_id = %session.id,
            patient_id = %session.patient_id,
            estimated_total,
            "intake session started"
        );
        Ok(session)
    }

    /// Rebuild a session by applying `steps` in order to a fresh session.
    ///
    /// The same steps against the same catalog always produce the same
    /// history and final state.
    pub fn replay(
        catalog: Arc<dyn QuestionCatalog>,
        patient_id: PatientId,
        steps: &[IntakeStep],
    ) -> TelespecResult<Self> {
        let mut session = Self::new(catalog, patient_id)?;
        for step in steps {
            session.apply(step)?;
        }
        Ok(session)
    }

    /// Apply a single recorded step.
    pub fn apply(&mut self, step: &IntakeStep) -> TelespecResult<()> {
        match step {
            IntakeStep::Answer { question_id, value } => {
                self.set_answer(question_id, value.clone())?;
            }
            IntakeStep::Advance => {
                self.advance()?;
            }
            IntakeStep::Retreat => {
                self.retreat()?;
            }
        }
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn patient_id(&self) -> &PatientId {
        &self.patient_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn history(&self) -> &[QuestionId] {
        &self.history
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            SessionState::Completed { completed_at } => Some(completed_at),
            SessionState::InProgress { .. } => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, SessionState::Completed { .. })
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// The current question id, or `None` once completed.
    pub fn current(&self) -> Option<&QuestionId> {
        match &self.state {
            SessionState::InProgress { current } => Some(current),
            SessionState::Completed { .. } => None,
        }
    }

    /// The full current question, for rendering the prompt.
    pub fn current_question(&self) -> TelespecResult<&Question> {
        let current = self.current().ok_or_else(|| self.closed())?;
        self.store.catalog().question(current)
    }

    pub fn get_answer(&self, question_id: &QuestionId) -> Option<&Answer> {
        self.store.get(question_id)
    }

    /// Every recorded answer, including answers to questions that were left
    /// by retreating and are no longer on the path.
    pub fn answers(&self) -> &AnswerSet {
        self.store.answers()
    }

    /// Answers to questions on the visited path only. This is the set that
    /// branching, the progress estimate, the risk engine, and the summary
    /// builder see, so the path can be re-derived from the stored snapshot.
    pub fn effective_answers(&self) -> AnswerSet {
        self.store.answers().restricted_to(self.history.iter())
    }

    pub fn progress(&self) -> Progress {
        let visited = self.history.len();
        let estimated_total = if self.is_completed() {
            visited
        } else {
            self.estimated_total.max(visited)
        };
        Progress { visited, estimated_total }
    }

    // ── Mutations ─────────────────────────────────────────────────────────────

    /// Record or overwrite the answer to `question_id`.
    ///
    /// Any catalog question may be answered, not only the current one.
    pub fn set_answer(&mut self, question_id: &QuestionId, value: AnswerValue) -> TelespecResult<Answer> {
        self.ensure_open()?;
        self.store.set(question_id, value)
    }

    /// Withdraw the answer to an optional question.
    pub fn clear_answer(&mut self, question_id: &QuestionId) -> TelespecResult<Option<Answer>> {
        self.ensure_open()?;
        self.store.clear(question_id)
    }

    /// Move past the current question.
    ///
    /// Requires an answer when the current question is required. Resolves the
    /// successor through the catalog; `End` completes the session.
    pub fn advance(&mut self) -> TelespecResult<&SessionState> {
        let current = match &self.state {
            SessionState::InProgress { current } => current.clone(),
            SessionState::Completed { .. } => return Err(self.closed()),
        };

        let catalog = Arc::clone(self.store.catalog());
        let question = catalog.question(&current)?;
        if question.constraint.required && self.store.get(&current).is_none() {
            return Err(violation(
                question,
                ConstraintKind::Required,
                "answer this question before continuing",
            ));
        }

        match catalog.next_question(&current, &self.effective_answers())? {
            NextStep::End => {
                let completed_at = Utc::now();
                self.state = SessionState::Completed { completed_at };
                info!(
                    session_id = %self.id,
                    visited = self.history.len(),
                    answers = self.store.answers().len(),
                    "intake session completed"
                );
            }
            NextStep::Question(next) => {
                if self.history.contains(&next) {
                    return Err(TelespecError::InvalidTransition {
                        reason: format!(
                            "question '{next}' was already visited in session '{}'; the catalog graph has a cycle",
                            self.id
                        ),
                    });
                }
                debug!(session_id = %self.id, from = %current, to = %next, "advanced");
                self.history.push(next.clone());
                self.state = SessionState::InProgress { current: next };
                self.refresh_estimate()?;
            }
        }

        Ok(&self.state)
    }

    /// Step back to the previous question. Answers are kept.
    pub fn retreat(&mut self) -> TelespecResult<&QuestionId> {
        self.ensure_open()?;
        if self.history.len() <= 1 {
            return Err(TelespecError::InvalidTransition {
                reason: "cannot retreat from the first question".to_string(),
            });
        }

        let left = self.history.pop();
        let previous = self.history[self.history.len() - 1].clone();
        debug!(
            session_id = %self.id,
            left = ?left,
            to = %previous,
            "retreated"
        );
        self.state = SessionState::InProgress { current: previous };
        self.refresh_estimate()?;

        match &self.state {
            SessionState::InProgress { current } => Ok(current),
            SessionState::Completed { .. } => Err(self.closed()),
        }
    }

    pub(crate) fn mark_submitted(&mut self) {
        self.submitted = true;
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    /// The visited prefix is fixed, so the longest path from the start is the
    /// prefix plus the longest path from the current question.
    fn refresh_estimate(&mut self) -> TelespecResult<()> {
        let answers = self.effective_answers();
        if let SessionState::InProgress { current } = &self.state {
            let remaining = self.store.catalog().longest_path_len(current, &answers)?;
            self.estimated_total = self.history.len() - 1 + remaining;
        }
        Ok(())
    }

    fn ensure_open(&self) -> TelespecResult<()> {
        if self.is_completed() {
            Err(self.closed())
        } else {
            Ok(())
        }
    }

    fn closed(&self) -> TelespecError {
        TelespecError::SessionClosed { session_id: self.id.to_string() }
    }
}
