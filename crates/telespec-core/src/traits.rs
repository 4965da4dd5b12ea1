//! Core trait definitions for the intake pipeline.
//!
//! These five traits are the seams between the session state machine and
//! the pluggable, declaratively configured parts of the system:
//!
//! - `QuestionCatalog`   : the interview graph (read-only, shared)
//! - `RiskEngine`        : derives risk flags from answers
//! - `SummaryBuilder`    : derives the ISBAR summary
//! - `SubmissionVerifier`: checks a snapshot before it is stored
//! - `SubmissionSink`    : durable store for submitted snapshots
//!
//! The `Submitter` wires the last four together in a fixed order. Every
//! implementation must be deterministic given its inputs.

use regex::Regex;

use telespec_contracts::{
    answer::AnswerSet,
    error::TelespecResult,
    question::{NextStep, Question, QuestionId},
    risk::RiskFlag,
    session::SubmissionSnapshot,
    summary::IsbarSummary,
    verify::VerificationReport,
};

/// The interview graph.
///
/// Implementations hold no per-session state: every method is a pure
/// function of its arguments, so a session's path can always be re-derived
/// from its answer history.
pub trait QuestionCatalog: Send + Sync {
    /// The question every session starts at.
    fn start(&self) -> &QuestionId;

    /// Look up a question by id.
    ///
    /// Returns `TelespecError::UnknownQuestion` if `id` is not in the catalog.
    fn question(&self, id: &QuestionId) -> TelespecResult<&Question>;

    /// Number of questions in the catalog.
    fn len(&self) -> usize;

    /// Resolve the successor of `current` given the answers so far.
    ///
    /// Branches whose prerequisites are unanswered count as not satisfied.
    fn next_question(&self, current: &QuestionId, answers: &AnswerSet) -> TelespecResult<NextStep>;

    /// Number of questions on the longest path from `from` (inclusive) to the
    /// end of the interview, treating every unresolved branch as possible.
    fn longest_path_len(&self, from: &QuestionId, answers: &AnswerSet) -> TelespecResult<usize>;

    /// The compiled, whole-answer form of `id`'s text pattern.
    ///
    /// Catalogs that declare patterns must compile them once and return them
    /// here. Answers to a question whose pattern is missing are refused with
    /// `TelespecError::ConfigError`.
    fn pattern(&self, _id: &QuestionId) -> Option<&Regex> {
        None
    }
}

/// Derives risk flags from a stable answer set.
pub trait RiskEngine: Send + Sync {
    /// Evaluate every rule independently and return all matches, most
    /// severe first. Identical inputs must yield identical output.
    fn evaluate(&self, answers: &AnswerSet) -> TelespecResult<Vec<RiskFlag>>;
}

/// Derives the structured ISBAR summary.
pub trait SummaryBuilder: Send + Sync {
    /// Build the summary. Returns `TelespecError::EmptySession` when `answers`
    /// is empty.
    fn build(&self, answers: &AnswerSet, flags: &[RiskFlag]) -> TelespecResult<IsbarSummary>;
}

/// The last gate before a snapshot is persisted.
///
/// Implementations must not modify the snapshot. A failing report stops the
/// submission.
pub trait SubmissionVerifier: Send + Sync {
    fn verify(&self, snapshot: &SubmissionSnapshot) -> TelespecResult<VerificationReport>;
}

/// Durable, keyed store for submitted snapshots.
///
/// A failed write is fatal to the submission: the session stays unsubmitted
/// and `TelespecError::PersistenceFailed` is returned.
pub trait SubmissionSink: Send + Sync {
    /// Store `snapshot` keyed by its session id. Must reject a second write
    /// for the same session.
    fn write(&self, snapshot: &SubmissionSnapshot) -> TelespecResult<()>;
}
