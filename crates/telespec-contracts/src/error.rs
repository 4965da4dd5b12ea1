//! Error types for the intake core.
//!
//! All fallible operations return `TelespecResult<T>`. Only `Validation` is
//! meant to be shown to the patient; everything else is an integration or
//! configuration failure that aborts the calling operation.

use thiserror::Error;

use crate::question::ConstraintKind;

/// The unified error type for the intake core.
#[derive(Debug, Error)]
pub enum TelespecError {
    /// An answer value violates its question's constraint. Prior state is unchanged.
    #[error("invalid answer for '{question_id}' ({constraint}): {reason}")]
    Validation {
        question_id: String,
        constraint: ConstraintKind,
        reason: String,
    },

    /// The question id is not in the catalog.
    #[error("unknown question '{question_id}'")]
    UnknownQuestion { question_id: String },

    /// The session is completed and can no longer be mutated.
    #[error("session '{session_id}' is closed")]
    SessionClosed { session_id: String },

    /// A summary was requested with no answers to derive it from.
    #[error("cannot summarize an empty session: no answers recorded")]
    EmptySession,

    /// The state machine does not allow this operation in its current state.
    #[error("invalid transition: {reason}")]
    InvalidTransition { reason: String },

    /// The session was already submitted once.
    #[error("session '{session_id}' has already been submitted")]
    AlreadySubmitted { session_id: String },

    /// A catalog, rule set, or template could not be loaded.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The snapshot failed its provenance or schema checks and was not persisted.
    #[error("submission verification failed: {reason}")]
    VerificationFailed { reason: String },

    /// The submission sink could not store the snapshot.
    #[error("persistence failed: {reason}")]
    PersistenceFailed { reason: String },
}

impl TelespecError {
    /// True for errors the patient can fix by changing their answer.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Convenience alias used throughout the workspace.
pub type TelespecResult<T> = Result<T, TelespecError>;
