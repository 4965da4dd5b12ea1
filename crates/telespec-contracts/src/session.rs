//! Session identity and the submission snapshot.
//!
//! `SubmissionSnapshot` is the output contract of the intake core: a
//! serializable bundle of a completed session, its flags, and its summary,
//! handed to the persistence boundary before anything reaches the dashboard.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    answer::AnswerSet, question::QuestionId, risk::RiskFlag, summary::IsbarSummary,
};

/// Unique identifier for one intake session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    /// Create a new, unique session ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier for a patient, e.g. `PatientId("pt-001")`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub String);

impl PatientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything derived from one completed session, as handed to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionSnapshot {
    pub session_id: SessionId,
    pub patient_id: PatientId,
    /// Visited question ids in interview order.
    pub history: Vec<QuestionId>,
    /// The effective answers: those whose question is on `history`.
    pub answers: AnswerSet,
    /// Flags in severity-then-priority order.
    pub flags: Vec<RiskFlag>,
    pub summary: IsbarSummary,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
}
