//! The submission pipeline.
//!
//! The submitter enforces the order every completed session goes through:
//!
//!   Completed → Risk evaluation → ISBAR build → Verify → Persist → Submitted
//!
//! A session is marked submitted only after the sink accepts the snapshot,
//! so a failed verification or write leaves it eligible for another attempt
//! and nothing unverified ever reaches storage or the dashboard.

use chrono::Utc;
use tracing::{debug, info, warn};

use telespec_contracts::{
    error::{TelespecError, TelespecResult},
    risk::RiskFlag,
    session::SubmissionSnapshot,
};

use crate::{
    session::IntakeSession,
    traits::{RiskEngine, SubmissionSink, SubmissionVerifier, SummaryBuilder},
};

/// Runs the derivation and persistence stages for completed sessions.
///
/// One submitter can serve many sessions; it holds no per-session state.
pub struct Submitter {
    risk: Box<dyn RiskEngine>,
    summary: Box<dyn SummaryBuilder>,
    verifier: Box<dyn SubmissionVerifier>,
    sink: Box<dyn SubmissionSink>,
}

impl Submitter {
    pub fn new(
        risk: Box<dyn RiskEngine>,
        summary: Box<dyn SummaryBuilder>,
        verifier: Box<dyn SubmissionVerifier>,
        sink: Box<dyn SubmissionSink>,
    ) -> Self {
        Self { risk, summary, verifier, sink }
    }

    /// Flags for the session's current effective answers.
    ///
    /// Usable while the session is still in progress, so flags track the
    /// answers as they change. Nothing is stored.
    pub fn preview_flags(&self, session: &IntakeSession) -> TelespecResult<Vec<RiskFlag>> {
        self.risk.evaluate(&session.effective_answers())
    }

    /// Submit a completed session exactly once.
    ///
    /// # Pipeline
    ///
    /// 1. Require `Completed` (`InvalidTransition`) and not yet submitted
    ///    (`AlreadySubmitted`).
    /// 2. Take the effective answers; none at all → `EmptySession`.
    /// 3. `risk.evaluate()` then `summary.build()`.
    /// 4. `verifier.verify()`; a failing report → `VerificationFailed`.
    /// 5. `sink.write()`; then mark the session submitted.
    pub fn submit(&self, session: &mut IntakeSession) -> TelespecResult<SubmissionSnapshot> {
        let session_id = session.id();

        // ── Step 1: Lifecycle checks ─────────────────────────────────────────
        let completed_at = session.completed_at().ok_or_else(|| TelespecError::InvalidTransition {
            reason: format!("session '{session_id}' is still in progress and cannot be submitted"),
        })?;
        if session.is_submitted() {
            return Err(TelespecError::AlreadySubmitted { session_id: session_id.to_string() });
        }

        // ── Step 2: Stable answer set ────────────────────────────────────────
        let answers = session.effective_answers();
        if answers.is_empty() {
            warn!(session_id = %session_id, "submission attempted with no answers");
            return Err(TelespecError::EmptySession);
        }

        // ── Step 3: Derivation ───────────────────────────────────────────────
        let flags = self.risk.evaluate(&answers)?;
        debug!(session_id = %session_id, flag_count = flags.len(), "risk flags derived");

        let summary = self.summary.build(&answers, &flags)?;
        debug!(
            session_id = %session_id,
            statements = summary.statement_count(),
            "isbar summary built"
        );

        let snapshot = SubmissionSnapshot {
            session_id,
            patient_id: session.patient_id().clone(),
            history: session.history().to_vec(),
            answers,
            flags,
            summary,
            started_at: session.started_at(),
            completed_at,
            submitted_at: Utc::now(),
        };

        // ── Step 4: Verification ─────────────────────────────────────────────
        let report = self.verifier.verify(&snapshot)?;
        if !report.passed {
            let reason = report.failure_summary();
            warn!(session_id = %session_id, failures = %reason, "submission verification failed");
            return Err(TelespecError::VerificationFailed { reason });
        }

        // ── Step 5: Persist, then seal ───────────────────────────────────────
        self.sink.write(&snapshot)?;
        session.mark_submitted();

        info!(
            session_id = %session_id,
            patient_id = %snapshot.patient_id,
            flags = snapshot.flags.len(),
            "session submitted"
        );
        Ok(snapshot)
    }
}
