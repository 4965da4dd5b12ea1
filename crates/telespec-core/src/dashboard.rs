//! Dashboard projection: the specialist's read model.
//!
//! `project` only assembles; every derived value it carries was computed
//! upstream. `DashboardBoard` keeps the latest entry per patient and orders
//! the list so the most urgent near-term cases come first.

use std::cmp::{Ordering, Reverse};
use std::collections::BTreeMap;

use tracing::debug;

use telespec_contracts::{
    dashboard::{DashboardEntry, PatientRecord, ReviewStatus},
    error::{TelespecError, TelespecResult},
    risk::RiskFlag,
    session::PatientId,
    summary::IsbarSummary,
};

use crate::session::IntakeSession;

/// Assemble the dashboard entry for a submitted session. Flags are put in
/// display order, most severe first.
///
/// # Errors
///
/// `InvalidTransition` if the session has not been submitted (storage comes
/// before display) or if `patient` is not the session's patient.
pub fn project(
    patient: PatientRecord,
    session: &IntakeSession,
    mut flags: Vec<RiskFlag>,
    summary: IsbarSummary,
) -> TelespecResult<DashboardEntry> {
    let completed_at = match session.completed_at() {
        Some(at) if session.is_submitted() => at,
        _ => {
            return Err(TelespecError::InvalidTransition {
                reason: format!(
                    "session '{}' must be completed and submitted before it is shown",
                    session.id()
                ),
            })
        }
    };
    if &patient.patient_id != session.patient_id() {
        return Err(TelespecError::InvalidTransition {
            reason: format!(
                "patient '{}' does not own session '{}' (owner '{}')",
                patient.patient_id,
                session.id(),
                session.patient_id()
            ),
        });
    }

    flags.sort_by(RiskFlag::urgency_cmp);
    Ok(DashboardEntry::new(patient, session.id(), completed_at, flags, summary))
}

/// Appointment time ascending, then highest severity descending (no flags
/// sorts last), then patient id.
pub fn dashboard_order(a: &DashboardEntry, b: &DashboardEntry) -> Ordering {
    a.patient()
        .appointment_at
        .cmp(&b.patient().appointment_at)
        .then_with(|| Reverse(a.highest_severity()).cmp(&Reverse(b.highest_severity())))
        .then_with(|| a.patient().patient_id.cmp(&b.patient().patient_id))
}

/// The current dashboard entry for each patient.
#[derive(Debug, Default)]
pub struct DashboardBoard {
    entries: BTreeMap<PatientId, DashboardEntry>,
}

impl DashboardBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `entry` unless the patient already has an entry from a session
    /// completed later.
    ///
    /// Returns the entry that is no longer shown: the superseded previous
    /// entry, or `entry` itself when it is older than the one on display.
    pub fn publish(&mut self, entry: DashboardEntry) -> Option<DashboardEntry> {
        let patient_id = entry.patient().patient_id.clone();
        if let Some(current) = self.entries.get(&patient_id) {
            if current.completed_at() > entry.completed_at() {
                debug!(
                    patient_id = %patient_id,
                    stale_session = %entry.session_id(),
                    shown_session = %current.session_id(),
                    "older submission not shown"
                );
                return Some(entry);
            }
        }

        let previous = self.entries.insert(patient_id.clone(), entry);
        if let Some(old) = &previous {
            debug!(
                patient_id = %patient_id,
                superseded_session = %old.session_id(),
                "dashboard entry superseded"
            );
        }
        previous
    }

    /// All entries in dashboard order.
    pub fn entries(&self) -> Vec<&DashboardEntry> {
        let mut out: Vec<&DashboardEntry> = self.entries.values().collect();
        out.sort_by(|a, b| dashboard_order(a, b));
        out
    }

    /// Entries whose patient is in `status`, in dashboard order.
    pub fn with_status(&self, status: ReviewStatus) -> Vec<&DashboardEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.patient().status == status)
            .collect()
    }

    /// The detail view for one patient.
    pub fn entry(&self, patient_id: &PatientId) -> Option<&DashboardEntry> {
        self.entries.get(patient_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
