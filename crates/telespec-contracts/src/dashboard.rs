//! Specialist-facing read model.
//!
//! A `DashboardEntry` is assembled once per submitted session and exposes
//! its contents through accessors only; consumers cannot modify it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    risk::{RiskFlag, Severity},
    session::{PatientId, SessionId},
    summary::IsbarSummary,
};

/// Where a patient is in the specialist's review workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewStatus {
    /// Intake submitted, not yet looked at.
    Pending,
    /// A consultation slot is booked.
    Scheduled,
    /// The specialist has reviewed the summary.
    Reviewed,
}

/// Patient metadata from the clinic's patient repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: PatientId,
    pub name: String,
    pub age: Option<u32>,
    pub sex: String,
    /// Specialty the patient is referred to, e.g. "Cardiology".
    pub specialty: String,
    /// Medical record number.
    pub mrn: String,
    pub appointment_at: DateTime<Utc>,
    pub status: ReviewStatus,
}

/// One patient's row on the specialist dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardEntry {
    patient: PatientRecord,
    session_id: SessionId,
    completed_at: DateTime<Utc>,
    flags: Vec<RiskFlag>,
    summary: IsbarSummary,
}

impl DashboardEntry {
    pub fn new(
        patient: PatientRecord,
        session_id: SessionId,
        completed_at: DateTime<Utc>,
        flags: Vec<RiskFlag>,
        summary: IsbarSummary,
    ) -> Self {
        Self { patient, session_id, completed_at, flags, summary }
    }

    pub fn patient(&self) -> &PatientRecord {
        &self.patient
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Flags, most severe first.
    pub fn flags(&self) -> &[RiskFlag] {
        &self.flags
    }

    pub fn summary(&self) -> &IsbarSummary {
        &self.summary
    }

    pub fn highest_severity(&self) -> Option<Severity> {
        self.flags.iter().map(|f| f.severity).max()
    }

    /// True when at least one flag was raised (the list view's alert marker).
    pub fn has_risk(&self) -> bool {
        !self.flags.is_empty()
    }
}
