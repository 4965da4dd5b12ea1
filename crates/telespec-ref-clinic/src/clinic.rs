//! Wiring for the reference clinic.
//!
//! `Clinic` owns one shared catalog, the submission pipeline, the ledger,
//! the patient repository, and the specialist dashboard. Rule sets are the
//! embedded TOML documents under `config/` unless overridden.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use telespec_audit::InMemorySubmissionLedger;
use telespec_catalog::TomlQuestionCatalog;
use telespec_contracts::{
    answer::AnswerValue,
    dashboard::DashboardEntry,
    error::{TelespecError, TelespecResult},
    question::QuestionId,
    risk::{RiskFlag, Severity},
    session::{PatientId, SubmissionSnapshot},
};
use telespec_core::{
    dashboard::{project, DashboardBoard},
    session::IntakeSession,
    submit::Submitter,
    traits::{QuestionCatalog, SubmissionSink},
};
use telespec_risk::TomlRiskEngine;
use telespec_summary::IsbarBuilder;
use telespec_verify::ProvenanceVerifier;

use crate::patients::PatientRepository;

// ── Embedded configuration ────────────────────────────────────────────────────

pub const CATALOG_TOML: &str = include_str!("../config/catalog.toml");
pub const RISK_RULES_TOML: &str = include_str!("../config/risk_rules.toml");
pub const SUMMARY_TOML: &str = include_str!("../config/summary.toml");

/// The three TOML documents a clinic is built from.
#[derive(Debug, Clone)]
pub struct ClinicConfig {
    pub catalog: String,
    pub risk_rules: String,
    pub summary: String,
}

impl ClinicConfig {
    /// The embedded reference configuration.
    pub fn reference() -> Self {
        Self {
            catalog: CATALOG_TOML.to_string(),
            risk_rules: RISK_RULES_TOML.to_string(),
            summary: SUMMARY_TOML.to_string(),
        }
    }

    /// Replace any document whose path is given with that file's contents.
    pub fn with_overrides(
        mut self,
        catalog: Option<&Path>,
        risk_rules: Option<&Path>,
        summary: Option<&Path>,
    ) -> TelespecResult<Self> {
        if let Some(path) = catalog {
            self.catalog = read_config(path)?;
        }
        if let Some(path) = risk_rules {
            self.risk_rules = read_config(path)?;
        }
        if let Some(path) = summary {
            self.summary = read_config(path)?;
        }
        Ok(self)
    }
}

fn read_config(path: &Path) -> TelespecResult<String> {
    std::fs::read_to_string(path).map_err(|e| TelespecError::ConfigError {
        reason: format!("failed to read config file '{}': {}", path.display(), e),
    })
}

// ── Arc-wrapped ledger helper ─────────────────────────────────────────────────

/// Lets an `Arc<InMemorySubmissionLedger>` be handed to the submitter as
/// `Box<dyn SubmissionSink>` while the clinic keeps an inspectable handle.
struct ArcLedger(Arc<InMemorySubmissionLedger>);

impl SubmissionSink for ArcLedger {
    fn write(&self, snapshot: &SubmissionSnapshot) -> TelespecResult<()> {
        self.0.write(snapshot)
    }
}

/// Check registered with the verifier: a critical flag must come with at
/// least one recommendation.
pub const CRITICAL_NEEDS_RECOMMENDATION: &str = "critical-needs-recommendation";

// ── Clinic ────────────────────────────────────────────────────────────────────

pub struct Clinic {
    catalog: Arc<dyn QuestionCatalog>,
    submitter: Submitter,
    ledger: Arc<InMemorySubmissionLedger>,
    patients: PatientRepository,
    board: DashboardBoard,
}

impl Clinic {
    /// Load and cross-check every rule set, then wire the pipeline.
    ///
    /// Returns `ConfigError` if any document is invalid, a rule reads a
    /// question the catalog lacks, or a summary rule names an unknown flag.
    pub fn new(config: &ClinicConfig, patients: PatientRepository) -> TelespecResult<Self> {
        let catalog = TomlQuestionCatalog::from_toml_str(&config.catalog)?;
        let risk = TomlRiskEngine::from_toml_str(&config.risk_rules)?;
        let summary = IsbarBuilder::from_toml_str(&config.summary)?;

        risk.check_against(&catalog)?;
        summary.check_against(&catalog)?;
        for flag in summary.referenced_flags() {
            if !risk.rules().iter().any(|r| r.id == flag) {
                return Err(TelespecError::ConfigError {
                    reason: format!("summary rules cite flag '{flag}' which no risk rule raises"),
                });
            }
        }

        let mut verifier = ProvenanceVerifier::new();
        verifier.register_check(
            CRITICAL_NEEDS_RECOMMENDATION,
            Box::new(|snapshot| {
                let critical = snapshot.flags.iter().any(|f| f.severity == Severity::Critical);
                (critical && snapshot.summary.recommendation.is_empty())
                    .then(|| "a critical flag was raised but no recommendation was produced".to_string())
            }),
        );

        let ledger = Arc::new(InMemorySubmissionLedger::new());
        let submitter = Submitter::new(
            Box::new(risk),
            Box::new(summary),
            Box::new(verifier),
            Box::new(ArcLedger(Arc::clone(&ledger))),
        );

        info!(
            questions = catalog.len(),
            patients = patients.len(),
            "clinic ready"
        );

        Ok(Self {
            catalog: Arc::new(catalog),
            submitter,
            ledger,
            patients,
            board: DashboardBoard::new(),
        })
    }

    /// The reference clinic: embedded configuration and the sample patients
    /// with appointments today.
    pub fn reference() -> TelespecResult<Self> {
        let today = chrono::Utc::now().date_naive();
        Self::new(&ClinicConfig::reference(), PatientRepository::sample(today))
    }

    /// Begin an intake for a known patient.
    pub fn start_intake(&self, patient_id: &PatientId) -> TelespecResult<IntakeSession> {
        if self.patients.get(patient_id).is_none() {
            return Err(TelespecError::InvalidTransition {
                reason: format!("patient '{patient_id}' has no appointment at this clinic"),
            });
        }
        IntakeSession::new(Arc::clone(&self.catalog), patient_id.clone())
    }

    /// Flags for the session's answers so far.
    pub fn preview_flags(&self, session: &IntakeSession) -> TelespecResult<Vec<RiskFlag>> {
        self.submitter.preview_flags(session)
    }

    /// Submit a completed session, store it, and publish it to the dashboard.
    ///
    /// Returns the patient's dashboard entry, which stays on a later-completed
    /// session if one was already published.
    pub fn submit(&mut self, session: &mut IntakeSession) -> TelespecResult<&DashboardEntry> {
        let patient = self
            .patients
            .get(session.patient_id())
            .cloned()
            .ok_or_else(|| TelespecError::InvalidTransition {
                reason: format!("patient '{}' is not registered", session.patient_id()),
            })?;

        let snapshot = self.submitter.submit(session)?;
        let entry = project(patient, session, snapshot.flags, snapshot.summary)?;
        let patient_id = entry.patient().patient_id.clone();
        self.board.publish(entry);

        self.board.entry(&patient_id).ok_or_else(|| TelespecError::PersistenceFailed {
            reason: format!("dashboard entry for '{patient_id}' vanished after publishing"),
        })
    }

    pub fn catalog(&self) -> &Arc<dyn QuestionCatalog> {
        &self.catalog
    }

    pub fn board(&self) -> &DashboardBoard {
        &self.board
    }

    pub fn ledger(&self) -> &InMemorySubmissionLedger {
        &self.ledger
    }

    pub fn patients(&self) -> &PatientRepository {
        &self.patients
    }
}

// ── Scripted intake ───────────────────────────────────────────────────────────

/// Drive `session` to completion: at each question, record the scripted
/// answer if there is one, then advance.
///
/// Stops with the first error, e.g. a required question missing from the
/// script.
pub fn run_script(session: &mut IntakeSession, script: &[(&str, AnswerValue)]) -> TelespecResult<()> {
    while let Some(current) = session.current().cloned() {
        if let Some((_, value)) = script.iter().find(|(id, _)| QuestionId::new(*id) == current) {
            session.set_answer(&current, value.clone())?;
        }
        session.advance()?;
    }
    Ok(())
}
