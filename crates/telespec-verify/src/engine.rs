//! Provenance verifier for submission snapshots.
//!
//! `ProvenanceVerifier` implements the `SubmissionVerifier` trait from
//! telespec-core. Verification runs in three phases:
//!
//! 1. **Structural**: the serialized snapshot is validated against the
//!    snapshot JSON Schema using the `jsonschema` crate.
//! 2. **Provenance**: every statement must trace to an answer revision or a
//!    flag actually present in the snapshot, and every flag to answered
//!    questions. The snapshot must be internally consistent.
//! 3. **Custom**: checks registered by the hosting clinic via
//!    `register_check`, run in name order.
//!
//! All failures are collected before returning so operators see the full
//! failure set in one pass.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::{debug, warn};

use telespec_contracts::{
    error::TelespecResult,
    session::SubmissionSnapshot,
    summary::Provenance,
    verify::{VerificationFailure, VerificationReport},
};
use telespec_core::traits::SubmissionVerifier;

use crate::schema::snapshot_schema;

/// A caller-supplied snapshot check.
///
/// Returns `Some(message)` when the check fails, `None` on success.
pub type CustomCheckFn = Box<dyn Fn(&SubmissionSnapshot) -> Option<String> + Send + Sync>;

/// The last gate before a snapshot is stored.
pub struct ProvenanceVerifier {
    schema: serde_json::Value,
    custom_checks: BTreeMap<String, CustomCheckFn>,
}

impl ProvenanceVerifier {
    /// A verifier using the built-in snapshot schema and no custom checks.
    pub fn new() -> Self {
        Self::with_schema(snapshot_schema())
    }

    /// A verifier validating against `schema` instead of the built-in one.
    /// `Value::Null` skips the structural phase.
    pub fn with_schema(schema: serde_json::Value) -> Self {
        Self { schema, custom_checks: BTreeMap::new() }
    }

    /// Register a custom check under `name`. Registering the same name twice
    /// replaces the previous check.
    pub fn register_check(&mut self, name: impl Into<String>, check: CustomCheckFn) {
        self.custom_checks.insert(name.into(), check);
    }

    // ── Phase 1 ───────────────────────────────────────────────────────────────

    fn check_structure(&self, snapshot: &SubmissionSnapshot, failures: &mut Vec<VerificationFailure>) {
        if self.schema.is_null() {
            return;
        }

        let instance = match serde_json::to_value(snapshot) {
            Ok(value) => value,
            Err(e) => {
                fail(failures, "json-schema", format!("snapshot could not be serialized: {e}"));
                return;
            }
        };

        match jsonschema::validator_for(&self.schema) {
            Ok(validator) => {
                for error in validator.iter_errors(&instance) {
                    fail(
                        failures,
                        "json-schema",
                        format!("JSON Schema violation at {}: {}", error.instance_path, error),
                    );
                }
            }
            Err(e) => fail(failures, "json-schema", format!("invalid JSON Schema document: {e}")),
        }
    }

    // ── Phase 2 ───────────────────────────────────────────────────────────────

    fn check_provenance(snapshot: &SubmissionSnapshot, failures: &mut Vec<VerificationFailure>) {
        for (section, statements) in snapshot.summary.sections() {
            for statement in statements {
                if statement.provenance.is_empty() {
                    fail(
                        failures,
                        "statement-provenance",
                        format!("{section} statement '{}' cites no source", statement.rule_id),
                    );
                }

                for link in &statement.provenance {
                    match link {
                        Provenance::Answer { question_id, revision } => {
                            match snapshot.answers.get(question_id) {
                                None => fail(
                                    failures,
                                    "answer-provenance",
                                    format!(
                                        "{section} statement '{}' cites unanswered question '{question_id}'",
                                        statement.rule_id
                                    ),
                                ),
                                Some(answer) if answer.revision != *revision => fail(
                                    failures,
                                    "answer-provenance",
                                    format!(
                                        "{section} statement '{}' cites revision {revision} of '{question_id}' but the stored revision is {}",
                                        statement.rule_id, answer.revision
                                    ),
                                ),
                                Some(_) => {}
                            }
                        }
                        Provenance::Flag { rule_id } => {
                            if !section.accepts_flags() {
                                fail(
                                    failures,
                                    "flag-provenance",
                                    format!(
                                        "{section} statement '{}' cites flag '{rule_id}'; flags belong in Assessment or Recommendation",
                                        statement.rule_id
                                    ),
                                );
                            }
                            if !snapshot.flags.iter().any(|f| &f.rule_id == rule_id) {
                                fail(
                                    failures,
                                    "flag-provenance",
                                    format!(
                                        "{section} statement '{}' cites flag '{rule_id}' which was not raised",
                                        statement.rule_id
                                    ),
                                );
                            }
                        }
                    }
                }
            }
        }

        for flag in &snapshot.flags {
            if flag.triggered_by.is_empty() {
                fail(
                    failures,
                    "flag-inputs",
                    format!("flag '{}' cites no answer", flag.rule_id),
                );
            }
            for question_id in &flag.triggered_by {
                if !snapshot.answers.contains(question_id) {
                    fail(
                        failures,
                        "flag-inputs",
                        format!("flag '{}' cites unanswered question '{question_id}'", flag.rule_id),
                    );
                }
            }
        }
    }

    fn check_consistency(snapshot: &SubmissionSnapshot, failures: &mut Vec<VerificationFailure>) {
        for answer in snapshot.answers.iter() {
            if !snapshot.history.contains(&answer.question_id) {
                fail(
                    failures,
                    "answers-on-path",
                    format!("answer to '{}' is not on the visited path", answer.question_id),
                );
            }
        }

        for pair in snapshot.flags.windows(2) {
            if pair[0].urgency_cmp(&pair[1]) == Ordering::Greater {
                fail(
                    failures,
                    "flag-order",
                    format!(
                        "flag '{}' is listed before more urgent flag '{}'",
                        pair[0].rule_id, pair[1].rule_id
                    ),
                );
            }
        }

        if snapshot.started_at > snapshot.completed_at || snapshot.completed_at > snapshot.submitted_at {
            fail(
                failures,
                "timeline",
                "timestamps must satisfy started_at <= completed_at <= submitted_at".to_string(),
            );
        }
    }
}

impl Default for ProvenanceVerifier {
    fn default() -> Self {
        Self::new()
    }
}

fn fail(failures: &mut Vec<VerificationFailure>, check_id: &str, message: String) {
    warn!(check_id, %message, "verification check failed");
    failures.push(VerificationFailure { check_id: check_id.to_string(), message });
}

impl SubmissionVerifier for ProvenanceVerifier {
    fn verify(&self, snapshot: &SubmissionSnapshot) -> TelespecResult<VerificationReport> {
        let mut failures = Vec::new();

        // ── Phase 1: JSON Schema structural validation ────────────────────────
        self.check_structure(snapshot, &mut failures);

        // ── Phase 2: Provenance and consistency ──────────────────────────────
        Self::check_provenance(snapshot, &mut failures);
        Self::check_consistency(snapshot, &mut failures);

        // ── Phase 3: Custom checks ────────────────────────────────────────────
        for (name, check) in &self.custom_checks {
            debug!(check_id = %name, "running custom check");
            if let Some(message) = check(snapshot) {
                fail(&mut failures, name, message);
            }
        }

        let report = VerificationReport::from_failures(failures);
        debug!(
            session_id = %snapshot.session_id,
            passed = report.passed,
            failure_count = report.failures.len(),
            "verification complete"
        );
        Ok(report)
    }
}
