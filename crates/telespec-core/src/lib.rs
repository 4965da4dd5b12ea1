//! # telespec-core
//!
//! The intake engine: answer validation, the per-session `AnswerStore`, the
//! `IntakeSession` state machine, the `Submitter` that turns a completed
//! session into a verified, persisted snapshot, and the dashboard projection.
//!
//! This crate provides:
//! - The five seam traits (`QuestionCatalog`, `RiskEngine`, `SummaryBuilder`,
//!   `SubmissionVerifier`, `SubmissionSink`)
//! - Three-valued condition evaluation shared by branching and risk rules
//! - The session, submitter, and dashboard board
//!
//! ## Usage
//!
//! ```rust,ignore
//! use telespec_core::{IntakeSession, Submitter};
//!
//! let mut session = IntakeSession::new(catalog.clone(), patient_id)?;
//! session.set_answer(&"chief_complaint".into(), AnswerValue::text("chest pain"))?;
//! session.advance()?;
//! // ...
//! let snapshot = submitter.submit(&mut session)?;
//! ```

pub mod answers;
pub mod condition;
pub mod dashboard;
pub mod session;
pub mod submit;
pub mod traits;
pub mod validate;

pub use answers::AnswerStore;
pub use dashboard::{project, DashboardBoard};
pub use session::{IntakeSession, IntakeStep, Progress, SessionState};
pub use submit::Submitter;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use chrono::{Duration, TimeZone, Utc};

    use telespec_contracts::{
        answer::{AnswerSet, AnswerValue},
        condition::Condition,
        dashboard::{DashboardEntry, PatientRecord, ReviewStatus},
        error::{TelespecError, TelespecResult},
        question::{AnswerType, Branch, Constraint, ConstraintKind, NextStep, Question, QuestionId},
        risk::{RiskFlag, Severity},
        session::{PatientId, SessionId, SubmissionSnapshot},
        summary::{IsbarSection, IsbarSummary, Provenance, Statement},
        verify::{VerificationFailure, VerificationReport},
    };

    use crate::{
        condition::{possible_successors, resolve_next},
        dashboard::{project, DashboardBoard},
        session::{IntakeSession, IntakeStep, SessionState},
        submit::Submitter,
        traits::{QuestionCatalog, RiskEngine, SubmissionSink, SubmissionVerifier, SummaryBuilder},
    };

    // ── Mock helpers ─────────────────────────────────────────────────────────

    fn qid(id: &str) -> QuestionId {
        QuestionId::new(id)
    }

    /// A catalog held in a map, resolving branches with the shared helpers.
    struct MockCatalog {
        start: QuestionId,
        questions: BTreeMap<QuestionId, Question>,
    }

    impl MockCatalog {
        fn new(start: &str, questions: Vec<Question>) -> Arc<dyn QuestionCatalog> {
            Arc::new(Self {
                start: qid(start),
                questions: questions.into_iter().map(|q| (q.id.clone(), q)).collect(),
            })
        }
    }

    impl QuestionCatalog for MockCatalog {
        fn start(&self) -> &QuestionId {
            &self.start
        }

        fn question(&self, id: &QuestionId) -> TelespecResult<&Question> {
            self.questions
                .get(id)
                .ok_or_else(|| TelespecError::UnknownQuestion { question_id: id.0.clone() })
        }

        fn len(&self) -> usize {
            self.questions.len()
        }

        fn next_question(&self, current: &QuestionId, answers: &AnswerSet) -> TelespecResult<NextStep> {
            Ok(resolve_next(self.question(current)?, answers))
        }

        fn longest_path_len(&self, from: &QuestionId, answers: &AnswerSet) -> TelespecResult<usize> {
            let mut best = 0;
            for step in possible_successors(self.question(from)?, answers) {
                let len = match step {
                    NextStep::End => 0,
                    NextStep::Question(next) => self.longest_path_len(&next, answers)?,
                };
                best = best.max(len);
            }
            Ok(best + 1)
        }
    }

    fn question(
        id: &str,
        answer_type: AnswerType,
        required: bool,
        options: &[&str],
        branches: Vec<Branch>,
        next: Option<&str>,
    ) -> Question {
        Question {
            id: qid(id),
            ordinal: 0,
            prompt: format!("prompt for {id}"),
            hint: None,
            answer_type,
            constraint: Constraint {
                required,
                options: options.iter().map(|s| s.to_string()).collect(),
                ..Constraint::default()
            },
            branches,
            next: next.map(qid),
        }
    }

    /// complaint → duration → chest (Yes → cardiac) → conditions (optional) → END
    fn intake_catalog() -> Arc<dyn QuestionCatalog> {
        MockCatalog::new(
            "complaint",
            vec![
                question("complaint", AnswerType::FreeText, true, &[], vec![], Some("duration")),
                question("duration", AnswerType::ShortText, true, &[], vec![], Some("chest")),
                question(
                    "chest",
                    AnswerType::SingleChoice,
                    true,
                    &["Yes", "No"],
                    vec![Branch {
                        when: Condition::Equals { question: qid("chest"), value: "Yes".into() },
                        goto: qid("cardiac"),
                    }],
                    Some("conditions"),
                ),
                question("cardiac", AnswerType::FreeText, true, &[], vec![], Some("conditions")),
                question("conditions", AnswerType::FreeText, false, &[], vec![], None),
            ],
        )
    }

    fn patient(id: &str) -> PatientId {
        PatientId::new(id)
    }

    fn answer_and_advance(session: &mut IntakeSession, id: &str, value: AnswerValue) {
        session.set_answer(&qid(id), value).unwrap();
        session.advance().unwrap();
    }

    /// Drive a session from start to completion on the given chest answer.
    fn completed_session(catalog: &Arc<dyn QuestionCatalog>, patient_id: &str, chest: &str) -> IntakeSession {
        let mut s = IntakeSession::new(Arc::clone(catalog), patient(patient_id)).unwrap();
        answer_and_advance(&mut s, "complaint", AnswerValue::text("chest pain on exertion"));
        answer_and_advance(&mut s, "duration", AnswerValue::text("3 months"));
        answer_and_advance(&mut s, "chest", AnswerValue::choice(chest));
        if chest == "Yes" {
            answer_and_advance(&mut s, "cardiac", AnswerValue::text("pressure when climbing stairs"));
        }
        s.advance().unwrap(); // optional "conditions" skipped
        assert!(s.is_completed());
        s
    }

    struct MockRisk;

    impl RiskEngine for MockRisk {
        fn evaluate(&self, answers: &AnswerSet) -> TelespecResult<Vec<RiskFlag>> {
            let mut flags = vec![];
            if answers.value(&qid("chest")) == Some(&AnswerValue::choice("Yes")) {
                flags.push(RiskFlag {
                    rule_id: "cardiac".into(),
                    label: "Cardiac risk factors".into(),
                    severity: Severity::Critical,
                    priority: 1,
                    triggered_by: vec![qid("chest")],
                });
            }
            Ok(flags)
        }
    }

    /// One Situation statement per answer.
    struct MockSummary;

    impl SummaryBuilder for MockSummary {
        fn build(&self, answers: &AnswerSet, _flags: &[RiskFlag]) -> TelespecResult<IsbarSummary> {
            if answers.is_empty() {
                return Err(TelespecError::EmptySession);
            }
            let mut summary = IsbarSummary::default();
            for answer in answers.iter() {
                summary.push(
                    IsbarSection::Situation,
                    Statement {
                        rule_id: format!("echo-{}", answer.question_id),
                        text: answer.value.to_string(),
                        provenance: vec![Provenance::Answer {
                            question_id: answer.question_id.clone(),
                            revision: answer.revision,
                        }],
                    },
                );
            }
            Ok(summary)
        }
    }

    struct MockVerifier {
        pass: bool,
    }

    impl SubmissionVerifier for MockVerifier {
        fn verify(&self, _snapshot: &SubmissionSnapshot) -> TelespecResult<VerificationReport> {
            if self.pass {
                Ok(VerificationReport::from_failures(vec![]))
            } else {
                Ok(VerificationReport::from_failures(vec![VerificationFailure {
                    check_id: "provenance".into(),
                    message: "statement cites a missing answer".into(),
                }]))
            }
        }
    }

    /// A sink that records every write; optionally fails.
    struct MockSink {
        written: Arc<Mutex<Vec<SubmissionSnapshot>>>,
        fail: bool,
    }

    impl SubmissionSink for MockSink {
        fn write(&self, snapshot: &SubmissionSnapshot) -> TelespecResult<()> {
            if self.fail {
                return Err(TelespecError::PersistenceFailed { reason: "disk full".into() });
            }
            self.written.lock().unwrap().push(snapshot.clone());
            Ok(())
        }
    }

    fn submitter(
        verifier_passes: bool,
        sink_fails: bool,
    ) -> (Submitter, Arc<Mutex<Vec<SubmissionSnapshot>>>) {
        let written = Arc::new(Mutex::new(vec![]));
        let submitter = Submitter::new(
            Box::new(MockRisk),
            Box::new(MockSummary),
            Box::new(MockVerifier { pass: verifier_passes }),
            Box::new(MockSink { written: Arc::clone(&written), fail: sink_fails }),
        );
        (submitter, written)
    }

    // ── Session: navigation ───────────────────────────────────────────────────

    #[test]
    fn new_session_starts_at_catalog_start() {
        let s = IntakeSession::new(intake_catalog(), patient("pt-1")).unwrap();
        assert_eq!(s.current(), Some(&qid("complaint")));
        assert_eq!(s.history(), &[qid("complaint")]);
        assert!(!s.is_completed());
    }

    /// Retreating from the second question restores the first and keeps its answer.
    #[test]
    fn retreat_restores_previous_question_and_keeps_answer() {
        let mut s = IntakeSession::new(intake_catalog(), patient("pt-1")).unwrap();
        answer_and_advance(&mut s, "complaint", AnswerValue::text("chest pain on exertion"));
        assert_eq!(s.current(), Some(&qid("duration")));

        let back = s.retreat().unwrap().clone();

        assert_eq!(back, qid("complaint"));
        assert_eq!(s.current(), Some(&qid("complaint")));
        assert_eq!(
            s.get_answer(&qid("complaint")).map(|a| &a.value),
            Some(&AnswerValue::text("chest pain on exertion"))
        );
    }

    #[test]
    fn retreat_from_first_question_is_invalid() {
        let mut s = IntakeSession::new(intake_catalog(), patient("pt-1")).unwrap();
        assert!(matches!(s.retreat(), Err(TelespecError::InvalidTransition { .. })));
    }

    #[test]
    fn advance_requires_answer_to_required_question() {
        let mut s = IntakeSession::new(intake_catalog(), patient("pt-1")).unwrap();
        match s.advance() {
            Err(TelespecError::Validation { question_id, constraint, .. }) => {
                assert_eq!(question_id, "complaint");
                assert_eq!(constraint, ConstraintKind::Required);
            }
            other => panic!("expected Validation, got {:?}", other.map(|st| st.clone())),
        }
        assert_eq!(s.current(), Some(&qid("complaint")));
    }

    #[test]
    fn invalid_answer_leaves_previous_answer_in_place() {
        let mut s = IntakeSession::new(intake_catalog(), patient("pt-1")).unwrap();
        answer_and_advance(&mut s, "complaint", AnswerValue::text("headache"));
        answer_and_advance(&mut s, "duration", AnswerValue::text("2 weeks"));
        s.set_answer(&qid("chest"), AnswerValue::choice("No")).unwrap();

        let err = s.set_answer(&qid("chest"), AnswerValue::choice("Sometimes")).unwrap_err();

        assert!(err.is_recoverable());
        assert_eq!(s.get_answer(&qid("chest")).map(|a| &a.value), Some(&AnswerValue::choice("No")));
    }

    #[test]
    fn unknown_question_is_rejected() {
        let mut s = IntakeSession::new(intake_catalog(), patient("pt-1")).unwrap();
        assert!(matches!(
            s.set_answer(&qid("nope"), AnswerValue::text("x")),
            Err(TelespecError::UnknownQuestion { .. })
        ));
    }

    #[test]
    fn branch_follows_answer() {
        let catalog = intake_catalog();
        let yes = completed_session(&catalog, "pt-1", "Yes");
        let no = completed_session(&catalog, "pt-2", "No");

        assert_eq!(
            yes.history(),
            &[qid("complaint"), qid("duration"), qid("chest"), qid("cardiac"), qid("conditions")]
        );
        assert_eq!(
            no.history(),
            &[qid("complaint"), qid("duration"), qid("chest"), qid("conditions")]
        );
    }

    #[test]
    fn completed_session_is_closed() {
        let catalog = intake_catalog();
        let mut s = completed_session(&catalog, "pt-1", "No");

        assert!(matches!(s.state(), SessionState::Completed { .. }));
        assert!(matches!(
            s.set_answer(&qid("complaint"), AnswerValue::text("x")),
            Err(TelespecError::SessionClosed { .. })
        ));
        assert!(matches!(s.advance(), Err(TelespecError::SessionClosed { .. })));
        assert!(matches!(s.retreat(), Err(TelespecError::SessionClosed { .. })));
        assert!(matches!(s.current_question(), Err(TelespecError::SessionClosed { .. })));
    }

    // ── Session: progress ─────────────────────────────────────────────────────

    #[test]
    fn progress_uses_longest_reachable_path() {
        let mut s = IntakeSession::new(intake_catalog(), patient("pt-1")).unwrap();
        // Unresolved chest branch: the cardiac path is still possible.
        assert_eq!(s.progress().visited, 1);
        assert_eq!(s.progress().estimated_total, 5);

        answer_and_advance(&mut s, "complaint", AnswerValue::text("cough"));
        answer_and_advance(&mut s, "duration", AnswerValue::text("1 week"));
        answer_and_advance(&mut s, "chest", AnswerValue::choice("No"));

        // Branch resolved to the short side.
        assert_eq!(s.progress().visited, 4);
        assert_eq!(s.progress().estimated_total, 4);

        s.advance().unwrap();
        assert_eq!(s.progress().fraction(), 1.0);
        assert_eq!(s.progress().percent(), 100);
    }

    #[test]
    fn progress_never_regresses_on_forward_run() {
        let mut s = IntakeSession::new(intake_catalog(), patient("pt-1")).unwrap();
        let mut last = s.progress().fraction();
        let steps = [
            ("complaint", AnswerValue::text("cough")),
            ("duration", AnswerValue::text("1 week")),
            ("chest", AnswerValue::choice("No")),
        ];
        for (id, value) in steps {
            answer_and_advance(&mut s, id, value);
            let now = s.progress().fraction();
            assert!(now >= last, "progress regressed from {last} to {now}");
            last = now;
        }
    }

    // ── Session: effective answers and isolation ─────────────────────────────

    #[test]
    fn abandoned_branch_answers_are_not_effective() {
        let mut s = IntakeSession::new(intake_catalog(), patient("pt-1")).unwrap();
        answer_and_advance(&mut s, "complaint", AnswerValue::text("palpitations"));
        answer_and_advance(&mut s, "duration", AnswerValue::text("2 days"));
        answer_and_advance(&mut s, "chest", AnswerValue::choice("Yes"));
        s.set_answer(&qid("cardiac"), AnswerValue::text("fluttering")).unwrap();

        s.retreat().unwrap();
        answer_and_advance(&mut s, "chest", AnswerValue::choice("No"));
        assert_eq!(s.current(), Some(&qid("conditions")));

        // Kept in the store, excluded from what the engines see.
        assert!(s.answers().contains(&qid("cardiac")));
        assert!(!s.effective_answers().contains(&qid("cardiac")));
    }

    /// route (A | B→qb) → qa → q2 (qb = "x" → q3) → END
    fn detour_catalog() -> Arc<dyn QuestionCatalog> {
        MockCatalog::new(
            "route",
            vec![
                question(
                    "route",
                    AnswerType::SingleChoice,
                    true,
                    &["A", "B"],
                    vec![Branch {
                        when: Condition::Equals { question: qid("route"), value: "B".into() },
                        goto: qid("qb"),
                    }],
                    Some("qa"),
                ),
                question("qa", AnswerType::FreeText, false, &[], vec![], Some("q2")),
                question("qb", AnswerType::FreeText, false, &[], vec![], Some("q2")),
                question(
                    "q2",
                    AnswerType::FreeText,
                    false,
                    &[],
                    vec![Branch {
                        when: Condition::Equals { question: qid("qb"), value: "x".into() },
                        goto: qid("q3"),
                    }],
                    None,
                ),
                question("q3", AnswerType::FreeText, false, &[], vec![], None),
            ],
        )
    }

    #[test]
    fn abandoned_answer_does_not_steer_later_branches() {
        let mut s = IntakeSession::new(detour_catalog(), patient("pt-1")).unwrap();
        answer_and_advance(&mut s, "route", AnswerValue::choice("B"));
        s.set_answer(&qid("qb"), AnswerValue::text("x")).unwrap();
        s.retreat().unwrap();
        answer_and_advance(&mut s, "route", AnswerValue::choice("A"));
        answer_and_advance(&mut s, "qa", AnswerValue::text("fine"));
        assert_eq!(s.current(), Some(&qid("q2")));

        s.advance().unwrap();

        assert!(s.is_completed());
        assert_eq!(s.history(), &[qid("route"), qid("qa"), qid("q2")]);
        assert!(s.answers().contains(&qid("qb")));
        assert!(!s.effective_answers().contains(&qid("qb")));
        // The path re-derives from what the snapshot will hold.
        let catalog = detour_catalog();
        assert_eq!(catalog.next_question(&qid("q2"), &s.effective_answers()).unwrap(), NextStep::End);
    }

    #[test]
    fn sessions_do_not_share_answers() {
        let catalog = intake_catalog();
        let mut a = IntakeSession::new(Arc::clone(&catalog), patient("pt-a")).unwrap();
        let mut b = IntakeSession::new(Arc::clone(&catalog), patient("pt-b")).unwrap();

        answer_and_advance(&mut a, "complaint", AnswerValue::text("chest pain"));
        answer_and_advance(&mut b, "complaint", AnswerValue::text("rash"));
        answer_and_advance(&mut a, "duration", AnswerValue::text("1 day"));
        answer_and_advance(&mut b, "duration", AnswerValue::text("1 year"));
        answer_and_advance(&mut a, "chest", AnswerValue::choice("Yes"));
        answer_and_advance(&mut b, "chest", AnswerValue::choice("No"));

        assert_eq!(a.current(), Some(&qid("cardiac")));
        assert_eq!(b.current(), Some(&qid("conditions")));
        assert_eq!(
            a.get_answer(&qid("complaint")).map(|x| x.value.to_string()),
            Some("chest pain".to_string())
        );
        assert_eq!(
            b.get_answer(&qid("complaint")).map(|x| x.value.to_string()),
            Some("rash".to_string())
        );
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn sessions_on_separate_threads_stay_isolated() {
        let catalog = intake_catalog();
        let handles: Vec<_> = ["Yes", "No", "Yes", "No"]
            .into_iter()
            .enumerate()
            .map(|(i, chest)| {
                let catalog = Arc::clone(&catalog);
                std::thread::spawn(move || {
                    let s = completed_session(&catalog, &format!("pt-{i}"), chest);
                    (chest, s.history().len())
                })
            })
            .collect();

        for handle in handles {
            let (chest, len) = handle.join().unwrap();
            assert_eq!(len, if chest == "Yes" { 5 } else { 4 });
        }
    }

    #[test]
    fn replay_reproduces_history() {
        let steps = vec![
            IntakeStep::Answer { question_id: qid("complaint"), value: AnswerValue::text("dizzy") },
            IntakeStep::Advance,
            IntakeStep::Answer { question_id: qid("duration"), value: AnswerValue::text("3 days") },
            IntakeStep::Advance,
            IntakeStep::Answer { question_id: qid("chest"), value: AnswerValue::choice("Yes") },
            IntakeStep::Advance,
            IntakeStep::Retreat,
            IntakeStep::Answer { question_id: qid("chest"), value: AnswerValue::choice("No") },
            IntakeStep::Advance,
            IntakeStep::Advance,
        ];

        let catalog = intake_catalog();
        let first = IntakeSession::replay(Arc::clone(&catalog), patient("pt-1"), &steps).unwrap();
        let second = IntakeSession::replay(Arc::clone(&catalog), patient("pt-1"), &steps).unwrap();

        assert!(first.is_completed());
        assert_eq!(first.history(), second.history());
        assert_eq!(first.effective_answers().len(), second.effective_answers().len());
    }

    // ── Submitter ─────────────────────────────────────────────────────────────

    #[test]
    fn submit_requires_completed_session() {
        let (submitter, written) = submitter(true, false);
        let mut s = IntakeSession::new(intake_catalog(), patient("pt-1")).unwrap();
        assert!(matches!(submitter.submit(&mut s), Err(TelespecError::InvalidTransition { .. })));
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn submit_persists_snapshot_once() {
        let (submitter, written) = submitter(true, false);
        let catalog = intake_catalog();
        let mut s = completed_session(&catalog, "pt-1", "Yes");

        let snapshot = submitter.submit(&mut s).unwrap();

        assert!(s.is_submitted());
        assert_eq!(snapshot.session_id, s.id());
        assert_eq!(snapshot.history, s.history().to_vec());
        assert_eq!(snapshot.flags[0].label, "Cardiac risk factors");
        assert!(!snapshot.summary.is_empty());
        assert_eq!(written.lock().unwrap().len(), 1);

        assert!(matches!(submitter.submit(&mut s), Err(TelespecError::AlreadySubmitted { .. })));
        assert_eq!(written.lock().unwrap().len(), 1);
    }

    #[test]
    fn submit_with_no_answers_is_empty_session() {
        let catalog = MockCatalog::new(
            "notes",
            vec![question("notes", AnswerType::FreeText, false, &[], vec![], None)],
        );
        let mut s = IntakeSession::new(catalog, patient("pt-1")).unwrap();
        s.advance().unwrap();
        assert!(s.is_completed());

        let (submitter, written) = submitter(true, false);
        assert!(matches!(submitter.submit(&mut s), Err(TelespecError::EmptySession)));
        assert!(!s.is_submitted());
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_verification_is_not_persisted() {
        let (submitter, written) = submitter(false, false);
        let catalog = intake_catalog();
        let mut s = completed_session(&catalog, "pt-1", "No");

        match submitter.submit(&mut s) {
            Err(TelespecError::VerificationFailed { reason }) => {
                assert!(reason.contains("[provenance]"), "unexpected reason: {reason}");
            }
            other => panic!("expected VerificationFailed, got {:?}", other),
        }
        assert!(!s.is_submitted());
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_write_leaves_session_unsubmitted() {
        let (submitter, _) = submitter(true, true);
        let catalog = intake_catalog();
        let mut s = completed_session(&catalog, "pt-1", "No");

        assert!(matches!(submitter.submit(&mut s), Err(TelespecError::PersistenceFailed { .. })));
        assert!(!s.is_submitted());
    }

    #[test]
    fn preview_flags_track_changing_answers() {
        let (submitter, _) = submitter(true, false);
        let mut s = IntakeSession::new(intake_catalog(), patient("pt-1")).unwrap();
        answer_and_advance(&mut s, "complaint", AnswerValue::text("chest pain"));
        answer_and_advance(&mut s, "duration", AnswerValue::text("1 day"));

        s.set_answer(&qid("chest"), AnswerValue::choice("Yes")).unwrap();
        assert_eq!(submitter.preview_flags(&s).unwrap().len(), 1);

        s.set_answer(&qid("chest"), AnswerValue::choice("No")).unwrap();
        assert!(submitter.preview_flags(&s).unwrap().is_empty());
    }

    // ── Dashboard ─────────────────────────────────────────────────────────────

    fn record(id: &str, hours_from_now: i64, status: ReviewStatus) -> PatientRecord {
        let base = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        PatientRecord {
            patient_id: patient(id),
            name: format!("Patient {id}"),
            age: Some(50),
            sex: "Female".into(),
            specialty: "Cardiology".into(),
            mrn: format!("MT-{id}"),
            appointment_at: base + Duration::hours(hours_from_now),
            status,
        }
    }

    fn submitted_entry(
        submitter: &Submitter,
        catalog: &Arc<dyn QuestionCatalog>,
        patient_record: PatientRecord,
        chest: &str,
    ) -> DashboardEntry {
        let mut s = completed_session(catalog, &patient_record.patient_id.0, chest);
        let snapshot = submitter.submit(&mut s).unwrap();
        project(patient_record, &s, snapshot.flags, snapshot.summary).unwrap()
    }

    #[test]
    fn project_requires_submitted_session() {
        let catalog = intake_catalog();
        let s = completed_session(&catalog, "pt-1", "No");
        let result = project(record("pt-1", 0, ReviewStatus::Pending), &s, vec![], IsbarSummary::default());
        assert!(matches!(result, Err(TelespecError::InvalidTransition { .. })));
    }

    #[test]
    fn project_rejects_foreign_patient() {
        let (submitter, _) = submitter(true, false);
        let catalog = intake_catalog();
        let mut s = completed_session(&catalog, "pt-1", "No");
        let snapshot = submitter.submit(&mut s).unwrap();

        let result = project(record("pt-2", 0, ReviewStatus::Pending), &s, snapshot.flags, snapshot.summary);
        assert!(matches!(result, Err(TelespecError::InvalidTransition { .. })));
    }

    #[test]
    fn board_orders_by_appointment_then_severity() {
        let (submitter, _) = submitter(true, false);
        let catalog = intake_catalog();
        let mut board = DashboardBoard::new();

        board.publish(submitted_entry(&submitter, &catalog, record("pt-late", 5, ReviewStatus::Pending), "Yes"));
        board.publish(submitted_entry(&submitter, &catalog, record("pt-calm", 1, ReviewStatus::Scheduled), "No"));
        board.publish(submitted_entry(&submitter, &catalog, record("pt-urgent", 1, ReviewStatus::Pending), "Yes"));

        let order: Vec<&str> = board
            .entries()
            .iter()
            .map(|e| e.patient().patient_id.0.as_str())
            .collect();
        assert_eq!(order, vec!["pt-urgent", "pt-calm", "pt-late"]);

        let urgent = board.entry(&patient("pt-urgent")).unwrap();
        assert!(urgent.has_risk());
        assert_eq!(urgent.highest_severity(), Some(Severity::Critical));

        let pending: Vec<&str> = board
            .with_status(ReviewStatus::Pending)
            .iter()
            .map(|e| e.patient().patient_id.0.as_str())
            .collect();
        assert_eq!(pending, vec!["pt-urgent", "pt-late"]);
    }

    #[test]
    fn newer_submission_supersedes_entry() {
        let (submitter, _) = submitter(true, false);
        let catalog = intake_catalog();
        let mut board = DashboardBoard::new();

        let first = submitted_entry(&submitter, &catalog, record("pt-1", 0, ReviewStatus::Pending), "Yes");
        let first_session = first.session_id();
        assert!(board.publish(first).is_none());

        let second = submitted_entry(&submitter, &catalog, record("pt-1", 0, ReviewStatus::Pending), "No");
        let superseded = board.publish(second).unwrap();

        assert_eq!(superseded.session_id(), first_session);
        assert_eq!(board.len(), 1);
        assert!(!board.entry(&patient("pt-1")).unwrap().has_risk());
    }

    #[test]
    fn older_submission_does_not_replace_newer_entry() {
        let mut board = DashboardBoard::new();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap();
        let entry = |completed_at| {
            DashboardEntry::new(
                record("pt-1", 0, ReviewStatus::Pending),
                SessionId::new(),
                completed_at,
                vec![],
                IsbarSummary::default(),
            )
        };

        let newer = entry(at);
        let newer_session = newer.session_id();
        assert!(board.publish(newer).is_none());

        let older = entry(at - Duration::hours(2));
        let older_session = older.session_id();
        let returned = board.publish(older).unwrap();

        assert_eq!(returned.session_id(), older_session);
        assert_eq!(board.entry(&patient("pt-1")).unwrap().session_id(), newer_session);
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn project_puts_flags_in_display_order() {
        let (submitter, _) = submitter(true, false);
        let catalog = intake_catalog();
        let mut s = completed_session(&catalog, "pt-1", "Yes");
        let snapshot = submitter.submit(&mut s).unwrap();

        let flag = |rule_id: &str, severity, priority| RiskFlag {
            rule_id: rule_id.into(),
            label: rule_id.into(),
            severity,
            priority,
            triggered_by: vec![qid("chest")],
        };
        let shuffled = vec![
            flag("follow-up", Severity::Informational, 10),
            flag("b-warning", Severity::Warning, 40),
            flag("cardiac", Severity::Critical, 10),
            flag("a-warning", Severity::Warning, 40),
            flag("early-warning", Severity::Warning, 5),
        ];

        let entry = project(record("pt-1", 0, ReviewStatus::Pending), &s, shuffled, snapshot.summary).unwrap();

        let ids: Vec<&str> = entry.flags().iter().map(|f| f.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["cardiac", "early-warning", "a-warning", "b-warning", "follow-up"]);
        assert_eq!(entry.highest_severity(), Some(Severity::Critical));
    }

    // ── Property tests ────────────────────────────────────────────────────────

    mod properties {
        use proptest::prelude::*;

        use super::*;

        fn step_strategy() -> impl Strategy<Value = IntakeStep> {
            prop_oneof![
                Just(IntakeStep::Advance),
                Just(IntakeStep::Retreat),
                Just(IntakeStep::Answer { question_id: qid("complaint"), value: AnswerValue::text("pain") }),
                Just(IntakeStep::Answer { question_id: qid("duration"), value: AnswerValue::text("2 weeks") }),
                Just(IntakeStep::Answer { question_id: qid("chest"), value: AnswerValue::choice("Yes") }),
                Just(IntakeStep::Answer { question_id: qid("chest"), value: AnswerValue::choice("No") }),
                Just(IntakeStep::Answer { question_id: qid("cardiac"), value: AnswerValue::text("tight") }),
                Just(IntakeStep::Answer { question_id: qid("chest"), value: AnswerValue::choice("Maybe") }),
            ]
        }

        /// Apply every step, ignoring rejected ones, and return the history.
        fn run(steps: &[IntakeStep]) -> (Vec<QuestionId>, bool) {
            let mut s = IntakeSession::new(intake_catalog(), patient("pt-prop")).unwrap();
            for step in steps {
                let _ = s.apply(step);
            }
            (s.history().to_vec(), s.is_completed())
        }

        proptest! {
            /// The same step sequence always yields the same history.
            #[test]
            fn replay_is_deterministic(steps in proptest::collection::vec(step_strategy(), 0..40)) {
                prop_assert_eq!(run(&steps), run(&steps));
            }

            /// Progress stays within bounds whatever the interaction order.
            #[test]
            fn progress_is_bounded(steps in proptest::collection::vec(step_strategy(), 0..40)) {
                let mut s = IntakeSession::new(intake_catalog(), patient("pt-prop")).unwrap();
                for step in &steps {
                    let _ = s.apply(step);
                    let p = s.progress();
                    prop_assert!(p.visited <= p.estimated_total);
                    prop_assert!(p.fraction() > 0.0 && p.fraction() <= 1.0);
                }
            }
        }
    }
}
