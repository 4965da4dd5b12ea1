//! # telespec-audit
//!
//! Append-only, SHA-256 hash-chained storage for submitted intake sessions.
//!
//! ## Overview
//!
//! Every submitted `SubmissionSnapshot` is wrapped in a `LedgerEntry` that
//! links to the previous entry via its SHA-256 hash. Tampering with any
//! stored snapshot, even a single answer, breaks the chain and is detected
//! by `verify_chain`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use telespec_audit::InMemorySubmissionLedger;
//! use telespec_core::traits::SubmissionSink;
//!
//! let ledger = InMemorySubmissionLedger::new();
//! ledger.write(&snapshot)?;
//!
//! assert!(ledger.verify_integrity());
//! let stored = ledger.get(snapshot.session_id);
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_submission, verify_chain};
pub use event::{LedgerEntry, LedgerExport};
pub use memory::InMemorySubmissionLedger;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use telespec_contracts::{
        answer::{Answer, AnswerValue},
        error::TelespecError,
        question::QuestionId,
        session::{PatientId, SessionId, SubmissionSnapshot},
        summary::IsbarSummary,
    };
    use telespec_core::traits::SubmissionSink;

    use super::{verify_chain, InMemorySubmissionLedger, LedgerEntry};

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Build a minimal snapshot with one distinguishable answer.
    fn make_snapshot(patient: &str, complaint: &str) -> SubmissionSnapshot {
        let now = Utc::now();
        let answer = Answer {
            question_id: QuestionId::new("chief_complaint"),
            value: AnswerValue::text(complaint),
            recorded_at: now,
            revision: 1,
        };
        SubmissionSnapshot {
            session_id: SessionId::new(),
            patient_id: PatientId::new(patient),
            history: vec![QuestionId::new("chief_complaint")],
            answers: [answer].into_iter().collect(),
            flags: vec![],
            summary: IsbarSummary::default(),
            started_at: now,
            completed_at: now,
            submitted_at: now,
        }
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_hash_chain_integrity() {
        let ledger = InMemorySubmissionLedger::new();
        ledger.write(&make_snapshot("pt-1", "cough")).unwrap();
        ledger.write(&make_snapshot("pt-2", "rash")).unwrap();
        ledger.write(&make_snapshot("pt-3", "fatigue")).unwrap();

        assert_eq!(ledger.len(), 3);
        assert!(ledger.verify_integrity(), "chain must be valid after sequential writes");
    }

    /// Editing a stored answer breaks the chain.
    #[test]
    fn test_tamper_detection() {
        let ledger = InMemorySubmissionLedger::new();
        ledger.write(&make_snapshot("pt-1", "chest pain")).unwrap();
        ledger.write(&make_snapshot("pt-2", "headache")).unwrap();

        {
            let mut state = ledger.state.lock().unwrap();
            let tampered = Answer {
                question_id: QuestionId::new("chief_complaint"),
                value: AnswerValue::text("no complaints"),
                recorded_at: Utc::now(),
                revision: 1,
            };
            state.entries[0].snapshot.answers.insert(tampered);
        }

        assert!(!ledger.verify_integrity(), "chain must detect a modified snapshot");
    }

    #[test]
    fn test_genesis_hash() {
        let ledger = InMemorySubmissionLedger::new();
        ledger.write(&make_snapshot("pt-1", "cough")).unwrap();

        let export = ledger.export();
        assert_eq!(export.entries[0].prev_hash, LedgerEntry::GENESIS_HASH);
        assert_eq!(export.entries[0].sequence, 0);
    }

    #[test]
    fn test_duplicate_session_rejected() {
        let ledger = InMemorySubmissionLedger::new();
        let snapshot = make_snapshot("pt-1", "cough");
        ledger.write(&snapshot).unwrap();

        match ledger.write(&snapshot) {
            Err(TelespecError::PersistenceFailed { reason }) => {
                assert!(reason.contains("already stored"), "unexpected reason: {reason}");
            }
            other => panic!("expected PersistenceFailed, got {:?}", other),
        }
        assert_eq!(ledger.len(), 1);
        assert!(ledger.verify_integrity());
    }

    #[test]
    fn test_get_by_session_and_patient() {
        let ledger = InMemorySubmissionLedger::new();
        let first = make_snapshot("pt-1", "cough");
        let other = make_snapshot("pt-2", "rash");
        let second = make_snapshot("pt-1", "cough and fever");
        for s in [&first, &other, &second] {
            ledger.write(s).unwrap();
        }

        assert_eq!(ledger.get(first.session_id), Some(first.clone()));
        assert_eq!(ledger.get(SessionId::new()), None);
        assert_eq!(
            ledger.latest_for_patient(&PatientId::new("pt-1")).map(|s| s.session_id),
            Some(second.session_id)
        );
        assert!(ledger.latest_for_patient(&PatientId::new("pt-9")).is_none());
    }

    #[test]
    fn test_export() {
        let ledger = InMemorySubmissionLedger::new();
        ledger.write(&make_snapshot("pt-1", "a")).unwrap();
        ledger.write(&make_snapshot("pt-2", "b")).unwrap();

        let export = ledger.export();

        assert_eq!(export.entries.len(), 2);
        assert_eq!(export.terminal_hash, export.entries[1].this_hash);
        assert!(verify_chain(&export.entries));
    }

    #[test]
    fn test_reordered_export_fails_verification() {
        let ledger = InMemorySubmissionLedger::new();
        ledger.write(&make_snapshot("pt-1", "a")).unwrap();
        ledger.write(&make_snapshot("pt-2", "b")).unwrap();

        let mut entries = ledger.export().entries;
        entries.swap(0, 1);
        assert!(!verify_chain(&entries));
    }

    #[test]
    fn test_verify_empty() {
        let ledger = InMemorySubmissionLedger::new();
        assert!(ledger.is_empty());
        assert!(ledger.verify_integrity());
        assert_eq!(ledger.export().terminal_hash, "");
        assert!(verify_chain(&[]));
    }

    #[test]
    fn test_concurrent_writers() {
        let ledger = Arc::new(InMemorySubmissionLedger::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    ledger.write(&make_snapshot(&format!("pt-{i}"), "cough")).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.len(), 8);
        assert!(ledger.verify_integrity());
    }
}
