//! In-memory implementation of `SubmissionSink`.
//!
//! `InMemorySubmissionLedger` keeps every stored snapshot in a hash-chained
//! `Vec` behind a `Mutex`, plus an index by session id. It is safe to share
//! across threads that submit different sessions concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{info, warn};

use telespec_contracts::{
    error::{TelespecError, TelespecResult},
    session::{PatientId, SessionId, SubmissionSnapshot},
};
use telespec_core::traits::SubmissionSink;

use crate::{
    chain::{hash_submission, verify_chain},
    event::{LedgerEntry, LedgerExport},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct LedgerState {
    /// All entries in append order.
    pub(crate) entries: Vec<LedgerEntry>,

    /// Position in `entries` for each stored session.
    pub(crate) index: HashMap<SessionId, usize>,

    /// The `this_hash` of the last entry, or `GENESIS_HASH`.
    pub(crate) last_hash: String,
}

// ── Public ledger ─────────────────────────────────────────────────────────────

/// An in-memory, append-only submission store backed by a SHA-256 hash chain.
///
/// Each session id can be written once; a second write is rejected with
/// `PersistenceFailed` and leaves the chain untouched.
pub struct InMemorySubmissionLedger {
    pub(crate) state: Arc<Mutex<LedgerState>>,
}

impl InMemorySubmissionLedger {
    pub fn new() -> Self {
        let state = LedgerState {
            entries: Vec::new(),
            index: HashMap::new(),
            last_hash: LedgerEntry::GENESIS_HASH.to_string(),
        };
        Self { state: Arc::new(Mutex::new(state)) }
    }

    /// The stored snapshot for `session_id`.
    pub fn get(&self, session_id: SessionId) -> Option<SubmissionSnapshot> {
        let state = self.lock();
        state
            .index
            .get(&session_id)
            .map(|&i| state.entries[i].snapshot.clone())
    }

    /// The most recently stored snapshot for `patient_id`.
    pub fn latest_for_patient(&self, patient_id: &PatientId) -> Option<SubmissionSnapshot> {
        self.lock()
            .entries
            .iter()
            .rev()
            .find(|e| &e.snapshot.patient_id == patient_id)
            .map(|e| e.snapshot.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Export every entry written so far.
    pub fn export(&self) -> LedgerExport {
        let state = self.lock();
        let terminal_hash = state
            .entries
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        LedgerExport {
            entries: state.entries.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        }
    }

    /// Confirm the stored chain has not been tampered with.
    pub fn verify_integrity(&self) -> bool {
        verify_chain(&self.lock().entries)
    }

    /// A poisoned lock still guards a consistent chain: entries are only
    /// pushed after their hash is computed.
    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemorySubmissionLedger {
    fn default() -> Self {
        Self::new()
    }
}

// ── SubmissionSink impl ───────────────────────────────────────────────────────

impl SubmissionSink for InMemorySubmissionLedger {
    /// Append `snapshot` to the chain, keyed by its session id.
    fn write(&self, snapshot: &SubmissionSnapshot) -> TelespecResult<()> {
        let mut state = self.state.lock().map_err(|e| TelespecError::PersistenceFailed {
            reason: format!("ledger lock poisoned: {}", e),
        })?;

        let session_id = snapshot.session_id;
        if state.index.contains_key(&session_id) {
            warn!(session_id = %session_id, "duplicate submission rejected by ledger");
            return Err(TelespecError::PersistenceFailed {
                reason: format!("session '{session_id}' is already stored"),
            });
        }

        let sequence = state.entries.len() as u64;
        let prev_hash = state.last_hash.clone();
        let this_hash = hash_submission(sequence, snapshot, &prev_hash)?;

        state.entries.push(LedgerEntry {
            sequence,
            session_id,
            snapshot: snapshot.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.index.insert(session_id, sequence as usize);
        state.last_hash = this_hash;

        info!(
            session_id = %session_id,
            patient_id = %snapshot.patient_id,
            sequence,
            hash = %state.last_hash,
            "submission stored"
        );
        Ok(())
    }
}
