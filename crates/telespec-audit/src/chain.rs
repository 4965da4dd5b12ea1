//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! Hash input layout (bytes, in order):
//!   1. session_id as UTF-8 bytes (hyphenated UUID)
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. compact JSON of the snapshot

use sha2::{Digest, Sha256};

use telespec_contracts::{
    error::{TelespecError, TelespecResult},
    session::SubmissionSnapshot,
};

use crate::event::LedgerEntry;

/// Compute the SHA-256 hash for one ledger entry.
///
/// Returns a lowercase 64-character hex string, or `PersistenceFailed` if
/// the snapshot cannot be serialized.
pub fn hash_submission(
    sequence: u64,
    snapshot: &SubmissionSnapshot,
    prev_hash: &str,
) -> TelespecResult<String> {
    let snapshot_json = serde_json::to_vec(snapshot).map_err(|e| TelespecError::PersistenceFailed {
        reason: format!("snapshot for session '{}' is not serializable: {e}", snapshot.session_id),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(snapshot.session_id.to_string().as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&snapshot_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify the integrity of a hash chain.
///
/// Valid when every entry's `prev_hash` equals the previous entry's
/// `this_hash` (or `GENESIS_HASH` for the first), every `this_hash` matches
/// the value recomputed from the entry, and sequences run 0, 1, 2, ….
/// An empty chain is valid.
pub fn verify_chain(entries: &[LedgerEntry]) -> bool {
    let mut expected_prev = LedgerEntry::GENESIS_HASH.to_string();

    for (position, entry) in entries.iter().enumerate() {
        if entry.sequence != position as u64 || entry.prev_hash != expected_prev {
            return false;
        }
        if entry.session_id != entry.snapshot.session_id {
            return false;
        }

        match hash_submission(entry.sequence, &entry.snapshot, &entry.prev_hash) {
            Ok(recomputed) if recomputed == entry.this_hash => {}
            _ => return false,
        }

        expected_prev = entry.this_hash.clone();
    }

    true
}
