//! Ledger entry and export types.
//!
//! `LedgerEntry` wraps one `SubmissionSnapshot` with its position in the
//! chain and the SHA-256 hashes that make tampering detectable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use telespec_contracts::session::{SessionId, SubmissionSnapshot};

/// A single stored submission in the hash chain.
///
/// Modifying any field of the embedded snapshot invalidates `this_hash` and
/// every subsequent `prev_hash`, which `verify_chain` detects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    /// Storage key. Equal to `snapshot.session_id`.
    pub session_id: SessionId,

    pub snapshot: SubmissionSnapshot,

    /// Hash of the previous entry, or `GENESIS_HASH` for the first.
    pub prev_hash: String,

    /// Hash of this entry's content.
    pub this_hash: String,
}

impl LedgerEntry {
    /// The `prev_hash` of the first entry: 64 hex zeros.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A point-in-time copy of the whole ledger.
///
/// `terminal_hash` is the last entry's `this_hash` and commits to every
/// submission stored before it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerExport {
    pub entries: Vec<LedgerEntry>,

    pub exported_at: DateTime<Utc>,

    /// Empty string if the ledger is empty.
    pub terminal_hash: String,
}
