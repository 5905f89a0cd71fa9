//! Audit entry and exported log types.
//!
//! `AuditEntry` wraps one `GrantChange` with its position in the chain and the
//! SHA-256 hashes that make tampering detectable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use datafilter_contracts::grant::GrantChange;

/// A single link in the grant audit chain.
///
/// Modifying any field, including those of the embedded `change`, invalidates
/// `this_hash` and every later `prev_hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    /// The grant or revoke being recorded.
    pub change: GrantChange,

    /// Hash of the previous entry, or `GENESIS_HASH` for the first one.
    pub prev_hash: String,

    /// Hash over (sequence, prev_hash, canonical JSON of change).
    pub this_hash: String,
}

impl AuditEntry {
    /// The `prev_hash` of the first entry in every chain: 64 hex zeros.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A snapshot of the whole chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantAuditLog {
    /// All entries in chain order.
    pub entries: Vec<AuditEntry>,

    /// When the snapshot was taken (UTC).
    pub exported_at: DateTime<Utc>,

    /// `this_hash` of the last entry; empty when the log is empty.
    pub terminal_hash: String,
}
