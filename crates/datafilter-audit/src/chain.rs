//! Hash-chain primitives.
//!
//! Hash input layout (bytes, in order):
//!   1. sequence as 8-byte little-endian
//!   2. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   3. compact JSON of the change

use sha2::{Digest, Sha256};

use datafilter_contracts::{
    error::{DataFilterError, DataFilterResult},
    grant::GrantChange,
};

use crate::event::AuditEntry;

/// Compute the lowercase hex SHA-256 of one chain entry.
pub fn hash_entry(sequence: u64, change: &GrantChange, prev_hash: &str) -> DataFilterResult<String> {
    let change_json = serde_json::to_vec(change).map_err(|e| DataFilterError::Persistence {
        reason: format!("failed to encode grant change for audit: {}", e),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&change_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify prev-hash linkage, sequence numbering and hash correctness.
///
/// An empty chain is valid. Any entry that cannot be re-hashed counts as
/// tampered.
pub fn verify_chain(entries: &[AuditEntry]) -> bool {
    let mut expected_prev = AuditEntry::GENESIS_HASH.to_string();

    for (index, entry) in entries.iter().enumerate() {
        if entry.sequence != index as u64 || entry.prev_hash != expected_prev {
            return false;
        }

        match hash_entry(entry.sequence, &entry.change, &entry.prev_hash) {
            Ok(recomputed) if recomputed == entry.this_hash => {}
            _ => return false,
        }

        expected_prev = entry.this_hash.clone();
    }

    true
}
