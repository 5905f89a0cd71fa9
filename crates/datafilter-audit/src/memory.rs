//! In-memory implementation of `GrantAuditWriter`.
//!
//! `InMemoryGrantAuditLog` keeps every entry in a `Vec` behind a `Mutex`, so
//! one instance can be shared by all request workers through an `Arc`.

use std::sync::Mutex;

use chrono::Utc;
use tracing::debug;

use datafilter_contracts::{
    error::{DataFilterError, DataFilterResult},
    grant::GrantChange,
};
use datafilter_core::traits::GrantAuditWriter;

use crate::{
    chain::{hash_entry, verify_chain},
    event::{AuditEntry, GrantAuditLog},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct ChainState {
    pub(crate) entries: Vec<AuditEntry>,
    /// `this_hash` of the last entry, or `GENESIS_HASH`.
    pub(crate) last_hash: String,
}

// ── Public log ────────────────────────────────────────────────────────────────

/// An in-memory, append-only grant audit log backed by a SHA-256 hash chain.
pub struct InMemoryGrantAuditLog {
    pub(crate) state: Mutex<ChainState>,
}

impl Default for InMemoryGrantAuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGrantAuditLog {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChainState {
                entries: Vec::new(),
                last_hash: AuditEntry::GENESIS_HASH.to_string(),
            }),
        }
    }

    /// Snapshot every entry written so far.
    pub fn export_log(&self) -> DataFilterResult<GrantAuditLog> {
        let state = self.lock()?;
        Ok(GrantAuditLog {
            entries: state.entries.clone(),
            exported_at: Utc::now(),
            terminal_hash: state
                .entries
                .last()
                .map(|e| e.this_hash.clone())
                .unwrap_or_default(),
        })
    }

    /// Return true if the chain has not been tampered with.
    ///
    /// A poisoned lock counts as a failed verification.
    pub fn verify_integrity(&self) -> bool {
        match self.lock() {
            Ok(state) => verify_chain(&state.entries),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> DataFilterResult<std::sync::MutexGuard<'_, ChainState>> {
        self.state.lock().map_err(|e| DataFilterError::Persistence {
            reason: format!("grant audit lock poisoned: {}", e),
        })
    }
}

// ── GrantAuditWriter impl ─────────────────────────────────────────────────────

impl GrantAuditWriter for InMemoryGrantAuditLog {
    fn record(&self, change: &GrantChange) -> DataFilterResult<()> {
        let mut state = self.lock()?;

        let sequence = state.entries.len() as u64;
        let prev_hash = state.last_hash.clone();
        let this_hash = hash_entry(sequence, change, &prev_hash)?;

        debug!(
            sequence,
            action = ?change.action,
            principal = %change.grant.principal,
            basis = %change.grant.basis,
            "grant change audited"
        );

        state.entries.push(AuditEntry {
            sequence,
            change: change.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.last_hash = this_hash;

        Ok(())
    }
}
