//! # datafilter-audit
//!
//! Append-only, SHA-256 hash-chained record of every grant and revoke.
//!
//! Grant records are never updated in place, so the sequence of
//! created/removed records is a complete history of who could see what.
//! Each entry links to the previous one by hash; changing any stored entry
//! breaks `verify_chain`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use datafilter_audit::InMemoryGrantAuditLog;
//! use datafilter_store::InMemoryGrantStore;
//!
//! let audit = Arc::new(InMemoryGrantAuditLog::new());
//! let store = InMemoryGrantStore::with_audit(audit.clone());
//! // ... grant / revoke ...
//! assert!(audit.verify_integrity());
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_entry, verify_chain};
pub use event::{AuditEntry, GrantAuditLog};
pub use memory::InMemoryGrantAuditLog;

// ── Tests ─────────────────────────────────────────────────────────────────────
