//! # datafilter-store
//!
//! Reference implementation of the
//! [`GrantStore`](datafilter_core::traits::GrantStore) trait.
//!
//! [`InMemoryGrantStore`] enforces the uniqueness of
//! (principal, basis identifier, basis type) in its own key space rather
//! than by checking before inserting, and optionally reports every mutation
//! to a [`GrantAuditWriter`](datafilter_core::traits::GrantAuditWriter).

pub mod memory;

pub use memory::InMemoryGrantStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
