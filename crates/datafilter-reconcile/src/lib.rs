//! # datafilter-reconcile
//!
//! Keeps a principal's basis grants in sync with a submitted list of basis
//! names (e.g. the locations ticked on a user form).
//!
//! [`GrantReconciler`] resolves the names, diffs them against the stored
//! grants by identifier, and issues only the revokes and grants in the
//! symmetric difference. It can be called directly or wrapped around the
//! next pipeline stage with [`GrantReconciler::handle`].

pub mod reconciler;
pub mod request;

pub use reconciler::{AbortReason, GrantDiff, GrantReconciler, ReconcileOutcome};
pub use request::{PrincipalRef, ReconcileRequest};

// ── Tests ─────────────────────────────────────────────────────────────────────
