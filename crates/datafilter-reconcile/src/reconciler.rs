//! The grant reconciler: converges a principal's stored grants to a
//! submitted list of basis names with the fewest mutations.
//!
//! Pipeline, in one pass with no persisted intermediate state:
//!
//!   Upstream status → Method → Principal → Resolve names → Current grants
//!     → Diff → Revoke → Grant
//!
//! Unchanged memberships are never touched, so their creation metadata
//! survives. Revocations are issued before grants. Nothing is rolled back:
//! if a later call fails, earlier calls stay applied.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use serde::Serialize;
use tracing::{debug, info, warn};

use datafilter_contracts::{
    basis::{BasisEntity, BasisRef, BasisType},
    error::DataFilterResult,
    principal::Principal,
};
use datafilter_core::traits::{BasisDirectory, GrantStore, IdentityProvider};

use crate::request::{non_blank, PrincipalRef, ReconcileRequest};

/// Why a reconciliation stopped before touching the grant store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AbortReason {
    /// An upstream handler already set a failure status.
    UpstreamFailed,
    /// The method does not change state.
    NonMutatingMethod,
    /// No principal reference was supplied.
    PrincipalMissing,
    /// None of the supplied references resolved to a principal.
    PrincipalUnresolved,
}

/// The terminal state of one reconciliation pass.
///
/// A store failure is not an outcome; it is returned as `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ReconcileOutcome {
    /// No name resolved, or the grants already matched.
    NoOp,
    /// Grants were changed. Identifiers are sorted.
    Reconciled {
        granted: Vec<String>,
        revoked: Vec<String>,
    },
    /// Preconditions were not met; nothing was read from or written to the
    /// grant store.
    Aborted(AbortReason),
}

/// The grant changes needed to go from `current` to `desired`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GrantDiff {
    /// `desired − current`
    pub to_grant: Vec<BasisEntity>,
    /// `current − desired`
    pub to_revoke: BTreeSet<BasisRef>,
}

impl GrantDiff {
    /// Diff by basis identifier.
    ///
    /// `current` holds stored identifiers, which may belong to entities that
    /// no longer resolve; those are revoked like any other stale grant.
    pub fn compute(
        basis_type: &BasisType,
        current: &BTreeSet<String>,
        desired: &BTreeMap<String, BasisEntity>,
    ) -> Self {
        let to_revoke = current
            .iter()
            .filter(|id| !desired.contains_key(*id))
            .map(|id| BasisRef::new(basis_type.clone(), id.clone()))
            .collect();

        let to_grant = desired
            .iter()
            .filter(|(id, _)| !current.contains(*id))
            .map(|(_, entity)| entity.clone())
            .collect();

        Self { to_grant, to_revoke }
    }

    pub fn is_empty(&self) -> bool {
        self.to_grant.is_empty() && self.to_revoke.is_empty()
    }
}

/// Reconciles basis grants of one basis type.
///
/// Reconciliations for different principals are independent. Two concurrent
/// reconciliations for the same principal are not ordered by this type;
/// callers that need that must serialize them.
pub struct GrantReconciler {
    store: Arc<dyn GrantStore>,
    identity: Arc<dyn IdentityProvider>,
    directory: Arc<dyn BasisDirectory>,
    basis_type: BasisType,
}

impl GrantReconciler {
    pub fn new(
        store: Arc<dyn GrantStore>,
        identity: Arc<dyn IdentityProvider>,
        directory: Arc<dyn BasisDirectory>,
        basis_type: BasisType,
    ) -> Self {
        Self { store, identity, directory, basis_type }
    }

    /// Run reconciliation, then hand control to `next`.
    ///
    /// The reconciler is advisory: aborted and no-op outcomes still reach
    /// `next`. Only an error stops the pipeline, in which case `next` is not
    /// called and the error is returned unchanged.
    pub fn handle<T>(
        &self,
        request: &ReconcileRequest,
        next: impl FnOnce() -> T,
    ) -> DataFilterResult<T> {
        self.reconcile(request)?;
        Ok(next())
    }

    /// Converge the grants of the request's principal to its basis names.
    pub fn reconcile(&self, request: &ReconcileRequest) -> DataFilterResult<ReconcileOutcome> {
        if request.upstream_failed() {
            debug!(status = %request.upstream_status, "upstream already failed, skipping");
            return Ok(ReconcileOutcome::Aborted(AbortReason::UpstreamFailed));
        }
        if !request.is_mutating() {
            debug!(method = %request.method, "non-mutating request, skipping");
            return Ok(ReconcileOutcome::Aborted(AbortReason::NonMutatingMethod));
        }
        if request.principal.is_empty() {
            warn!("reconciliation request carries no principal reference");
            return Ok(ReconcileOutcome::Aborted(AbortReason::PrincipalMissing));
        }

        let principal = match self.resolve_principal(&request.principal)? {
            Some(principal) => principal,
            None => {
                warn!(principal = ?request.principal, "principal reference did not resolve");
                return Ok(ReconcileOutcome::Aborted(AbortReason::PrincipalUnresolved));
            }
        };

        let desired = self.resolve_desired(&request.basis_names)?;
        if desired.is_empty() {
            debug!(principal = %principal.id, "no basis name resolved, nothing to do");
            return Ok(ReconcileOutcome::NoOp);
        }

        let current: BTreeSet<String> = self
            .store
            .list_grants(&principal.id, &self.basis_type)?
            .into_iter()
            .map(|g| g.basis.identifier)
            .collect();

        let diff = GrantDiff::compute(&self.basis_type, &current, &desired);
        if diff.is_empty() {
            debug!(principal = %principal.id, grants = current.len(), "grants already in sync");
            return Ok(ReconcileOutcome::NoOp);
        }

        // Revoke before grant.
        if !diff.to_revoke.is_empty() {
            self.store.revoke(&principal.id, &diff.to_revoke)?;
        }
        if !diff.to_grant.is_empty() {
            self.store
                .grant_all(&principal.id, &diff.to_grant, request.performed_by.as_ref())?;
        }

        let granted: Vec<String> = diff.to_grant.into_iter().map(|b| b.identifier).collect();
        let revoked: Vec<String> = diff.to_revoke.into_iter().map(|b| b.identifier).collect();

        info!(
            principal = %principal.id,
            basis_type = %self.basis_type,
            granted = granted.len(),
            revoked = revoked.len(),
            "grants reconciled"
        );

        Ok(ReconcileOutcome::Reconciled { granted, revoked })
    }

    /// Try the direct id, then the alternate id, then the username.
    fn resolve_principal(&self, reference: &PrincipalRef) -> DataFilterResult<Option<Principal>> {
        if let Some(id) = non_blank(&reference.id) {
            if let Some(principal) = self.identity.find_by_id(id)? {
                return Ok(Some(principal));
            }
        }
        if let Some(alternate_id) = non_blank(&reference.alternate_id) {
            if let Some(principal) = self.identity.find_by_alternate_id(alternate_id)? {
                return Ok(Some(principal));
            }
        }
        if let Some(username) = non_blank(&reference.username) {
            return self.identity.find_by_username(username);
        }
        Ok(None)
    }

    /// Resolve names to entities keyed by identifier. Unknown names are
    /// dropped; a stale name must not block the rest of the submission.
    fn resolve_desired(&self, names: &[String]) -> DataFilterResult<BTreeMap<String, BasisEntity>> {
        let mut desired = BTreeMap::new();
        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            match self.directory.resolve_by_name(&self.basis_type, name)? {
                Some(entity) => {
                    desired.insert(entity.identifier.clone(), entity);
                }
                None => debug!(name = %name, basis_type = %self.basis_type, "basis name did not resolve, dropped"),
            }
        }
        Ok(desired)
    }
}
