//! Collaborator trait definitions for the datafilter engine.
//!
//! These traits mark every boundary the engine crosses:
//!
//! - `GrantStore`         : the only shared mutable resource (grant records)
//! - `FilterRegistrations`: the startup-built filter table (read-only)
//! - `IdentityProvider`   : principal lookup and privilege checks (external)
//! - `BasisDirectory`     : basis entity lookup by name (external)
//! - `QueryEngine`        : receives filter declarations at bootstrap (external)
//! - `GrantAuditWriter`   : records every grant mutation
//!
//! All of them are synchronous. Each request runs on its own worker, and the
//! only calls that may block are grant store and directory I/O.

use std::collections::BTreeSet;

use datafilter_contracts::{
    basis::{BasisEntity, BasisRef, BasisType},
    error::DataFilterResult,
    filter::{EntityType, FilterDefinition},
    grant::{EntityBasisMap, GrantChange, GrantOutcome},
    principal::{Principal, PrincipalId},
};

/// Persistent mapping of principal to basis access grants.
///
/// Implementations must enforce the (principal, basis identifier, basis type)
/// uniqueness invariant themselves, so that two concurrent `grant` calls for
/// the same pair converge to a single record.
pub trait GrantStore: Send + Sync {
    /// Grant `principal` access to `basis`.
    ///
    /// Idempotent: granting an existing pair returns
    /// `GrantOutcome::AlreadyGranted` and leaves the original record (and its
    /// creation metadata) untouched.
    fn grant(
        &self,
        principal: &PrincipalId,
        basis: &BasisEntity,
        creator: Option<&PrincipalId>,
    ) -> DataFilterResult<GrantOutcome>;

    /// Grant every entity in `bases`, returning how many records were created.
    ///
    /// Stops at the first failure. Grants issued before it stay in place.
    fn grant_all(
        &self,
        principal: &PrincipalId,
        bases: &[BasisEntity],
        creator: Option<&PrincipalId>,
    ) -> DataFilterResult<usize> {
        let mut created = 0;
        for basis in bases {
            if self.grant(principal, basis, creator)? == GrantOutcome::Created {
                created += 1;
            }
        }
        Ok(created)
    }

    /// Remove every grant `principal` holds on any of `bases`.
    ///
    /// Revoking a grant that does not exist is a no-op. Returns the number of
    /// records removed.
    fn revoke(&self, principal: &PrincipalId, bases: &BTreeSet<BasisRef>) -> DataFilterResult<usize>;

    /// Return the grants `principal` currently holds for `basis_type`.
    ///
    /// Callers treat the result as a set; order carries no meaning.
    fn list_grants(
        &self,
        principal: &PrincipalId,
        basis_type: &BasisType,
    ) -> DataFilterResult<Vec<EntityBasisMap>>;

    /// Return true if `principal` holds a grant on `basis`.
    fn has_access(&self, principal: &PrincipalId, basis: &BasisRef) -> DataFilterResult<bool> {
        Ok(self
            .list_grants(principal, &basis.basis_type)?
            .iter()
            .any(|g| g.basis_identifier() == basis.identifier))
    }
}

/// The filter registration table built at process start.
///
/// Implementations are immutable after construction, so concurrent reads need
/// no locking.
pub trait FilterRegistrations: Send + Sync {
    /// The filter registered for `entity_type`, if any.
    fn registration_for(&self, entity_type: &EntityType) -> Option<&FilterDefinition>;

    /// Every registration, in registration order.
    fn all_registrations(&self) -> &[FilterDefinition];
}

/// Identity and authorization collaborator.
///
/// The default privilege checks read the flags carried on `Principal`;
/// implementations backed by a live identity service may override them.
pub trait IdentityProvider: Send + Sync {
    /// Look a principal up by its primary identifier.
    fn find_by_id(&self, id: &str) -> DataFilterResult<Option<Principal>>;

    /// Look a principal up by its alternate identifier.
    fn find_by_alternate_id(&self, alternate_id: &str) -> DataFilterResult<Option<Principal>>;

    /// Look a principal up by login name.
    fn find_by_username(&self, username: &str) -> DataFilterResult<Option<Principal>>;

    fn is_super_user(&self, principal: &Principal) -> bool {
        principal.super_user
    }

    fn has_privilege(&self, principal: &Principal, privilege: &str) -> bool {
        principal.has_privilege(privilege)
    }
}

/// Basis directory collaborator (e.g. a location service).
pub trait BasisDirectory: Send + Sync {
    /// Resolve a human-entered name to a basis entity of `basis_type`.
    fn resolve_by_name(
        &self,
        basis_type: &BasisType,
        name: &str,
    ) -> DataFilterResult<Option<BasisEntity>>;

    /// List every known entity of `basis_type`.
    fn list_all(&self, basis_type: &BasisType) -> DataFilterResult<Vec<BasisEntity>>;
}

/// The external query engine, as seen during bootstrap.
///
/// At execution time the engine calls back into `AccessEvaluator` and binds
/// the returned parameters; the engine never reaches the grant store directly.
pub trait QueryEngine {
    /// Declare `definition` so it can later be enabled on queries.
    fn declare_filter(&mut self, definition: &FilterDefinition) -> DataFilterResult<()>;
}

/// Sink for grant store mutations.
///
/// Implementations must treat this as append-only.
pub trait GrantAuditWriter: Send + Sync {
    fn record(&self, change: &GrantChange) -> DataFilterResult<()>;
}
