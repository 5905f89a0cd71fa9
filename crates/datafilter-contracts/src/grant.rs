//! Entity-basis grant records.
//!
//! An `EntityBasisMap` says "this principal may see records associated with
//! this basis". Records are created and deleted, never updated in place, so
//! `date_created` always reflects when the access was first given.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{basis::BasisRef, principal::PrincipalId};

/// A stored (principal, basis, basis-type) authorization record.
///
/// The triple (`principal`, `basis.identifier`, `basis.basis_type`) is unique
/// within a grant store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityBasisMap {
    /// Unique id of this record.
    pub uuid: Uuid,
    /// The principal access was granted to.
    pub principal: PrincipalId,
    /// The basis the principal may see, by type and identifier.
    pub basis: BasisRef,
    /// Who created the grant, when known.
    pub creator: Option<PrincipalId>,
    /// When the grant was created (UTC).
    pub date_created: DateTime<Utc>,
}

impl EntityBasisMap {
    /// Create a fresh record stamped with the current time.
    pub fn new(principal: PrincipalId, basis: BasisRef, creator: Option<PrincipalId>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            principal,
            basis,
            creator,
            date_created: Utc::now(),
        }
    }

    /// The stored basis identifier, whether or not the entity still resolves.
    pub fn basis_identifier(&self) -> &str {
        &self.basis.identifier
    }
}

/// What a `grant` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantOutcome {
    /// A new record was stored.
    Created,
    /// The pair was already granted; nothing changed.
    AlreadyGranted,
}

/// The kind of mutation reported to the grant audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrantAction {
    Granted,
    Revoked,
}

/// One grant store mutation, as written to the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantChange {
    pub action: GrantAction,
    /// The record created or removed.
    pub grant: EntityBasisMap,
    /// When the mutation happened (UTC).
    pub at: DateTime<Utc>,
}
