//! In-memory implementation of `GrantStore`.
//!
//! Grants live in a `BTreeMap` keyed by (principal, basis type, basis
//! identifier). The key is the uniqueness constraint: a second `grant` for
//! the same triple finds the existing entry under the same lock and leaves
//! it alone, so concurrent duplicate grants converge to one record.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::Utc;
use tracing::{debug, info};

use datafilter_contracts::{
    basis::{BasisEntity, BasisRef, BasisType},
    error::{DataFilterError, DataFilterResult},
    grant::{EntityBasisMap, GrantAction, GrantChange, GrantOutcome},
    principal::PrincipalId,
};
use datafilter_core::traits::{GrantAuditWriter, GrantStore};

/// (principal, basis type, basis identifier)
type GrantKey = (PrincipalId, BasisType, String);

/// Thread-safe, in-memory grant store.
///
/// Each `grant` and `revoke` call is atomic with respect to other calls.
/// Nothing spans calls: a caller that fails halfway through a sequence of
/// calls keeps whatever already succeeded.
#[derive(Default)]
pub struct InMemoryGrantStore {
    grants: Mutex<BTreeMap<GrantKey, EntityBasisMap>>,
    audit: Option<Arc<dyn GrantAuditWriter>>,
}

impl InMemoryGrantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that reports every created and removed record to `audit`.
    pub fn with_audit(audit: Arc<dyn GrantAuditWriter>) -> Self {
        Self {
            grants: Mutex::default(),
            audit: Some(audit),
        }
    }

    /// Total number of stored grants across all principals.
    pub fn len(&self) -> DataFilterResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> DataFilterResult<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> DataFilterResult<MutexGuard<'_, BTreeMap<GrantKey, EntityBasisMap>>> {
        self.grants.lock().map_err(|e| DataFilterError::Persistence {
            reason: format!("grant store lock poisoned: {}", e),
        })
    }

    /// Called with the store lock held so audit order matches store order.
    fn audit(&self, action: GrantAction, grant: &EntityBasisMap) -> DataFilterResult<()> {
        match &self.audit {
            Some(writer) => writer.record(&GrantChange {
                action,
                grant: grant.clone(),
                at: Utc::now(),
            }),
            None => Ok(()),
        }
    }
}

fn check_principal(principal: &PrincipalId) -> DataFilterResult<()> {
    if principal.as_str().trim().is_empty() {
        return Err(DataFilterError::InvalidReference {
            reason: "principal id is empty".to_string(),
        });
    }
    Ok(())
}

fn check_basis(basis: &BasisRef) -> DataFilterResult<()> {
    if basis.identifier.trim().is_empty() || basis.basis_type.as_str().trim().is_empty() {
        return Err(DataFilterError::InvalidReference {
            reason: format!("basis reference '{}' is incomplete", basis),
        });
    }
    Ok(())
}

impl GrantStore for InMemoryGrantStore {
    fn grant(
        &self,
        principal: &PrincipalId,
        basis: &BasisEntity,
        creator: Option<&PrincipalId>,
    ) -> DataFilterResult<GrantOutcome> {
        check_principal(principal)?;
        let basis_ref = basis.basis_ref();
        check_basis(&basis_ref)?;

        let key = (
            principal.clone(),
            basis_ref.basis_type.clone(),
            basis_ref.identifier.clone(),
        );

        let mut grants = self.lock()?;
        if grants.contains_key(&key) {
            debug!(principal = %principal, basis = %basis_ref, "already granted");
            return Ok(GrantOutcome::AlreadyGranted);
        }

        let record = EntityBasisMap::new(principal.clone(), basis_ref, creator.cloned());
        grants.insert(key, record.clone());
        info!(principal = %principal, basis = %record.basis, "access granted");

        // The record stays stored if the audit write fails.
        self.audit(GrantAction::Granted, &record)?;
        Ok(GrantOutcome::Created)
    }

    fn revoke(&self, principal: &PrincipalId, bases: &BTreeSet<BasisRef>) -> DataFilterResult<usize> {
        check_principal(principal)?;

        let mut grants = self.lock()?;
        let mut removed = 0;
        for basis in bases {
            let key = (principal.clone(), basis.basis_type.clone(), basis.identifier.clone());
            if let Some(record) = grants.remove(&key) {
                info!(principal = %principal, basis = %basis, "access revoked");
                removed += 1;
                self.audit(GrantAction::Revoked, &record)?;
            }
        }

        if removed == 0 {
            debug!(principal = %principal, requested = bases.len(), "nothing to revoke");
        }
        Ok(removed)
    }

    fn list_grants(
        &self,
        principal: &PrincipalId,
        basis_type: &BasisType,
    ) -> DataFilterResult<Vec<EntityBasisMap>> {
        check_principal(principal)?;

        let grants = self.lock()?;
        let start = (principal.clone(), basis_type.clone(), String::new());
        Ok(grants
            .range(start..)
            .take_while(|((p, t, _), _)| p == principal && t == basis_type)
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn has_access(&self, principal: &PrincipalId, basis: &BasisRef) -> DataFilterResult<bool> {
        check_principal(principal)?;
        let key = (principal.clone(), basis.basis_type.clone(), basis.identifier.clone());
        Ok(self.lock()?.contains_key(&key))
    }
}
