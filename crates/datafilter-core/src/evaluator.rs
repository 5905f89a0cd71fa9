//! The access evaluator: turns "who is asking, for what entity type" into the
//! effective access set and the parameters the query engine binds.
//!
//! Evaluation order:
//!
//!   Toggle → Registration → Super user / bypass → Grant store
//!
//! The toggle and privilege checks short-circuit before any store read, and
//! this is the only place those checks live. An empty grant set always
//! yields `NoAccess`; absence of grants never falls through to
//! `Unrestricted`.

use std::{collections::BTreeSet, sync::Arc};

use tracing::{debug, warn};

use datafilter_contracts::{
    access::{EffectiveAccess, FailurePolicy, FilterBinding},
    error::{DataFilterError, DataFilterResult},
    filter::{EntityType, FilterDefinition},
    principal::Principal,
};

use crate::{
    toggles::FilterToggles,
    traits::{FilterRegistrations, GrantStore, IdentityProvider},
};

/// Computes effective access sets. Cheap to share; holds only `Arc`s.
///
/// Nothing is cached between calls: every evaluation reads the toggles and the
/// grant store afresh, so a grant or revoke is visible to the next query.
#[derive(Clone)]
pub struct AccessEvaluator {
    registry: Arc<dyn FilterRegistrations>,
    store: Arc<dyn GrantStore>,
    identity: Arc<dyn IdentityProvider>,
    toggles: Arc<FilterToggles>,
}

impl AccessEvaluator {
    pub fn new(
        registry: Arc<dyn FilterRegistrations>,
        store: Arc<dyn GrantStore>,
        identity: Arc<dyn IdentityProvider>,
        toggles: Arc<FilterToggles>,
    ) -> Self {
        Self { registry, store, identity, toggles }
    }

    /// The toggles this evaluator reads.
    pub fn toggles(&self) -> &Arc<FilterToggles> {
        &self.toggles
    }

    /// Compute the set of basis identifiers `principal` may see for
    /// `entity_type`.
    ///
    /// # Errors
    ///
    /// - `InvalidReference` if `entity_type` has no registered filter while
    ///   filtering is enabled for it.
    /// - `Persistence` propagated from the grant store. Callers must fail
    ///   closed on it unless they explicitly choose otherwise; see
    ///   [`binding_for`](Self::binding_for).
    pub fn effective_access(
        &self,
        principal: &Principal,
        entity_type: &EntityType,
    ) -> DataFilterResult<EffectiveAccess> {
        if !self.toggles.is_enabled(entity_type) {
            debug!(
                principal = %principal.id,
                entity_type = %entity_type,
                "filtering disabled for entity type"
            );
            return Ok(EffectiveAccess::Unrestricted);
        }

        let definition = self.definition(entity_type)?;
        self.evaluate(principal, definition)
    }

    /// Compute the filter binding for one query.
    ///
    /// `on_store_failure` decides what a `Persistence` error turns into:
    /// `FailClosed` binds the no-access parameters, `FailOpen` leaves the
    /// filter off. Any other error is returned unchanged.
    pub fn binding_for(
        &self,
        principal: &Principal,
        entity_type: &EntityType,
        on_store_failure: FailurePolicy,
    ) -> DataFilterResult<FilterBinding> {
        if !self.toggles.is_enabled(entity_type) {
            return Ok(FilterBinding::Unfiltered);
        }

        let definition = self.definition(entity_type)?;
        let access = match self.evaluate(principal, definition) {
            Ok(access) => access,
            Err(e) if e.is_persistence() => {
                warn!(
                    principal = %principal.id,
                    entity_type = %entity_type,
                    policy = ?on_store_failure,
                    error = %e,
                    "grant lookup failed"
                );
                match on_store_failure {
                    FailurePolicy::FailClosed => EffectiveAccess::NoAccess,
                    FailurePolicy::FailOpen => EffectiveAccess::Unrestricted,
                }
            }
            Err(e) => return Err(e),
        };

        Ok(FilterBinding::for_access(definition, &principal.id, &access))
    }

    fn definition(&self, entity_type: &EntityType) -> DataFilterResult<&FilterDefinition> {
        self.registry
            .registration_for(entity_type)
            .ok_or_else(|| DataFilterError::InvalidReference {
                reason: format!("no filter is registered for entity type '{}'", entity_type),
            })
    }

    fn evaluate(
        &self,
        principal: &Principal,
        definition: &FilterDefinition,
    ) -> DataFilterResult<EffectiveAccess> {
        if self.identity.is_super_user(principal) {
            debug!(principal = %principal.id, "super user, filtering skipped");
            return Ok(EffectiveAccess::Unrestricted);
        }

        if let Some(privilege) = &definition.bypass_privilege {
            if self.identity.has_privilege(principal, privilege) {
                debug!(
                    principal = %principal.id,
                    privilege = %privilege,
                    entity_type = %definition.entity_type,
                    "bypass privilege held, filtering skipped"
                );
                return Ok(EffectiveAccess::Unrestricted);
            }
        }

        // Counted by stored identifier; the basis entity is never resolved
        // here, so grants on externally deleted entities are kept.
        let identifiers: BTreeSet<String> = self
            .store
            .list_grants(&principal.id, &definition.basis_type)?
            .into_iter()
            .map(|g| g.basis.identifier)
            .collect();

        debug!(
            principal = %principal.id,
            entity_type = %definition.entity_type,
            granted = identifiers.len(),
            "effective access computed"
        );

        Ok(EffectiveAccess::from_identifiers(identifiers))
    }
}
