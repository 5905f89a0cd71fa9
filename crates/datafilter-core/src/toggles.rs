//! Process-wide "filtering enabled" switches, one per filtered entity type.
//!
//! Filtering is enabled for every type unless explicitly disabled. The
//! evaluator reads the switch on every call instead of caching it, so a
//! re-enable takes effect on the next query.

use std::{
    collections::BTreeSet,
    sync::{PoisonError, RwLock},
};

use tracing::{info, warn};

use datafilter_contracts::filter::EntityType;

/// Environment variable holding a comma-separated list of entity types whose
/// filtering starts disabled.
pub const DISABLED_TYPES_ENV: &str = "DATAFILTER_DISABLED_TYPES";

/// Administrative switchboard for entity-type filtering.
///
/// Share one instance across the process behind an `Arc`.
#[derive(Debug, Default)]
pub struct FilterToggles {
    disabled: RwLock<BTreeSet<EntityType>>,
}

impl FilterToggles {
    /// All types enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `DATAFILTER_DISABLED_TYPES`, if set.
    pub fn from_env() -> Self {
        match std::env::var(DISABLED_TYPES_ENV) {
            Ok(value) => Self::from_disabled_list(&value),
            Err(_) => Self::new(),
        }
    }

    /// Build from a comma-separated list of disabled entity types.
    pub fn from_disabled_list(list: &str) -> Self {
        let disabled: BTreeSet<EntityType> = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(EntityType::new)
            .collect();

        for entity_type in &disabled {
            warn!(entity_type = %entity_type, "filtering disabled at startup");
        }

        Self {
            disabled: RwLock::new(disabled),
        }
    }

    /// Return true unless filtering has been disabled for `entity_type`.
    pub fn is_enabled(&self, entity_type: &EntityType) -> bool {
        // A poisoned lock still holds a consistent set; reading it keeps the
        // switch fail-closed.
        let disabled = self.disabled.read().unwrap_or_else(PoisonError::into_inner);
        !disabled.contains(entity_type)
    }

    pub fn disable(&self, entity_type: &EntityType) {
        let mut disabled = self.disabled.write().unwrap_or_else(PoisonError::into_inner);
        if disabled.insert(entity_type.clone()) {
            warn!(entity_type = %entity_type, "filtering disabled");
        }
    }

    pub fn enable(&self, entity_type: &EntityType) {
        let mut disabled = self.disabled.write().unwrap_or_else(PoisonError::into_inner);
        if disabled.remove(entity_type) {
            info!(entity_type = %entity_type, "filtering re-enabled");
        }
    }
}
