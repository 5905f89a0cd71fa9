//! The filter registration table.
//!
//! `FilterRegistry` is built once at process start from a declarative list,
//! checked for conflicts, and then only read. It implements the
//! `FilterRegistrations` trait from datafilter-core.
//!
//! Build algorithm:
//!
//! 1. Validate each registration on its own (see `validate_definition`).
//! 2. For a registration whose entity type is already registered:
//!    a. identical predicate shape → keep the first, drop the repeat;
//!    b. any other shape → `Configuration` error.
//! 3. A filter name may only be used by one entity type.

use std::{collections::HashMap, path::Path};

use tracing::{debug, warn};

use datafilter_contracts::{
    error::{DataFilterError, DataFilterResult},
    filter::{EntityType, FilterDefinition},
};
use datafilter_core::traits::FilterRegistrations;

use crate::config::{validate_definition, RegistrationConfig};

/// An immutable table of filter registrations keyed by entity type.
///
/// ```rust,ignore
/// use datafilter_registry::FilterRegistry;
///
/// let registry = FilterRegistry::from_file(Path::new("registrations/clinic.toml"))?;
/// ```
#[derive(Debug, Default)]
pub struct FilterRegistry {
    definitions: Vec<FilterDefinition>,
    by_entity_type: HashMap<EntityType, usize>,
}

impl FilterRegistry {
    /// Build a registry from registrations in declaration order.
    ///
    /// Returns `DataFilterError::Configuration` on the first invalid or
    /// conflicting registration.
    pub fn from_registrations(
        registrations: impl IntoIterator<Item = FilterDefinition>,
    ) -> DataFilterResult<Self> {
        let mut registry = Self::default();
        let mut names: HashMap<String, EntityType> = HashMap::new();

        for definition in registrations {
            validate_definition(&definition)?;

            if let Some(&index) = registry.by_entity_type.get(&definition.entity_type) {
                let existing = &registry.definitions[index];
                if existing.same_shape(&definition) {
                    debug!(
                        filter = %definition.name,
                        entity_type = %definition.entity_type,
                        "duplicate registration ignored"
                    );
                    continue;
                }

                warn!(
                    entity_type = %definition.entity_type,
                    existing = %existing.name,
                    conflicting = %definition.name,
                    "conflicting filter registrations"
                );
                return Err(DataFilterError::Configuration {
                    reason: format!(
                        "filters '{}' and '{}' both claim entity type '{}' with different predicates",
                        existing.name, definition.name, definition.entity_type
                    ),
                });
            }

            if let Some(owner) = names.get(&definition.name) {
                return Err(DataFilterError::Configuration {
                    reason: format!(
                        "filter name '{}' is used for both '{}' and '{}'",
                        definition.name, owner, definition.entity_type
                    ),
                });
            }

            names.insert(definition.name.clone(), definition.entity_type.clone());
            registry
                .by_entity_type
                .insert(definition.entity_type.clone(), registry.definitions.len());
            registry.definitions.push(definition);
        }

        debug!(registrations = registry.definitions.len(), "filter registry built");
        Ok(registry)
    }

    /// Parse `s` as a TOML registration file and build the registry.
    ///
    /// Returns `DataFilterError::Configuration` if the TOML is malformed, does
    /// not match `RegistrationConfig`, or contains conflicting registrations.
    pub fn from_toml_str(s: &str) -> DataFilterResult<Self> {
        let config: RegistrationConfig =
            toml::from_str(s).map_err(|e| DataFilterError::Configuration {
                reason: format!("failed to parse registration TOML: {}", e),
            })?;
        Self::from_registrations(config.filters)
    }

    /// Read the file at `path` and build the registry from it.
    pub fn from_file(path: &Path) -> DataFilterResult<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| DataFilterError::Configuration {
                reason: format!("failed to read registration file '{}': {}", path.display(), e),
            })?;
        Self::from_toml_str(&contents)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl FilterRegistrations for FilterRegistry {
    fn registration_for(&self, entity_type: &EntityType) -> Option<&FilterDefinition> {
        self.by_entity_type
            .get(entity_type)
            .map(|&index| &self.definitions[index])
    }

    fn all_registrations(&self) -> &[FilterDefinition] {
        &self.definitions
    }
}
