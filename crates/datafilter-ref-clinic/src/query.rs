//! A toy in-memory query engine standing in for the persistence layer.
//!
//! It plays the query engine's side of the contract: filters are declared
//! once at bootstrap, and each query asks the evaluator for a binding
//! (failing closed) before returning rows. It only understands `basis-ids`
//! parameters: a row is visible when its location is among the bound ids.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use datafilter_contracts::{
    access::{FailurePolicy, FilterBinding},
    error::{DataFilterError, DataFilterResult},
    filter::{EntityType, FilterDefinition, ParameterSource},
    principal::Principal,
};
use datafilter_core::{traits::QueryEngine, AccessEvaluator};

use crate::mock_data::{patients, visits, ClinicRow};

pub struct ClinicQueryEngine {
    tables: BTreeMap<EntityType, Vec<ClinicRow>>,
    declared: BTreeMap<String, FilterDefinition>,
}

impl Default for ClinicQueryEngine {
    fn default() -> Self {
        let tables = BTreeMap::from([
            (EntityType::new("patient"), patients()),
            (EntityType::new("visit"), visits()),
        ]);
        Self {
            tables,
            declared: BTreeMap::new(),
        }
    }
}

impl ClinicQueryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the filters declared so far.
    pub fn declared_filters(&self) -> Vec<&str> {
        self.declared.keys().map(String::as_str).collect()
    }

    /// Return the rows of `entity_type` visible to `principal`.
    pub fn list(
        &self,
        evaluator: &AccessEvaluator,
        principal: &Principal,
        entity_type: &EntityType,
    ) -> DataFilterResult<Vec<ClinicRow>> {
        let rows = self
            .tables
            .get(entity_type)
            .ok_or_else(|| DataFilterError::InvalidReference {
                reason: format!("no table for entity type '{}'", entity_type),
            })?;

        let binding = evaluator.binding_for(principal, entity_type, FailurePolicy::FailClosed)?;

        let (filter_name, parameters) = match binding {
            FilterBinding::Unfiltered => return Ok(rows.clone()),
            FilterBinding::Bound { filter_name, parameters } => (filter_name, parameters),
        };

        let definition = self
            .declared
            .get(&filter_name)
            .ok_or_else(|| DataFilterError::Configuration {
                reason: format!("filter '{}' was never declared", filter_name),
            })?;

        let allowed: BTreeSet<&str> = definition
            .parameters
            .iter()
            .filter_map(|p| parameters.get(&p.name))
            .flatten()
            .map(String::as_str)
            .collect();

        debug!(
            filter = %filter_name,
            principal = %principal.id,
            allowed = allowed.len(),
            "filter bound"
        );

        Ok(rows
            .iter()
            .filter(|r| allowed.contains(r.location_id.as_str()))
            .cloned()
            .collect())
    }
}

impl QueryEngine for ClinicQueryEngine {
    fn declare_filter(&mut self, definition: &FilterDefinition) -> DataFilterResult<()> {
        if let Some(p) = definition
            .parameters
            .iter()
            .find(|p| p.source != ParameterSource::BasisIds)
        {
            return Err(DataFilterError::Configuration {
                reason: format!(
                    "filter '{}': parameter '{}' has a source this engine cannot evaluate",
                    definition.name, p.name
                ),
            });
        }
        if self.declared.contains_key(&definition.name) {
            return Err(DataFilterError::Configuration {
                reason: format!("filter '{}' is already declared", definition.name),
            });
        }

        self.declared.insert(definition.name.clone(), definition.clone());
        Ok(())
    }
}
