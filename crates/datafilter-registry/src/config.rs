//! Registration file schema.
//!
//! A `RegistrationConfig` is deserialized from TOML and holds an ordered list
//! of filter registrations. Order matters: it is the order in which filters
//! are declared to the query engine at bootstrap.
//!
//! Example:
//! ```toml
//! [[filters]]
//! name = "patient_location"
//! entity_type = "patient"
//! basis_type = "location"
//! condition = "location_id in (:basisIds)"
//! bypass_privilege = "Bypass Location Filter"
//!
//! [[filters.parameters]]
//! name = "basisIds"
//! source = "basis-ids"
//! ```

use serde::{Deserialize, Serialize};

use datafilter_contracts::{
    error::{DataFilterError, DataFilterResult},
    filter::FilterDefinition,
};

/// The top-level structure of a registration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// Registrations in declaration order.
    #[serde(default)]
    pub filters: Vec<FilterDefinition>,
}

/// Check a single registration in isolation.
///
/// A registration needs a name, an entity type, a basis type and at least one
/// parameter, and every parameter must appear in the condition as `:name`.
pub fn validate_definition(definition: &FilterDefinition) -> DataFilterResult<()> {
    let invalid = |reason: String| DataFilterError::Configuration { reason };

    if definition.name.trim().is_empty() {
        return Err(invalid(format!(
            "filter for entity type '{}' has an empty name",
            definition.entity_type
        )));
    }
    if definition.entity_type.as_str().trim().is_empty() {
        return Err(invalid(format!("filter '{}' has an empty entity_type", definition.name)));
    }
    if definition.basis_type.as_str().trim().is_empty() {
        return Err(invalid(format!("filter '{}' has an empty basis_type", definition.name)));
    }
    if definition.parameters.is_empty() {
        return Err(invalid(format!("filter '{}' declares no parameters", definition.name)));
    }

    for parameter in &definition.parameters {
        if !references_parameter(&definition.condition, &parameter.name) {
            return Err(invalid(format!(
                "filter '{}' declares parameter '{}' that its condition never references",
                definition.name, parameter.name
            )));
        }
    }

    Ok(())
}

/// Return true if `condition` contains `:name` not followed by another
/// identifier character.
fn references_parameter(condition: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let needle = format!(":{}", name);
    condition.match_indices(&needle).any(|(at, _)| {
        condition[at + needle.len()..]
            .chars()
            .next()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_'))
    })
}
