//! Filter definition types.
//!
//! A `FilterDefinition` is registered once at startup and tells the query
//! engine which entity type is filtered, by what predicate, and which
//! parameters must be bound when a query runs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::basis::BasisType;

/// Name of a filtered entity type (e.g. `"patient"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityType(pub String);

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the value bound to a filter parameter comes from.
///
/// Expressed in kebab-case in TOML:
/// ```toml
/// source = "basis-ids"
/// source = "principal-id"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterSource {
    /// The identifiers in the principal's effective access set.
    BasisIds,
    /// The requesting principal's own identifier.
    PrincipalId,
}

/// A named parameter a filter condition expects at query time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterParameter {
    /// Referenced in the condition as `:name`.
    pub name: String,
    pub source: ParameterSource,
}

/// A registered, parameterized visibility predicate for one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDefinition {
    /// Name the query engine declares the filter under.
    pub name: String,
    /// The entity type this filter restricts.
    pub entity_type: EntityType,
    /// The basis type grants for this filter are recorded against.
    pub basis_type: BasisType,
    /// The predicate, in the query engine's condition language.
    pub condition: String,
    /// Parameters referenced by `condition`, in declaration order.
    pub parameters: Vec<FilterParameter>,
    /// Holders of this privilege see every row of `entity_type`.
    #[serde(default)]
    pub bypass_privilege: Option<String>,
}

impl FilterDefinition {
    /// Return true if `other` describes the same predicate shape.
    ///
    /// The filter name is not part of the shape: two registrations that only
    /// differ by name still filter identically.
    pub fn same_shape(&self, other: &FilterDefinition) -> bool {
        self.entity_type == other.entity_type
            && self.basis_type == other.basis_type
            && self.condition.trim() == other.condition.trim()
            && self.parameters == other.parameters
            && self.bypass_privilege == other.bypass_privilege
    }
}
