//! Basis entity types.
//!
//! A basis entity is the scoping object access is granted against, e.g. a
//! care location. Basis entities are owned externally; the engine only looks
//! them up by name and copies their identifier into grant records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discriminator naming the kind of basis entity (e.g. `"location"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BasisType(pub String);

impl BasisType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BasisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opaque reference to a basis entity: its type plus its identifier string.
///
/// Grants store this rather than the entity itself so that a grant stays
/// addressable after the entity has been deleted externally.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BasisRef {
    pub basis_type: BasisType,
    pub identifier: String,
}

impl BasisRef {
    pub fn new(basis_type: BasisType, identifier: impl Into<String>) -> Self {
        Self {
            basis_type,
            identifier: identifier.into(),
        }
    }
}

impl fmt::Display for BasisRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.basis_type, self.identifier)
    }
}

/// A resolved basis entity as supplied by the basis directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasisEntity {
    /// Stable identifier, copied into grant records.
    pub identifier: String,
    /// Human-readable name or code used for lookup by name.
    pub name: String,
    /// Which kind of basis this is.
    pub basis_type: BasisType,
}

impl BasisEntity {
    pub fn new(basis_type: BasisType, identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            basis_type,
        }
    }

    /// The reference grant records use for this entity.
    pub fn basis_ref(&self) -> BasisRef {
        BasisRef::new(self.basis_type.clone(), self.identifier.clone())
    }
}
