//! Effective access sets and the filter bindings derived from them.
//!
//! Neither type is persisted. Both are computed fresh for every evaluation so
//! that a grant mutation is visible to the very next query.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    filter::{FilterDefinition, ParameterSource},
    principal::PrincipalId,
};

/// The outcome of evaluating grants and privileges for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectiveAccess {
    /// Filtering does not apply: super user, bypass privilege, or filtering
    /// disabled for the entity type.
    Unrestricted,
    /// The principal holds no grants. Nothing is visible.
    NoAccess,
    /// Only rows associated with these basis identifiers are visible.
    Restricted(BTreeSet<String>),
}

impl EffectiveAccess {
    /// Build from a set of granted identifiers. An empty set denies.
    pub fn from_identifiers(identifiers: BTreeSet<String>) -> Self {
        if identifiers.is_empty() {
            Self::NoAccess
        } else {
            Self::Restricted(identifiers)
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    /// Return true if a row scoped to `identifier` is visible.
    pub fn permits(&self, identifier: &str) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::NoAccess => false,
            Self::Restricted(ids) => ids.contains(identifier),
        }
    }
}

/// What the caller wants when the grant store cannot be read.
///
/// There is deliberately no `Default`: every call site must choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Treat the request as having no access.
    FailClosed,
    /// Leave the filter off. Only for administrative tooling.
    FailOpen,
}

/// The parameter set the query engine binds before executing a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterBinding {
    /// The filter stays disabled for this query.
    Unfiltered,
    /// Enable `filter_name` with these parameter values.
    Bound {
        filter_name: String,
        parameters: BTreeMap<String, Vec<String>>,
    },
}

impl FilterBinding {
    /// Derive the binding for `definition` from an effective access set.
    ///
    /// `NoAccess` binds an empty basis-id list so the predicate matches no row.
    pub fn for_access(
        definition: &FilterDefinition,
        principal: &PrincipalId,
        access: &EffectiveAccess,
    ) -> Self {
        let basis_ids: Vec<String> = match access {
            EffectiveAccess::Unrestricted => return Self::Unfiltered,
            EffectiveAccess::NoAccess => Vec::new(),
            EffectiveAccess::Restricted(ids) => ids.iter().cloned().collect(),
        };

        let parameters = definition
            .parameters
            .iter()
            .map(|p| {
                let values = match p.source {
                    ParameterSource::BasisIds => basis_ids.clone(),
                    ParameterSource::PrincipalId => vec![principal.0.clone()],
                };
                (p.name.clone(), values)
            })
            .collect();

        Self::Bound {
            filter_name: definition.name.clone(),
            parameters,
        }
    }

    /// The values bound to `parameter`, if the filter is bound.
    pub fn parameter(&self, parameter: &str) -> Option<&[String]> {
        match self {
            Self::Unfiltered => None,
            Self::Bound { parameters, .. } => parameters.get(parameter).map(Vec::as_slice),
        }
    }
}
