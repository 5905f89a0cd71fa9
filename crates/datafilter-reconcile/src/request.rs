//! The inbound reconciliation request.
//!
//! The web tier parses the submission (method, status so far, user
//! reference, basis names) and hands it over as a `ReconcileRequest`. Nothing
//! in this crate reads HTTP bodies or headers itself.

use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use datafilter_contracts::principal::PrincipalId;

/// How the request identifies the principal whose grants change.
///
/// Resolution tries `id`, then `alternate_id`, then `username`; blank values
/// count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalRef {
    /// Direct identifier.
    pub id: Option<String>,
    /// Alternate identifier, typically carried in a separate header.
    pub alternate_id: Option<String>,
    /// Login name form field.
    pub username: Option<String>,
}

impl PrincipalRef {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()), ..Self::default() }
    }

    pub fn by_alternate_id(alternate_id: impl Into<String>) -> Self {
        Self { alternate_id: Some(alternate_id.into()), ..Self::default() }
    }

    pub fn by_username(username: impl Into<String>) -> Self {
        Self { username: Some(username.into()), ..Self::default() }
    }

    /// Return true if no non-blank reference was supplied.
    pub fn is_empty(&self) -> bool {
        [&self.id, &self.alternate_id, &self.username]
            .iter()
            .all(|v| non_blank(v).is_none())
    }
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// A request to converge a principal's grants to `basis_names`.
#[derive(Debug, Clone)]
pub struct ReconcileRequest {
    pub method: Method,
    /// Status already set by upstream handlers.
    pub upstream_status: StatusCode,
    pub principal: PrincipalRef,
    /// Human-entered basis names, in submission order.
    pub basis_names: Vec<String>,
    /// The authenticated actor making the change, recorded as grant creator.
    pub performed_by: Option<PrincipalId>,
}

impl ReconcileRequest {
    /// A POST submission with an OK upstream status.
    pub fn submission(principal: PrincipalRef, basis_names: Vec<String>) -> Self {
        Self {
            method: Method::POST,
            upstream_status: StatusCode::OK,
            principal,
            basis_names,
            performed_by: None,
        }
    }

    /// POST, PUT and PATCH change state; everything else is a read.
    pub fn is_mutating(&self) -> bool {
        self.method == Method::POST || self.method == Method::PUT || self.method == Method::PATCH
    }

    /// Return true if an upstream handler already rejected the request.
    pub fn upstream_failed(&self) -> bool {
        self.upstream_status.is_client_error() || self.upstream_status.is_server_error()
    }
}
