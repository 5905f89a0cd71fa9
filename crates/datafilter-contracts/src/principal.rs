//! Principal identity types.
//!
//! Principals are owned by an external identity subsystem. The engine only
//! reads them: it never creates, mutates or persists a `Principal`.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

/// Stable identifier of an authenticated actor.
///
/// Grant records reference principals by this value only, so it must not
/// change over the lifetime of the account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PrincipalId(pub String);

impl PrincipalId {
    /// Construct an identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An authenticated actor whose data visibility is being restricted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Primary identifier.
    pub id: PrincipalId,
    /// Alternate identifier (e.g. a UUID carried in a request header).
    pub alternate_id: Option<String>,
    /// Login name.
    pub username: Option<String>,
    /// Super users are never filtered.
    pub super_user: bool,
    /// Privilege names held by this principal, including any bypass privilege.
    pub privileges: BTreeSet<String>,
}

impl Principal {
    /// Build an ordinary principal with no privileges.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: PrincipalId::new(id),
            alternate_id: None,
            username: None,
            super_user: false,
            privileges: BTreeSet::new(),
        }
    }

    /// Set the login name.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the alternate identifier.
    pub fn with_alternate_id(mut self, alternate_id: impl Into<String>) -> Self {
        self.alternate_id = Some(alternate_id.into());
        self
    }

    /// Add a held privilege.
    pub fn with_privilege(mut self, privilege: impl Into<String>) -> Self {
        self.privileges.insert(privilege.into());
        self
    }

    /// Mark this principal as a super user.
    pub fn as_super_user(mut self) -> Self {
        self.super_user = true;
        self
    }

    /// Return true if the principal holds `privilege`.
    pub fn has_privilege(&self, privilege: &str) -> bool {
        self.privileges.contains(privilege)
    }
}
