//! Role tags and the role-based access decision
//!
//! Roles are capability tags carried by an identity and embedded in its
//! tokens. An operation declares the set of roles that may invoke it; the
//! decision is "any of": one matching role is enough. An empty requirement
//! means any authenticated identity is allowed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability tag attached to an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular authenticated user
    User,
    /// Administrative operations (identity management)
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Normalize a role list into set semantics: duplicates removed, the
/// stored order carries no meaning.
pub fn normalize(roles: &[Role]) -> Vec<Role> {
    let mut out = Vec::with_capacity(roles.len());
    for role in roles {
        if !out.contains(role) {
            out.push(*role);
        }
    }
    out
}

/// Check whether a caller holding `held` may invoke an operation that
/// requires `required`.
///
/// Empty `required` means any authenticated identity. Otherwise the
/// intersection of the two sets must be non-empty; a single matching
/// role is sufficient.
pub fn is_allowed(required: &[Role], held: &[Role]) -> bool {
    required.is_empty() || required.iter().any(|role| held.contains(role))
}
