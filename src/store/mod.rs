//! Identity persistence contract
//!
//! The auth core consumes a narrow read/write contract; everything else
//! about storage (uniqueness enforcement, indexing, concurrency control)
//! belongs to the backend. Two implementations exist: MongoDB for
//! production and an in-memory map for dev mode and tests.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::auth::roles::Role;
use crate::types::WardenError;

pub use memory::MemoryIdentityStore;
pub use mongo::MongoIdentityStore;

/// Account lifecycle state. Only active identities can authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdentityStatus {
    #[default]
    Active,
    Suspended,
}

impl fmt::Display for IdentityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityStatus::Active => write!(f, "active"),
            IdentityStatus::Suspended => write!(f, "suspended"),
        }
    }
}

/// An identity as the auth core sees it.
///
/// Deliberately not `Serialize`: the password hash must never travel
/// outward. Responses are built from explicit summary types instead.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Backend-assigned opaque id
    pub id: String,
    /// Unique across all identities
    pub username: String,
    /// PHC-formatted Argon2 hash, never the plaintext
    pub password_hash: String,
    /// Role set (no duplicates, order irrelevant)
    pub roles: Vec<Role>,
    pub status: IdentityStatus,
}

/// Input for creating an identity. The id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
}

/// Narrow persistence contract consumed by the auth core.
///
/// `insert` must enforce username uniqueness and surface a violation as
/// [`WardenError::Conflict`]. Storage outages surface as
/// [`WardenError::Database`] and are not retried here.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, WardenError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Identity>, WardenError>;

    /// Create an identity, assigning a fresh id. Duplicate username is a
    /// conflict error.
    async fn insert(&self, identity: NewIdentity) -> Result<Identity, WardenError>;

    /// Replace the stored password hash (rotation path).
    async fn set_password_hash(&self, id: &str, password_hash: &str) -> Result<(), WardenError>;

    /// Change the account lifecycle state.
    async fn set_status(&self, id: &str, status: IdentityStatus) -> Result<(), WardenError>;

    async fn list(&self) -> Result<Vec<Identity>, WardenError>;

    /// Cheap backend reachability probe for readiness checks.
    async fn ping(&self) -> Result<(), WardenError>;

    fn backend_name(&self) -> &'static str;
}
