//! Identity document schema
//!
//! Stores credentials and role assignments. The unique index on
//! `username` is the storage-boundary enforcement of the uniqueness
//! invariant; a duplicate insert surfaces as a conflict, never as a
//! second live document.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::auth::roles::Role;
use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::store::{Identity, IdentityStatus};
use crate::types::WardenError;

/// Collection name for identities
pub const IDENTITY_COLLECTION: &str = "identities";

/// Identity document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct IdentityDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Unique login name
    pub username: String,

    /// Argon2 password hash (PHC string)
    pub password_hash: String,

    /// Role set; stored order is meaningless
    #[serde(default)]
    pub roles: Vec<Role>,

    /// Account lifecycle state
    #[serde(default)]
    pub status: IdentityStatus,
}

impl IdentityDoc {
    /// Create a new identity document
    pub fn new(username: String, password_hash: String, roles: Vec<Role>) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            username,
            password_hash,
            roles,
            status: IdentityStatus::Active,
        }
    }

    /// Convert into the domain identity. Fails if the document has not
    /// been persisted (no id assigned).
    pub fn into_identity(self) -> Result<Identity, WardenError> {
        let id = self
            ._id
            .ok_or_else(|| WardenError::Database("Identity document missing _id".into()))?;

        Ok(Identity {
            id: id.to_hex(),
            username: self.username,
            password_hash: self.password_hash,
            roles: self.roles,
            status: self.status,
        })
    }
}

impl IntoIndexes for IdentityDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Unique index on username
            (
                doc! { "username": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("username_unique".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for IdentityDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
