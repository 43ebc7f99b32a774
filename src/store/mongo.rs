//! MongoDB-backed identity store

use async_trait::async_trait;
use bson::{doc, oid::ObjectId};

use crate::auth::roles;
use crate::db::schemas::{IdentityDoc, IDENTITY_COLLECTION};
use crate::db::{MongoClient, MongoCollection};
use crate::store::{Identity, IdentityStatus, IdentityStore, NewIdentity};
use crate::types::WardenError;

/// Identity store backed by the `identities` collection.
///
/// Username uniqueness is enforced by the collection's unique index;
/// the duplicate-key error surfaces here as a conflict.
pub struct MongoIdentityStore {
    client: MongoClient,
    identities: MongoCollection<IdentityDoc>,
}

impl MongoIdentityStore {
    /// Open the identities collection, creating indexes if needed
    pub async fn new(client: MongoClient) -> Result<Self, WardenError> {
        let identities = client.collection::<IdentityDoc>(IDENTITY_COLLECTION).await?;
        Ok(Self { client, identities })
    }
}

#[async_trait]
impl IdentityStore for MongoIdentityStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, WardenError> {
        match self.identities.find_one(doc! { "username": username }).await? {
            Some(found) => Ok(Some(found.into_identity()?)),
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Identity>, WardenError> {
        // An id that is not a valid ObjectId cannot match any document
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };

        match self.identities.find_one(doc! { "_id": oid }).await? {
            Some(found) => Ok(Some(found.into_identity()?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, identity: NewIdentity) -> Result<Identity, WardenError> {
        let doc = IdentityDoc::new(
            identity.username,
            identity.password_hash,
            roles::normalize(&identity.roles),
        );

        let username = doc.username.clone();
        let inserted_id = self.identities.insert_one(doc.clone()).await.map_err(|e| {
            match e {
                WardenError::Conflict(_) => {
                    WardenError::Conflict(format!("Username '{}' already exists", username))
                }
                other => other,
            }
        })?;

        let mut doc = doc;
        doc._id = Some(inserted_id);
        doc.into_identity()
    }

    async fn set_password_hash(&self, id: &str, password_hash: &str) -> Result<(), WardenError> {
        let oid = ObjectId::parse_str(id)
            .map_err(|_| WardenError::NotFound(format!("Identity {} not found", id)))?;

        let result = self
            .identities
            .update_one(
                doc! { "_id": oid },
                doc! { "$set": { "password_hash": password_hash } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(WardenError::NotFound(format!("Identity {} not found", id)));
        }
        Ok(())
    }

    async fn set_status(&self, id: &str, status: IdentityStatus) -> Result<(), WardenError> {
        let oid = ObjectId::parse_str(id)
            .map_err(|_| WardenError::NotFound(format!("Identity {} not found", id)))?;

        let result = self
            .identities
            .update_one(
                doc! { "_id": oid },
                doc! { "$set": { "status": status.to_string() } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(WardenError::NotFound(format!("Identity {} not found", id)));
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Identity>, WardenError> {
        let docs = self.identities.find_many(doc! {}).await?;
        docs.into_iter().map(|d| d.into_identity()).collect()
    }

    async fn ping(&self) -> Result<(), WardenError> {
        self.client.ping().await
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}
