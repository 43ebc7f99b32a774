//! In-memory identity store
//!
//! Backs dev mode (no MongoDB required) and unit tests. Uniqueness is
//! enforced the same way the MongoDB backend's unique index does, so the
//! conflict behavior is identical across backends.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::auth::roles;
use crate::store::{Identity, IdentityStatus, IdentityStore, NewIdentity};
use crate::types::WardenError;

/// Identity store backed by a concurrent in-process map, keyed by id.
#[derive(Default)]
pub struct MemoryIdentityStore {
    identities: DashMap<String, Identity>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, WardenError> {
        Ok(self
            .identities
            .iter()
            .find(|entry| entry.username == username)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Identity>, WardenError> {
        Ok(self.identities.get(id).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, identity: NewIdentity) -> Result<Identity, WardenError> {
        if self
            .identities
            .iter()
            .any(|entry| entry.username == identity.username)
        {
            return Err(WardenError::Conflict(format!(
                "Username '{}' already exists",
                identity.username
            )));
        }

        let created = Identity {
            id: Uuid::new_v4().to_string(),
            username: identity.username,
            password_hash: identity.password_hash,
            roles: roles::normalize(&identity.roles),
            status: IdentityStatus::Active,
        };
        self.identities.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn set_password_hash(&self, id: &str, password_hash: &str) -> Result<(), WardenError> {
        match self.identities.get_mut(id) {
            Some(mut entry) => {
                entry.password_hash = password_hash.to_string();
                Ok(())
            }
            None => Err(WardenError::NotFound(format!("Identity {} not found", id))),
        }
    }

    async fn set_status(&self, id: &str, status: IdentityStatus) -> Result<(), WardenError> {
        match self.identities.get_mut(id) {
            Some(mut entry) => {
                entry.status = status;
                Ok(())
            }
            None => Err(WardenError::NotFound(format!("Identity {} not found", id))),
        }
    }

    async fn list(&self) -> Result<Vec<Identity>, WardenError> {
        let mut all: Vec<Identity> = self
            .identities
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(all)
    }

    async fn ping(&self) -> Result<(), WardenError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::Role;

    fn new_identity(username: &str) -> NewIdentity {
        NewIdentity {
            username: username.into(),
            password_hash: "$argon2id$test".into(),
            roles: vec![Role::User],
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = MemoryIdentityStore::new();
        let created = store.insert(new_identity("alice")).await.unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(created.status, IdentityStatus::Active);

        let by_name = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);

        let by_id = store.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");

        assert!(store.find_by_username("bob").await.unwrap().is_none());
        assert!(store.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryIdentityStore::new();
        store.insert(new_identity("alice")).await.unwrap();

        let err = store.insert(new_identity("alice")).await.unwrap_err();
        assert!(matches!(err, WardenError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_roles_are_deduplicated_on_insert() {
        let store = MemoryIdentityStore::new();
        let created = store
            .insert(NewIdentity {
                username: "alice".into(),
                password_hash: "$argon2id$test".into(),
                roles: vec![Role::Admin, Role::Admin, Role::User],
            })
            .await
            .unwrap();
        assert_eq!(created.roles, vec![Role::Admin, Role::User]);
    }

    #[tokio::test]
    async fn test_password_rotation() {
        let store = MemoryIdentityStore::new();
        let created = store.insert(new_identity("alice")).await.unwrap();

        store
            .set_password_hash(&created.id, "$argon2id$rotated")
            .await
            .unwrap();
        let reloaded = store.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(reloaded.password_hash, "$argon2id$rotated");

        let err = store
            .set_password_hash("missing", "$argon2id$x")
            .await
            .unwrap_err();
        assert!(matches!(err, WardenError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_is_sorted_and_complete() {
        let store = MemoryIdentityStore::new();
        store.insert(new_identity("carol")).await.unwrap();
        store.insert(new_identity("alice")).await.unwrap();
        store.insert(new_identity("bob")).await.unwrap();

        let all = store.list().await.unwrap();
        let names: Vec<&str> = all.iter().map(|i| i.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }
}
