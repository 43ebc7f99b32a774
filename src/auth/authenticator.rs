//! Credential authentication
//!
//! Looks up an identity by username and verifies the presented password.
//! Unknown username, non-active account and wrong password all collapse
//! into the same outward rejection so a caller cannot probe which
//! usernames exist. The precise cause is logged server-side only.

use std::sync::Arc;
use tracing::warn;
use zeroize::Zeroizing;

use crate::auth::password::PasswordHasher;
use crate::store::{Identity, IdentityStatus, IdentityStore};
use crate::types::{AuthError, WardenError};

/// Verifies presented credentials against the identity store.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn IdentityStore>,
    hasher: Arc<PasswordHasher>,
}

impl Authenticator {
    pub fn new(store: Arc<dyn IdentityStore>, hasher: Arc<PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    /// Authenticate a username/password pair.
    ///
    /// On success returns the stored identity. Every credential failure
    /// maps to the same generic unauthorized error; storage errors
    /// propagate unchanged. The plaintext is wiped after verification and
    /// never logged.
    ///
    /// Verification runs on a blocking thread: the KDF is CPU-bound and
    /// must not stall the request loop.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity, WardenError> {
        let identity = match self.store.find_by_username(username).await? {
            Some(identity) => identity,
            None => {
                warn!("Authentication failed - unknown username: {}", username);
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if identity.status != IdentityStatus::Active {
            warn!("Authentication failed - account not active: {}", username);
            return Err(AuthError::InvalidCredentials.into());
        }

        let hasher = Arc::clone(&self.hasher);
        let stored_hash = identity.password_hash.clone();
        let plaintext = Zeroizing::new(password.to_string());
        let password_valid =
            tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &stored_hash))
                .await
                .map_err(|e| WardenError::Internal(format!("Verify task failed: {}", e)))??;

        if !password_valid {
            warn!("Authentication failed - wrong password: {}", username);
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::Role;
    use crate::store::{MemoryIdentityStore, NewIdentity};
    use argon2::Params;

    fn test_hasher() -> Arc<PasswordHasher> {
        Arc::new(
            PasswordHasher::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST)
                .unwrap(),
        )
    }

    async fn seeded_authenticator() -> Authenticator {
        let hasher = test_hasher();
        let store = Arc::new(MemoryIdentityStore::new());
        store
            .insert(NewIdentity {
                username: "alice".into(),
                password_hash: hasher.hash("Secret123!").unwrap(),
                roles: vec![Role::User],
            })
            .await
            .unwrap();
        Authenticator::new(store, hasher)
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        let auth = seeded_authenticator().await;
        let identity = auth.authenticate("alice", "Secret123!").await.unwrap();
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.roles, vec![Role::User]);
        assert_eq!(identity.status, IdentityStatus::Active);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let auth = seeded_authenticator().await;
        let err = auth.authenticate("alice", "wrong").await.unwrap_err();
        assert_eq!(err.status_code(), hyper::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_no_enumeration_leak() {
        // Unknown user and wrong password must be indistinguishable
        let auth = seeded_authenticator().await;

        let unknown = auth
            .authenticate("nonexistent", "anything")
            .await
            .unwrap_err();
        let mismatch = auth.authenticate("alice", "wrongpassword").await.unwrap_err();

        assert_eq!(unknown.to_string(), mismatch.to_string());
        assert_eq!(unknown.status_code(), mismatch.status_code());
    }

    #[tokio::test]
    async fn test_suspended_account_rejected() {
        let hasher = test_hasher();
        let store = Arc::new(MemoryIdentityStore::new());
        let created = store
            .insert(NewIdentity {
                username: "mallory".into(),
                password_hash: hasher.hash("Secret123!").unwrap(),
                roles: vec![Role::User],
            })
            .await
            .unwrap();
        store
            .set_status(&created.id, IdentityStatus::Suspended)
            .await
            .unwrap();

        let auth = Authenticator::new(store, hasher);
        let err = auth
            .authenticate("mallory", "Secret123!")
            .await
            .unwrap_err();
        // Same outward signal as any other credential failure
        assert_eq!(err.status_code(), hyper::StatusCode::UNAUTHORIZED);
    }
}
