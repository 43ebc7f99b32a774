//! JWT issuance and validation
//!
//! Tokens are compact three-part (header.payload.signature) HS256 tokens
//! carrying the identity's id, username and role set. Validation is
//! stateless: signature and expiry decide validity, with no storage
//! lookup. Claims are therefore only as fresh as issuance time; a role
//! change becomes visible when the token expires and is reissued.
//!
//! Expiry is compared with zero leeway. A deployment with skewed clocks
//! will reject tokens early or late by exactly that skew; this is a
//! documented limitation, not something the validator papers over.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::roles::{self, Role};
use crate::store::Identity;
use crate::types::{AuthError, WardenError};

/// Minimum secret length accepted outside dev mode
const MIN_SECRET_LEN: usize = 32;

/// Claims embedded in an issued token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity id
    pub sub: String,
    /// Username at issuance time
    pub username: String,
    /// Role set at issuance time
    pub roles: Vec<Role>,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Token issuer and validator sharing one signing secret.
///
/// Constructed once at startup from configuration and shared read-only.
#[derive(Clone)]
pub struct JwtValidator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_seconds: u64,
}

impl JwtValidator {
    /// Create a validator from the configured secret.
    ///
    /// Returns an error if the secret is empty or too short.
    pub fn new(secret: &str, expiry_seconds: u64) -> Result<Self, WardenError> {
        if secret.is_empty() {
            return Err(WardenError::Config(
                "JWT_SECRET is required in production mode".into(),
            ));
        }

        if secret.len() < MIN_SECRET_LEN {
            return Err(WardenError::Config(format!(
                "JWT_SECRET must be at least {} characters",
                MIN_SECRET_LEN
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_seconds,
        })
    }

    /// Create a validator for dev mode (fixed insecure secret)
    pub fn new_dev() -> Self {
        let secret = "dev-mode-secret-not-for-production-use-123456";
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_seconds: 3600,
        }
    }

    /// Configured token lifetime in seconds
    pub fn expiry_seconds(&self) -> u64 {
        self.expiry_seconds
    }

    /// Issue a token for an authenticated identity.
    ///
    /// Only id, username and roles are read; the password hash never
    /// reaches the claims set.
    pub fn issue(&self, identity: &Identity) -> Result<String, WardenError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| WardenError::Internal(format!("System time error: {}", e)))?
            .as_secs();

        let claims = Claims {
            sub: identity.id.clone(),
            username: identity.username.clone(),
            roles: roles::normalize(&identity.roles),
            iat: now,
            exp: now + self.expiry_seconds,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| WardenError::Internal(format!("Failed to issue token: {}", e)))
    }

    /// Verify and decode a token.
    ///
    /// Rejects on structural problems, signature mismatch (compared in
    /// constant time by the underlying library) and expiry. The error
    /// distinguishes expiry from everything else for logging; the outward
    /// HTTP signal collapses both.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Exact expiry comparison against current time
        validation.leeway = 0;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(err) => {
                use jsonwebtoken::errors::ErrorKind;
                match err.kind() {
                    ErrorKind::ExpiredSignature => Err(AuthError::ExpiredToken),
                    _ => Err(AuthError::MalformedToken),
                }
            }
        }
    }
}
