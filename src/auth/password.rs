//! Password hashing and verification using Argon2
//!
//! Uses the argon2id variant. The work factor is fixed at construction from
//! configuration; a fresh random salt is generated on every hash call, so
//! hashing the same input twice yields two different PHC strings that both
//! verify. There is no code path that hashes without a generated salt.

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as HashError, PasswordHash, PasswordHasher as _,
        PasswordVerifier as _, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

use crate::types::WardenError;

/// Argon2id hasher with a configured work factor.
///
/// Built once at startup and shared read-only by every request worker.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a hasher with the given cost parameters.
    ///
    /// Returns a configuration error if the parameters are outside the
    /// ranges the algorithm accepts.
    pub fn new(mem_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, WardenError> {
        let params = Params::new(mem_kib, iterations, parallelism, None)
            .map_err(|e| WardenError::Config(format!("Invalid hash parameters: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password, generating a fresh random salt.
    ///
    /// Returns the PHC-formatted string that embeds algorithm, cost
    /// parameters, salt and digest.
    pub fn hash(&self, password: &str) -> Result<String, WardenError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| WardenError::Internal(format!("Failed to hash password: {e}")))
    }

    /// Verify a password against a stored PHC hash in constant time.
    ///
    /// Returns `Ok(false)` on mismatch. A stored hash that cannot be parsed
    /// is a hard error, never a silent `false`.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, WardenError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| WardenError::Internal(format!("Unreadable password hash: {e}")))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(e) => Err(WardenError::Internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_hasher() -> PasswordHasher {
        // Minimal cost so tests stay fast; production values come from config
        PasswordHasher::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = test_hasher();
        let password = "correct-horse-battery-staple";
        let hash = hasher.hash(password).unwrap();

        // Hash should be in PHC format
        assert!(hash.starts_with("$argon2id$"));

        // Correct password should verify
        assert!(hasher.verify(password, &hash).unwrap());

        // Wrong password should not verify
        assert!(!hasher.verify("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_fresh_salt_per_hash() {
        let hasher = test_hasher();
        let password = "same-password";
        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        // Same password should produce different hashes (different salts)
        assert_ne!(hash1, hash2);

        // Both should verify
        assert!(hasher.verify(password, &hash1).unwrap());
        assert!(hasher.verify(password, &hash2).unwrap());
    }

    #[test]
    fn test_invalid_hash_format_is_an_error() {
        let hasher = test_hasher();
        let result = hasher.verify("password", "not-a-valid-hash");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        // Zero memory cost is below the algorithm's minimum
        assert!(PasswordHasher::new(0, 1, 1).is_err());
    }
}
