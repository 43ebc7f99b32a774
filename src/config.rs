//! Configuration for Warden
//!
//! CLI arguments and environment variable handling using clap. Parsed and
//! validated once at startup; the resulting components (signing keys,
//! hasher parameters) are immutable for the life of the process and
//! shared read-only across request workers. There is no ambient global
//! configuration state.

use clap::Parser;
use std::net::SocketAddr;

use crate::auth::{JwtValidator, PasswordHasher};
use crate::types::WardenError;

/// Warden - identity and access gateway
#[derive(Parser, Debug, Clone)]
#[command(name = "warden")]
#[command(about = "Identity and access gateway for multi-tenant services")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Enable development mode (in-memory store fallback, fixed JWT secret)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "warden")]
    pub mongodb_db: String,

    /// JWT secret for token signing (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "3600")]
    pub jwt_expiry_seconds: u64,

    /// Argon2 memory cost in KiB
    #[arg(long, env = "HASH_MEM_KIB", default_value = "19456")]
    pub hash_mem_kib: u32,

    /// Argon2 iteration count
    #[arg(long, env = "HASH_ITERATIONS", default_value = "2")]
    pub hash_iterations: u32,

    /// Argon2 lane count
    #[arg(long, env = "HASH_PARALLELISM", default_value = "1")]
    pub hash_parallelism: u32,

    /// Username for the seeded identity (dev mode only)
    #[arg(long, env = "SEED_USERNAME")]
    pub seed_username: Option<String>,

    /// Password for the seeded identity (dev mode only)
    #[arg(long, env = "SEED_PASSWORD")]
    pub seed_password: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode {
            if self.jwt_secret.is_none() {
                return Err("JWT_SECRET is required in production mode".to_string());
            }
            if self.seed_username.is_some() || self.seed_password.is_some() {
                return Err("SEED_USERNAME/SEED_PASSWORD are only honored in dev mode".to_string());
            }
        }

        if self.seed_username.is_some() != self.seed_password.is_some() {
            return Err("SEED_USERNAME and SEED_PASSWORD must be set together".to_string());
        }

        Ok(())
    }

    /// Build the token issuer/validator from the configured secret.
    ///
    /// Dev mode without an explicit secret falls back to a fixed insecure
    /// one; production requires a real secret.
    pub fn jwt_validator(&self) -> Result<JwtValidator, WardenError> {
        match &self.jwt_secret {
            Some(secret) => JwtValidator::new(secret, self.jwt_expiry_seconds),
            None if self.dev_mode => Ok(JwtValidator::new_dev()),
            None => Err(WardenError::Config(
                "JWT_SECRET is required in production mode".into(),
            )),
        }
    }

    /// Build the password hasher with the configured work factor
    pub fn password_hasher(&self) -> Result<PasswordHasher, WardenError> {
        PasswordHasher::new(
            self.hash_mem_kib,
            self.hash_iterations,
            self.hash_parallelism,
        )
    }
}
