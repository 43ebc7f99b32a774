//! Authentication and authorization for Warden
//!
//! Provides:
//! - Password hashing with Argon2 (configured work factor, fresh salt per hash)
//! - JWT token issuance and validation (HS256, zero expiry leeway)
//! - Credential authentication against the identity store
//! - Role-based request authorization (the guard pipeline stage)

pub mod authenticator;
pub mod guard;
pub mod jwt;
pub mod password;
pub mod roles;

pub use authenticator::Authenticator;
pub use guard::{authorize, extract_bearer, CallerContext};
pub use jwt::{Claims, JwtValidator};
pub use password::PasswordHasher;
pub use roles::Role;
