//! Warden - identity and access gateway
//!
//! Warden authenticates credentials, issues and validates bearer tokens,
//! hashes and verifies secrets, and enforces role-based authorization on
//! protected operations. Business CRUD services sit in front of it and
//! call in to obtain an identity and a permission decision.
//!
//! ## Components
//!
//! - **Password hashing**: Argon2id with a configured work factor, fresh
//!   salt per hash ([`auth::PasswordHasher`])
//! - **Tokens**: stateless HS256 JWTs with zero expiry leeway
//!   ([`auth::JwtValidator`])
//! - **Credential authentication**: enumeration-safe username/password
//!   verification ([`auth::Authenticator`])
//! - **Authorization guard**: role-set intersection per operation
//!   ([`auth::guard`])
//! - **Identity store**: MongoDB in production, in-memory in dev mode
//!   ([`store::IdentityStore`])

pub mod auth;
pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod store;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{Result, WardenError};
