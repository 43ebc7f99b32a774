//! Document schemas for MongoDB collections

pub mod identity;
pub mod metadata;

pub use identity::{IdentityDoc, IDENTITY_COLLECTION};
pub use metadata::Metadata;
