//! Credential domain
//!
//! Identifier normalization, the persisted credential record and the store
//! trait the orchestrator depends on.

mod entity;
mod repository;
mod validation;

pub use entity::{CredentialRecord, Identifier};
pub use repository::UserStore;
pub use validation::{validate_identifier, validate_secret, CredentialValidationError};

#[cfg(test)]
pub use repository::mock::MockUserStore;
