//! Domain layer - Core types and traits

pub mod credential;
pub mod error;
pub mod token;

pub use credential::{CredentialRecord, CredentialValidationError, Identifier, UserStore};
pub use error::{AuthError, DomainError};
pub use token::{AccessClaims, IssuedToken, Jwk, JwksDocument, BEARER_TOKEN_TYPE};
