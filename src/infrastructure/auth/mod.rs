//! Token infrastructure
//!
//! Signing key material, RS256 token issuance, JWKS publication and the
//! resource-side verifier.

mod jwks;
mod jwt;
mod keys;
mod verifier;

pub use jwks::JwksPublisher;
pub use jwt::TokenIssuer;
pub use keys::{FileKeySource, KeyMaterial, KeyPairPem, KeySource, PemKeySource};
pub use verifier::{HttpJwksSource, JwksSource, StaticJwksSource, TokenVerifier};

#[cfg(test)]
pub(crate) use keys::fixtures;
