//! Token domain
//!
//! Typed access-token claims, the issued-token value returned by login, and
//! the JWKS document shape.

mod claims;
mod jwks;

pub use claims::AccessClaims;
pub use jwks::{Jwk, JwksDocument};

/// Token type reported to clients
pub const BEARER_TOKEN_TYPE: &str = "bearer";

/// Result of a successful login
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Compact JWS
    pub access_token: String,
    /// Seconds until expiry
    pub expires_in: u64,
    /// Claims that were signed
    pub claims: AccessClaims,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("access_token", &"[hidden]")
            .field("expires_in", &self.expires_in)
            .field("claims", &self.claims)
            .finish()
    }
}
