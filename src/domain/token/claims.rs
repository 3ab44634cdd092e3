//! Access-token claims

use serde::{Deserialize, Serialize};

/// Claims carried by every access token
///
/// All fields are required; a token missing any of them does not decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Subject (the authenticated identifier)
    pub sub: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

impl AccessClaims {
    /// Build claims valid for `ttl_secs` from `issued_at`
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        subject: impl Into<String>,
        issued_at: i64,
        ttl_secs: u64,
    ) -> Self {
        Self {
            iss: issuer.into(),
            aud: audience.into(),
            sub: subject.into(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs as i64),
        }
    }
}
