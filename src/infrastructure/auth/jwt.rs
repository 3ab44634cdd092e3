//! RS256 access-token issuance

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, Header};
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::domain::{AccessClaims, AuthError, IssuedToken};

use super::keys::KeyMaterial;

/// Signs access tokens with the active key
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keys: Arc<KeyMaterial>,
    issuer: String,
    audience: String,
    ttl_secs: u64,
}

impl TokenIssuer {
    pub fn new(
        keys: Arc<KeyMaterial>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_secs,
        }
    }

    pub fn from_config(keys: Arc<KeyMaterial>, config: &AuthConfig) -> Self {
        Self::new(
            keys,
            config.issuer.clone(),
            config.audience.clone(),
            config.token_ttl_secs,
        )
    }

    /// Issue a token for `subject` valid from now
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, AuthError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if signed at `issued_at`
    pub fn issue_at(&self, subject: &str, issued_at: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        if subject.is_empty() {
            return Err(AuthError::signing("Subject must not be empty"));
        }

        let claims = AccessClaims::new(
            &self.issuer,
            &self.audience,
            subject,
            issued_at.timestamp(),
            self.ttl_secs,
        );

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.keys.key_id().to_string());

        let access_token = encode(&header, &claims, self.keys.encoding_key())
            .map_err(|e| AuthError::signing(format!("Failed to sign token: {}", e)))?;

        Ok(IssuedToken {
            access_token,
            expires_in: self.ttl_secs,
            claims,
        })
    }

    pub fn key_id(&self) -> &str {
        self.keys.key_id()
    }
}
