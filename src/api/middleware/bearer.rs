//! Bearer-token authentication for resource endpoints

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};

use crate::api::types::error::INVALID_TOKEN;
use crate::api::types::ApiError;
use crate::domain::AccessClaims;
use crate::infrastructure::auth::TokenVerifier;

/// Extractor that requires a valid access token
///
/// Reads `Authorization: Bearer <token>` and verifies it against the JWKS.
/// Rejects with 401 `invalid_token`, or 503 when no keys can be fetched.
#[derive(Debug, Clone)]
pub struct RequireClaims(pub AccessClaims);

impl<S> FromRequestParts<S> for RequireClaims
where
    Arc<TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let verifier = Arc::<TokenVerifier>::from_ref(state);

        let claims = verifier.verify(token).await?;

        Ok(RequireClaims(claims))
    }
}

/// Extract the token from an `Authorization: Bearer` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized(INVALID_TOKEN))?
        .to_str()
        .map_err(|_| ApiError::unauthorized(INVALID_TOKEN))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| ApiError::unauthorized(INVALID_TOKEN))?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(ApiError::unauthorized(INVALID_TOKEN));
    }

    Ok(token)
}
