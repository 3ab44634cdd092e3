//! Registration and login endpoints

use axum::{extract::State, http::StatusCode, routing::post, Router};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::BEARER_TOKEN_TYPE;

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Credentials submitted to `/register` and `/login`
#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(alias = "email", alias = "login")]
    pub identifier: String,
    #[serde(alias = "password")]
    pub secret: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("identifier", &self.identifier)
            .field("secret", &"[hidden]")
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    state
        .auth_service
        .register(&request.identifier, &request.secret)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Success!".to_string(),
        }),
    ))
}

/// POST /login
///
/// Unknown identifiers and wrong secrets produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let token = state
        .auth_service
        .login(&request.identifier, &request.secret)
        .await?;

    Ok(Json(LoginResponse {
        access_token: token.access_token,
        token_type: BEARER_TOKEN_TYPE.to_string(),
        expires_in: token.expires_in,
    }))
}
