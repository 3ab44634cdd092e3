//! API error responses
//!
//! Every error body has the shape `{"detail": "<code or message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, DomainError};

pub const USER_ALREADY_REGISTERED: &str = "user_is_already_registered";
pub const INCORRECT_NAME_OR_PASSWORD: &str = "incorrect_name_or_password";
pub const INVALID_TOKEN: &str = "invalid_token";
pub const KEYS_UNAVAILABLE: &str = "verification_keys_unavailable";
pub const INTERNAL_SERVER_ERROR: &str = "internal_server_error";

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub detail: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                detail: detail.into(),
            },
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, detail)
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }

    /// Generic 500; the cause is logged, never returned
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AlreadyRegistered => Self::bad_request(USER_ALREADY_REGISTERED),
            AuthError::InvalidCredentials => Self::unauthorized(INCORRECT_NAME_OR_PASSWORD),
            AuthError::Validation { message } => Self::unprocessable(message),
            AuthError::InvalidToken { message } => {
                tracing::debug!(reason = %message, "Token rejected");
                Self::unauthorized(INVALID_TOKEN)
            }
            AuthError::KeyUnavailable { message } => {
                tracing::warn!(reason = %message, "Verification keys unavailable");
                Self::unavailable(KEYS_UNAVAILABLE)
            }
            AuthError::Signing { message } => {
                tracing::error!(error = %message, "Token signing failed");
                Self::internal()
            }
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        tracing::error!(error = %err, "Request failed");
        Self::internal()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.response.detail)
    }
}

impl std::error::Error for ApiError {}
