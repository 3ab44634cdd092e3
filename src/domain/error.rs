use thiserror::Error;

use super::credential::CredentialValidationError;

/// Errors reported by storage collaborators
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the store rejected a write because the key already exists
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Authentication and token-trust errors
///
/// `InvalidCredentials` deliberately carries no detail: an unknown identifier
/// and a wrong secret must be indistinguishable to the caller.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Identifier is already registered")]
    AlreadyRegistered,

    #[error("Incorrect identifier or secret")]
    InvalidCredentials,

    #[error("Invalid input: {message}")]
    Validation { message: String },

    #[error("Signing key unavailable: {message}")]
    KeyUnavailable { message: String },

    #[error("Token signing failed: {message}")]
    Signing { message: String },

    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error(transparent)]
    Store(#[from] DomainError),
}

impl AuthError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn key_unavailable(message: impl Into<String>) -> Self {
        Self::KeyUnavailable {
            message: message.into(),
        }
    }

    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }
}

impl From<CredentialValidationError> for AuthError {
    fn from(err: CredentialValidationError) -> Self {
        Self::validation(err.to_string())
    }
}
