//! Credential input validation

use thiserror::Error;

/// Errors that can occur while validating registration or login input
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CredentialValidationError {
    #[error("Identifier cannot be empty")]
    EmptyIdentifier,

    #[error("Identifier exceeds maximum length of {0} characters")]
    IdentifierTooLong(usize),

    #[error("Identifier contains whitespace")]
    IdentifierWhitespace,

    #[error("Identifier must be an e-mail address of the form 'name@domain.tld'")]
    IdentifierNotEmail,

    #[error("Secret cannot be empty")]
    EmptySecret,

    #[error("Secret exceeds maximum length of {0} bytes")]
    SecretTooLong(usize),
}

const MAX_IDENTIFIER_LENGTH: usize = 254;
const MAX_LOCAL_PART_LENGTH: usize = 64;
const MAX_SECRET_LENGTH: usize = 1024;

/// Validate an already-normalized identifier
///
/// Rules:
/// - Cannot be empty
/// - Maximum 254 characters
/// - No whitespace
/// - Exactly one '@' with a non-empty local part (max 64)
/// - Domain has at least one dot, no empty labels, labels do not start or end with '-'
pub fn validate_identifier(identifier: &str) -> Result<(), CredentialValidationError> {
    if identifier.is_empty() {
        return Err(CredentialValidationError::EmptyIdentifier);
    }

    if identifier.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(CredentialValidationError::IdentifierTooLong(
            MAX_IDENTIFIER_LENGTH,
        ));
    }

    if identifier.chars().any(char::is_whitespace) {
        return Err(CredentialValidationError::IdentifierWhitespace);
    }

    let (local, domain) = identifier
        .split_once('@')
        .ok_or(CredentialValidationError::IdentifierNotEmail)?;

    if local.is_empty() || local.len() > MAX_LOCAL_PART_LENGTH || domain.contains('@') {
        return Err(CredentialValidationError::IdentifierNotEmail);
    }

    let labels: Vec<&str> = domain.split('.').collect();

    if labels.len() < 2 {
        return Err(CredentialValidationError::IdentifierNotEmail);
    }

    for label in labels {
        if label.is_empty() || label.starts_with('-') || label.ends_with('-') {
            return Err(CredentialValidationError::IdentifierNotEmail);
        }
    }

    Ok(())
}

/// Validate a raw secret
///
/// Only emptiness and an upper bound are enforced; strength policy is not
/// part of the credential codec.
pub fn validate_secret(secret: &str) -> Result<(), CredentialValidationError> {
    if secret.is_empty() {
        return Err(CredentialValidationError::EmptySecret);
    }

    if secret.len() > MAX_SECRET_LENGTH {
        return Err(CredentialValidationError::SecretTooLong(MAX_SECRET_LENGTH));
    }

    Ok(())
}
