//! Credential record and identifier types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{validate_identifier, CredentialValidationError};

/// Login identifier (an e-mail address), trimmed and lowercased
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Normalize and validate a raw identifier
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, CredentialValidationError> {
        let normalized = raw.as_ref().trim().to_lowercase();
        validate_identifier(&normalized)?;
        Ok(Self(normalized))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identifier {
    type Error = CredentialValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Identifier> for String {
    fn from(identifier: Identifier) -> Self {
        identifier.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted credential for one user
///
/// Created once at registration and never mutated afterwards. Only the hash
/// of the secret is held.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    id: Uuid,
    identifier: Identifier,
    #[serde(skip_serializing)]
    secret_hash: String,
    created_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Create a new record for a freshly hashed secret
    pub fn new(identifier: Identifier, secret_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            identifier,
            secret_hash: secret_hash.into(),
            created_at: Utc::now(),
        }
    }

    /// Rebuild a record loaded from storage
    pub fn from_parts(
        id: Uuid,
        identifier: Identifier,
        secret_hash: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            identifier,
            secret_hash,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn secret_hash(&self) -> &str {
        &self.secret_hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("id", &self.id)
            .field("identifier", &self.identifier)
            .field("secret_hash", &"[hidden]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_is_normalized() {
        let identifier = Identifier::parse("  U@X.Com ").unwrap();
        assert_eq!(identifier.as_str(), "u@x.com");
        assert_eq!(identifier, Identifier::parse("u@x.com").unwrap());
    }

    #[test]
    fn test_identifier_rejects_invalid() {
        assert!(Identifier::parse("not-an-email").is_err());
        assert!(Identifier::parse("   ").is_err());
    }

    #[test]
    fn test_identifier_deserialize_normalizes() {
        let identifier: Identifier = serde_json::from_str("\"A@B.COM\"").unwrap();
        assert_eq!(identifier.as_str(), "a@b.com");

        let invalid: Result<Identifier, _> = serde_json::from_str("\"nope\"");
        assert!(invalid.is_err());
    }

    #[test]
    fn test_record_never_exposes_hash() {
        let record = CredentialRecord::new(Identifier::parse("a@b.com").unwrap(), "$argon2id$abc");

        let debug = format!("{:?}", record);
        assert!(!debug.contains("$argon2id$abc"));

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("secret_hash"));
        assert_eq!(record.secret_hash(), "$argon2id$abc");
    }
}
