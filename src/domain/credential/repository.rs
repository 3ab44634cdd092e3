//! Credential store trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{CredentialRecord, Identifier};
use crate::domain::DomainError;

/// Storage capability for credential records
///
/// Implementations own uniqueness of the identifier: `insert` must fail with
/// `DomainError::Conflict` when a record for the same identifier exists,
/// even under concurrent inserts.
#[async_trait]
pub trait UserStore: Send + Sync + Debug {
    /// Look up a record by its normalized identifier
    async fn get_by_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<CredentialRecord>, DomainError>;

    /// Insert a record if no record with the same identifier exists
    async fn insert(&self, record: CredentialRecord) -> Result<CredentialRecord, DomainError>;
}
