//! In-memory credential store implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::credential::{CredentialRecord, Identifier, UserStore};
use crate::domain::DomainError;

/// In-memory implementation of UserStore
///
/// Uniqueness is checked and the record inserted under one write lock.
#[derive(Debug)]
pub struct InMemoryUserStore {
    records: Arc<RwLock<HashMap<String, CredentialRecord>>>,
}

impl InMemoryUserStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_by_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<CredentialRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.get(identifier.as_str()).cloned())
    }

    async fn insert(&self, record: CredentialRecord) -> Result<CredentialRecord, DomainError> {
        let mut records = self.records.write().await;
        let key = record.identifier().as_str().to_string();

        if records.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "Identifier '{}' already exists",
                key
            )));
        }

        records.insert(key, record.clone());

        Ok(record)
    }
}
