//! PostgreSQL credential store implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::domain::credential::{CredentialRecord, Identifier, UserStore};
use crate::domain::DomainError;

/// PostgreSQL implementation of UserStore
///
/// Uniqueness is enforced by the `identifier` UNIQUE constraint, so two
/// concurrent registrations of the same identifier cannot both commit.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    /// Create a new store with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using the database configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DomainError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| DomainError::configuration("Database URL is not configured"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool))
    }

    /// Create the credentials table if it does not exist
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS credentials (
                id UUID PRIMARY KEY,
                identifier TEXT NOT NULL UNIQUE,
                secret_hash TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create credentials table: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn get_by_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<CredentialRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, identifier, secret_hash, created_at
            FROM credentials
            WHERE identifier = $1
            "#,
        )
        .bind(identifier.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get credential: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, record: CredentialRecord) -> Result<CredentialRecord, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO credentials (id, identifier, secret_hash, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.id())
        .bind(record.identifier().as_str())
        .bind(record.secret_hash())
        .bind(record.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::conflict(
                format!("Identifier '{}' already exists", record.identifier()),
            ),
            _ => DomainError::storage(format!("Failed to insert credential: {}", e)),
        })?;

        Ok(record)
    }
}

fn row_to_record(row: &PgRow) -> Result<CredentialRecord, DomainError> {
    let id: Uuid = row
        .try_get("id")
        .map_err(|e| DomainError::storage(format!("Failed to read id: {}", e)))?;
    let identifier: String = row
        .try_get("identifier")
        .map_err(|e| DomainError::storage(format!("Failed to read identifier: {}", e)))?;
    let secret_hash: String = row
        .try_get("secret_hash")
        .map_err(|e| DomainError::storage(format!("Failed to read secret_hash: {}", e)))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| DomainError::storage(format!("Failed to read created_at: {}", e)))?;

    let identifier = Identifier::parse(&identifier)
        .map_err(|e| DomainError::storage(format!("Stored identifier is invalid: {}", e)))?;

    Ok(CredentialRecord::from_parts(
        id,
        identifier,
        secret_hash,
        created_at,
    ))
}
