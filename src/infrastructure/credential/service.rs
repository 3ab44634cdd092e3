//! Registration and login orchestration

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::credential::{validate_secret, CredentialRecord, Identifier, UserStore};
use crate::domain::{AuthError, DomainError, IssuedToken};
use crate::infrastructure::auth::TokenIssuer;
use crate::infrastructure::observability::{record_login, record_registration, record_token_issued};

use super::password::PasswordHasher;

/// Verified against when the identifier is unknown so both login failures
/// cost one hash verification.
const DUMMY_SECRET: &str = "credential-gateway-dummy-secret";

/// Registers credentials and exchanges them for access tokens
pub struct AuthService<R: UserStore, H: PasswordHasher> {
    store: Arc<R>,
    hasher: Arc<H>,
    issuer: Arc<TokenIssuer>,
    dummy_hash: String,
}

impl<R: UserStore, H: PasswordHasher> std::fmt::Debug for AuthService<R, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("store", &self.store)
            .field("hasher", &self.hasher)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl<R: UserStore + 'static, H: PasswordHasher + 'static> AuthService<R, H> {
    pub fn new(store: Arc<R>, hasher: Arc<H>, issuer: Arc<TokenIssuer>) -> Result<Self, DomainError> {
        let dummy_hash = hasher.hash(DUMMY_SECRET)?;

        Ok(Self {
            store,
            hasher,
            issuer,
            dummy_hash,
        })
    }

    /// Register a new identifier
    ///
    /// Fails with `AlreadyRegistered` when the identifier exists, including
    /// when a concurrent registration wins the insert.
    pub async fn register(&self, raw_identifier: &str, secret: &str) -> Result<(), AuthError> {
        let result = self.try_register(raw_identifier, secret).await;

        record_registration(match &result {
            Ok(()) => "created",
            Err(AuthError::AlreadyRegistered) => "conflict",
            Err(AuthError::Validation { .. }) => "invalid",
            Err(_) => "error",
        });

        result
    }

    async fn try_register(&self, raw_identifier: &str, secret: &str) -> Result<(), AuthError> {
        let identifier = Identifier::parse(raw_identifier)?;
        validate_secret(secret)?;

        if self.store.get_by_identifier(&identifier).await?.is_some() {
            debug!("Registration rejected: identifier already registered");
            return Err(AuthError::AlreadyRegistered);
        }

        let secret_hash = self.hash_blocking(secret).await?;
        let record = CredentialRecord::new(identifier, secret_hash);

        match self.store.insert(record).await {
            Ok(record) => {
                info!(credential_id = %record.id(), "Credential registered");
                Ok(())
            }
            Err(e) if e.is_conflict() => {
                debug!("Registration lost insert race");
                Err(AuthError::AlreadyRegistered)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Exchange an identifier and secret for an access token
    ///
    /// Unknown identifiers and wrong secrets both yield `InvalidCredentials`.
    pub async fn login(&self, raw_identifier: &str, secret: &str) -> Result<IssuedToken, AuthError> {
        let result = self.try_login(raw_identifier, secret).await;

        match &result {
            Ok(_) => {
                record_login("success");
                record_token_issued();
            }
            Err(AuthError::InvalidCredentials) => record_login("rejected"),
            Err(e) => {
                warn!(error = %e, "Login failed");
                record_login("error");
            }
        }

        result
    }

    async fn try_login(&self, raw_identifier: &str, secret: &str) -> Result<IssuedToken, AuthError> {
        // Malformed input can never match a stored credential
        let identifier = match Identifier::parse(raw_identifier) {
            Ok(identifier) => identifier,
            Err(_) => return Err(AuthError::InvalidCredentials),
        };
        if validate_secret(secret).is_err() {
            return Err(AuthError::InvalidCredentials);
        }

        let record = self.store.get_by_identifier(&identifier).await?;

        let secret_hash = match &record {
            Some(record) => record.secret_hash().to_string(),
            None => self.dummy_hash.clone(),
        };

        let matches = self.verify_blocking(secret, secret_hash).await?;

        match record {
            Some(record) if matches => {
                let token = self.issuer.issue(record.identifier().as_str())?;
                info!(credential_id = %record.id(), kid = %self.issuer.key_id(), "Access token issued");
                Ok(token)
            }
            _ => {
                debug!("Login rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    async fn hash_blocking(&self, secret: &str) -> Result<String, DomainError> {
        let hasher = self.hasher.clone();
        let secret = secret.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| DomainError::internal(format!("Hashing task failed: {}", e)))?
    }

    async fn verify_blocking(&self, secret: &str, secret_hash: String) -> Result<bool, DomainError> {
        let hasher = self.hasher.clone();
        let secret = secret.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&secret, &secret_hash))
            .await
            .map_err(|e| DomainError::internal(format!("Verification task failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credential::MockUserStore;
    use crate::infrastructure::auth::fixtures::signing_keys;
    use crate::infrastructure::credential::password::{fast_hasher, Argon2Hasher};
    use crate::infrastructure::credential::repository::InMemoryUserStore;

    fn issuer() -> Arc<TokenIssuer> {
        Arc::new(TokenIssuer::new(
            Arc::new(signing_keys()),
            "http://localhost",
            "api",
            900,
        ))
    }

    fn create_service() -> AuthService<InMemoryUserStore, Argon2Hasher> {
        AuthService::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(fast_hasher()),
            issuer(),
        )
        .unwrap()
    }

    fn create_mock_service(store: Arc<MockUserStore>) -> AuthService<MockUserStore, Argon2Hasher> {
        AuthService::new(store, Arc::new(fast_hasher()), issuer()).unwrap()
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = create_service();

        service.register("u@x.com", "pw1").await.unwrap();
        let token = service.login("u@x.com", "pw1").await.unwrap();

        assert_eq!(token.expires_in, 900);
        assert_eq!(token.claims.sub, "u@x.com");
        assert_eq!(token.claims.exp - token.claims.iat, 900);
    }

    #[tokio::test]
    async fn test_register_stores_hash_only() {
        let store = Arc::new(InMemoryUserStore::new());
        let service = AuthService::new(store.clone(), Arc::new(fast_hasher()), issuer()).unwrap();

        service.register("u@x.com", "pw1").await.unwrap();

        let identifier = Identifier::parse("u@x.com").unwrap();
        let record = store.get_by_identifier(&identifier).await.unwrap().unwrap();
        assert_ne!(record.secret_hash(), "pw1");
        assert!(record.secret_hash().starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_duplicate() {
        let service = create_service();

        service.register("u@x.com", "pw1").await.unwrap();
        let result = service.register("u@x.com", "other").await;

        assert!(matches!(result, Err(AuthError::AlreadyRegistered)));
    }

    #[tokio::test]
    async fn test_register_duplicate_differs_only_in_case() {
        let service = create_service();

        service.register("u@x.com", "pw1").await.unwrap();
        let result = service.register("  U@X.COM ", "pw1").await;

        assert!(matches!(result, Err(AuthError::AlreadyRegistered)));
    }

    #[tokio::test]
    async fn test_register_insert_conflict_maps_to_already_registered() {
        let store = Arc::new(MockUserStore::new());
        let service = create_mock_service(store.clone());

        service.register("u@x.com", "pw1").await.unwrap();

        // Lookup misses, so the store's uniqueness check is what rejects
        store.set_hide_from_lookup(true).await;
        let result = service.register("u@x.com", "pw1").await;

        assert!(matches!(result, Err(AuthError::AlreadyRegistered)));
        assert_eq!(store.insert_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_registrations_one_wins() {
        let service = Arc::new(create_service());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.register("race@x.com", "pw1").await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => created += 1,
                Err(AuthError::AlreadyRegistered) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_register_invalid_input() {
        let service = create_service();

        assert!(matches!(
            service.register("not-an-email", "pw1").await,
            Err(AuthError::Validation { .. })
        ));
        assert!(matches!(
            service.register("u@x.com", "").await,
            Err(AuthError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_register_store_failure() {
        let store = Arc::new(MockUserStore::new());
        let service = create_mock_service(store.clone());
        store.set_should_fail(true).await;

        let result = service.register("u@x.com", "pw1").await;
        assert!(matches!(result, Err(AuthError::Store(_))));
    }

    #[tokio::test]
    async fn test_login_wrong_secret_and_unknown_user_are_identical() {
        let service = create_service();
        service.register("u@x.com", "pw1").await.unwrap();

        let wrong = service.login("u@x.com", "wrong").await.unwrap_err();
        let unknown = service.login("nobody@x.com", "pw1").await.unwrap_err();

        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_login_malformed_input_is_invalid_credentials() {
        let service = create_service();

        assert!(matches!(
            service.login("not-an-email", "pw1").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login("u@x.com", "").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_login_normalizes_identifier() {
        let service = create_service();
        service.register("u@x.com", "pw1").await.unwrap();

        let token = service.login("U@X.com", "pw1").await.unwrap();
        assert_eq!(token.claims.sub, "u@x.com");
    }

    #[tokio::test]
    async fn test_login_store_failure() {
        let store = Arc::new(MockUserStore::new());
        let service = create_mock_service(store.clone());
        store.set_should_fail(true).await;

        let result = service.login("u@x.com", "pw1").await;
        assert!(matches!(result, Err(AuthError::Store(_))));
    }
}
