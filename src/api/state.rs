//! Application state for shared services

use std::sync::Arc;

use axum::extract::FromRef;

use crate::domain::credential::UserStore;
use crate::domain::{AuthError, IssuedToken};
use crate::infrastructure::auth::{JwksPublisher, TokenVerifier};
use crate::infrastructure::credential::{AuthService, PasswordHasher};

/// State of the issuing server
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServiceTrait>,
    pub jwks: Arc<JwksPublisher>,
}

/// Register/login operations used by the HTTP handlers
#[async_trait::async_trait]
pub trait AuthServiceTrait: Send + Sync {
    async fn register(&self, identifier: &str, secret: &str) -> Result<(), AuthError>;
    async fn login(&self, identifier: &str, secret: &str) -> Result<IssuedToken, AuthError>;
}

#[async_trait::async_trait]
impl<R, H> AuthServiceTrait for AuthService<R, H>
where
    R: UserStore + 'static,
    H: PasswordHasher + 'static,
{
    async fn register(&self, identifier: &str, secret: &str) -> Result<(), AuthError> {
        AuthService::register(self, identifier, secret).await
    }

    async fn login(&self, identifier: &str, secret: &str) -> Result<IssuedToken, AuthError> {
        AuthService::login(self, identifier, secret).await
    }
}

/// State of a resource server that only verifies tokens
#[derive(Clone)]
pub struct ResourceState {
    pub verifier: Arc<TokenVerifier>,
}

impl FromRef<ResourceState> for Arc<TokenVerifier> {
    fn from_ref(state: &ResourceState) -> Self {
        state.verifier.clone()
    }
}
