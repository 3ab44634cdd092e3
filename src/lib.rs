//! Credential Gateway
//!
//! Registers users with Argon2id-hashed secrets, exchanges credentials for
//! RS256 access tokens and publishes the verification keys as a JWKS:
//! - `POST /register`, `POST /login`
//! - `GET /.well-known/jwks.json`
//! - a token verifier for resource servers

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use api::state::{AppState, AuthServiceTrait, ResourceState};
use domain::AuthError;
use infrastructure::auth::{FileKeySource, JwksPublisher, KeyMaterial, TokenIssuer, TokenVerifier};
use infrastructure::credential::{Argon2Hasher, AuthService, InMemoryUserStore, PostgresUserStore};

/// Build the issuing server's state
///
/// Fails when the signing keys cannot be loaded or the store is unreachable;
/// the server never starts without a publishable key set.
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let keys = Arc::new(load_key_material(config).context("Signing keys unavailable")?);
    info!(
        kid = %keys.key_id(),
        published = keys.public_key_set().len(),
        "Signing keys loaded"
    );

    let jwks = Arc::new(JwksPublisher::new(&keys, config.auth.jwks_max_age_secs)?);
    let issuer = Arc::new(TokenIssuer::from_config(keys, &config.auth));
    let hasher = Arc::new(Argon2Hasher::with_config(&config.password)?);

    let auth_service: Arc<dyn AuthServiceTrait> = match config.database.url {
        Some(_) => {
            info!("Connecting to PostgreSQL...");
            let store = PostgresUserStore::connect(&config.database).await?;
            store.ensure_schema().await?;
            info!("Using PostgreSQL credential store");
            Arc::new(AuthService::new(Arc::new(store), hasher, issuer)?)
        }
        None => {
            info!("Using in-memory credential store");
            Arc::new(AuthService::new(
                Arc::new(InMemoryUserStore::new()),
                hasher,
                issuer,
            )?)
        }
    };

    Ok(AppState { auth_service, jwks })
}

/// Build the resource server's state
pub fn create_resource_state(config: &AppConfig) -> anyhow::Result<ResourceState> {
    let verifier = TokenVerifier::from_config(&config.verifier)?;

    Ok(ResourceState {
        verifier: Arc::new(verifier),
    })
}

/// Load the active key pair and any retired public keys
pub fn load_key_material(config: &AppConfig) -> Result<KeyMaterial, AuthError> {
    let auth = &config.auth;

    let (private_path, public_path) = match (&auth.private_key_path, &auth.public_key_path) {
        (Some(private_path), Some(public_path)) => (private_path, public_path),
        _ => {
            return Err(AuthError::key_unavailable(
                "Both auth.private_key_path and auth.public_key_path must be set",
            ))
        }
    };

    let source = FileKeySource::new(private_path, public_path, auth.key_id.clone());
    let mut keys = KeyMaterial::load(&source)?;

    for retired in &auth.retired_keys {
        keys = keys.with_retired_public_key_file(retired.key_id.clone(), &retired.public_key_path)?;
    }

    Ok(keys)
}
