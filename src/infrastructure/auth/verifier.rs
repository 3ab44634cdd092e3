//! Token verification against a published JWKS
//!
//! Used by resource servers. Decoding keys are cached by `kid` for the
//! configured TTL. A token carrying an unknown `kid` triggers one refresh,
//! rate-limited so a flood of forged `kid`s cannot hammer the JWKS endpoint.
//! Failed fetches count against the same limit.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use moka::future::Cache;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::VerifierConfig;
use crate::domain::{AccessClaims, AuthError, JwksDocument};

const REQUIRED_CLAIMS: [&str; 5] = ["exp", "iat", "iss", "aud", "sub"];

/// Where verification keys come from
#[async_trait]
pub trait JwksSource: Send + Sync + Debug {
    async fn fetch(&self) -> Result<JwksDocument, AuthError>;
}

/// Fetches the JWKS document over HTTP
#[derive(Debug, Clone)]
pub struct HttpJwksSource {
    client: reqwest::Client,
    url: String,
}

impl HttpJwksSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::key_unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl JwksSource for HttpJwksSource {
    async fn fetch(&self) -> Result<JwksDocument, AuthError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AuthError::key_unavailable(format!("Failed to fetch JWKS: {}", e)))?;

        if !response.status().is_success() {
            return Err(AuthError::key_unavailable(format!(
                "JWKS fetch failed with status: {}",
                response.status()
            )));
        }

        response
            .json::<JwksDocument>()
            .await
            .map_err(|e| AuthError::key_unavailable(format!("Failed to parse JWKS: {}", e)))
    }
}

/// Fixed key set, for co-located verification and tests
#[derive(Debug, Clone)]
pub struct StaticJwksSource {
    document: JwksDocument,
}

impl StaticJwksSource {
    pub fn new(document: JwksDocument) -> Self {
        Self { document }
    }
}

#[async_trait]
impl JwksSource for StaticJwksSource {
    async fn fetch(&self) -> Result<JwksDocument, AuthError> {
        Ok(self.document.clone())
    }
}

#[derive(Debug, Clone, Copy)]
struct RefreshAttempt {
    at: Instant,
    failed: bool,
}

/// Validates bearer tokens and returns their claims
pub struct TokenVerifier {
    source: Arc<dyn JwksSource>,
    keys: Cache<String, Arc<DecodingKey>>,
    last_refresh: Mutex<Option<RefreshAttempt>>,
    issuer: String,
    audience: String,
    leeway_secs: u64,
    cache_ttl: Duration,
    min_refresh: Duration,
}

impl Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("source", &self.source)
            .field("cached_keys", &self.keys.entry_count())
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_secs", &self.leeway_secs)
            .field("cache_ttl", &self.cache_ttl)
            .field("min_refresh", &self.min_refresh)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(source: Arc<dyn JwksSource>, config: &VerifierConfig) -> Self {
        let min_refresh = Duration::from_secs(config.min_refresh_secs);

        // Keys must outlive the refresh window or a still-valid kid could
        // expire with no refetch allowed.
        let mut cache_ttl = Duration::from_secs(config.cache_ttl_secs);
        if cache_ttl < min_refresh {
            warn!(
                cache_ttl_secs = config.cache_ttl_secs,
                min_refresh_secs = config.min_refresh_secs,
                "Key cache TTL below minimum refresh interval, raising it"
            );
            cache_ttl = min_refresh;
        }

        let keys = Cache::builder()
            .time_to_live(cache_ttl)
            .max_capacity(64)
            .build();

        Self {
            source,
            keys,
            last_refresh: Mutex::new(None),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            leeway_secs: config.leeway_secs,
            cache_ttl,
            min_refresh,
        }
    }

    /// Verifier backed by the configured JWKS URL
    pub fn from_config(config: &VerifierConfig) -> Result<Self, AuthError> {
        let source = HttpJwksSource::new(
            config.jwks_url.clone(),
            Duration::from_secs(config.fetch_timeout_secs),
        )?;

        Ok(Self::new(Arc::new(source), config))
    }

    /// Verify signature and claims
    pub async fn verify(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let header = decode_header(token)
            .map_err(|e| AuthError::invalid_token(format!("Malformed token: {}", e)))?;

        if header.alg != Algorithm::RS256 {
            return Err(AuthError::invalid_token(format!(
                "Unexpected algorithm {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AuthError::invalid_token("Token header has no kid"))?;

        let key = self.key_for(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&REQUIRED_CLAIMS);
        validation.leeway = self.leeway_secs;

        let claims = decode::<AccessClaims>(token, &key, &validation)
            .map_err(|e| AuthError::invalid_token(e.to_string()))?
            .claims;

        // jsonwebtoken does not check iat
        if claims.iat > Utc::now().timestamp() + self.leeway_secs as i64 {
            return Err(AuthError::invalid_token("Token issued in the future"));
        }

        if claims.sub.is_empty() {
            return Err(AuthError::invalid_token("Token has an empty subject"));
        }

        Ok(claims)
    }

    /// Fetch the key set now, replacing cached keys
    pub async fn refresh(&self) -> Result<usize, AuthError> {
        let mut last_refresh = self.last_refresh.lock().await;
        self.refresh_locked(&mut last_refresh).await
    }

    async fn key_for(&self, kid: &str) -> Result<Arc<DecodingKey>, AuthError> {
        if let Some(key) = self.keys.get(kid).await {
            return Ok(key);
        }

        let mut last_refresh = self.last_refresh.lock().await;

        // Another caller may have refreshed while we waited
        if let Some(key) = self.keys.get(kid).await {
            return Ok(key);
        }

        let previous = *last_refresh;
        match previous {
            Some(attempt) if attempt.at.elapsed() < self.min_refresh => {
                if attempt.failed {
                    return Err(AuthError::key_unavailable(
                        "JWKS fetch failed recently, not retrying yet",
                    ));
                }
            }
            _ => {
                self.refresh_locked(&mut last_refresh).await?;
            }
        }

        self.keys
            .get(kid)
            .await
            .ok_or_else(|| AuthError::invalid_token(format!("Unknown key id '{}'", kid)))
    }

    async fn refresh_locked(&self, last_refresh: &mut Option<RefreshAttempt>) -> Result<usize, AuthError> {
        // Recorded before fetching so a failing source is rate-limited too
        *last_refresh = Some(RefreshAttempt {
            at: Instant::now(),
            failed: true,
        });

        let document = self.source.fetch().await.inspect_err(|e| {
            warn!(error = %e, "JWKS refresh failed");
        })?;

        self.keys.invalidate_all();

        let mut loaded = 0;
        for jwk in document.keys.iter().filter(|k| !k.kid.is_empty()) {
            let Some((n, e)) = jwk.rs256_components() else {
                debug!(kid = %jwk.kid, kty = %jwk.kty, "Skipping non-RS256 JWK");
                continue;
            };

            match DecodingKey::from_rsa_components(n, e) {
                Ok(key) => {
                    self.keys.insert(jwk.kid.clone(), Arc::new(key)).await;
                    loaded += 1;
                }
                Err(e) => debug!(kid = %jwk.kid, error = %e, "Skipping unusable JWK"),
            }
        }

        if let Some(attempt) = last_refresh.as_mut() {
            attempt.failed = false;
        }
        info!(keys = loaded, "JWKS refreshed");

        Ok(loaded)
    }
}
