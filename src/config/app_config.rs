use std::path::PathBuf;

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use serde::Deserialize;

/// Environment variables used by earlier deployments, mapped to config keys.
/// They act as defaults underneath `APP__...` variables and config files.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("auth.private_key_path", "JWT_PRIVATE_KEY_PATH"),
    ("auth.public_key_path", "JWT_PUBLIC_KEY_PATH"),
    ("auth.key_id", "JWT_KID"),
    ("auth.issuer", "JWT_ISS"),
    ("auth.audience", "JWT_AUD"),
    ("database.url", "DATABASE_URL"),
];

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub password: PasswordConfig,
    pub database: DatabaseConfig,
    pub metrics: MetricsConfig,
    pub verifier: VerifierConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Signing key and token settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// PEM file holding the active private key (PKCS#8 or PKCS#1)
    pub private_key_path: Option<PathBuf>,
    /// PEM file holding the matching public key (SPKI or PKCS#1)
    pub public_key_path: Option<PathBuf>,
    /// `kid` of the active key
    pub key_id: String,
    pub issuer: String,
    pub audience: String,
    pub token_ttl_secs: u64,
    /// `max-age` advertised on the JWKS response
    pub jwks_max_age_secs: u64,
    /// Public keys still published while tokens they signed may be live
    pub retired_keys: Vec<RetiredKeyConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetiredKeyConfig {
    pub key_id: String,
    pub public_key_path: PathBuf,
}

/// Argon2 cost parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; the in-memory store is used when unset
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

/// Settings for the resource-server side token verifier
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    pub jwks_url: String,
    pub issuer: String,
    pub audience: String,
    pub leeway_secs: u64,
    pub cache_ttl_secs: u64,
    pub min_refresh_secs: u64,
    pub fetch_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            private_key_path: None,
            public_key_path: None,
            key_id: "k1".to_string(),
            issuer: "http://localhost".to_string(),
            audience: "api".to_string(),
            token_ttl_secs: 900,
            jwks_max_age_secs: 3600,
            retired_keys: Vec::new(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            jwks_url: "http://localhost:8000/.well-known/jwks.json".to_string(),
            issuer: "http://localhost".to_string(),
            audience: "api".to_string(),
            leeway_secs: 60,
            cache_ttl_secs: 3600,
            min_refresh_secs: 10,
            fetch_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let builder = with_legacy_env(config::Config::builder())?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

fn with_legacy_env(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (key, var) in LEGACY_ENV {
        if let Ok(value) = std::env::var(var) {
            builder = builder.set_default(*key, value)?;
        }
    }

    Ok(builder)
}
