//! Signing key material
//!
//! Loads the active RSA key pair from PEM, checks that the halves belong
//! together and exposes the public side as JWKs. Any failure is reported as
//! `AuthError::KeyUnavailable` so startup can refuse to serve.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::EncodingKey;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::domain::{AuthError, Jwk};

/// Raw PEM text for one key pair
#[derive(Clone)]
pub struct KeyPairPem {
    pub kid: String,
    pub private_pem: String,
    pub public_pem: String,
}

impl Debug for KeyPairPem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPairPem")
            .field("kid", &self.kid)
            .field("private_pem", &"[hidden]")
            .field("public_pem", &self.public_pem)
            .finish()
    }
}

/// Where the active key pair comes from
pub trait KeySource: Send + Sync + Debug {
    fn load_pem(&self) -> Result<KeyPairPem, AuthError>;
}

/// Key pair read from two PEM files
#[derive(Debug, Clone)]
pub struct FileKeySource {
    private_path: PathBuf,
    public_path: PathBuf,
    kid: String,
}

impl FileKeySource {
    pub fn new(
        private_path: impl Into<PathBuf>,
        public_path: impl Into<PathBuf>,
        kid: impl Into<String>,
    ) -> Self {
        Self {
            private_path: private_path.into(),
            public_path: public_path.into(),
            kid: kid.into(),
        }
    }
}

impl KeySource for FileKeySource {
    fn load_pem(&self) -> Result<KeyPairPem, AuthError> {
        Ok(KeyPairPem {
            kid: self.kid.clone(),
            private_pem: read_pem(&self.private_path, "private")?,
            public_pem: read_pem(&self.public_path, "public")?,
        })
    }
}

/// Key pair held in memory, used by tests and embedded setups
#[derive(Debug, Clone)]
pub struct PemKeySource {
    pem: KeyPairPem,
}

impl PemKeySource {
    pub fn new(
        kid: impl Into<String>,
        private_pem: impl Into<String>,
        public_pem: impl Into<String>,
    ) -> Self {
        Self {
            pem: KeyPairPem {
                kid: kid.into(),
                private_pem: private_pem.into(),
                public_pem: public_pem.into(),
            },
        }
    }
}

impl KeySource for PemKeySource {
    fn load_pem(&self) -> Result<KeyPairPem, AuthError> {
        Ok(self.pem.clone())
    }
}

/// Active signing key plus every public key that should be published
pub struct KeyMaterial {
    kid: String,
    encoding_key: EncodingKey,
    public_keys: Vec<Jwk>,
}

impl Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("kid", &self.kid)
            .field("encoding_key", &"[hidden]")
            .field("public_keys", &self.public_keys)
            .finish()
    }
}

impl KeyMaterial {
    /// Load and cross-check the active key pair
    pub fn load(source: &dyn KeySource) -> Result<Self, AuthError> {
        let pem = source.load_pem()?;

        if pem.kid.trim().is_empty() {
            return Err(AuthError::key_unavailable("Key ID must not be empty"));
        }

        let private_key = parse_private_key(&pem.private_pem)?;
        let public_key = parse_public_key(&pem.public_pem)?;

        if private_key.to_public_key() != public_key {
            return Err(AuthError::key_unavailable(format!(
                "Public key does not match private key for kid '{}'",
                pem.kid
            )));
        }

        let encoding_key = EncodingKey::from_rsa_pem(pem.private_pem.as_bytes())
            .map_err(|e| AuthError::key_unavailable(format!("Unusable signing key: {}", e)))?;

        let jwk = to_jwk(&pem.kid, &public_key);

        Ok(Self {
            kid: pem.kid,
            encoding_key,
            public_keys: vec![jwk],
        })
    }

    /// Keep publishing a retired public key so tokens it signed still verify
    pub fn with_retired_public_key(
        mut self,
        kid: impl Into<String>,
        public_pem: &str,
    ) -> Result<Self, AuthError> {
        let kid = kid.into();

        if self.public_keys.iter().any(|k| k.kid == kid) {
            return Err(AuthError::key_unavailable(format!(
                "Duplicate key ID '{}'",
                kid
            )));
        }

        let public_key = parse_public_key(public_pem)?;
        self.public_keys.push(to_jwk(&kid, &public_key));

        Ok(self)
    }

    /// Read a retired public key from disk
    pub fn with_retired_public_key_file(
        self,
        kid: impl Into<String>,
        path: &Path,
    ) -> Result<Self, AuthError> {
        let pem = read_pem(path, "retired public")?;
        self.with_retired_public_key(kid, &pem)
    }

    /// ID of the key that signs new tokens
    pub fn key_id(&self) -> &str {
        &self.kid
    }

    /// Public keys to publish, active key first
    pub fn public_key_set(&self) -> Vec<Jwk> {
        self.public_keys.clone()
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }
}

fn read_pem(path: &Path, label: &str) -> Result<String, AuthError> {
    std::fs::read_to_string(path).map_err(|e| {
        AuthError::key_unavailable(format!(
            "Failed to read {} key '{}': {}",
            label,
            path.display(),
            e
        ))
    })
}

fn parse_private_key(pem: &str) -> Result<RsaPrivateKey, AuthError> {
    RsaPrivateKey::from_pkcs8_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
        .map_err(|_| AuthError::key_unavailable("Private key is not a PKCS#8 or PKCS#1 RSA key"))
}

fn parse_public_key(pem: &str) -> Result<RsaPublicKey, AuthError> {
    RsaPublicKey::from_public_key_pem(pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
        .map_err(|e| {
            AuthError::key_unavailable(format!("Public key is not an SPKI or PKCS#1 RSA key: {}", e))
        })
}

fn to_jwk(kid: &str, key: &RsaPublicKey) -> Jwk {
    Jwk::rs256(
        kid,
        URL_SAFE_NO_PAD.encode(key.n().to_bytes_be()),
        URL_SAFE_NO_PAD.encode(key.e().to_bytes_be()),
    )
}
