//! Published JSON Web Key Set types

use serde::{Deserialize, Serialize};

/// Public signing key descriptor in JWK form
///
/// Only RSA public components are representable; there is no field for
/// private material. Everything except `kty` is optional so a fetched set
/// containing other key types still parses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type (RSA, EC, oct)
    pub kty: String,
    /// Key ID
    #[serde(default)]
    pub kid: String,
    /// Intended use
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    /// Signature algorithm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// RSA modulus (base64url, no padding)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA public exponent (base64url, no padding)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

impl Jwk {
    /// RS256 signature key
    pub fn rs256(kid: impl Into<String>, n: impl Into<String>, e: impl Into<String>) -> Self {
        Self {
            kty: "RSA".to_string(),
            kid: kid.into(),
            key_use: Some("sig".to_string()),
            alg: Some("RS256".to_string()),
            n: Some(n.into()),
            e: Some(e.into()),
        }
    }

    /// RSA modulus and exponent, if this entry can verify RS256 signatures
    ///
    /// A missing `use` or `alg` is accepted; a present one must match.
    pub fn rs256_components(&self) -> Option<(&str, &str)> {
        if self.kty != "RSA" {
            return None;
        }
        if self.key_use.as_deref().is_some_and(|u| u != "sig") {
            return None;
        }
        if self.alg.as_deref().is_some_and(|a| a != "RS256") {
            return None;
        }

        Some((self.n.as_deref()?, self.e.as_deref()?))
    }
}

/// Discovery document served at `/.well-known/jwks.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwksDocument {
    pub keys: Vec<Jwk>,
}

impl JwksDocument {
    pub fn new(keys: Vec<Jwk>) -> Self {
        Self { keys }
    }

    /// Find a key by ID
    #[cfg(test)]
    pub fn find_key(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid == kid)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwk_serializes_use_field() {
        let jwk = Jwk::rs256("k1", "modulus", "AQAB");
        let value = serde_json::to_value(&jwk).unwrap();

        assert_eq!(value["use"], "sig");
        assert_eq!(value["alg"], "RS256");
        assert_eq!(value["kty"], "RSA");
        assert_eq!(value["kid"], "k1");
        assert!(value.get("key_use").is_none());
        assert!(value.get("d").is_none());
    }

    #[test]
    fn test_find_key() {
        let doc = JwksDocument::new(vec![Jwk::rs256("k1", "n1", "AQAB"), Jwk::rs256("k0", "n0", "AQAB")]);

        assert_eq!(doc.find_key("k0").unwrap().n.as_deref(), Some("n0"));
        assert!(doc.find_key("missing").is_none());
        assert!(!doc.is_empty());
        assert!(JwksDocument::default().is_empty());
    }

    #[test]
    fn test_mixed_key_set_parses() {
        let doc: JwksDocument = serde_json::from_value(serde_json::json!({
            "keys": [
                { "kty": "EC", "kid": "ec1", "alg": "ES256", "crv": "P-256", "x": "abc", "y": "def" },
                { "kty": "RSA", "kid": "noalg", "n": "n2", "e": "AQAB" },
                { "kty": "RSA", "kid": "enc", "use": "enc", "n": "n3", "e": "AQAB" },
                { "kty": "RSA", "kid": "k1", "use": "sig", "alg": "RS256", "n": "n1", "e": "AQAB" }
            ]
        }))
        .unwrap();

        assert_eq!(doc.keys.len(), 4);
        assert!(doc.find_key("ec1").unwrap().rs256_components().is_none());
        assert!(doc.find_key("enc").unwrap().rs256_components().is_none());
        assert_eq!(doc.find_key("noalg").unwrap().rs256_components(), Some(("n2", "AQAB")));
        assert_eq!(doc.find_key("k1").unwrap().rs256_components(), Some(("n1", "AQAB")));
    }

    #[test]
    fn test_rsa_entry_without_modulus_is_unusable() {
        let jwk: Jwk = serde_json::from_str(r#"{"kty":"RSA","kid":"k1","e":"AQAB"}"#).unwrap();
        assert!(jwk.rs256_components().is_none());
    }

    #[test]
    fn test_document_shape() {
        let doc = JwksDocument::new(vec![Jwk::rs256("k1", "n", "AQAB")]);
        let json = serde_json::to_value(&doc).unwrap();

        assert!(json["keys"].is_array());
        assert_eq!(json["keys"].as_array().unwrap().len(), 1);
    }
}
