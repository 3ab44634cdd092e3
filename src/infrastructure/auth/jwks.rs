//! JWKS discovery document

use crate::domain::{AuthError, JwksDocument};

use super::keys::KeyMaterial;

/// Pre-rendered JWKS response
///
/// The body is serialized once at startup. Construction fails when there is
/// nothing to publish, so the endpoint never serves an empty or null set.
#[derive(Debug, Clone)]
pub struct JwksPublisher {
    document: JwksDocument,
    body: String,
    cache_control: String,
}

impl JwksPublisher {
    pub fn new(keys: &KeyMaterial, max_age_secs: u64) -> Result<Self, AuthError> {
        let document = JwksDocument::new(keys.public_key_set());

        if document.is_empty() {
            return Err(AuthError::key_unavailable("No public keys to publish"));
        }

        let body = serde_json::to_string(&document)
            .map_err(|e| AuthError::key_unavailable(format!("Failed to serialize JWKS: {}", e)))?;

        Ok(Self {
            document,
            body,
            cache_control: format!("public, max-age={}", max_age_secs),
        })
    }

    pub fn serve(&self) -> &JwksDocument {
        &self.document
    }

    /// Serialized `{"keys":[...]}` body
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn cache_control(&self) -> &str {
        &self.cache_control
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::auth::keys::fixtures::*;

    #[test]
    fn test_publishes_active_key() {
        let publisher = JwksPublisher::new(&signing_keys(), 3600).unwrap();

        let doc = publisher.serve();
        assert_eq!(doc.keys.len(), 1);
        assert!(doc.find_key("k1").is_some());
        assert_eq!(publisher.cache_control(), "public, max-age=3600");
    }

    #[test]
    fn test_body_shape() {
        let publisher = JwksPublisher::new(&signing_keys(), 3600).unwrap();

        let body: serde_json::Value = serde_json::from_str(publisher.body()).unwrap();
        let key = &body["keys"][0];

        assert_eq!(key["kid"], "k1");
        assert_eq!(key["use"], "sig");
        assert_eq!(key["alg"], "RS256");
        assert_eq!(key["kty"], "RSA");
        assert_eq!(key["e"], "AQAB");
        assert!(key.get("d").is_none());
        assert!(!publisher.body().contains("PRIVATE"));
    }

    #[test]
    fn test_retired_keys_published() {
        let keys = signing_keys()
            .with_retired_public_key("k0", ROTATED_PUBLIC)
            .unwrap();

        let publisher = JwksPublisher::new(&keys, 60).unwrap();

        assert_eq!(publisher.serve().keys.len(), 2);
        assert!(publisher.serve().find_key("k0").is_some());
        assert_eq!(publisher.cache_control(), "public, max-age=60");
    }
}
