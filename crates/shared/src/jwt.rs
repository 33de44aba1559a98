//! JWT validation for bearer tokens.
//!
//! Tokens come from the external identity provider. Issuing is kept for
//! development tooling and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Claims;
use crate::config::JwtConfig;

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Issuer mismatch.
    #[error("invalid token issuer")]
    InvalidIssuer,
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    issuer: Option<String>,
    leeway_secs: u64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.issuer)
            .field("leeway_secs", &self.leeway_secs)
            .field("keys", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            leeway_secs: config.leeway_secs,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    /// Creates a signed token for a user, valid for `ttl_minutes`.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn issue_token(
        &self,
        user_id: Uuid,
        name: Option<String>,
        ttl_minutes: i64,
    ) -> Result<String, JwtError> {
        let mut claims = Claims::new(user_id, name, Utc::now() + Duration::minutes(ttl_minutes));
        claims.iss.clone_from(&self.issuer);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates and decodes a token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired,
    /// `JwtError::InvalidIssuer` on an issuer mismatch and
    /// `JwtError::DecodingError` if the token is malformed.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::default();
        validation.leeway = self.leeway_secs;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service(issuer: Option<&str>) -> JwtService {
        JwtService::new(&JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            issuer: issuer.map(str::to_string),
            leeway_secs: 0,
        })
    }

    #[test]
    fn test_issue_and_validate() {
        let service = create_test_service(None);
        let user_id = Uuid::new_v4();

        let token = service
            .issue_token(user_id, Some("Siti".into()), 15)
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.name.as_deref(), Some("Siti"));
    }

    #[test]
    fn test_expired_token() {
        let service = create_test_service(None);
        let token = service.issue_token(Uuid::new_v4(), None, -5).unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_wrong_issuer() {
        let issuer_a = create_test_service(Some("idp-a"));
        let issuer_b = create_test_service(Some("idp-b"));
        let token = issuer_a.issue_token(Uuid::new_v4(), None, 15).unwrap();

        assert!(matches!(
            issuer_b.validate_token(&token),
            Err(JwtError::InvalidIssuer)
        ));
    }

    #[test]
    fn test_invalid_token() {
        let service = create_test_service(None);
        assert!(matches!(
            service.validate_token("invalid.token.here"),
            Err(JwtError::DecodingError(_))
        ));
    }
}
