//! Access token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the user id and role. They are the only
//! credential handlers see; nothing else about the caller is trusted.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use store_ratings_core::{Role, UserId};

use crate::config::JwtConfig;

/// Errors from issuing or verifying a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing failed.
    #[error("failed to issue token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    /// The token is malformed, badly signed or expired.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    /// The subject is not a user id.
    #[error("invalid token subject")]
    InvalidSubject,
}

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID, as a decimal string.
    pub sub: String,
    /// Role at the time of issue.
    pub role: Role,
    /// Issued at (seconds since the epoch).
    pub iat: i64,
    /// Expiration time (seconds since the epoch).
    pub exp: i64,
}

impl Claims {
    /// Claims for `user_id` valid for `ttl` from now.
    #[must_use]
    pub fn new(user_id: UserId, role: Role, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// The user these claims were issued to.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidSubject` if `sub` is not a user id.
    pub fn user_id(&self) -> Result<UserId, TokenError> {
        self.sub.parse().map_err(|_| TokenError::InvalidSubject)
    }
}

/// Signs and verifies access tokens with one shared secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    /// Build the service from the configured secret and lifetime.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::minutes(config.ttl_minutes),
        }
    }

    /// Issue a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails.
    pub fn issue(&self, user_id: UserId, role: Role) -> Result<String, TokenError> {
        self.encode(&Claims::new(user_id, role, self.ttl))
    }

    /// Sign arbitrary claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails.
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(TokenError::Encode)
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if the token doesn't verify.
    /// Returns `TokenError::InvalidSubject` if its subject is not a user id.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)?;
        claims.user_id()?;
        Ok(claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&JwtConfig {
            secret: SecretString::from(secret.to_string()),
            ttl_minutes: 60,
        })
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = service("kT9#vQ2!mZ7@pL4$wX8^rB1&nC6*yD3%");
        let token = tokens.issue(UserId::new(42), Role::Owner).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), UserId::new(42));
        assert_eq!(claims.role, Role::Owner);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_rejects_other_secret() {
        let token = service("kT9#vQ2!mZ7@pL4$wX8^rB1&nC6*yD3%")
            .issue(UserId::new(1), Role::Admin)
            .unwrap();
        let result = service("Zq8!Lw3@Xe5#Rt7$Yu9%Io1^Pa2&Sd4*").verify(&token);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_rejects_expired() {
        let tokens = service("kT9#vQ2!mZ7@pL4$wX8^rB1&nC6*yD3%");
        let claims = Claims::new(UserId::new(1), Role::User, Duration::hours(-2));
        let token = tokens.encode(&claims).unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_rejects_non_numeric_subject() {
        let tokens = service("kT9#vQ2!mZ7@pL4$wX8^rB1&nC6*yD3%");
        let mut claims = Claims::new(UserId::new(1), Role::User, Duration::hours(1));
        claims.sub = "alice".to_string();
        let token = tokens.encode(&claims).unwrap();
        assert!(matches!(
            tokens.verify(&token),
            Err(TokenError::InvalidSubject)
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        let tokens = service("kT9#vQ2!mZ7@pL4$wX8^rB1&nC6*yD3%");
        assert!(tokens.verify("not.a.jwt").is_err());
    }
}
