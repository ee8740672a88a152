//! # Admin Tokens
//!
//! HS256 JSON Web Tokens carrying `{role: "admin", iat, exp}`.
//!
//! ## Invariants
//! - Stateless validation (no store lookup)
//! - Fixed lifetime from issuance (2 hours by default), no refresh
//! - Expiry is checked with zero leeway

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use super::credential::AdminCredential;
use super::errors::{AuthError, AuthResult};

/// Role embedded in every admin token.
pub const ADMIN_ROLE: &str = "admin";

/// Default token lifetime: two hours.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 2 * 60 * 60;

const GENERATED_SECRET_LEN: usize = 64;

/// Claims carried by an admin token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Always [`ADMIN_ROLE`].
    pub role: String,
    /// Issued at (Unix epoch seconds).
    pub iat: i64,
    /// Expiration (Unix epoch seconds).
    pub exp: i64,
}

/// Token signing configuration.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC secret for signing.
    pub secret: String,
    /// Token lifetime.
    pub ttl: Duration,
}

impl Default for TokenConfig {
    /// A random secret known only to this process.
    fn default() -> Self {
        Self {
            secret: generate_secret(),
            ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        }
    }
}

impl TokenConfig {
    /// Read `JWT_SECRET` from the environment.
    pub fn from_env() -> Self {
        Self::from_secret(std::env::var("JWT_SECRET").ok())
    }

    /// Use the given secret, or a random per-process one if unset or empty.
    ///
    /// Tokens signed with a generated secret stop verifying on restart.
    pub fn from_secret(secret: Option<String>) -> Self {
        match secret {
            Some(secret) if !secret.is_empty() => Self {
                secret,
                ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            },
            _ => {
                tracing::warn!(
                    "JWT_SECRET not set or empty. Using a random per-process secret; \
                     admin tokens will not survive a restart"
                );
                Self::default()
            }
        }
    }
}

fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LEN)
        .map(char::from)
        .collect()
}

/// A freshly issued token and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Encoded token, opaque to clients.
    pub token: String,
    /// When the token stops verifying.
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Seconds until expiry, from now.
    pub fn expires_in(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }
}

/// Issues and verifies admin tokens.
#[derive(Clone)]
pub struct TokenService {
    credential: AdminCredential,
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    /// Create a token service for the given admin credential.
    pub fn new(credential: AdminCredential, config: TokenConfig) -> Self {
        Self {
            credential,
            ttl: config.ttl,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    /// Exchange the admin username/password for a token.
    pub fn issue(&self, username: &str, password: &str) -> AuthResult<IssuedToken> {
        if !self.credential.matches(username, password) {
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = AdminClaims {
            role: ADMIN_ROLE.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenIssue)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a bearer credential.
    ///
    /// `None` means the request carried no credential at all.
    pub fn verify(&self, token: Option<&str>) -> AuthResult<AdminClaims> {
        let token = token.ok_or(AuthError::MissingToken)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<AdminClaims>(token, &self.decoding_key, &validation)
            .map_err(|_| AuthError::InvalidOrExpiredToken)?
            .claims;

        if claims.role != ADMIN_ROLE {
            return Err(AuthError::InvalidOrExpiredToken);
        }
        Ok(claims)
    }

    /// Configured token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_with(secret: &str, ttl: Duration) -> TokenService {
        TokenService::new(
            AdminCredential::new("admin", "s3cret"),
            TokenConfig {
                secret: secret.to_string(),
                ttl,
            },
        )
    }

    fn create_test_service() -> TokenService {
        service_with("test_secret_key_for_testing_only", Duration::hours(2))
    }

    #[test]
    fn test_issue_and_verify() {
        let service = create_test_service();
        let issued = service.issue("admin", "s3cret").unwrap();

        assert_eq!(issued.token.split('.').count(), 3);

        let claims = service.verify(Some(&issued.token)).unwrap();
        assert_eq!(claims.role, ADMIN_ROLE);
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_SECS);
    }

    #[test]
    fn test_wrong_credentials_rejected() {
        let service = create_test_service();
        assert_eq!(
            service.issue("admin", "wrong").unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn test_missing_token() {
        let service = create_test_service();
        assert_eq!(service.verify(None).unwrap_err(), AuthError::MissingToken);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = create_test_service();
        assert_eq!(
            service.verify(Some("invalid.token.here")).unwrap_err(),
            AuthError::InvalidOrExpiredToken
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = service_with("secret_one", Duration::hours(2));
        let verifier = service_with("secret_two", Duration::hours(2));

        let issued = issuer.issue("admin", "s3cret").unwrap();
        assert_eq!(
            verifier.verify(Some(&issued.token)).unwrap_err(),
            AuthError::InvalidOrExpiredToken
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = service_with("test_secret", Duration::hours(-1));
        let issued = service.issue("admin", "s3cret").unwrap();

        assert_eq!(issued.expires_in(), 0);
        assert_eq!(
            service.verify(Some(&issued.token)).unwrap_err(),
            AuthError::InvalidOrExpiredToken
        );
    }

    #[test]
    fn test_non_admin_role_rejected() {
        let secret = "test_secret";
        let now = Utc::now();
        let claims = AdminClaims {
            role: "viewer".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let service = service_with(secret, Duration::hours(2));
        assert_eq!(
            service.verify(Some(&token)).unwrap_err(),
            AuthError::InvalidOrExpiredToken
        );
    }

    #[test]
    fn test_configured_secret_is_used() {
        let config = TokenConfig::from_secret(Some("configured".to_string()));
        assert_eq!(config.secret, "configured");
        assert_eq!(config.ttl, Duration::seconds(DEFAULT_TOKEN_TTL_SECS));
    }

    #[test]
    fn test_missing_secret_is_random_per_process() {
        let first = TokenConfig::from_secret(None);
        let second = TokenConfig::from_secret(Some(String::new()));
        assert_eq!(first.secret.len(), GENERATED_SECRET_LEN);
        assert_ne!(first.secret, second.secret);

        let credential = AdminCredential::new("admin", "s3cret");
        let issuer = TokenService::new(credential.clone(), first);
        let other = TokenService::new(credential, second);
        let issued = issuer.issue("admin", "s3cret").unwrap();

        assert!(issuer.verify(Some(&issued.token)).is_ok());
        assert_eq!(
            other.verify(Some(&issued.token)).unwrap_err(),
            AuthError::InvalidOrExpiredToken
        );
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(Some("abc.def.ghi")), None);
        assert_eq!(bearer_token(None), None);
    }
}
