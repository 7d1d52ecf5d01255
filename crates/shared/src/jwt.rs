//! JWT token generation and validation.
//!
//! Tokens are HS256-signed and carry the account's id and role. Whoever holds
//! a valid token is trusted as that actor by the loan engine.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Claims;
use crate::config::JwtSettings;

/// Longest token lifetime honored, one year. Longer settings are clamped.
pub const MAX_TOKEN_EXPIRY_SECS: i64 = 365 * 24 * 60 * 60;

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Token lifetime in seconds.
    pub token_expires_secs: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            token_expires_secs: 86_400,
        }
    }
}

impl From<&JwtSettings> for JwtConfig {
    fn from(settings: &JwtSettings) -> Self {
        Self {
            secret: settings.secret.clone(),
            token_expires_secs: i64::try_from(settings.token_expiry_secs)
                .unwrap_or(MAX_TOKEN_EXPIRY_SECS)
                .min(MAX_TOKEN_EXPIRY_SECS),
        }
    }
}

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
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("token_expires_secs", &self.config.token_expires_secs)
            .field("secret", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    ///
    /// Lifetimes beyond [`MAX_TOKEN_EXPIRY_SECS`] in either direction are
    /// clamped.
    #[must_use]
    pub fn new(mut config: JwtConfig) -> Self {
        config.token_expires_secs = config
            .token_expires_secs
            .clamp(-MAX_TOKEN_EXPIRY_SECS, MAX_TOKEN_EXPIRY_SECS);
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issues a bearer token for an account.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn issue_token(&self, user_id: Uuid, role: &str, email: &str) -> Result<String, JwtError> {
        let expires_at = Utc::now() + Duration::seconds(self.config.token_expires_secs);
        let claims = Claims::new(user_id, role, email, expires_at);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates and decodes a token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired, or
    /// `JwtError::DecodingError` if it is malformed or badly signed.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::default();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }

    /// Returns the token lifetime in seconds.
    #[must_use]
    pub const fn token_expires_in(&self) -> i64 {
        self.config.token_expires_secs
    }
}
