//! Signed bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying `sub` (username), `iat` and `exp`.
//! Expiry is checked against the injected [`Clock`], not the library's own
//! notion of time, so tests can move time freely.
//!
//! There is no revocation list: a token stays valid until `exp`. Logging out
//! cannot invalidate a token that has already been handed out.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;
use crate::utils::clock::Clock;

/// Minimum HS256 key length in bytes (256 bits).
pub const MIN_SECRET_LEN: usize = 32;

/// Claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the username.
    pub sub: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// Issues and verifies tokens with a symmetric secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a token service.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the secret is shorter than
    /// [`MIN_SECRET_LEN`] bytes or the lifetime is not positive.
    pub fn new(secret: &str, lifetime: Duration, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AppError::bad_request(
                "Signing secret must be at least 32 bytes",
                json!({ "provided_length": secret.len() }),
            ));
        }

        if lifetime <= Duration::zero() {
            return Err(AppError::bad_request(
                "Token lifetime must be positive",
                json!({ "lifetime_seconds": lifetime.num_seconds() }),
            ));
        }

        // Signature and structure only; expiry is compared against `clock`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
            clock,
        })
    }

    /// Configured token lifetime.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issues a token for `username`, valid from now for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if signing fails.
    pub fn issue(&self, username: &str) -> Result<String, AppError> {
        let now = self.clock.now();
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Token signing failed");
            AppError::internal("Token signing failed", json!({}))
        })
    }

    /// True iff the signature verifies and the token has not expired.
    pub fn validate(&self, token: &str) -> bool {
        match self.decode_claims(token) {
            Ok(claims) if !self.is_past(claims.exp) => true,
            Ok(claims) => {
                tracing::debug!(sub = %claims.sub, "Token expired");
                false
            }
            Err(e) => {
                tracing::debug!(error = %e, "Invalid token");
                false
            }
        }
    }

    /// Subject of a correctly signed token.
    ///
    /// Expiry is not checked here; callers that need both guarantees call
    /// [`Self::validate`] first.
    pub fn extract_username(&self, token: &str) -> Option<String> {
        self.extract_claims(token).map(|claims| claims.sub)
    }

    /// Claims of a correctly signed token, without an expiry check.
    pub fn extract_claims(&self, token: &str) -> Option<Claims> {
        match self.decode_claims(token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to extract token claims");
                None
            }
        }
    }

    /// True if the token is unreadable or its expiry is in the past.
    pub fn is_expired(&self, token: &str) -> bool {
        self.extract_claims(token)
            .map(|claims| self.is_past(claims.exp))
            .unwrap_or(true)
    }

    fn is_past(&self, exp: i64) -> bool {
        exp < self.clock.now().timestamp()
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }
}
