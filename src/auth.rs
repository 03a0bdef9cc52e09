use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    error::{ApiError, ModerationError},
};

/// Claims
///
/// Payload carried by the bearer token. `user_id` names the account the token was
/// issued to; `exp` is mandatory and checked on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    /// Issued At, seconds since the epoch.
    pub iat: u64,
    /// Expiration Time, seconds since the epoch.
    pub exp: u64,
}

impl Claims {
    /// Claims for `user_id` valid for `ttl_secs` from now.
    pub fn new(user_id: impl Into<String>, ttl_secs: u64) -> Self {
        let now = Utc::now().timestamp().max(0) as u64;
        Self {
            user_id: user_id.into(),
            iat: now,
            exp: now.saturating_add(ttl_secs),
        }
    }
}

/// TokenError
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token rejected: {0}")]
    Rejected(#[from] jsonwebtoken::errors::Error),
}

/// TokenService
///
/// The token collaborator: checks a token against a secret and reads its payload.
pub trait TokenService: Send + Sync {
    /// True when the token is well formed, correctly signed and not expired.
    fn validate(&self, token: &str, secret: &str) -> bool;

    fn decode(&self, token: &str, secret: &str) -> Result<Claims, TokenError>;
}

/// TokenState
pub type TokenState = Arc<dyn TokenService>;

/// JwtService
///
/// HS256 JSON Web Tokens through `jsonwebtoken`.
#[derive(Debug, Clone, Default)]
pub struct JwtService;

impl JwtService {
    fn validation() -> Validation {
        let mut validation = Validation::default();
        // Ensure expiration time validation is always active.
        validation.validate_exp = true;
        // No grace period: a token is dead the second `exp` passes.
        validation.leeway = 0;
        validation
    }

    /// Signs `claims` with `secret`. Token issuance belongs to the login flow; this is
    /// here for tooling and tests.
    pub fn issue(&self, claims: &Claims, secret: &str) -> Result<String, TokenError> {
        let key = EncodingKey::from_secret(secret.as_bytes());
        Ok(encode(&Header::default(), claims, &key)?)
    }
}

impl TokenService for JwtService {
    fn validate(&self, token: &str, secret: &str) -> bool {
        match TokenService::decode(self, token, secret) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "token validation failed");
                false
            }
        }
    }

    fn decode(&self, token: &str, secret: &str) -> Result<Claims, TokenError> {
        let key = DecodingKey::from_secret(secret.as_bytes());
        let data = decode::<Claims>(token, &key, &Self::validation())?;
        Ok(data.claims)
    }
}

/// BearerToken Extractor
///
/// Pulls the raw token out of `Authorization: Bearer <token>`. The header must be
/// exactly the `Bearer ` prefix followed by the token; a missing header, another
/// scheme, an empty token or one containing whitespace is rejected with the
/// "Invalid token" envelope, rendered in the configured error status mode.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty() && !token.contains(char::is_whitespace))
            .map(|token| BearerToken(token.to_string()))
            .ok_or_else(|| ApiError::new(ModerationError::InvalidToken, config.error_status))
    }
}
