use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::AppConfig, error::ApiError, repository::RepositoryState};

const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";
const INVALID_TOKEN: &str = "Invalid token.";
const INACTIVE_ACCOUNT: &str = "User inactive or deleted.";

// --- Passwords ---

/// hash_password
///
/// Produces a salted argon2 PHC string. The salt comes from the OS generator.
pub fn hash_password(plain: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(plain.as_bytes(), &salt).map_err(|e| {
        tracing::error!(error = %e, "argon2 hash_password error");
        e
    })?;
    Ok(hash.to_string())
}

/// verify_password
///
/// Constant-time comparison through argon2's verifier. An unparsable stored hash never
/// authenticates.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(plain.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "argon2 parse hash error");
            false
        }
    }
}

// --- Access tokens ---

/// Claims
///
/// Payload of an access token. The token is only honoured while it is also the
/// account's stored token, so logout and deactivation revoke it before `exp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account id.
    pub sub: Uuid,
    /// Unique token id; two tokens issued in the same second still differ.
    pub jti: Uuid,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is invalid: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("token could not be signed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("token lifetime of {0} hours is out of range")]
    Lifetime(i64),
}

/// issue_token
///
/// Signs a fresh HS256 token for `user_id`, valid for the configured lifetime.
pub fn issue_token(user_id: Uuid, config: &AppConfig) -> Result<String, TokenError> {
    let now = Utc::now();
    let exp = TimeDelta::try_hours(config.token_ttl_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or(TokenError::Lifetime(config.token_ttl_hours))?;
    let claims = Claims {
        sub: user_id,
        jti: Uuid::new_v4(),
        iat: now.timestamp().max(0) as usize,
        exp: exp.timestamp().max(0) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(TokenError::Signing)
}

/// decode_token
///
/// Verifies signature and expiry (no leeway) and returns the claims.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.leeway = 0;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e),
        })
}

/// Extracts the token from `Authorization: Bearer <t>` or `Authorization: Token <t>`.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("Token "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// --- Extractor ---

/// AuthUser
///
/// The resolved identity of an authenticated request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub is_staff: bool,
    /// The token the request was authenticated with.
    pub token: String,
}

/// AuthUser Extractor Implementation
///
/// 1. Reuses the identity already resolved by the auth middleware, if any.
/// 2. Reads the token from the `Authorization` header.
/// 3. Verifies the JWT signature and expiry.
/// 4. Requires the token to be the account's stored token (revocation).
/// 5. Requires the account to exist and be active.
///
/// Rejection: `ApiError::Auth` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let token = token_from_headers(&parts.headers)
            .ok_or_else(|| ApiError::Auth(MISSING_CREDENTIALS.to_string()))?
            .to_string();

        let claims = decode_token(&token, &config.jwt_secret).map_err(|e| {
            tracing::debug!(error = %e, "rejected access token");
            ApiError::Auth(INVALID_TOKEN.to_string())
        })?;

        match repo.get_token(claims.sub).await? {
            Some(stored) if stored.key == token => {}
            _ => {
                tracing::debug!(user_id = %claims.sub, "access token revoked or replaced");
                return Err(ApiError::Auth(INVALID_TOKEN.to_string()));
            }
        }

        let account = repo
            .get_account(claims.sub)
            .await?
            .ok_or_else(|| ApiError::Auth(INVALID_TOKEN.to_string()))?;
        if !account.is_active {
            return Err(ApiError::Auth(INACTIVE_ACCOUNT.to_string()));
        }

        Ok(AuthUser {
            id: account.id,
            username: account.username,
            is_staff: account.is_staff,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("longpass1").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("longpass1", &hash));
        assert!(!verify_password("longpass2", &hash));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        assert_ne!(hash_password("longpass1").unwrap(), hash_password("longpass1").unwrap());
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_issued_token_decodes_to_subject() {
        let config = AppConfig::default();
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, &config).unwrap();
        let claims = decode_token(&token, &config.jwt_secret).unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tokens_are_unique_per_issue() {
        let config = AppConfig::default();
        let user_id = Uuid::new_v4();
        assert_ne!(issue_token(user_id, &config).unwrap(), issue_token(user_id, &config).unwrap());
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let config = AppConfig::default();
        let token = issue_token(Uuid::new_v4(), &config).unwrap();
        assert!(matches!(decode_token(&token, "another-secret"), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = AppConfig {
            token_ttl_hours: -1,
            ..AppConfig::default()
        };
        let token = issue_token(Uuid::new_v4(), &config).unwrap();
        assert!(matches!(decode_token(&token, &config.jwt_secret), Err(TokenError::Expired)));
    }

    #[test]
    fn test_unrepresentable_lifetime_is_an_error() {
        for hours in [i64::MAX, i64::MAX / 2, i64::MIN] {
            let config = AppConfig {
                token_ttl_hours: hours,
                ..AppConfig::default()
            };
            assert!(matches!(issue_token(Uuid::new_v4(), &config), Err(TokenError::Lifetime(h)) if h == hours));
        }
    }

    #[test]
    fn test_both_authorization_schemes_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(token_from_headers(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Token xyz"));
        assert_eq!(token_from_headers(&headers), Some("xyz"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(token_from_headers(&headers), None);
    }
}
