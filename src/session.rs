// src/session.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, models::user::User, state::AppState, store::UserStore};

/// Name of the cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "session";

/// Sessions last a week; the cookie Max-Age and the token's exp claim agree.
const SESSION_TTL_SECS: u64 = 60 * 60 * 24 * 7;

/// Session token claims.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - stores the user ID (as string).
    pub sub: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Signs a new session token for the user.
pub fn sign_session(user_id: i64, secret: &str) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + SESSION_TTL_SECS as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a session token, including its expiry.
pub fn verify_session(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthRequired)?;

    Ok(token_data.claims)
}

/// Set-Cookie value that installs a session.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={SESSION_TTL_SECS}")
}

/// Set-Cookie value that removes the session.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

/// Looks up the user behind the request's session cookie, if any.
///
/// A missing cookie, a token that fails verification, or a user row that no
/// longer exists all resolve to `None`; only database failures are errors.
async fn resolve_user(parts: &Parts, state: &AppState) -> Result<Option<User>, AppError> {
    let jar = CookieJar::from_headers(&parts.headers);

    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    let Ok(claims) = verify_session(cookie.value(), &state.config.session_secret) else {
        return Ok(None);
    };

    let Ok(user_id) = claims.sub.parse::<i64>() else {
        return Ok(None);
    };

    UserStore::get_by_id(&state.pool, user_id).await
}

/// Extractor for endpoints that require a logged-in user.
/// Rejects with 401 when the session is missing or invalid.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match resolve_user(parts, state).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => Err(AppError::AuthRequired),
        }
    }
}

/// Extractor for pages that render either way and redirect on their own.
pub struct OptionalUser(pub Option<User>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(resolve_user(parts, state).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trip() {
        let token = sign_session(42, "secret").unwrap();
        let claims = verify_session(&token, "secret").unwrap();
        assert_eq!(claims.sub, "42");
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = sign_session(42, "secret").unwrap();
        assert!(verify_session(&token, "other-secret").is_err());
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let mut token = sign_session(42, "secret").unwrap();
        token.push('x');
        assert!(verify_session(&token, "secret").is_err());
    }

    #[test]
    fn cookie_strings_target_the_same_cookie() {
        let set = session_cookie("tok");
        assert!(set.starts_with("session=tok;"));
        assert!(set.contains("HttpOnly"));
        assert!(clear_session_cookie().starts_with("session=;"));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
