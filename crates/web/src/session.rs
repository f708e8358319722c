//! Cookie-backed login sessions.
//!
//! The cookie holds an opaque random token; the database stores only the
//! token's SHA-256 digest, so a leaked sessions table cannot be replayed.
//! Handlers receive the logged-in user through the [`AuthUser`] extractor
//! (rejects with 401) or [`MaybeAuthUser`] (never rejects, for endpoints
//! that degrade for anonymous visitors).

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use shelfmark_core::types::DbId;
use shelfmark_db::repositories::SessionRepo;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "shelfmark_session";

/// Generate a fresh opaque session token.
pub fn generate_token() -> String {
    Uuid::new_v4().to_string()
}

/// SHA-256 hex digest of a session token, the only form that is persisted.
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{digest:x}")
}

/// Create a session row for `user_id`, returning the cookie to set and the
/// new session's row id (for attaching a flash message).
///
/// Login always mints a fresh token; an existing session for the same user
/// is left to expire on its own.
pub async fn start_session(
    state: &AppState,
    user_id: DbId,
) -> Result<(Cookie<'static>, DbId), AppError> {
    let token = generate_token();
    let expires_at = Utc::now() + Duration::hours(state.config.session_ttl_hours);
    let session =
        SessionRepo::create(&state.pool, user_id, &hash_token(&token), expires_at).await?;
    Ok((session_cookie(token), session.id))
}

/// Delete the session row named by the jar's cookie, if any. The caller is
/// responsible for removing the cookie from the jar.
pub async fn destroy_session(state: &AppState, jar: &CookieJar) -> Result<(), AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        SessionRepo::delete_by_token_hash(&state.pool, &hash_token(cookie.value())).await?;
    }
    Ok(())
}

/// A removal cookie for logout responses.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Authenticated user extracted from the session cookie.
///
/// Missing cookie, unknown token, or expired session all reject with 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// Row id of the backing session, used for flash messages.
    pub session_id: DbId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar.get(SESSION_COOKIE).ok_or(AppError::Unauthorized)?;

        let session =
            SessionRepo::find_by_token_hash(&state.pool, &hash_token(cookie.value()), Utc::now())
                .await?
                .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser {
            user_id: session.user_id,
            session_id: session.id,
        })
    }
}

/// Like [`AuthUser`] but never rejects; anonymous visitors extract as
/// `MaybeAuthUser(None)`.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(MaybeAuthUser(Some(user))),
            Err(AppError::Unauthorized) => Ok(MaybeAuthUser(None)),
            Err(other) => Err(other),
        }
    }
}
