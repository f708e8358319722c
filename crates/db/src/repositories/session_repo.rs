//! Repository for the `sessions` table.
//!
//! Sessions are looked up by the SHA-256 digest of the cookie token.
//! Expiry comparisons always bind the caller's clock instead of comparing
//! against `CURRENT_TIMESTAMP`, so the encoding of both sides matches.

use shelfmark_core::types::{DbId, Timestamp};
use sqlx::SqlitePool;

use crate::error::StoreError;
use crate::models::session::Session;

const COLUMNS: &str = "id, user_id, token_hash, flash, expires_at, created_at";

/// Provides login-session persistence and flash-message storage.
pub struct SessionRepo;

impl SessionRepo {
    /// Persist a new session for `user_id`.
    pub async fn create(
        pool: &SqlitePool,
        user_id: DbId,
        token_hash: &str,
        expires_at: Timestamp,
    ) -> Result<Session, StoreError> {
        let query = format!(
            "INSERT INTO sessions (user_id, token_hash, expires_at)
             VALUES (?, ?, ?)
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .bind(token_hash)
            .bind(expires_at)
            .fetch_one(pool)
            .await?;
        Ok(session)
    }

    /// Find a live session by token digest. Expired sessions are treated as
    /// absent; they stay in the table until [`Self::cleanup_expired`] runs.
    pub async fn find_by_token_hash(
        pool: &SqlitePool,
        token_hash: &str,
        now: Timestamp,
    ) -> Result<Option<Session>, StoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             WHERE token_hash = ? AND expires_at > ?"
        );
        let session = sqlx::query_as::<_, Session>(&query)
            .bind(token_hash)
            .bind(now)
            .fetch_optional(pool)
            .await?;
        Ok(session)
    }

    /// Delete the session with the given token digest, if any. Logout of an
    /// already-gone session is not an error.
    pub async fn delete_by_token_hash(
        pool: &SqlitePool,
        token_hash: &str,
    ) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Store a one-shot flash message on a session.
    pub async fn set_flash(
        pool: &SqlitePool,
        session_id: DbId,
        message: &str,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE sessions SET flash = ? WHERE id = ?")
            .bind(message)
            .bind(session_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Read and clear the session's flash message in one call.
    pub async fn pop_flash(
        pool: &SqlitePool,
        session_id: DbId,
    ) -> Result<Option<String>, StoreError> {
        let flash: Option<String> =
            sqlx::query_scalar("SELECT flash FROM sessions WHERE id = ?")
                .bind(session_id)
                .fetch_optional(pool)
                .await?
                .flatten();

        if flash.is_some() {
            sqlx::query("UPDATE sessions SET flash = NULL WHERE id = ?")
                .bind(session_id)
                .execute(pool)
                .await?;
        }
        Ok(flash)
    }

    /// Remove all sessions whose expiry is at or before `now`, returning how
    /// many were deleted.
    pub async fn cleanup_expired(pool: &SqlitePool, now: Timestamp) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
