//! Repository for the `users` table.

use shelfmark_core::password::{hash_password, verify_password};
use shelfmark_core::types::DbId;
use sqlx::SqlitePool;

use crate::error::{classify_unique_violation, StoreError};
use crate::models::user::{User, UserLookup};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";

/// Provides account creation, lookup, and credential checks for users.
pub struct UserRepo;

impl UserRepo {
    /// Create a new user with an argon2id-hashed password, returning the
    /// new user id.
    ///
    /// A unique violation on `users.username` maps to
    /// [`StoreError::DuplicateUsername`], on `users.email` to
    /// [`StoreError::DuplicateEmail`].
    pub async fn create(
        pool: &SqlitePool,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<DbId, StoreError> {
        let password_hash =
            hash_password(password).map_err(|e| StoreError::PasswordHash(e.to_string()))?;

        let id: DbId = sqlx::query_scalar(
            "INSERT INTO users (username, email, password_hash)
             VALUES (?, ?, ?)
             RETURNING id",
        )
        .bind(username)
        .bind(email)
        .bind(&password_hash)
        .fetch_one(pool)
        .await
        .map_err(classify_unique_violation)?;

        Ok(id)
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = ?");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Verify a username/password pair, returning the user id on success.
    ///
    /// Unknown username and wrong password both produce
    /// [`StoreError::InvalidCredentials`] so account existence never leaks.
    pub async fn authenticate(
        pool: &SqlitePool,
        username: &str,
        password: &str,
    ) -> Result<DbId, StoreError> {
        let user = Self::find_by_username(pool, username)
            .await?
            .ok_or(StoreError::InvalidCredentials)?;

        let password_valid = verify_password(password, &user.password_hash)
            .map_err(|e| StoreError::PasswordHash(e.to_string()))?;

        if !password_valid {
            return Err(StoreError::InvalidCredentials);
        }
        Ok(user.id)
    }

    /// Check whether a user row matches the given lookup. Each lookup
    /// variant dispatches to its own prepared query.
    pub async fn exists(pool: &SqlitePool, lookup: &UserLookup) -> Result<bool, StoreError> {
        let exists: bool = match lookup {
            UserLookup::Id(id) => {
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
                    .bind(id)
                    .fetch_one(pool)
                    .await?
            }
            UserLookup::Email(email) => {
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
                    .bind(email)
                    .fetch_one(pool)
                    .await?
            }
            UserLookup::Username(username) => {
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
                    .bind(username)
                    .fetch_one(pool)
                    .await?
            }
        };
        Ok(exists)
    }
}
