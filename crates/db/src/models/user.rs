//! User entity model.

use serde::Serialize;
use shelfmark_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- never render or serialize this to
/// responses directly.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for templates (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: DbId,
    pub username: String,
    pub email: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Closed set of columns a user can be looked up by, carrying the value
/// to match.
///
/// Each variant maps to its own prepared query; there is no runtime SQL
/// assembly from field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Id(DbId),
    Email(String),
    Username(String),
}
