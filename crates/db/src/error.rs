//! Domain error type returned by every repository operation.

/// Closed set of domain failures plus a passthrough for everything else.
///
/// Repositories translate only the known constraint violations; any other
/// storage error propagates unmodified inside [`StoreError::Database`] and
/// is treated as fatal for the request by the web layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The username is already taken (`users.username` unique constraint).
    #[error("duplicate username")]
    DuplicateUsername,

    /// The email is already registered (`users.email` unique constraint).
    #[error("duplicate email")]
    DuplicateEmail,

    /// The ISBN is already registered (`books.isbn` unique constraint).
    #[error("duplicate isbn")]
    DuplicateIsbn,

    /// No matching record. Also covers records that exist but belong to a
    /// different user; callers cannot distinguish the two.
    #[error("no matching record found")]
    NoRecord,

    /// Unknown username or wrong password. Deliberately the same error for
    /// both so user existence never leaks.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password hashing or verification failed.
    #[error("password hash error: {0}")]
    PasswordHash(String),

    /// Any other storage error, propagated untouched.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Classify a sqlx error, mapping a unique-constraint violation on a known
/// column to its domain error. Anything else passes through.
///
/// SQLite reports the violated column in the error message
/// (`UNIQUE constraint failed: users.username`), so classification is a
/// message inspection rather than a constraint-name lookup.
pub(crate) fn classify_unique_violation(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("users.username") {
                return StoreError::DuplicateUsername;
            }
            if message.contains("users.email") {
                return StoreError::DuplicateEmail;
            }
            if message.contains("books.isbn") {
                return StoreError::DuplicateIsbn;
            }
            tracing::warn!(%message, "unique violation on an unclassified constraint");
        }
    }
    StoreError::Database(err)
}
