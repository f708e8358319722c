//! Login session model.

use shelfmark_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// One login session. Only the SHA-256 digest of the cookie token is
/// stored; the plaintext token lives exclusively in the client cookie.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    /// One-shot message popped into the next rendered page.
    pub flash: Option<String>,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}
