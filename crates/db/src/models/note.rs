//! Note entity model.

use serde::Serialize;
use shelfmark_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A user's annotation on one book. Page numbers are free-form; the
/// application accepts any integer, including negatives.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Note {
    pub id: DbId,
    pub user_id: DbId,
    pub book_id: DbId,
    pub note_text: String,
    pub page_number: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
