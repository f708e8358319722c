//! Review entity models.

use serde::Serialize;
use shelfmark_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A user's rating and review text for one book.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub user_id: DbId,
    pub book_id: DbId,
    pub rating: i64,
    pub review_text: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A review joined with its author's username, for the public per-book
/// review list.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewWithAuthor {
    pub id: DbId,
    pub user_id: DbId,
    pub book_id: DbId,
    pub rating: i64,
    pub review_text: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub username: String,
}

/// A review joined with its book's title, for the recent-reviews widget.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecentReview {
    pub id: DbId,
    pub user_id: DbId,
    pub book_id: DbId,
    pub rating: i64,
    pub review_text: String,
    pub book_title: String,
}
