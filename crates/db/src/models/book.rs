//! Book entity models and DTOs.

use serde::Serialize;
use shelfmark_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Plain row from the `books` table, without ownership information.
/// Returned by queries that do not join `user_books` (filter, recent).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Book {
    pub id: DbId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: i64,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A book joined with its `user_books` row. The ownership columns are
/// `None` for a book no user is tracking.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrackedBook {
    pub id: DbId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: i64,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub user_id: Option<DbId>,
    pub status: Option<String>,
}

/// Input for creating or updating a book together with its reading status.
#[derive(Debug, Clone)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: i64,
    pub status: String,
    pub image_url: String,
}

/// One page of the book catalog plus pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct BookPage {
    pub books: Vec<TrackedBook>,
    pub total: i64,
    pub total_pages: i64,
    pub page: i64,
    pub page_size: i64,
}
