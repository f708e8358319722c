//! Repository for the `reviews` table.
//!
//! Listing is public (reviews are shown to everyone on a book's page), so
//! `list` takes only the book id. Mutations are scoped by `user_id` like
//! notes are.

use shelfmark_core::types::DbId;
use sqlx::SqlitePool;

use crate::error::StoreError;
use crate::models::review::{RecentReview, Review, ReviewWithAuthor};

const COLUMNS: &str = "id, user_id, book_id, rating, review_text, created_at, updated_at";

/// Provides CRUD for book reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Create a review, returning the new review id.
    pub async fn create(
        pool: &SqlitePool,
        user_id: DbId,
        book_id: DbId,
        rating: i64,
        review_text: &str,
    ) -> Result<DbId, StoreError> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO reviews (user_id, book_id, rating, review_text)
             VALUES (?, ?, ?, ?)
             RETURNING id",
        )
        .bind(user_id)
        .bind(book_id)
        .bind(rating)
        .bind(review_text)
        .fetch_one(pool)
        .await?;
        Ok(id)
    }

    /// Fetch one of the caller's reviews by id.
    pub async fn retrieve(
        pool: &SqlitePool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Review, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE id = ? AND user_id = ?");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?
            .ok_or(StoreError::NoRecord)
    }

    /// Update the rating and text of one of the caller's reviews.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        user_id: DbId,
        rating: i64,
        review_text: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE reviews
             SET rating = ?, review_text = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ? AND user_id = ?",
        )
        .bind(rating)
        .bind(review_text)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NoRecord);
        }
        Ok(())
    }

    /// Delete one of the caller's reviews.
    pub async fn delete(pool: &SqlitePool, id: DbId, user_id: DbId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NoRecord);
        }
        Ok(())
    }

    /// All reviews for one book with their authors' usernames, newest first.
    pub async fn list(
        pool: &SqlitePool,
        book_id: DbId,
    ) -> Result<Vec<ReviewWithAuthor>, StoreError> {
        let reviews = sqlx::query_as::<_, ReviewWithAuthor>(
            "SELECT r.id, r.user_id, r.book_id, r.rating, r.review_text,
                    r.created_at, r.updated_at, u.username
             FROM reviews r
             JOIN users u ON r.user_id = u.id
             WHERE r.book_id = ?
             ORDER BY r.created_at DESC, r.id DESC",
        )
        .bind(book_id)
        .fetch_all(pool)
        .await?;
        Ok(reviews)
    }

    /// Total number of reviews the user has written.
    pub async fn count(pool: &SqlitePool, user_id: DbId) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// The most recent reviews site-wide, joined with their book titles.
    pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<RecentReview>, StoreError> {
        let reviews = sqlx::query_as::<_, RecentReview>(
            "SELECT r.id, r.user_id, r.book_id, r.rating, r.review_text,
                    b.title AS book_title
             FROM reviews r
             JOIN books b ON r.book_id = b.id
             ORDER BY r.created_at DESC, r.id DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(reviews)
    }
}
