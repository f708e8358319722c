//! Repository for the `notes` table.
//!
//! Every mutating or single-row query is scoped by `user_id` in the same
//! statement, so a note belonging to someone else is indistinguishable
//! from one that does not exist.

use shelfmark_core::types::DbId;
use sqlx::SqlitePool;

use crate::error::StoreError;
use crate::models::note::Note;

const COLUMNS: &str = "id, user_id, book_id, note_text, page_number, created_at, updated_at";

/// Provides CRUD for per-user book notes.
pub struct NoteRepo;

impl NoteRepo {
    /// Create a note, returning the new note id.
    pub async fn create(
        pool: &SqlitePool,
        user_id: DbId,
        book_id: DbId,
        note_text: &str,
        page_number: i64,
    ) -> Result<DbId, StoreError> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO notes (user_id, book_id, note_text, page_number)
             VALUES (?, ?, ?, ?)
             RETURNING id",
        )
        .bind(user_id)
        .bind(book_id)
        .bind(note_text)
        .bind(page_number)
        .fetch_one(pool)
        .await?;
        Ok(id)
    }

    /// Fetch one of the caller's notes by id.
    pub async fn retrieve(pool: &SqlitePool, id: DbId, user_id: DbId) -> Result<Note, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM notes WHERE id = ? AND user_id = ?");
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?
            .ok_or(StoreError::NoRecord)
    }

    /// Update the text and page number of one of the caller's notes.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        user_id: DbId,
        note_text: &str,
        page_number: i64,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE notes
             SET note_text = ?, page_number = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ? AND user_id = ?",
        )
        .bind(note_text)
        .bind(page_number)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NoRecord);
        }
        Ok(())
    }

    /// Delete one of the caller's notes.
    pub async fn delete(pool: &SqlitePool, id: DbId, user_id: DbId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NoRecord);
        }
        Ok(())
    }

    /// The caller's notes for one book, newest first.
    pub async fn list(
        pool: &SqlitePool,
        book_id: DbId,
        user_id: DbId,
    ) -> Result<Vec<Note>, StoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM notes
             WHERE book_id = ? AND user_id = ?
             ORDER BY created_at DESC, id DESC"
        );
        let notes = sqlx::query_as::<_, Note>(&query)
            .bind(book_id)
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        Ok(notes)
    }

    /// Total number of notes the user has written, across all books.
    pub async fn count(pool: &SqlitePool, user_id: DbId) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
