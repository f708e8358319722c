//! Repository for the `books` table and its `user_books` ownership join.
//!
//! Book creation and update are two-table operations; both statements run
//! inside one transaction so concurrent readers never observe a half-done
//! pair.

use shelfmark_core::types::DbId;
use sqlx::SqlitePool;

use crate::error::{classify_unique_violation, StoreError};
use crate::models::book::{Book, BookInput, BookPage, TrackedBook};

/// Columns of a bare `books` row.
const BOOK_COLUMNS: &str =
    "b.id, b.title, b.author, b.isbn, b.publication_year, b.image_url, b.created_at, b.updated_at";

/// Columns of a `books` row joined with its `user_books` ownership row.
const TRACKED_COLUMNS: &str = "b.id, b.title, b.author, b.isbn, b.publication_year, b.image_url, \
     b.created_at, b.updated_at, ub.user_id, ub.status";

/// Provides CRUD, pagination, and search for books.
pub struct BookRepo;

impl BookRepo {
    /// Create a book and its ownership row for `user_id` atomically,
    /// returning the new book id.
    ///
    /// A unique violation on `books.isbn` maps to
    /// [`StoreError::DuplicateIsbn`]; either insert failing rolls back the
    /// whole pair, so a failed create leaves no orphan `user_books` row.
    pub async fn create(
        pool: &SqlitePool,
        input: &BookInput,
        user_id: DbId,
    ) -> Result<DbId, StoreError> {
        let mut tx = pool.begin().await?;

        let book_id: DbId = sqlx::query_scalar(
            "INSERT INTO books (title, author, isbn, publication_year, image_url)
             VALUES (?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&input.title)
        .bind(&input.author)
        .bind(&input.isbn)
        .bind(input.publication_year)
        .bind(&input.image_url)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_unique_violation)?;

        sqlx::query("INSERT INTO user_books (user_id, book_id, status) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(book_id)
            .bind(&input.status)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(book_id)
    }

    /// Fetch a book by id together with its ownership row (if any).
    pub async fn retrieve(pool: &SqlitePool, id: DbId) -> Result<TrackedBook, StoreError> {
        let query = format!(
            "SELECT {TRACKED_COLUMNS} FROM books b
             LEFT JOIN user_books ub ON b.id = ub.book_id
             WHERE b.id = ?"
        );
        sqlx::query_as::<_, TrackedBook>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(StoreError::NoRecord)
    }

    /// Update a book's fields and its reading status atomically.
    ///
    /// Either statement affecting zero rows reports [`StoreError::NoRecord`]
    /// and rolls back the whole operation.
    pub async fn update(pool: &SqlitePool, id: DbId, input: &BookInput) -> Result<(), StoreError> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE books
             SET title = ?, author = ?, isbn = ?, publication_year = ?, image_url = ?,
                 updated_at = CURRENT_TIMESTAMP
             WHERE id = ?",
        )
        .bind(&input.title)
        .bind(&input.author)
        .bind(&input.isbn)
        .bind(input.publication_year)
        .bind(&input.image_url)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(classify_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NoRecord);
        }

        let result = sqlx::query("UPDATE user_books SET status = ? WHERE book_id = ?")
            .bind(&input.status)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NoRecord);
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a book owned by `user_id`.
    ///
    /// A book that exists but is not tracked by the caller reports
    /// [`StoreError::NoRecord`] rather than silently succeeding. The
    /// `user_books` row goes away via the foreign-key cascade.
    pub async fn delete(pool: &SqlitePool, id: DbId, user_id: DbId) -> Result<(), StoreError> {
        let mut tx = pool.begin().await?;

        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_books WHERE book_id = ? AND user_id = ?)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if !owned {
            return Err(StoreError::NoRecord);
        }

        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NoRecord);
        }

        tx.commit().await?;
        Ok(())
    }

    /// One page of the catalog, newest first, plus pagination metadata.
    ///
    /// A requested page beyond the last page clamps to the last valid page
    /// instead of erroring or returning an empty result.
    pub async fn list(
        pool: &SqlitePool,
        page: i64,
        page_size: i64,
    ) -> Result<BookPage, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(pool)
            .await?;

        let page_size = page_size.max(1);
        let total_pages = (total + page_size - 1) / page_size;

        let mut page = page.max(1);
        if page > total_pages && total_pages > 0 {
            page = total_pages;
        }
        let offset = (page - 1) * page_size;

        let query = format!(
            "SELECT {TRACKED_COLUMNS} FROM books b
             LEFT JOIN user_books ub ON b.id = ub.book_id
             ORDER BY b.created_at DESC, b.id DESC
             LIMIT ? OFFSET ?"
        );
        let books = sqlx::query_as::<_, TrackedBook>(&query)
            .bind(page_size)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(BookPage {
            books,
            total,
            total_pages,
            page,
            page_size,
        })
    }

    /// Case-insensitive substring search across book titles, note text,
    /// and review text, de-duplicated by book id.
    pub async fn filter(pool: &SqlitePool, term: &str) -> Result<Vec<Book>, StoreError> {
        let pattern = format!("%{term}%");
        let query = format!(
            "SELECT DISTINCT {BOOK_COLUMNS} FROM books b
             LEFT JOIN notes n ON b.id = n.book_id
             LEFT JOIN reviews r ON b.id = r.book_id
             WHERE b.title LIKE ? COLLATE NOCASE
                OR n.note_text LIKE ? COLLATE NOCASE
                OR r.review_text LIKE ? COLLATE NOCASE"
        );
        let books = sqlx::query_as::<_, Book>(&query)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_all(pool)
            .await?;
        Ok(books)
    }

    /// Total number of books in the catalog.
    pub async fn count(pool: &SqlitePool) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// The most recently added books.
    pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<Book>, StoreError> {
        let query = format!(
            "SELECT {BOOK_COLUMNS} FROM books b
             ORDER BY b.created_at DESC, b.id DESC
             LIMIT ?"
        );
        let books = sqlx::query_as::<_, Book>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(books)
    }

    /// Number of books a user has marked as finished.
    pub async fn count_finished(pool: &SqlitePool, user_id: DbId) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_books WHERE user_id = ? AND status = 'finished'",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
