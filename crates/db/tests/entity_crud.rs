//! Integration tests for the repository layer.
//!
//! Exercises every repository against a real database:
//! - Account creation, duplicate classification, credential checks
//! - Book create/retrieve/update/delete with ownership scoping
//! - Pagination clamping and cross-entity filtering
//! - Note and review CRUD scoped by user
//! - Session lifecycle and flash messages

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use shelfmark_db::error::StoreError;
use shelfmark_db::models::book::BookInput;
use shelfmark_db::models::user::UserLookup;
use shelfmark_db::repositories::{BookRepo, NoteRepo, ReviewRepo, SessionRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &SqlitePool, username: &str) -> i64 {
    UserRepo::create(
        pool,
        username,
        &format!("{username}@example.com"),
        "correct horse battery",
    )
    .await
    .unwrap()
}

fn new_book(title: &str, isbn: &str) -> BookInput {
    BookInput {
        title: title.to_string(),
        author: "Ursula K. Le Guin".to_string(),
        isbn: isbn.to_string(),
        publication_year: 1974,
        status: "want_to_read".to_string(),
        image_url: String::new(),
    }
}

// ---------------------------------------------------------------------------
// Test: user creation and duplicate classification
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_user_and_duplicates(pool: SqlitePool) {
    let id = seed_user(&pool, "alice").await;
    let user = UserRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@example.com");
    // Stored as a PHC string, never plaintext.
    assert!(user.password_hash.starts_with("$argon2id$"));

    // Same username, different email.
    let result = UserRepo::create(&pool, "alice", "other@example.com", "pw123456").await;
    assert_matches!(result, Err(StoreError::DuplicateUsername));

    // Same email, different username.
    let result = UserRepo::create(&pool, "alice2", "alice@example.com", "pw123456").await;
    assert_matches!(result, Err(StoreError::DuplicateEmail));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_authenticate(pool: SqlitePool) {
    let id = seed_user(&pool, "bob").await;

    let got = UserRepo::authenticate(&pool, "bob", "correct horse battery")
        .await
        .unwrap();
    assert_eq!(got, id);

    let result = UserRepo::authenticate(&pool, "bob", "wrong password").await;
    assert_matches!(result, Err(StoreError::InvalidCredentials));

    // Unknown user yields the same error as a wrong password.
    let result = UserRepo::authenticate(&pool, "nobody", "correct horse battery").await;
    assert_matches!(result, Err(StoreError::InvalidCredentials));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_user_exists_lookups(pool: SqlitePool) {
    let id = seed_user(&pool, "carol").await;

    assert!(UserRepo::exists(&pool, &UserLookup::Id(id)).await.unwrap());
    assert!(UserRepo::exists(&pool, &UserLookup::Username("carol".into()))
        .await
        .unwrap());
    assert!(
        UserRepo::exists(&pool, &UserLookup::Email("carol@example.com".into()))
            .await
            .unwrap()
    );
    assert!(!UserRepo::exists(&pool, &UserLookup::Username("dave".into()))
        .await
        .unwrap());
}

// ---------------------------------------------------------------------------
// Test: book CRUD and ownership
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_book_create_and_retrieve(pool: SqlitePool) {
    let user_id = seed_user(&pool, "alice").await;

    let book_id = BookRepo::create(&pool, &new_book("The Dispossessed", "9780061054884"), user_id)
        .await
        .unwrap();

    let book = BookRepo::retrieve(&pool, book_id).await.unwrap();
    assert_eq!(book.title, "The Dispossessed");
    assert_eq!(book.isbn, "9780061054884");
    assert_eq!(book.user_id, Some(user_id));
    assert_eq!(book.status.as_deref(), Some("want_to_read"));

    let result = BookRepo::retrieve(&pool, book_id + 1).await;
    assert_matches!(result, Err(StoreError::NoRecord));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_isbn_leaves_no_orphan(pool: SqlitePool) {
    let alice = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;

    BookRepo::create(&pool, &new_book("First Copy", "9780061054884"), alice)
        .await
        .unwrap();

    let result = BookRepo::create(&pool, &new_book("Second Copy", "9780061054884"), bob).await;
    assert_matches!(result, Err(StoreError::DuplicateIsbn));

    // The failed create rolled back: no stray user_books row for bob.
    let bob_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_books WHERE user_id = ?")
        .bind(bob)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(bob_rows, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_book_update(pool: SqlitePool) {
    let user_id = seed_user(&pool, "alice").await;
    let book_id = BookRepo::create(&pool, &new_book("Draft Title", "111"), user_id)
        .await
        .unwrap();

    let mut input = new_book("Final Title", "111");
    input.status = "finished".to_string();
    BookRepo::update(&pool, book_id, &input).await.unwrap();

    let book = BookRepo::retrieve(&pool, book_id).await.unwrap();
    assert_eq!(book.title, "Final Title");
    assert_eq!(book.status.as_deref(), Some("finished"));

    let result = BookRepo::update(&pool, book_id + 1, &input).await;
    assert_matches!(result, Err(StoreError::NoRecord));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_requires_ownership(pool: SqlitePool) {
    let alice = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;
    let book_id = BookRepo::create(&pool, &new_book("Hers", "222"), alice)
        .await
        .unwrap();

    // Bob cannot delete a book he does not track.
    let result = BookRepo::delete(&pool, book_id, bob).await;
    assert_matches!(result, Err(StoreError::NoRecord));
    assert!(BookRepo::retrieve(&pool, book_id).await.is_ok());

    BookRepo::delete(&pool, book_id, alice).await.unwrap();
    let result = BookRepo::retrieve(&pool, book_id).await;
    assert_matches!(result, Err(StoreError::NoRecord));

    // The ownership row went with it.
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_books WHERE book_id = ?")
        .bind(book_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

// ---------------------------------------------------------------------------
// Test: pagination clamping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_list_clamps_out_of_range_page(pool: SqlitePool) {
    let user_id = seed_user(&pool, "alice").await;
    for i in 0..10 {
        BookRepo::create(&pool, &new_book(&format!("Book {i}"), &format!("isbn-{i}")), user_id)
            .await
            .unwrap();
    }

    // 10 books at 8 per page: 2 pages, last page holds 2 books.
    let page = BookRepo::list(&pool, 5, 8).await.unwrap();
    assert_eq!(page.total, 10);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.page, 2);
    assert_eq!(page.books.len(), 2);

    let page = BookRepo::list(&pool, 1, 8).await.unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.books.len(), 8);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_empty_catalog(pool: SqlitePool) {
    let page = BookRepo::list(&pool, 3, 8).await.unwrap();
    assert_eq!(page.total, 0);
    assert_eq!(page.total_pages, 0);
    assert!(page.books.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_raises_zero_page_size_to_one(pool: SqlitePool) {
    let user_id = seed_user(&pool, "alice").await;
    BookRepo::create(&pool, &new_book("Only Book", "isbn-z"), user_id)
        .await
        .unwrap();

    let page = BookRepo::list(&pool, 1, 0).await.unwrap();
    assert_eq!(page.page_size, 1);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.books.len(), 1);
}

// ---------------------------------------------------------------------------
// Test: filter across titles, notes, and reviews
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_filter_matches_title_note_and_review(pool: SqlitePool) {
    let user_id = seed_user(&pool, "alice").await;
    let by_title = BookRepo::create(&pool, &new_book("Dragons of Autumn", "f-1"), user_id)
        .await
        .unwrap();
    let by_note = BookRepo::create(&pool, &new_book("Plain Title", "f-2"), user_id)
        .await
        .unwrap();
    let by_review = BookRepo::create(&pool, &new_book("Another Title", "f-3"), user_id)
        .await
        .unwrap();
    let no_match = BookRepo::create(&pool, &new_book("Unrelated", "f-4"), user_id)
        .await
        .unwrap();

    NoteRepo::create(&pool, user_id, by_note, "the dragon appears on page 40", 40)
        .await
        .unwrap();
    ReviewRepo::create(&pool, user_id, by_review, 4, "Best DRAGON story in years")
        .await
        .unwrap();

    let found = BookRepo::filter(&pool, "dragon").await.unwrap();
    let ids: Vec<i64> = found.iter().map(|b| b.id).collect();
    assert_eq!(found.len(), 3);
    assert!(ids.contains(&by_title));
    assert!(ids.contains(&by_note));
    assert!(ids.contains(&by_review));
    assert!(!ids.contains(&no_match));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_filter_deduplicates(pool: SqlitePool) {
    let user_id = seed_user(&pool, "alice").await;
    let book_id = BookRepo::create(&pool, &new_book("Dune", "d-1"), user_id)
        .await
        .unwrap();
    // Title, a note, and a review all match the same term.
    NoteRepo::create(&pool, user_id, book_id, "dune worms", 12)
        .await
        .unwrap();
    ReviewRepo::create(&pool, user_id, book_id, 5, "dune is great")
        .await
        .unwrap();

    let found = BookRepo::filter(&pool, "dune").await.unwrap();
    assert_eq!(found.len(), 1);
}

// ---------------------------------------------------------------------------
// Test: counts and recents
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_counts_and_finished(pool: SqlitePool) {
    let user_id = seed_user(&pool, "alice").await;
    let mut finished = new_book("Done", "c-1");
    finished.status = "finished".to_string();
    BookRepo::create(&pool, &finished, user_id).await.unwrap();
    BookRepo::create(&pool, &new_book("Reading", "c-2"), user_id)
        .await
        .unwrap();

    assert_eq!(BookRepo::count(&pool).await.unwrap(), 2);
    assert_eq!(BookRepo::count_finished(&pool, user_id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_recent_reviews_join_book_titles(pool: SqlitePool) {
    let user_id = seed_user(&pool, "alice").await;
    let book_id = BookRepo::create(&pool, &new_book("Hyperion", "r-1"), user_id)
        .await
        .unwrap();
    ReviewRepo::create(&pool, user_id, book_id, 5, "stunning").await.unwrap();

    let recent = ReviewRepo::recent(&pool, 2).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].book_title, "Hyperion");
    assert_eq!(recent[0].rating, 5);
}

// ---------------------------------------------------------------------------
// Test: notes scoped by user
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_note_round_trip(pool: SqlitePool) {
    let user_id = seed_user(&pool, "alice").await;
    let book_id = BookRepo::create(&pool, &new_book("Annotated", "n-1"), user_id)
        .await
        .unwrap();

    // Negative page numbers are accepted as-is.
    let note_id = NoteRepo::create(&pool, user_id, book_id, "front matter", -3)
        .await
        .unwrap();
    let note = NoteRepo::retrieve(&pool, note_id, user_id).await.unwrap();
    assert_eq!(note.note_text, "front matter");
    assert_eq!(note.page_number, -3);

    NoteRepo::update(&pool, note_id, user_id, "revised", 7)
        .await
        .unwrap();
    let note = NoteRepo::retrieve(&pool, note_id, user_id).await.unwrap();
    assert_eq!(note.note_text, "revised");
    assert_eq!(note.page_number, 7);

    assert_eq!(NoteRepo::count(&pool, user_id).await.unwrap(), 1);

    NoteRepo::delete(&pool, note_id, user_id).await.unwrap();
    let result = NoteRepo::retrieve(&pool, note_id, user_id).await;
    assert_matches!(result, Err(StoreError::NoRecord));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_note_ownership(pool: SqlitePool) {
    let alice = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;
    let book_id = BookRepo::create(&pool, &new_book("Shared Book", "n-2"), alice)
        .await
        .unwrap();
    let note_id = NoteRepo::create(&pool, alice, book_id, "private thought", 1)
        .await
        .unwrap();

    // Bob sees neither the note nor any trace it exists.
    assert_matches!(
        NoteRepo::retrieve(&pool, note_id, bob).await,
        Err(StoreError::NoRecord)
    );
    assert_matches!(
        NoteRepo::update(&pool, note_id, bob, "vandalism", 1).await,
        Err(StoreError::NoRecord)
    );
    assert_matches!(
        NoteRepo::delete(&pool, note_id, bob).await,
        Err(StoreError::NoRecord)
    );
    assert!(NoteRepo::list(&pool, book_id, bob).await.unwrap().is_empty());
    assert_eq!(NoteRepo::list(&pool, book_id, alice).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Test: reviews scoped mutations, public listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_review_round_trip_and_public_list(pool: SqlitePool) {
    let alice = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;
    let book_id = BookRepo::create(&pool, &new_book("Reviewed", "v-1"), alice)
        .await
        .unwrap();

    let review_id = ReviewRepo::create(&pool, alice, book_id, 3, "decent")
        .await
        .unwrap();
    ReviewRepo::update(&pool, review_id, alice, 4, "grew on me")
        .await
        .unwrap();

    // Listing is public: both users' reviews appear with author names.
    ReviewRepo::create(&pool, bob, book_id, 2, "not for me")
        .await
        .unwrap();
    let reviews = ReviewRepo::list(&pool, book_id).await.unwrap();
    assert_eq!(reviews.len(), 2);
    let authors: Vec<&str> = reviews.iter().map(|r| r.username.as_str()).collect();
    assert!(authors.contains(&"alice"));
    assert!(authors.contains(&"bob"));

    // Mutations stay scoped.
    assert_matches!(
        ReviewRepo::delete(&pool, review_id, bob).await,
        Err(StoreError::NoRecord)
    );
    ReviewRepo::delete(&pool, review_id, alice).await.unwrap();
    assert_eq!(ReviewRepo::count(&pool, alice).await.unwrap(), 0);
    assert_eq!(ReviewRepo::count(&pool, bob).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Test: session lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_session_lifecycle(pool: SqlitePool) {
    let user_id = seed_user(&pool, "alice").await;
    let now = Utc::now();

    let session = SessionRepo::create(&pool, user_id, "digest-1", now + Duration::hours(12))
        .await
        .unwrap();
    assert_eq!(session.user_id, user_id);
    assert!(session.flash.is_none());

    let found = SessionRepo::find_by_token_hash(&pool, "digest-1", now)
        .await
        .unwrap();
    assert!(found.is_some());

    SessionRepo::delete_by_token_hash(&pool, "digest-1")
        .await
        .unwrap();
    let found = SessionRepo::find_by_token_hash(&pool, "digest-1", now)
        .await
        .unwrap();
    assert!(found.is_none());

    // Deleting an already-gone session is fine.
    SessionRepo::delete_by_token_hash(&pool, "digest-1")
        .await
        .unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn test_expired_sessions_invisible_and_cleaned(pool: SqlitePool) {
    let user_id = seed_user(&pool, "alice").await;
    let now = Utc::now();

    SessionRepo::create(&pool, user_id, "stale", now - Duration::hours(1))
        .await
        .unwrap();
    SessionRepo::create(&pool, user_id, "live", now + Duration::hours(1))
        .await
        .unwrap();

    assert!(SessionRepo::find_by_token_hash(&pool, "stale", now)
        .await
        .unwrap()
        .is_none());
    assert!(SessionRepo::find_by_token_hash(&pool, "live", now)
        .await
        .unwrap()
        .is_some());

    let removed = SessionRepo::cleanup_expired(&pool, now).await.unwrap();
    assert_eq!(removed, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_flash_pops_once(pool: SqlitePool) {
    let user_id = seed_user(&pool, "alice").await;
    let session = SessionRepo::create(
        &pool,
        user_id,
        "digest-f",
        Utc::now() + Duration::hours(12),
    )
    .await
    .unwrap();

    assert!(SessionRepo::pop_flash(&pool, session.id).await.unwrap().is_none());

    SessionRepo::set_flash(&pool, session.id, "Welcome back!")
        .await
        .unwrap();
    let flash = SessionRepo::pop_flash(&pool, session.id).await.unwrap();
    assert_eq!(flash.as_deref(), Some("Welcome back!"));

    // Second read comes back empty.
    assert!(SessionRepo::pop_flash(&pool, session.id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Test: concurrent duplicate-ISBN creates resolve to exactly one winner
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_duplicate_isbn(pool: SqlitePool) {
    let alice = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;

    let book_a = new_book("Race A", "race-isbn");
    let book_b = new_book("Race B", "race-isbn");
    let a = BookRepo::create(&pool, &book_a, alice);
    let b = BookRepo::create(&pool, &book_b, bob);
    let (ra, rb) = tokio::join!(a, b);

    let winners = [&ra, &rb].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    let loser = if ra.is_err() { ra } else { rb };
    assert_matches!(loser, Err(StoreError::DuplicateIsbn));

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE isbn = 'race-isbn'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(total, 1);
}
