//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&SqlitePool` as the first argument. Storage constraint
//! violations are translated into [`crate::error::StoreError`] here and
//! nowhere else.

pub mod book_repo;
pub mod note_repo;
pub mod review_repo;
pub mod session_repo;
pub mod user_repo;

pub use book_repo::BookRepo;
pub use note_repo::NoteRepo;
pub use review_repo::ReviewRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
