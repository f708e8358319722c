//! Persistence layer: SQLite pool management, migrations, entity models,
//! and one repository per entity.
//!
//! Repositories exclusively own the translation from storage constraint
//! violations into the closed set of domain errors in [`error::StoreError`];
//! handlers never inspect raw sqlx errors.

pub mod error;
pub mod models;
pub mod repositories;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub type DbPool = sqlx::SqlitePool;

/// Create a connection pool from a SQLite URL (e.g. `sqlite://shelfmark.db`).
///
/// Creates the database file if missing and enables foreign key enforcement
/// plus WAL journaling, which SQLite needs for concurrent readers alongside
/// the single writer.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await
}

/// Apply all pending migrations from the crate's `migrations/` directory.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Cheap connectivity check used at startup.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
