//! Database operations for the Bazaar `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `users` - Accounts (unique email and phone, Argon2id password hash)
//! - `categories` - Product categories
//! - `products` - Catalog products (FK to `categories`)
//! - `sliders` - Home screen slider entries
//! - `orders` / `order_items` - Placed orders with price snapshots
//! - `favorites` - User <-> product many-to-many
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/`, embedded via [`MIGRATOR`]
//! and applied by the server at startup before it binds.
//!
//! # Conventions
//!
//! Repository functions take `impl PgExecutor<'_>` so callers can pass the
//! pool for standalone reads or an open transaction when a handler needs
//! all its writes to commit atomically.

pub mod categories;
pub mod favorites;
pub mod orders;
pub mod products;
pub mod sliders;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-constraint violation to [`RepositoryError::Conflict`] with
/// a client-facing message, passing other errors through.
pub(crate) fn map_unique_violation(
    e: sqlx::Error,
    message: impl FnOnce(Option<&str>) -> String,
) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message(db_err.constraint()));
    }
    RepositoryError::Database(e)
}

/// Map a foreign-key violation to [`RepositoryError::Conflict`] with a
/// client-facing message, passing other errors through.
pub(crate) fn map_foreign_key_violation(
    e: sqlx::Error,
    message: impl FnOnce() -> String,
) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::Conflict(message());
    }
    RepositoryError::Database(e)
}
