//! Database access for the backoffice.
//!
//! Admin only reads `therapist_applications`; the site writes it. Migrations
//! live in `migrations/` at the workspace root and run via
//! `cargo run -p psicofinders-cli -- migrate`.

pub mod applications;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use applications::{ApplicationRecord, ApplicationRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No database is configured for this process.
    #[error("database not configured")]
    Unavailable,
}

/// Create a `PostgreSQL` connection pool.
///
/// The backoffice has a single operator, so the pool stays small.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
