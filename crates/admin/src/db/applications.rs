//! Read access to `therapist_applications`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;

/// Rows shown on the backoffice home page.
pub const LIST_LIMIT: i64 = 200;

/// Rows included in a CSV export.
pub const EXPORT_LIMIT: i64 = 1000;

/// One submitted application, as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: String,
    pub country: String,
    pub colegiado: String,
    pub experience: Option<Decimal>,
    pub website: Option<String>,
    pub modality: String,
    pub langs: Vec<String>,
    pub approaches: Vec<String>,
    pub specialties: Vec<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub availability: Option<serde_json::Value>,
    pub notes: Option<String>,
    pub ui_lang: String,
    pub source: String,
}

/// Read-only repository over submitted applications.
pub struct ApplicationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ApplicationRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Newest applications first, at most [`LIST_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.newest(LIST_LIMIT).await
    }

    /// Newest applications first, at most [`EXPORT_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_export(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.newest(EXPORT_LIMIT).await
    }

    async fn newest(&self, limit: i64) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, ApplicationRecord>(
            r"
            SELECT id, submitted_at, name, email, phone, city, country, colegiado,
                   experience, website, modality, langs, approaches, specialties,
                   price_min, price_max, availability, notes, ui_lang, source
            FROM therapist_applications
            ORDER BY submitted_at DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}
