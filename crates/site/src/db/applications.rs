//! Application intake storage.

use sqlx::PgPool;
use sqlx::types::Json;

use psicofinders_core::ApplicationId;

use super::RepositoryError;
use crate::models::NewApplication;

/// Repository for `therapist_applications` (insert only on the site).
pub struct ApplicationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ApplicationRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store one application.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, app: &NewApplication) -> Result<ApplicationId, RepositoryError> {
        let id = sqlx::query_scalar::<_, ApplicationId>(
            r"
            INSERT INTO therapist_applications (
                submitted_at, name, email, phone, city, country, colegiado, experience,
                website, modality, langs, approaches, specialties, price_min, price_max,
                availability, notes, ui_lang, source
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING id
            ",
        )
        .bind(app.submitted_at)
        .bind(&app.name)
        .bind(app.email.as_str())
        .bind(app.phone.as_deref())
        .bind(&app.city)
        .bind(&app.country)
        .bind(&app.colegiado)
        .bind(app.experience)
        .bind(app.website.as_deref())
        .bind(app.modality.as_str())
        .bind(&app.langs)
        .bind(&app.approaches)
        .bind(&app.specialties)
        .bind(app.price_min)
        .bind(app.price_max)
        .bind(app.availability.as_ref().map(Json))
        .bind(app.notes.as_deref())
        .bind(&app.ui_lang)
        .bind(&app.source)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }
}
