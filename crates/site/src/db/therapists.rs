//! Therapist profile repository.
//!
//! A repository is bound to one owner at construction. Every statement is
//! filtered by `id = owner`, so a handler can only ever read or write the
//! row of the signed-in account.

use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use psicofinders_core::{Availability, FeeRange, Modality, OnboardingState, TherapistId};

use super::RepositoryError;
use crate::models::{Identity, OnboardingSubmission, ProfileUpdate, TherapistProfile};

#[derive(sqlx::FromRow)]
struct TherapistRow {
    id: Uuid,
    email: Option<String>,
    name: Option<String>,
    colegiado: Option<String>,
    modality: Option<String>,
    langs: Vec<String>,
    approaches: Vec<String>,
    specialties: Vec<String>,
    city: Option<String>,
    country: Option<String>,
    website: Option<String>,
    phone: Option<String>,
    price_min: Option<Decimal>,
    price_max: Option<Decimal>,
    availability: Json<Availability>,
    avatar_url: Option<String>,
    onboarding_complete: bool,
}

impl TryFrom<TherapistRow> for TherapistProfile {
    type Error = RepositoryError;

    fn try_from(row: TherapistRow) -> Result<Self, Self::Error> {
        let modality = row
            .modality
            .as_deref()
            .map(str::parse::<Modality>)
            .transpose()
            .map_err(|e| RepositoryError::DataCorruption(format!("therapist {}: {e}", row.id)))?;
        let fees = FeeRange::new(row.price_min, row.price_max).map_err(|e| {
            RepositoryError::DataCorruption(format!("therapist {}: fees: {e}", row.id))
        })?;

        Ok(Self {
            id: TherapistId::new(row.id),
            email: row.email,
            name: row.name,
            colegiado: row.colegiado,
            modality,
            langs: row.langs,
            approaches: row.approaches,
            specialties: row.specialties,
            city: row.city,
            country: row.country,
            website: row.website,
            phone: row.phone,
            fees,
            availability: row.availability.0,
            avatar_url: row.avatar_url,
            onboarding_complete: row.onboarding_complete,
        })
    }
}

/// Repository for the signed-in therapist's own profile row.
pub struct TherapistRepository<'a> {
    pool: &'a PgPool,
    owner: &'a Identity,
}

impl<'a> TherapistRepository<'a> {
    /// Create a repository scoped to `owner`.
    #[must_use]
    pub const fn new(pool: &'a PgPool, owner: &'a Identity) -> Self {
        Self { pool, owner }
    }

    fn owner_id(&self) -> Uuid {
        self.owner.id.as_uuid()
    }

    /// Onboarding state of the owner; no row means [`OnboardingState::NoAccount`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn onboarding_state(&self) -> Result<OnboardingState, RepositoryError> {
        let flag: Option<bool> =
            sqlx::query_scalar("SELECT onboarding_complete FROM therapists WHERE id = $1")
                .bind(self.owner_id())
                .fetch_optional(self.pool)
                .await?;

        Ok(OnboardingState::from_flag(flag))
    }

    /// Read the owner's profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn get_profile(&self) -> Result<Option<TherapistProfile>, RepositoryError> {
        let row = sqlx::query_as::<_, TherapistRow>(
            r"
            SELECT id, email, name, colegiado, modality, langs, approaches, specialties,
                   city, country, website, phone, price_min, price_max, availability,
                   avatar_url, onboarding_complete
            FROM therapists
            WHERE id = $1
            ",
        )
        .bind(self.owner_id())
        .fetch_optional(self.pool)
        .await?;

        row.map(TherapistProfile::try_from).transpose()
    }

    /// Create or update the owner's row from the onboarding form and mark
    /// onboarding complete.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn complete_onboarding(
        &self,
        submission: &OnboardingSubmission,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO therapists (id, email, name, colegiado, modality, langs, onboarding_complete)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE)
            ON CONFLICT (id) DO UPDATE SET
                email = COALESCE(EXCLUDED.email, therapists.email),
                name = EXCLUDED.name,
                colegiado = EXCLUDED.colegiado,
                modality = EXCLUDED.modality,
                langs = EXCLUDED.langs,
                onboarding_complete = TRUE,
                updated_at = now()
            ",
        )
        .bind(self.owner_id())
        .bind(self.owner.email.as_deref())
        .bind(&submission.name)
        .bind(&submission.colegiado)
        .bind(submission.modality.as_str())
        .bind(submission.langs.as_slice())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Update the identity fields edited on the profile page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the owner has no row yet.
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE therapists SET
                name = $2,
                colegiado = $3,
                modality = $4,
                langs = $5,
                city = $6,
                country = $7,
                website = $8,
                phone = $9,
                updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(self.owner_id())
        .bind(&update.name)
        .bind(&update.colegiado)
        .bind(update.modality.as_str())
        .bind(update.langs.as_slice())
        .bind(update.city.as_deref())
        .bind(update.country.as_deref())
        .bind(update.website.as_deref())
        .bind(update.phone.as_deref())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Replace the owner's fee range.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the owner has no row yet.
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn update_fees(&self, fees: &FeeRange) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE therapists SET price_min = $2, price_max = $3, updated_at = now() WHERE id = $1",
        )
        .bind(self.owner_id())
        .bind(fees.min())
        .bind(fees.max())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Replace the owner's whole weekly availability.
    ///
    /// The caller validates `availability` first; this stores it as given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the owner has no row yet.
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn update_availability(
        &self,
        availability: &Availability,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE therapists SET availability = $2, updated_at = now() WHERE id = $1",
        )
        .bind(self.owner_id())
        .bind(Json(availability))
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
