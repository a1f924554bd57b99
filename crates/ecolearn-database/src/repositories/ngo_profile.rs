//! NGO extension repository implementation.

use sqlx::PgPool;

use ecolearn_core::error::{AppError, ErrorKind};
use ecolearn_core::result::AppResult;
use ecolearn_core::types::PrincipalId;
use ecolearn_entity::ngo::{NgoProfile, UpsertNgoProfile};

/// Repository for the `ngo_profiles` table.
#[derive(Debug, Clone)]
pub struct NgoProfileRepository {
    pool: PgPool,
}

impl NgoProfileRepository {
    /// Create a new NGO profile repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the NGO extension of a principal.
    pub async fn find_by_id(&self, id: PrincipalId) -> AppResult<Option<NgoProfile>> {
        sqlx::query_as::<_, NgoProfile>("SELECT * FROM ngo_profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find NGO profile", e))
    }

    /// Insert or update the NGO extension keyed on principal id.
    pub async fn upsert(&self, data: &UpsertNgoProfile) -> AppResult<NgoProfile> {
        sqlx::query_as::<_, NgoProfile>(
            "INSERT INTO ngo_profiles (id, organization_name, ngo_type, official_email, website_url) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (id) DO UPDATE SET organization_name = EXCLUDED.organization_name, \
                                            ngo_type = EXCLUDED.ngo_type, \
                                            official_email = EXCLUDED.official_email, \
                                            website_url = EXCLUDED.website_url, \
                                            updated_at = NOW() \
             RETURNING *",
        )
        .bind(data.id)
        .bind(&data.organization_name)
        .bind(data.ngo_type)
        .bind(&data.official_email)
        .bind(&data.website_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("ngo_profiles_id_fkey") =>
            {
                AppError::conflict(format!("No base profile exists for {}", data.id))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to upsert NGO profile", e),
        })
    }
}
