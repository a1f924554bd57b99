//! Base profile repository implementation.

use sqlx::PgPool;

use ecolearn_core::error::{AppError, ErrorKind};
use ecolearn_core::result::AppResult;
use ecolearn_core::types::PrincipalId;
use ecolearn_entity::profile::{NewProfile, Profile};

/// Repository for the `profiles` table.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Create a new profile repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a profile by principal id.
    pub async fn find_by_id(&self, id: PrincipalId) -> AppResult<Option<Profile>> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find profile by id", e)
            })
    }

    /// Insert a profile unless one already exists for the principal.
    ///
    /// Returns the stored row, which is the pre-existing one (role
    /// untouched) when the insert was skipped.
    pub async fn create_if_absent(&self, data: &NewProfile) -> AppResult<Profile> {
        let inserted = sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (id, display_name, role) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO NOTHING \
             RETURNING *",
        )
        .bind(data.id)
        .bind(&data.display_name)
        .bind(data.role)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create profile", e))?;

        match inserted {
            Some(profile) => Ok(profile),
            None => self.find_by_id(data.id).await?.ok_or_else(|| {
                AppError::database(format!("Profile {} vanished during insert", data.id))
            }),
        }
    }
}
