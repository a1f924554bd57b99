//! Teacher extension repository implementation.

use sqlx::PgPool;

use ecolearn_core::error::{AppError, ErrorKind};
use ecolearn_core::result::AppResult;
use ecolearn_core::types::PrincipalId;
use ecolearn_entity::teacher::{TeacherProfile, UpsertTeacherProfile};

/// Repository for the `teacher_profiles` table.
#[derive(Debug, Clone)]
pub struct TeacherProfileRepository {
    pool: PgPool,
}

impl TeacherProfileRepository {
    /// Create a new teacher profile repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the teacher extension of a principal.
    pub async fn find_by_id(&self, id: PrincipalId) -> AppResult<Option<TeacherProfile>> {
        sqlx::query_as::<_, TeacherProfile>("SELECT * FROM teacher_profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find teacher profile", e)
            })
    }

    /// Insert or update the teacher extension keyed on principal id.
    ///
    /// Verification fields of an existing row are preserved.
    pub async fn upsert(&self, data: &UpsertTeacherProfile) -> AppResult<TeacherProfile> {
        sqlx::query_as::<_, TeacherProfile>(
            "INSERT INTO teacher_profiles (id, institution, school_email) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET institution = EXCLUDED.institution, \
                                            school_email = EXCLUDED.school_email, \
                                            updated_at = NOW() \
             RETURNING *",
        )
        .bind(data.id)
        .bind(&data.institution)
        .bind(&data.school_email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("teacher_profiles_id_fkey") =>
            {
                AppError::conflict(format!("No base profile exists for {}", data.id))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to upsert teacher profile", e),
        })
    }
}
