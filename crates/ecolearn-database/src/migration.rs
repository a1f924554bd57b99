//! Schema migrations for the profile tables.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use ecolearn_core::error::{AppError, ErrorKind};

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply every migration that has not run yet.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!(
        available = MIGRATOR.iter().count(),
        "Applying profile schema migrations"
    );

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!("Profile schema is up to date");
    Ok(())
}

/// Versions and descriptions of the bundled migrations.
pub fn bundled_migrations() -> Vec<(i64, String)> {
    MIGRATOR
        .iter()
        .map(|m| (m.version, m.description.to_string()))
        .collect()
}
