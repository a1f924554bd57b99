//! Profile schema migration commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use ecolearn_core::config::AppConfig;
use ecolearn_core::error::AppError;
use ecolearn_database::connection::DatabasePool;
use ecolearn_database::migration;

use crate::output::{self, OutputFormat};

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Apply every pending migration
    Run,
    /// List the migrations bundled with this binary
    List,
}

/// Migration display row
#[derive(Debug, Serialize, Tabled)]
struct MigrationRow {
    /// Version
    version: i64,
    /// Description
    description: String,
}

/// Execute migration commands
pub async fn execute(
    args: &MigrateArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        MigrateCommand::Run => {
            let db = DatabasePool::connect(&config.database).await?;
            println!("Running profile schema migrations...");
            migration::run_migrations(db.pool()).await?;
            db.close().await;
            output::print_success("All migrations applied.");
        }
        MigrateCommand::List => {
            let rows: Vec<MigrationRow> = migration::bundled_migrations()
                .into_iter()
                .map(|(version, description)| MigrationRow {
                    version,
                    description,
                })
                .collect();
            output::print_rows(&rows, format);
        }
    }

    Ok(())
}
