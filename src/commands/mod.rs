//! CLI command definitions and dispatch.

pub mod callback;
pub mod config;
pub mod migrate;
pub mod pending;
pub mod signin;
pub mod signout;
pub mod status;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use ecolearn_auth::{HttpAuthBackend, IdentitySession, PgProfileStore, SessionStorage};
use ecolearn_cache::LocalStoreManager;
use ecolearn_core::config::AppConfig;
use ecolearn_core::error::AppError;
use ecolearn_database::connection::DatabasePool;

use crate::navigator::CliNavigator;
use crate::output::OutputFormat;

/// EcoLearn: passwordless sign-in for teachers and NGOs
#[derive(Debug, Parser)]
#[command(name = "ecolearn", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file, without extension
    #[arg(short, long, default_value = "config/default", global = true)]
    pub config: String,

    /// Environment overlay loaded next to the base file
    #[arg(short, long, default_value = "development", global = true)]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Request a magic link for a teacher or NGO account
    Signin(signin::SigninArgs),
    /// Complete sign-in with the URL the magic link opened
    Callback(callback::CallbackArgs),
    /// Show the current session and profile
    Status(status::StatusArgs),
    /// End the current session
    Signout,
    /// Inspect or clear the staged profile fields
    Pending(pending::PendingArgs),
    /// Profile schema migrations
    Migrate(migrate::MigrateArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Signin(args) => signin::execute(args, &config).await,
            Commands::Callback(args) => callback::execute(args, &config, self.format).await,
            Commands::Status(args) => status::execute(args, &config, self.format).await,
            Commands::Signout => signout::execute(&config).await,
            Commands::Pending(args) => pending::execute(args, &config, self.format).await,
            Commands::Migrate(args) => migrate::execute(args, &config, self.format).await,
            Commands::Config(args) => config::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: open the configured local store
pub fn open_local_store(config: &AppConfig) -> Result<Arc<LocalStoreManager>, AppError> {
    Ok(Arc::new(LocalStoreManager::new(&config.local_store)?))
}

/// Helper: wire an identity session against the hosted backend.
///
/// The database pool is lazy, so commands that never reach provisioning
/// work without a reachable database.
pub fn open_session(config: &AppConfig, path: &str) -> Result<Arc<IdentitySession>, AppError> {
    let local_store = open_local_store(config)?;
    let backend = HttpAuthBackend::new(&config.auth, SessionStorage::new(local_store.clone()))?;
    let db = DatabasePool::connect_lazy(&config.database)?;

    Ok(IdentitySession::new(
        config,
        Arc::new(backend),
        Arc::new(PgProfileStore::new(&db)),
        local_store,
        Arc::new(CliNavigator::at(path)),
    ))
}
