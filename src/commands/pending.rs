//! Staged profile inspection commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use ecolearn_auth::PendingProfileCache;
use ecolearn_core::config::AppConfig;
use ecolearn_core::error::AppError;
use ecolearn_entity::pending::{PendingProfile, RoleDetails};

use crate::output::{self, OutputFormat};

/// Arguments for pending commands
#[derive(Debug, Args)]
pub struct PendingArgs {
    /// Pending subcommand
    #[command(subcommand)]
    pub command: PendingCommand,
}

/// Pending subcommands
#[derive(Debug, Subcommand)]
pub enum PendingCommand {
    /// Show the staged entry without consuming it
    Show,
    /// Drop the staged entry
    Clear,
}

/// Staged entry row for table output
#[derive(Debug, Serialize, Tabled)]
struct PendingRow {
    /// Email the link was sent to
    email: String,
    /// Role
    role: String,
    /// Display name
    display_name: String,
    /// Institution or organization
    organization: String,
    /// School or official email
    contact_email: String,
    /// Staged at
    staged_at: String,
}

impl From<&PendingProfile> for PendingRow {
    fn from(entry: &PendingProfile) -> Self {
        let (organization, contact_email) = match &entry.details {
            RoleDetails::Teacher {
                institution,
                school_email,
            } => (institution.clone(), school_email.clone()),
            RoleDetails::Ngo {
                organization_name,
                ngo_type,
                official_email,
                ..
            } => (
                format!("{organization_name} ({ngo_type})"),
                official_email.clone(),
            ),
        };

        Self {
            email: entry.email.clone(),
            role: entry.role().to_string(),
            display_name: entry.display_name.clone(),
            organization,
            contact_email,
            staged_at: entry.staged_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute pending commands
pub async fn execute(
    args: &PendingArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let cache = PendingProfileCache::new(super::open_local_store(config)?);

    match &args.command {
        PendingCommand::Show => match cache.peek().await? {
            Some(entry) => match format {
                OutputFormat::Json => output::print_json(&entry),
                OutputFormat::Table => output::print_rows(&[PendingRow::from(&entry)], format),
            },
            None => output::print_warning("No staged profile fields."),
        },
        PendingCommand::Clear => {
            cache.discard().await?;
            output::print_success("Staged profile fields cleared.");
        }
    }

    Ok(())
}
