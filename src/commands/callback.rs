//! Magic-link completion command.

use clap::Args;

use ecolearn_core::config::AppConfig;
use ecolearn_core::error::AppError;

use super::status::SessionRow;
use crate::output::{self, OutputFormat};

/// Arguments for the callback command
#[derive(Debug, Args)]
pub struct CallbackArgs {
    /// URL the magic link opened, including its query or fragment
    pub url: String,
}

/// Execute the callback command
///
/// The user is treated as being on the sign-in page, so a completed
/// profile reports its dashboard redirect.
pub async fn execute(
    args: &CallbackArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let session = super::open_session(config, &config.site.auth_path)?;

    let state = session.complete_sign_in(&args.url).await?;
    session.shutdown().await;

    if state.profile().is_none() {
        output::print_warning("Signed in, but the profile could not be loaded yet.");
    } else {
        output::print_success("Signed in.");
    }
    output::print_rows(&[SessionRow::from_state(&state)], format);
    Ok(())
}
