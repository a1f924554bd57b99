//! Sign-out command.

use ecolearn_core::config::AppConfig;
use ecolearn_core::error::AppError;

use crate::output;

/// Execute the signout command
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let session = super::open_session(config, &config.site.home_path)?;
    session.sign_out().await?;
    output::print_success("Signed out.");
    Ok(())
}
