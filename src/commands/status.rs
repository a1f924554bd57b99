//! Session status command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use ecolearn_auth::AuthState;
use ecolearn_core::config::AppConfig;
use ecolearn_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for the status command
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Path the user is looking at; a dashboard redirect is reported when
    /// it is on the redirect allow-list
    #[arg(long)]
    pub from: Option<String>,
}

/// Session display row for table output
#[derive(Debug, Serialize, Tabled)]
pub struct SessionRow {
    /// State name
    state: String,
    /// Signed-in email
    email: String,
    /// Principal ID
    principal_id: String,
    /// Profile role
    role: String,
    /// Display name
    display_name: String,
    /// Session expiry
    expires_at: String,
}

impl SessionRow {
    /// Summarize a session state.
    pub fn from_state(state: &AuthState) -> Self {
        let principal = state.principal();
        let profile = state.profile();
        let email = match state {
            AuthState::LinkSent { email, .. } => email.clone(),
            _ => principal.map(|p| p.email.clone()).unwrap_or_default(),
        };
        let role = match (state, profile) {
            (_, Some(profile)) => profile.role.to_string(),
            (AuthState::LinkSent { role, .. }, None) => role.to_string(),
            _ => "-".to_string(),
        };

        Self {
            state: state.name().to_string(),
            email,
            principal_id: principal.map(|p| p.id.to_string()).unwrap_or_default(),
            role,
            display_name: profile.map(|p| p.display_name.clone()).unwrap_or_default(),
            expires_at: principal
                .map(|p| p.expires_at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Execute the status command
pub async fn execute(
    args: &StatusArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let from = args.from.as_deref().unwrap_or("");
    let session = super::open_session(config, from)?;

    let state = session.start().await;
    session.shutdown().await;

    output::print_rows(&[SessionRow::from_state(&state)], format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use ecolearn_auth::{ProfileState, SignInRole};
    use ecolearn_core::types::PrincipalId;
    use ecolearn_entity::principal::{Principal, PrincipalMetadata};
    use ecolearn_entity::profile::{Profile, Role};

    use super::*;

    #[test]
    fn test_row_for_link_sent() {
        let row = SessionRow::from_state(&AuthState::LinkSent {
            email: "info@river.org".to_string(),
            role: SignInRole::Ngo,
        });
        assert_eq!(row.state, "link_sent");
        assert_eq!(row.email, "info@river.org");
        assert_eq!(row.role, Role::Ngo.to_string());
        assert!(row.principal_id.is_empty());
    }

    #[test]
    fn test_row_for_complete_profile() {
        let id = PrincipalId::new();
        let now = Utc::now();
        let state = AuthState::Authenticated {
            principal: Principal {
                id,
                email: "alice@school.edu".to_string(),
                access_token: "at".to_string(),
                refresh_token: None,
                expires_at: now + Duration::hours(1),
                metadata: PrincipalMetadata::default(),
            },
            profile: ProfileState::Complete(Profile {
                id,
                display_name: "alice".to_string(),
                role: Role::Teacher,
                created_at: now,
                updated_at: now,
            }),
        };

        let row = SessionRow::from_state(&state);
        assert_eq!(row.state, "authenticated");
        assert_eq!(row.principal_id, id.to_string());
        assert_eq!(row.display_name, "alice");
        assert_eq!(row.role, Role::Teacher.to_string());
    }

    #[test]
    fn test_row_for_signed_out() {
        let row = SessionRow::from_state(&AuthState::Unauthenticated);
        assert_eq!(row.state, "unauthenticated");
        assert_eq!(row.role, "-");
    }
}
