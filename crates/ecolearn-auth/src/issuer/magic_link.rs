//! Credential issuer: sends role-tagged magic links.

use std::sync::Arc;

use ecolearn_core::config::SiteConfig;
use ecolearn_entity::principal::{PrincipalMetadata, display_name_from_email};
use tracing::{info, warn};
use validator::ValidateEmail;

use super::role::SignInRole;
use crate::backend::{AuthBackend, MagicLinkRequest};
use crate::error::CredentialError;

/// Sends single-use sign-in links that call back into the sign-in route.
///
/// The issuer stores nothing; staging the form fields is the caller's job.
#[derive(Debug, Clone)]
pub struct CredentialIssuer {
    /// Backend that delivers the link.
    backend: Arc<dyn AuthBackend>,
    /// Absolute URL of the sign-in route.
    callback_url: String,
}

impl CredentialIssuer {
    /// Create an issuer whose links land on the site's sign-in route.
    pub fn new(backend: Arc<dyn AuthBackend>, site: &SiteConfig) -> Self {
        Self {
            backend,
            callback_url: site.callback_url(),
        }
    }

    /// The URL embedded in every link.
    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    /// Send a sign-in link for `role` to `email`.
    ///
    /// The link carries the role and the email local part as a fallback
    /// display name.
    pub async fn issue_link(&self, email: &str, role: SignInRole) -> Result<(), CredentialError> {
        let email = normalize_email(email)?;
        let request = MagicLinkRequest {
            metadata: PrincipalMetadata {
                role: Some(role.into()),
                display_name: Some(display_name_from_email(&email)),
            },
            email,
            redirect_to: self.callback_url.clone(),
        };

        match self.backend.send_magic_link(&request).await {
            Ok(()) => {
                info!(email = %request.email, role = %role, "Issued magic link");
                Ok(())
            }
            Err(e) => {
                let err = CredentialError::from(e);
                warn!(email = %request.email, role = %role, error = %err, "Magic link request failed");
                Err(err)
            }
        }
    }
}

/// Trim, lower-case and validate an email address.
pub fn normalize_email(email: &str) -> Result<String, CredentialError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(CredentialError::Generic("Email is required".to_string()));
    }
    if !email.validate_email() {
        return Err(CredentialError::Generic(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(email)
}
