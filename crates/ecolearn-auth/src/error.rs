//! Typed failures of the sign-in flow.
//!
//! [`CredentialError`] is what a caller of the sign-in operation sees,
//! [`BackendError`] is what an [`AuthBackend`](crate::backend::AuthBackend)
//! reports, and [`ProvisioningError`] covers the post-sign-in profile
//! writes, which are logged rather than surfaced.

use ecolearn_core::error::{AppError, ErrorKind};
use ecolearn_core::types::PrincipalId;
use ecolearn_entity::profile::Role;
use thiserror::Error;

use crate::issuer::SignInRole;

/// Why a magic link could not be issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// The backend cannot send mail (SMTP missing, provider disabled).
    #[error("auth backend email delivery is not configured")]
    EmailUnconfirmedConfiguration,
    /// Too many links were requested for this address.
    #[error("too many sign-in requests for this address")]
    RateLimited,
    /// Anything else, with the backend or validation message.
    #[error("{0}")]
    Generic(String),
}

impl CredentialError {
    /// Message shown to the person filling in the sign-in form.
    pub fn user_message(&self, role: SignInRole) -> String {
        let who = role.label();
        match self {
            Self::EmailUnconfirmedConfiguration => format!(
                "We couldn't send your {who} sign-in link because email delivery is not set up yet. \
                 Please contact the EcoLearn team."
            ),
            Self::RateLimited => format!(
                "Your {who} sign-in link was sent moments ago. \
                 Please check your inbox or wait a minute before trying again."
            ),
            Self::Generic(message) => format!("Could not send the {who} sign-in link: {message}"),
        }
    }
}

impl From<BackendError> for CredentialError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Api {
                status,
                code,
                message,
            } => {
                let code = code.unwrap_or_default().to_ascii_lowercase();
                let lowered = message.to_ascii_lowercase();

                if status == 429 || code.contains("rate_limit") || lowered.contains("rate limit") {
                    Self::RateLimited
                } else if code == "email_provider_disabled"
                    || code == "email_address_not_authorized"
                    || (lowered.contains("sending") && lowered.contains("email"))
                {
                    Self::EmailUnconfirmedConfiguration
                } else {
                    Self::Generic(message)
                }
            }
            other => Self::Generic(other.to_string()),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        let kind = match err {
            CredentialError::EmailUnconfirmedConfiguration => ErrorKind::Configuration,
            CredentialError::RateLimited => ErrorKind::RateLimit,
            CredentialError::Generic(_) => ErrorKind::Authentication,
        };
        AppError::new(kind, err.to_string())
    }
}

/// Failure reported by an auth backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend answered with an error status.
    #[error("auth backend returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable error code, when the backend sends one.
        code: Option<String>,
        /// Human-readable message.
        message: String,
    },
    /// The backend could not be reached.
    #[error("auth backend unreachable: {0}")]
    Transport(String),
    /// The callback did not carry a usable credential.
    #[error("invalid sign-in link: {0}")]
    InvalidLink(String),
    /// The backend answered with a body we could not read.
    #[error("unexpected auth backend response: {0}")]
    Decode(String),
    /// Reading or writing the persisted session failed.
    #[error(transparent)]
    Store(#[from] AppError),
}

impl BackendError {
    /// Shorthand for an API error without a code.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code: None,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Store(inner) => inner,
            BackendError::Api { status: 429, .. } => AppError::rate_limit(err.to_string()),
            BackendError::Api { status, .. } if status == 401 || status == 403 => {
                AppError::authentication(err.to_string())
            }
            BackendError::InvalidLink(_) => AppError::authentication(err.to_string()),
            _ => AppError::external(err.to_string()),
        }
    }
}

/// Why the pending entry could not be written to the profile tables.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// The base profile already exists with another role.
    #[error("profile {principal_id} already has role {existing}; refusing {staged} extension")]
    RoleMismatch {
        /// Principal the entry was meant for.
        principal_id: PrincipalId,
        /// Role stored on the base profile.
        existing: Role,
        /// Role of the staged entry.
        staged: Role,
    },
    /// The entry was staged for another address than the one that signed in.
    #[error("pending entry was staged for {staged_for}, but {signed_in} signed in")]
    EmailMismatch {
        /// Address on the staged entry.
        staged_for: String,
        /// Address of the confirmed principal.
        signed_in: String,
    },
    /// Store or cache failure.
    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<ProvisioningError> for AppError {
    fn from(err: ProvisioningError) -> Self {
        match err {
            ProvisioningError::Store(inner) => inner,
            other => AppError::conflict(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_classification() {
        let by_status = BackendError::api(429, "For security purposes, wait 60 seconds");
        assert_eq!(CredentialError::from(by_status), CredentialError::RateLimited);

        let by_code = BackendError::Api {
            status: 400,
            code: Some("over_email_send_rate_limit".to_string()),
            message: "Email rate limit exceeded".to_string(),
        };
        assert_eq!(CredentialError::from(by_code), CredentialError::RateLimited);
    }

    #[test]
    fn test_email_configuration_classification() {
        let err = BackendError::api(500, "Error sending magic link email");
        assert_eq!(
            CredentialError::from(err),
            CredentialError::EmailUnconfirmedConfiguration
        );
    }

    #[test]
    fn test_other_failures_are_generic() {
        let err = BackendError::Transport("connection refused".to_string());
        match CredentialError::from(err) {
            CredentialError::Generic(message) => assert!(message.contains("connection refused")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_user_message_names_the_role() {
        let msg = CredentialError::RateLimited.user_message(SignInRole::Ngo);
        assert!(msg.contains("NGO"));
        let msg = CredentialError::Generic("boom".to_string()).user_message(SignInRole::Teacher);
        assert_eq!(msg, "Could not send the teacher sign-in link: boom");
    }

    #[test]
    fn test_app_error_kinds() {
        assert_eq!(AppError::from(CredentialError::RateLimited).kind, ErrorKind::RateLimit);
        let err = AppError::from(ProvisioningError::RoleMismatch {
            principal_id: PrincipalId::new(),
            existing: Role::Student,
            staged: Role::Teacher,
        });
        assert_eq!(err.kind, ErrorKind::Conflict);
    }
}
