//! Principal value object.

use chrono::{DateTime, Utc};
use ecolearn_core::types::PrincipalId;
use serde::{Deserialize, Serialize};

use crate::profile::Role;

/// Metadata attached to the magic link and echoed back on the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalMetadata {
    /// Role requested when the link was issued.
    #[serde(default)]
    pub role: Option<Role>,
    /// Fallback display name derived from the email.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// An authenticated identity with a live session.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    /// Unique identifier assigned by the auth backend.
    pub id: PrincipalId,
    /// Confirmed email address.
    pub email: String,
    /// Bearer token for backend calls.
    pub access_token: String,
    /// Token used to obtain a new access token after expiry.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// When the access token expires.
    pub expires_at: DateTime<Utc>,
    /// Link metadata.
    #[serde(default)]
    pub metadata: PrincipalMetadata,
}

impl Principal {
    /// Check whether the session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Seconds until expiry, zero when already expired.
    pub fn expires_in_seconds(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }

    /// Display name from metadata, or the email local part.
    pub fn fallback_display_name(&self) -> String {
        self.metadata
            .display_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| display_name_from_email(&self.email))
    }
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("access_token", &"****")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "****"))
            .field("expires_at", &self.expires_at)
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// The local part of an email address, used as a fallback display name.
pub fn display_name_from_email(email: &str) -> String {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, _)) if !local.is_empty() => local.to_string(),
        _ => email.to_string(),
    }
}
