//! Base profile entity model.

use chrono::{DateTime, Utc};
use ecolearn_core::types::PrincipalId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::Role;

/// The role-agnostic profile every principal has, one per principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    /// Same value as the principal identifier.
    pub id: PrincipalId,
    /// Human-readable display name.
    pub display_name: String,
    /// Role chosen at sign-up.
    pub role: Role,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a base profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
    /// The principal this profile belongs to.
    pub id: PrincipalId,
    /// Display name.
    pub display_name: String,
    /// Role.
    pub role: Role,
}
