//! NGO extension entity model.

use chrono::{DateTime, Utc};
use ecolearn_core::types::PrincipalId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::kind::NgoType;
use crate::verification::VerificationStatus;

/// NGO-specific attributes, keyed by the principal identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NgoProfile {
    /// The principal (and base profile) this record extends.
    pub id: PrincipalId,
    /// Registered organization name.
    pub organization_name: String,
    /// Declared focus area.
    pub ngo_type: NgoType,
    /// Official contact email.
    pub official_email: String,
    /// Organization website.
    pub website_url: Option<String>,
    /// Review state.
    pub verification_status: VerificationStatus,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Fields written when provisioning an NGO extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertNgoProfile {
    /// The principal identifier.
    pub id: PrincipalId,
    /// Organization name.
    pub organization_name: String,
    /// Declared focus area.
    pub ngo_type: NgoType,
    /// Official email.
    pub official_email: String,
    /// Website, if given.
    pub website_url: Option<String>,
}
