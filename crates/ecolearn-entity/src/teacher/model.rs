//! Teacher extension entity model.

use chrono::{DateTime, Utc};
use ecolearn_core::types::PrincipalId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::verification::VerificationStatus;

/// Teacher-specific attributes, keyed by the principal identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TeacherProfile {
    /// The principal (and base profile) this record extends.
    pub id: PrincipalId,
    /// Resolved institution name.
    pub institution: String,
    /// School-issued email address.
    pub school_email: String,
    /// Review state.
    pub verification_status: VerificationStatus,
    /// Reference to an uploaded verification document.
    pub verification_document: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Fields written when provisioning a teacher extension.
///
/// An upsert never touches `verification_status` or
/// `verification_document` of an existing record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertTeacherProfile {
    /// The principal identifier.
    pub id: PrincipalId,
    /// Resolved institution name.
    pub institution: String,
    /// School email.
    pub school_email: String,
}
