//! Pending profile entry and role-specific form details.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ngo::NgoType;
use crate::profile::Role;

/// Role-specific fields collected on the sign-in form.
///
/// Institution names are already resolved: the "Other" selection has
/// been replaced by the custom text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleDetails {
    /// Teacher fields.
    Teacher {
        /// Institution name.
        institution: String,
        /// School email.
        school_email: String,
    },
    /// NGO fields.
    Ngo {
        /// Organization name.
        organization_name: String,
        /// Declared focus area.
        ngo_type: NgoType,
        /// Official email.
        official_email: String,
        /// Website.
        #[serde(default)]
        website_url: Option<String>,
    },
}

impl RoleDetails {
    /// The role these details belong to.
    pub fn role(&self) -> Role {
        match self {
            Self::Teacher { .. } => Role::Teacher,
            Self::Ngo { .. } => Role::Ngo,
        }
    }
}

/// Profile fields staged between requesting a link and confirming it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingProfile {
    /// Address the link was sent to.
    pub email: String,
    /// Display name to use for the base profile.
    pub display_name: String,
    /// Role-specific fields; also carries the role tag.
    #[serde(flatten)]
    pub details: RoleDetails,
    /// When the entry was staged.
    pub staged_at: DateTime<Utc>,
}

impl PendingProfile {
    /// The role requested on the form.
    pub fn role(&self) -> Role {
        self.details.role()
    }
}
