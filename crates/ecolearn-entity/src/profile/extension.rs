//! Role extension union.

use serde::{Deserialize, Serialize};

use super::role::Role;
use crate::ngo::NgoProfile;
use crate::teacher::TeacherProfile;

/// The role-specific record attached to a base profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RoleExtension {
    /// Teacher extension.
    Teacher(TeacherProfile),
    /// NGO extension.
    Ngo(NgoProfile),
}

impl RoleExtension {
    /// The role this extension belongs to.
    pub fn role(&self) -> Role {
        match self {
            Self::Teacher(_) => Role::Teacher,
            Self::Ngo(_) => Role::Ngo,
        }
    }
}
