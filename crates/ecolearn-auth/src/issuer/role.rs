//! Roles that may request a magic link.

use std::fmt;
use std::str::FromStr;

use ecolearn_core::error::AppError;
use ecolearn_entity::profile::Role;
use serde::{Deserialize, Serialize};

/// Roles offered on the sign-in page. Students join through their class
/// and never request a link here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInRole {
    /// Teacher sign-up.
    Teacher,
    /// NGO sign-up.
    Ngo,
}

impl SignInRole {
    /// Both roles, in the order the sign-in page shows them.
    pub const ALL: [SignInRole; 2] = [Self::Teacher, Self::Ngo];

    /// Wording used in user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Ngo => "NGO",
        }
    }
}

impl From<SignInRole> for Role {
    fn from(role: SignInRole) -> Self {
        match role {
            SignInRole::Teacher => Role::Teacher,
            SignInRole::Ngo => Role::Ngo,
        }
    }
}

impl TryFrom<Role> for SignInRole {
    type Error = AppError;

    fn try_from(role: Role) -> Result<Self, Self::Error> {
        match role {
            Role::Teacher => Ok(Self::Teacher),
            Role::Ngo => Ok(Self::Ngo),
            Role::Student => Err(AppError::validation(
                "Students cannot request a sign-in link",
            )),
        }
    }
}

impl FromStr for SignInRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Role>().and_then(Self::try_from)
    }
}

impl fmt::Display for SignInRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Role::from(*self))
    }
}
