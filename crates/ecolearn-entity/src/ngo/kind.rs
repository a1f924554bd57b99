//! NGO type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Focus area declared by an NGO at sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ngo_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NgoType {
    /// Education.
    Education,
    /// Social welfare.
    Welfare,
    /// STEM outreach.
    StemOutreach,
    /// Environmental.
    Environmental,
    /// Community development.
    CommunityDevelopment,
    /// Anything else.
    Other,
}

impl NgoType {
    /// Every variant, in picker order.
    pub const ALL: [NgoType; 6] = [
        Self::Education,
        Self::Welfare,
        Self::StemOutreach,
        Self::Environmental,
        Self::CommunityDevelopment,
        Self::Other,
    ];

    /// Return the type as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Education => "education",
            Self::Welfare => "welfare",
            Self::StemOutreach => "stem_outreach",
            Self::Environmental => "environmental",
            Self::CommunityDevelopment => "community_development",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for NgoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NgoType {
    type Err = ecolearn_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                ecolearn_core::AppError::validation(format!(
                    "Invalid NGO type: '{s}'. Expected one of: education, welfare, \
                     stem_outreach, environmental, community_development, other"
                ))
            })
    }
}
