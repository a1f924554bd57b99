//! Profile role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles a principal can hold. The role is fixed at the first profile
/// write and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "profile_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Learner working through lessons and challenges.
    Student,
    /// Educator managing classes; carries a teacher extension record.
    Teacher,
    /// Partner organization; carries an NGO extension record.
    Ngo,
}

impl Role {
    /// Whether this role carries a role extension record.
    pub fn has_extension(&self) -> bool {
        matches!(self, Self::Teacher | Self::Ngo)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Ngo => "ngo",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = ecolearn_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "ngo" => Ok(Self::Ngo),
            _ => Err(ecolearn_core::AppError::validation(format!(
                "Invalid role: '{s}'. Expected one of: student, teacher, ngo"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("teacher".parse::<Role>().unwrap(), Role::Teacher);
        assert_eq!("NGO".parse::<Role>().unwrap(), Role::Ngo);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_students_have_no_extension() {
        assert!(!Role::Student.has_extension());
        assert!(Role::Teacher.has_extension());
        assert!(Role::Ngo.has_extension());
    }
}
