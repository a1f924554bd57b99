//! Institution selection for the teacher sign-up form.

use ecolearn_core::error::AppError;
use serde::{Deserialize, Serialize};

/// The selection that requires a free-text institution name.
pub const OTHER_INSTITUTION: &str = "Other";

/// Institutions offered in the sign-up picker, ahead of "Other".
pub const KNOWN_INSTITUTIONS: &[&str] = &[
    "Delhi Public School",
    "Kendriya Vidyalaya",
    "Jawahar Navodaya Vidyalaya",
    "Army Public School",
    "DAV Public School",
    "St. Xavier's School",
];

/// A teacher's institution as chosen on the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum InstitutionChoice {
    /// A name picked from the list or typed directly.
    Named(String),
    /// "Other" with the custom text the user typed.
    Other(String),
}

impl InstitutionChoice {
    /// Build a choice from the picker value and the optional custom text.
    ///
    /// Selecting "Other" (case-insensitive) requires non-empty custom text.
    pub fn from_selection(selected: &str, custom: Option<&str>) -> Result<Self, AppError> {
        let selected = selected.trim();
        if selected.is_empty() {
            return Err(AppError::validation("Institution is required"));
        }

        if selected.eq_ignore_ascii_case(OTHER_INSTITUTION) {
            let custom = custom.map(str::trim).unwrap_or_default();
            if custom.is_empty() {
                return Err(AppError::validation(
                    "Please enter your institution name when selecting 'Other'",
                ));
            }
            return Ok(Self::Other(custom.to_string()));
        }

        Ok(Self::Named(selected.to_string()))
    }

    /// The institution name to persist. Never the literal "Other".
    pub fn resolve(&self) -> &str {
        match self {
            Self::Named(name) | Self::Other(name) => name,
        }
    }
}
