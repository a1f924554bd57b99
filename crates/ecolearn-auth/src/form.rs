//! Sign-in form fields.
//!
//! The sign-in page collects an email plus role-specific fields. The
//! role fields are not sent with the link; they are staged in the
//! pending profile cache and written once the link is confirmed.

use chrono::Utc;
use ecolearn_entity::ngo::NgoType;
use ecolearn_entity::pending::{PendingProfile, RoleDetails};
use ecolearn_entity::principal::display_name_from_email;
use ecolearn_entity::teacher::{InstitutionChoice, OTHER_INSTITUTION};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CredentialError;
use crate::issuer::{SignInRole, normalize_email};

/// Teacher fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TeacherFields {
    /// Selected or custom institution.
    #[validate(custom(function = "validate_institution"))]
    pub institution: InstitutionChoice,
    /// School email address.
    #[validate(email(message = "Please enter a valid school email"))]
    pub school_email: String,
}

/// NGO fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NgoFields {
    /// Registered organization name.
    #[validate(length(min = 1, max = 255, message = "Organization name is required"))]
    pub organization_name: String,
    /// Declared focus area.
    pub ngo_type: NgoType,
    /// Official contact address.
    #[validate(email(message = "Please enter a valid official email"))]
    pub official_email: String,
    /// Public website, if any.
    #[validate(url(message = "Website must be a full URL, e.g. https://example.org"))]
    pub website_url: Option<String>,
}

/// Role-specific part of the form. The variant decides the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleFields {
    /// Teacher sign-up.
    Teacher(TeacherFields),
    /// NGO sign-up.
    Ngo(NgoFields),
}

/// Everything the sign-in page submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SignInForm {
    /// Address the link is sent to.
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    /// Preferred display name; the email local part when absent.
    #[validate(length(max = 100, message = "Display name is too long"))]
    pub display_name: Option<String>,
    /// Role-specific fields.
    pub fields: RoleFields,
}

impl SignInForm {
    /// Teacher sign-up form.
    pub fn teacher(
        email: impl Into<String>,
        institution: InstitutionChoice,
        school_email: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            display_name: None,
            fields: RoleFields::Teacher(TeacherFields {
                institution,
                school_email: school_email.into(),
            }),
        }
    }

    /// NGO sign-up form.
    pub fn ngo(
        email: impl Into<String>,
        organization_name: impl Into<String>,
        ngo_type: NgoType,
        official_email: impl Into<String>,
        website_url: Option<String>,
    ) -> Self {
        Self {
            email: email.into(),
            display_name: None,
            fields: RoleFields::Ngo(NgoFields {
                organization_name: organization_name.into(),
                ngo_type,
                official_email: official_email.into(),
                website_url,
            }),
        }
    }

    /// Set an explicit display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// The role this form signs up for.
    pub fn role(&self) -> SignInRole {
        match self.fields {
            RoleFields::Teacher(_) => SignInRole::Teacher,
            RoleFields::Ngo(_) => SignInRole::Ngo,
        }
    }

    /// Validate the form, returning the first problem as a user-facing error.
    pub fn check(&self) -> Result<(), CredentialError> {
        let trimmed = self.trimmed();
        let result = trimmed.validate().and_then(|()| match &trimmed.fields {
            RoleFields::Teacher(fields) => fields.validate(),
            RoleFields::Ngo(fields) => fields.validate(),
        });
        result.map_err(|errors| CredentialError::Generic(describe(&errors)))
    }

    /// The pending entry to stage once the link is sent.
    pub fn to_pending(&self) -> Result<PendingProfile, CredentialError> {
        self.check()?;
        let form = self.trimmed();
        let email = normalize_email(&form.email)?;

        let display_name = form
            .display_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| display_name_from_email(&email));

        let details = match form.fields {
            RoleFields::Teacher(fields) => RoleDetails::Teacher {
                institution: fields.institution.resolve().to_string(),
                school_email: fields.school_email.to_lowercase(),
            },
            RoleFields::Ngo(fields) => RoleDetails::Ngo {
                organization_name: fields.organization_name,
                ngo_type: fields.ngo_type,
                official_email: fields.official_email.to_lowercase(),
                website_url: fields.website_url,
            },
        };

        Ok(PendingProfile {
            email,
            display_name,
            details,
            staged_at: Utc::now(),
        })
    }

    fn trimmed(&self) -> Self {
        let trim = |s: &str| s.trim().to_string();
        let optional = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        Self {
            email: trim(&self.email),
            display_name: optional(&self.display_name),
            fields: match &self.fields {
                RoleFields::Teacher(fields) => RoleFields::Teacher(TeacherFields {
                    institution: fields.institution.clone(),
                    school_email: trim(&fields.school_email),
                }),
                RoleFields::Ngo(fields) => RoleFields::Ngo(NgoFields {
                    organization_name: trim(&fields.organization_name),
                    ngo_type: fields.ngo_type,
                    official_email: trim(&fields.official_email),
                    website_url: optional(&fields.website_url),
                }),
            },
        }
    }
}

fn validate_institution(choice: &InstitutionChoice) -> Result<(), ValidationError> {
    let name = choice.resolve().trim();
    // "Other" is the picker placeholder, never an institution name.
    if name.is_empty() || name.eq_ignore_ascii_case(OTHER_INSTITUTION) {
        return Err(ValidationError::new("institution")
            .with_message("Please enter your institution name".into()));
    }
    Ok(())
}

/// First field message, or the field name and rule when none was set.
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .find_map(|(field, errs)| {
            errs.first().map(|err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid ({})", err.code),
            })
        })
        .unwrap_or_else(|| "Invalid sign-in form".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lakeside() -> SignInForm {
        SignInForm::teacher(
            " Alice@School.edu ",
            InstitutionChoice::from_selection("Other", Some("Lakeside Academy")).unwrap(),
            "a@lakeside.edu",
        )
    }

    #[test]
    fn test_teacher_pending_entry() {
        let entry = lakeside().to_pending().unwrap();
        assert_eq!(entry.email, "alice@school.edu");
        assert_eq!(entry.display_name, "alice");
        assert_eq!(
            entry.details,
            RoleDetails::Teacher {
                institution: "Lakeside Academy".to_string(),
                school_email: "a@lakeside.edu".to_string(),
            }
        );
    }

    #[test]
    fn test_explicit_display_name() {
        let entry = lakeside().with_display_name(" Ms. Alice ").to_pending().unwrap();
        assert_eq!(entry.display_name, "Ms. Alice");
    }

    #[test]
    fn test_bad_school_email() {
        let form = SignInForm::teacher(
            "alice@school.edu",
            InstitutionChoice::Named("Kendriya Vidyalaya".to_string()),
            "lakeside",
        );
        assert_eq!(
            form.check().unwrap_err(),
            CredentialError::Generic("Please enter a valid school email".to_string())
        );
    }

    #[test]
    fn test_empty_other_institution_is_rejected() {
        let form = SignInForm::teacher(
            "alice@school.edu",
            InstitutionChoice::Other("  ".to_string()),
            "a@lakeside.edu",
        );
        assert!(form.check().is_err());
    }

    #[test]
    fn test_submitted_other_placeholder_is_rejected() {
        let form: SignInForm = serde_json::from_value(serde_json::json!({
            "email": "alice@school.edu",
            "display_name": null,
            "fields": {
                "role": "teacher",
                "institution": { "kind": "named", "name": " other " },
                "school_email": "a@lakeside.edu"
            }
        }))
        .unwrap();

        assert_eq!(
            form.check().unwrap_err(),
            CredentialError::Generic("Please enter your institution name".to_string())
        );
        assert!(form.to_pending().is_err());
    }

    #[test]
    fn test_ngo_website_is_optional_but_checked() {
        let form = SignInForm::ngo(
            "info@river.org",
            "River Keepers",
            NgoType::Environmental,
            "info@river.org",
            Some(" ".to_string()),
        );
        let entry = form.to_pending().unwrap();
        assert!(matches!(entry.details, RoleDetails::Ngo { website_url: None, .. }));
        assert_eq!(form.role(), SignInRole::Ngo);

        let form = SignInForm::ngo(
            "info@river.org",
            "River Keepers",
            NgoType::Environmental,
            "info@river.org",
            Some("river.org".to_string()),
        );
        assert!(form.check().is_err());
    }

    #[test]
    fn test_missing_organization_name() {
        let form = SignInForm::ngo("info@river.org", "  ", NgoType::Other, "info@river.org", None);
        assert_eq!(
            form.check().unwrap_err(),
            CredentialError::Generic("Organization name is required".to_string())
        );
    }
}
