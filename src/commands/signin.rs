//! Magic-link request command.

use clap::Args;
use dialoguer::{Input, Select};

use ecolearn_auth::{SignInForm, SignInRole};
use ecolearn_core::config::AppConfig;
use ecolearn_core::error::AppError;
use ecolearn_entity::ngo::NgoType;
use ecolearn_entity::teacher::{InstitutionChoice, KNOWN_INSTITUTIONS, OTHER_INSTITUTION};

use crate::output;

/// Arguments for the signin command
///
/// Any field left out is prompted for unless `--no-input` is set.
#[derive(Debug, Args)]
pub struct SigninArgs {
    /// Account role: teacher or ngo
    #[arg(long)]
    pub role: Option<String>,
    /// Address the magic link is sent to
    #[arg(long)]
    pub email: Option<String>,
    /// Display name (defaults to the part of the email before '@')
    #[arg(long)]
    pub display_name: Option<String>,
    /// Teacher: institution name, or "Other"
    #[arg(long)]
    pub institution: Option<String>,
    /// Teacher: institution name when --institution is "Other"
    #[arg(long)]
    pub other_institution: Option<String>,
    /// Teacher: school email address
    #[arg(long)]
    pub school_email: Option<String>,
    /// NGO: organization name
    #[arg(long)]
    pub organization: Option<String>,
    /// NGO: type (education, welfare, stem_outreach, environmental,
    /// community_development, other)
    #[arg(long)]
    pub ngo_type: Option<String>,
    /// NGO: official email address
    #[arg(long)]
    pub official_email: Option<String>,
    /// NGO: website URL
    #[arg(long)]
    pub website: Option<String>,
    /// Fail instead of prompting for missing fields
    #[arg(long)]
    pub no_input: bool,
}

/// Execute the signin command
pub async fn execute(args: &SigninArgs, config: &AppConfig) -> Result<(), AppError> {
    let form = build_form(args)?;
    let role = form.role();
    let session = super::open_session(config, &config.site.auth_path)?;

    if let Err(e) = session.sign_in_with_magic_link(&form).await {
        let message = e.user_message(role);
        return Err(AppError::new(AppError::from(e).kind, message));
    }

    output::print_success(&format!("Magic link sent to {}", form.email.trim()));
    println!("  Open the link, then pass the URL it lands on to `ecolearn callback`.");
    Ok(())
}

fn build_form(args: &SigninArgs) -> Result<SignInForm, AppError> {
    let prompt = Prompter {
        enabled: !args.no_input,
    };

    let role = match &args.role {
        Some(role) => role.parse::<SignInRole>()?,
        None => prompt.role()?,
    };
    let email = prompt.text("Email", args.email.as_deref())?;

    let form = match role {
        SignInRole::Teacher => {
            let institution = match &args.institution {
                Some(selected) => InstitutionChoice::from_selection(
                    selected,
                    args.other_institution.as_deref(),
                )?,
                None => prompt.institution(args.other_institution.as_deref())?,
            };
            let school_email = prompt.text("School email", args.school_email.as_deref())?;
            SignInForm::teacher(email, institution, school_email)
        }
        SignInRole::Ngo => {
            let organization = prompt.text("Organization name", args.organization.as_deref())?;
            let ngo_type = match &args.ngo_type {
                Some(kind) => kind.parse::<NgoType>()?,
                None => prompt.ngo_type()?,
            };
            let official_email = prompt.text("Official email", args.official_email.as_deref())?;
            let website = match &args.website {
                Some(url) => Some(url.clone()),
                None => prompt.optional_text("Website URL")?,
            };
            SignInForm::ngo(email, organization, ngo_type, official_email, website)
        }
    };

    Ok(match &args.display_name {
        Some(name) => form.with_display_name(name.clone()),
        None => form,
    })
}

/// Fills missing fields interactively.
struct Prompter {
    enabled: bool,
}

impl Prompter {
    fn require(&self, field: &str) -> Result<(), AppError> {
        if self.enabled {
            Ok(())
        } else {
            Err(AppError::validation(format!("{field} is required")))
        }
    }

    fn text(&self, field: &str, given: Option<&str>) -> Result<String, AppError> {
        if let Some(value) = given {
            return Ok(value.to_string());
        }
        self.require(field)?;
        Input::<String>::new()
            .with_prompt(field)
            .interact_text()
            .map_err(input_error)
    }

    fn optional_text(&self, field: &str) -> Result<Option<String>, AppError> {
        if !self.enabled {
            return Ok(None);
        }
        let value = Input::<String>::new()
            .with_prompt(format!("{field} (optional)"))
            .allow_empty(true)
            .interact_text()
            .map_err(input_error)?;
        Ok(Some(value).filter(|v| !v.trim().is_empty()))
    }

    fn role(&self) -> Result<SignInRole, AppError> {
        self.require("Role")?;
        let labels: Vec<&str> = SignInRole::ALL.iter().map(|r| r.label()).collect();
        let index = Select::new()
            .with_prompt("Sign in as")
            .items(&labels)
            .default(0)
            .interact()
            .map_err(input_error)?;
        Ok(SignInRole::ALL[index])
    }

    fn institution(&self, custom: Option<&str>) -> Result<InstitutionChoice, AppError> {
        self.require("Institution")?;
        let mut choices: Vec<&str> = KNOWN_INSTITUTIONS.to_vec();
        choices.push(OTHER_INSTITUTION);
        let index = Select::new()
            .with_prompt("Institution")
            .items(&choices)
            .default(0)
            .interact()
            .map_err(input_error)?;

        let selected = choices[index];
        if selected == OTHER_INSTITUTION && custom.is_none() {
            let typed = self.text("Institution name", None)?;
            return InstitutionChoice::from_selection(selected, Some(&typed));
        }
        InstitutionChoice::from_selection(selected, custom)
    }

    fn ngo_type(&self) -> Result<NgoType, AppError> {
        self.require("NGO type")?;
        let labels: Vec<&str> = NgoType::ALL.iter().map(|t| t.as_str()).collect();
        let index = Select::new()
            .with_prompt("NGO type")
            .items(&labels)
            .default(0)
            .interact()
            .map_err(input_error)?;
        Ok(NgoType::ALL[index])
    }
}

fn input_error(e: dialoguer::Error) -> AppError {
    AppError::internal(format!("Input error: {e}"))
}
