//! Configuration inspection commands.

use clap::{Args, Subcommand};

use ecolearn_core::config::AppConfig;
use ecolearn_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the merged configuration with secrets masked
    Show,
    /// Check that the configuration is usable
    Validate,
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let masked = masked(config);
            match format {
                OutputFormat::Json => output::print_json(&masked),
                OutputFormat::Table => {
                    output::print_kv("Site", &masked.site.url);
                    output::print_kv("Callback", &masked.site.callback_url());
                    output::print_kv("Auth backend", &masked.auth.backend_url);
                    output::print_kv("Anon key", &masked.auth.anon_key);
                    output::print_kv("Redirect from", &masked.auth.redirect_from.join(", "));
                    output::print_kv("Database", &masked.database.url);
                    output::print_kv("Local store", &masked.local_store.provider);
                    output::print_kv("Log level", &masked.logging.level);
                }
            }
        }
        ConfigCommand::Validate => {
            let problems = problems(config);
            if problems.is_empty() {
                output::print_success("Configuration is valid");
            } else {
                for problem in &problems {
                    output::print_error(problem);
                }
                return Err(AppError::configuration(format!(
                    "{} configuration problem(s)",
                    problems.len()
                )));
            }
        }
    }

    Ok(())
}

/// Copy of the configuration safe to print.
fn masked(config: &AppConfig) -> AppConfig {
    let mut masked = config.clone();
    if !masked.auth.anon_key.is_empty() {
        masked.auth.anon_key = "****".to_string();
    }
    masked.database.url = mask_password(&masked.database.url);
    masked
}

/// Mask the password in a connection URL.
fn mask_password(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:****@{host}"),
        None => url.to_string(),
    }
}

fn problems(config: &AppConfig) -> Vec<String> {
    let mut problems = Vec::new();

    if !config.site.url.starts_with("http://") && !config.site.url.starts_with("https://") {
        problems.push(format!("site.url must be an http(s) URL: '{}'", config.site.url));
    }
    if !config.auth.backend_url.starts_with("http://")
        && !config.auth.backend_url.starts_with("https://")
    {
        problems.push(format!(
            "auth.backend_url must be an http(s) URL: '{}'",
            config.auth.backend_url
        ));
    }
    if config.auth.anon_key.is_empty() {
        problems.push("auth.anon_key is not set".to_string());
    }
    for path in [
        &config.site.auth_path,
        &config.site.home_path,
        &config.site.teacher_dashboard_path,
        &config.site.ngo_dashboard_path,
    ] {
        if !path.starts_with('/') {
            problems.push(format!("route '{path}' must start with '/'"));
        }
    }
    if !matches!(config.local_store.provider.as_str(), "file" | "memory") {
        problems.push(format!(
            "local_store.provider must be 'file' or 'memory': '{}'",
            config.local_store.provider
        ));
    }

    problems
}
