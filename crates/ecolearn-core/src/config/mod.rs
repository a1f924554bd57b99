//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a serde default so a partial file
//! (or none at all) still yields a usable configuration.

pub mod auth;
pub mod database;
pub mod local_store;
pub mod logging;
pub mod site;

use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::local_store::LocalStoreConfig;
pub use self::logging::LoggingConfig;
pub use self::site::SiteConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// (default.toml + environment overlay + `ECOLEARN_` variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Public site URL and fixed routes.
    #[serde(default)]
    pub site: SiteConfig,
    /// Magic-link and auth backend settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Profile database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Client-local durable store settings.
    #[serde(default)]
    pub local_store: LocalStoreConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the `config/` directory.
    ///
    /// Merges `config/default.toml` with `config/{env}.toml` and
    /// environment variables prefixed with `ECOLEARN_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", env)
    }

    /// Load configuration starting from an explicit base file.
    pub fn load_from(base: &str, env: &str) -> Result<Self, AppError> {
        let overlay = std::path::Path::new(base)
            .with_file_name(env)
            .to_string_lossy()
            .into_owned();

        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&overlay).required(false))
            .add_source(
                config::Environment::with_prefix("ECOLEARN")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.redirect_from")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
