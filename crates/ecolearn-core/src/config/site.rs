//! Public site and route configuration.

use serde::{Deserialize, Serialize};

/// Where the application is served and the fixed paths the identity
/// flow navigates between.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Public base URL of the application, without a trailing slash.
    #[serde(default = "default_url")]
    pub url: String,
    /// Sign-in route; magic links call back into this path.
    #[serde(default = "default_auth_path")]
    pub auth_path: String,
    /// Landing page.
    #[serde(default = "default_home_path")]
    pub home_path: String,
    /// Teacher dashboard route.
    #[serde(default = "default_teacher_dashboard")]
    pub teacher_dashboard_path: String,
    /// NGO dashboard route.
    #[serde(default = "default_ngo_dashboard")]
    pub ngo_dashboard_path: String,
}

impl SiteConfig {
    /// Absolute callback URL embedded in every magic link.
    pub fn callback_url(&self) -> String {
        format!("{}{}", self.url.trim_end_matches('/'), self.auth_path)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            auth_path: default_auth_path(),
            home_path: default_home_path(),
            teacher_dashboard_path: default_teacher_dashboard(),
            ngo_dashboard_path: default_ngo_dashboard(),
        }
    }
}

fn default_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_auth_path() -> String {
    "/auth".to_string()
}

fn default_home_path() -> String {
    "/".to_string()
}

fn default_teacher_dashboard() -> String {
    "/teacher-dashboard".to_string()
}

fn default_ngo_dashboard() -> String {
    "/ngo-dashboard".to_string()
}
