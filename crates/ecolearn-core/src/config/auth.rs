//! Authentication and auth-backend configuration.

use serde::{Deserialize, Serialize};

/// Settings for the magic-link flow and the hosted auth backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the hosted auth service.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Public (anon) API key sent with every backend request.
    #[serde(default)]
    pub anon_key: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Paths on which a confirmed sign-in may redirect to a dashboard.
    #[serde(default = "default_redirect_from")]
    pub redirect_from: Vec<String>,
    /// Minimum seconds between two links for the same address
    /// (enforced by the in-memory backend only).
    #[serde(default = "default_link_rate_limit")]
    pub link_rate_limit_seconds: u64,
    /// Lifetime of a magic link in minutes (in-memory backend only).
    #[serde(default = "default_link_ttl")]
    pub link_ttl_minutes: u64,
    /// Lifetime of an issued session in minutes (in-memory backend only).
    #[serde(default = "default_session_ttl")]
    pub session_ttl_minutes: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            anon_key: String::new(),
            request_timeout_seconds: default_request_timeout(),
            redirect_from: default_redirect_from(),
            link_rate_limit_seconds: default_link_rate_limit(),
            link_ttl_minutes: default_link_ttl(),
            session_ttl_minutes: default_session_ttl(),
        }
    }
}

fn default_backend_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

fn default_redirect_from() -> Vec<String> {
    vec!["/auth".to_string(), "/".to_string()]
}

fn default_link_rate_limit() -> u64 {
    60
}

fn default_link_ttl() -> u64 {
    60
}

fn default_session_ttl() -> u64 {
    60
}
