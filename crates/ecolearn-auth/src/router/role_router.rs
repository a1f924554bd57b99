//! Role-based dashboard routing.

use ecolearn_core::config::{AuthConfig, SiteConfig};
use ecolearn_entity::profile::{Profile, Role};

/// Decides where a freshly signed-in user belongs.
#[derive(Debug, Clone)]
pub struct RoleRouter {
    teacher_dashboard: String,
    ngo_dashboard: String,
    redirect_from: Vec<String>,
}

impl RoleRouter {
    /// Build a router from the site routes and the redirect allow-list.
    pub fn new(site: &SiteConfig, auth: &AuthConfig) -> Self {
        Self {
            teacher_dashboard: site.teacher_dashboard_path.clone(),
            ngo_dashboard: site.ngo_dashboard_path.clone(),
            redirect_from: auth
                .redirect_from
                .iter()
                .map(|p| normalize_path(p).to_string())
                .collect(),
        }
    }

    /// Dashboard for a role; `None` for roles without one.
    pub fn dashboard_for(&self, role: Role) -> Option<&str> {
        match role {
            Role::Teacher => Some(self.teacher_dashboard.as_str()),
            Role::Ngo => Some(self.ngo_dashboard.as_str()),
            Role::Student => None,
        }
    }

    /// Whether a sign-in observed at `path` may redirect.
    pub fn may_redirect_from(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.redirect_from.iter().any(|allowed| allowed == path)
    }

    /// Target to navigate to after sign-in, if any.
    pub fn route_after_auth(&self, profile: &Profile, current_path: &str) -> Option<String> {
        if !self.may_redirect_from(current_path) {
            return None;
        }
        self.dashboard_for(profile.role).map(String::from)
    }
}

/// Strip query, fragment and trailing slash (except for the root).
fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = path[..end].trim();
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}
