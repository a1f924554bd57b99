//! Published session state.

use ecolearn_entity::principal::Principal;
use ecolearn_entity::profile::Profile;

use crate::issuer::SignInRole;

/// Whether the signed-in principal's base profile has been read.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileState {
    /// Not read yet, missing, or the read failed.
    Incomplete,
    /// Base profile loaded.
    Complete(Profile),
}

/// Session state machine.
///
/// `Unauthenticated -> LinkSent -> Authenticated`, and back to
/// `Unauthenticated` on sign-out or expiry.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    /// No session.
    #[default]
    Unauthenticated,
    /// A link was sent and not yet confirmed.
    LinkSent {
        /// Address the link went to.
        email: String,
        /// Role requested.
        role: SignInRole,
    },
    /// A live session.
    Authenticated {
        /// The signed-in principal.
        principal: Principal,
        /// Base profile state.
        profile: ProfileState,
    },
}

impl AuthState {
    /// Short name for logs and CLI output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::LinkSent { .. } => "link_sent",
            Self::Authenticated {
                profile: ProfileState::Incomplete,
                ..
            } => "profile_incomplete",
            Self::Authenticated { .. } => "authenticated",
        }
    }

    /// Whether a session is live.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// The signed-in principal.
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Authenticated { principal, .. } => Some(principal),
            _ => None,
        }
    }

    /// The loaded base profile.
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            Self::Authenticated {
                profile: ProfileState::Complete(profile),
                ..
            } => Some(profile),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use ecolearn_core::types::PrincipalId;
    use ecolearn_entity::principal::PrincipalMetadata;
    use ecolearn_entity::profile::Role;

    use super::*;

    #[test]
    fn test_names() {
        let principal = Principal {
            id: PrincipalId::new(),
            email: "alice@school.edu".to_string(),
            access_token: "at".to_string(),
            refresh_token: None,
            expires_at: Utc::now() + Duration::minutes(5),
            metadata: PrincipalMetadata::default(),
        };
        let incomplete = AuthState::Authenticated {
            principal: principal.clone(),
            profile: ProfileState::Incomplete,
        };
        assert_eq!(incomplete.name(), "profile_incomplete");
        assert!(incomplete.profile().is_none());

        let complete = AuthState::Authenticated {
            profile: ProfileState::Complete(Profile {
                id: principal.id,
                display_name: "alice".to_string(),
                role: Role::Teacher,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }),
            principal,
        };
        assert_eq!(complete.name(), "authenticated");
        assert_eq!(complete.profile().map(|p| p.role), Some(Role::Teacher));
        assert_eq!(AuthState::default().name(), "unauthenticated");
    }
}
