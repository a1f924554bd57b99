//! Identity session manager.
//!
//! Owns the current principal and converges every way a session can
//! appear or disappear (backend notifications, the start-up check, a
//! completed link callback, explicit sign-out) onto one state-update
//! routine, [`IdentitySession::observe_session`]. That routine runs the
//! provisioner, reads the base profile and asks the role router whether
//! to navigate. Transitions are serialized, so two observations of the
//! same session never interleave.

use std::sync::{Arc, Weak};

use ecolearn_cache::LocalStoreManager;
use ecolearn_core::config::AppConfig;
use ecolearn_core::result::AppResult;
use ecolearn_entity::principal::Principal;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::state::{AuthState, ProfileState};
use crate::backend::{AuthBackend, AuthEvent, LinkCallback};
use crate::error::CredentialError;
use crate::form::SignInForm;
use crate::issuer::CredentialIssuer;
use crate::pending::PendingProfileCache;
use crate::profile::{ProfileProvisioner, ProfileStore, ProvisionOutcome};
use crate::router::{Navigator, RoleRouter};

/// The application's view of who is signed in.
pub struct IdentitySession {
    /// Auth provider.
    backend: Arc<dyn AuthBackend>,
    /// Magic-link sender.
    issuer: CredentialIssuer,
    /// Staging slot for form fields.
    pending: PendingProfileCache,
    /// Writes staged fields once signed in.
    provisioner: ProfileProvisioner,
    /// Base profile reads.
    profiles: Arc<dyn ProfileStore>,
    /// Dashboard decision.
    router: RoleRouter,
    /// Location seam.
    navigator: Arc<dyn Navigator>,
    /// Published state.
    state: watch::Sender<AuthState>,
    /// Serializes transitions.
    transition: Mutex<()>,
    /// Backend notification listener.
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for IdentitySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentitySession")
            .field("backend", &self.backend)
            .field("state", &self.state.borrow().name())
            .finish_non_exhaustive()
    }
}

impl IdentitySession {
    /// Wire a session manager. Call [`start`](Self::start) before use.
    pub fn new(
        config: &AppConfig,
        backend: Arc<dyn AuthBackend>,
        profiles: Arc<dyn ProfileStore>,
        local_store: Arc<LocalStoreManager>,
        navigator: Arc<dyn Navigator>,
    ) -> Arc<Self> {
        let pending = PendingProfileCache::new(local_store);
        let (state, _) = watch::channel(AuthState::Unauthenticated);

        Arc::new(Self {
            issuer: CredentialIssuer::new(backend.clone(), &config.site),
            provisioner: ProfileProvisioner::new(pending.clone(), profiles.clone()),
            router: RoleRouter::new(&config.site, &config.auth),
            backend,
            pending,
            profiles,
            navigator,
            state,
            transition: Mutex::new(()),
            listener: Mutex::new(None),
        })
    }

    /// Subscribe to backend notifications and pick up an existing session.
    ///
    /// Calling it again only repeats the session check.
    pub async fn start(self: &Arc<Self>) -> AuthState {
        {
            let mut listener = self.listener.lock().await;
            if listener.is_none() {
                let events = self.backend.subscribe();
                *listener = Some(tokio::spawn(listen(Arc::downgrade(self), events)));
                debug!("Auth event listener started");
            }
        }
        self.refresh().await
    }

    /// Stop listening for backend notifications.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.listener.lock().await.take() {
            handle.abort();
            match handle.await {
                Err(e) if !e.is_cancelled() => {
                    warn!(error = %e, "Auth event listener ended abnormally");
                }
                _ => {}
            }
            debug!("Auth event listener stopped");
        }
    }

    /// Current state.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Watch state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// The signed-in principal, if any.
    pub fn current_principal(&self) -> Option<Principal> {
        self.state.borrow().principal().cloned()
    }

    /// The pending profile cache this session stages into.
    pub fn pending(&self) -> &PendingProfileCache {
        &self.pending
    }

    /// Send a magic link for the form's role and stage its fields.
    ///
    /// Fields are staged only after the link was sent, so a rejected
    /// request (rate limit included) leaves an earlier entry in place.
    pub async fn sign_in_with_magic_link(&self, form: &SignInForm) -> Result<(), CredentialError> {
        let entry = form.to_pending()?;
        let role = form.role();

        self.issuer.issue_link(&entry.email, role).await?;

        if let Err(e) = self.pending.stage(&entry).await {
            error!(email = %entry.email, error = %e, "Failed to stage pending profile; extension will be skipped");
        }

        let _guard = self.transition.lock().await;
        self.state.send_if_modified(|state| {
            if state.is_authenticated() {
                return false;
            }
            *state = AuthState::LinkSent {
                email: entry.email.clone(),
                role,
            };
            true
        });
        Ok(())
    }

    /// Exchange a magic-link callback URL for a session.
    pub async fn complete_sign_in(&self, callback_url: &str) -> AppResult<AuthState> {
        let callback = LinkCallback::parse(callback_url)?;
        let principal = self.backend.exchange_callback(&callback).await?;
        Ok(self.observe_session(Some(principal)).await)
    }

    /// End the session.
    pub async fn sign_out(&self) -> AppResult<()> {
        self.backend.sign_out().await?;

        let _guard = self.transition.lock().await;
        self.state.send_replace(AuthState::Unauthenticated);
        Ok(())
    }

    /// Re-read the backend session and apply it.
    pub async fn refresh(&self) -> AuthState {
        match self.backend.current_session().await {
            Ok(session) => self.observe_session(session).await,
            Err(e) => {
                warn!(error = %e, "Could not read current session");
                self.observe_session(None).await
            }
        }
    }

    /// Apply an observed session.
    ///
    /// With a live principal: publish `Authenticated`, run provisioning,
    /// read the base profile and, when the profile was not already loaded
    /// for this principal, route. Provisioning and profile read
    /// failures are logged and leave the profile incomplete.
    pub async fn observe_session(&self, session: Option<Principal>) -> AuthState {
        let _guard = self.transition.lock().await;

        let Some(principal) = session.filter(|p| !p.is_expired()) else {
            self.state.send_if_modified(|state| {
                if !state.is_authenticated() {
                    return false;
                }
                info!("Session ended");
                *state = AuthState::Unauthenticated;
                true
            });
            return self.state();
        };

        let principal_id = principal.id;
        let known = self
            .state
            .borrow()
            .profile()
            .filter(|profile| profile.id == principal_id)
            .cloned();
        // Routing fires only on the transition into a complete profile.
        let was_complete = known.is_some();
        self.state.send_replace(AuthState::Authenticated {
            principal: principal.clone(),
            profile: known.map_or(ProfileState::Incomplete, ProfileState::Complete),
        });

        match self.provisioner.provision_if_pending(&principal).await {
            Ok(ProvisionOutcome::NothingPending) => {}
            Ok(outcome) => debug!(principal_id = %principal_id, ?outcome, "Provisioning pass finished"),
            Err(e) => error!(principal_id = %principal_id, error = %e, "Profile provisioning failed"),
        }

        let profile = match self.profiles.find_profile(principal_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                warn!(principal_id = %principal_id, "Signed in without a base profile");
                return self.state();
            }
            Err(e) => {
                error!(principal_id = %principal_id, error = %e, "Failed to fetch base profile");
                return self.state();
            }
        };

        self.state.send_replace(AuthState::Authenticated {
            principal,
            profile: ProfileState::Complete(profile.clone()),
        });

        if was_complete {
            return self.state();
        }

        let current = self.navigator.current_path();
        if let Some(target) = self.router.route_after_auth(&profile, &current) {
            info!(
                principal_id = %principal_id,
                role = %profile.role,
                from = %current,
                to = %target,
                "Routing to dashboard"
            );
            self.navigator.navigate(&target);
        }

        self.state()
    }
}

/// Re-reads the backend session on every notification. Event payloads
/// may be stale by the time they are handled.
async fn listen(session: Weak<IdentitySession>, mut events: broadcast::Receiver<AuthEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => debug!(?event, "Auth event received"),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Auth events lagged; re-reading session");
            }
            Err(RecvError::Closed) => break,
        }

        let Some(session) = session.upgrade() else {
            break;
        };
        session.refresh().await;
    }
}
