//! In-process auth backend using a Tokio mutex.
//!
//! Behaves like the hosted service for everything the sign-in flow relies
//! on: per-address rate limiting, single-use expiring links, refreshable
//! sessions and change notifications. Sent links land in an outbox
//! instead of a mailbox.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use ecolearn_core::config::AuthConfig;
use ecolearn_core::types::PrincipalId;
use ecolearn_entity::principal::{Principal, PrincipalMetadata};
use reqwest::Url;
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info};
use uuid::Uuid;

use super::{AuthBackend, AuthEvent, EVENT_CAPACITY, LinkCallback, MagicLinkRequest};
use crate::error::BackendError;
use crate::session::SessionStorage;

/// A link the backend "emailed".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentLink {
    /// Recipient.
    pub email: String,
    /// Callback URL including the one-time token.
    pub url: String,
    /// Metadata attached to the request.
    pub metadata: PrincipalMetadata,
    /// When it was sent.
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug)]
struct IssuedLink {
    email: String,
    metadata: PrincipalMetadata,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
struct Account {
    id: PrincipalId,
    metadata: PrincipalMetadata,
}

#[derive(Debug, Default)]
struct InnerState {
    /// Accounts by normalized email.
    accounts: HashMap<String, Account>,
    /// Outstanding links by token digest.
    links: HashMap<String, IssuedLink>,
    /// Last link sent per address.
    last_sent: HashMap<String, DateTime<Utc>>,
    /// Live sessions by access token.
    sessions: HashMap<String, Principal>,
    /// Refresh token to access token.
    refresh_tokens: HashMap<String, String>,
    outbox: Vec<SentLink>,
    delivery_disabled: bool,
}

/// In-memory [`AuthBackend`].
#[derive(Debug, Clone)]
pub struct MemoryAuthBackend {
    state: Arc<Mutex<InnerState>>,
    storage: SessionStorage,
    events: broadcast::Sender<AuthEvent>,
    rate_limit: Duration,
    link_ttl: Duration,
    session_ttl: Duration,
}

impl MemoryAuthBackend {
    /// Create a backend with the windows from the auth configuration.
    pub fn new(config: &AuthConfig, storage: SessionStorage) -> Self {
        Self::with_windows(
            storage,
            Duration::seconds(config.link_rate_limit_seconds as i64),
            Duration::minutes(config.link_ttl_minutes as i64),
            Duration::minutes(config.session_ttl_minutes as i64),
        )
    }

    /// Create a backend with explicit rate-limit, link and session windows.
    pub fn with_windows(
        storage: SessionStorage,
        rate_limit: Duration,
        link_ttl: Duration,
        session_ttl: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(InnerState::default())),
            storage,
            events,
            rate_limit,
            link_ttl,
            session_ttl,
        }
    }

    /// Every link sent so far, oldest first.
    pub async fn outbox(&self) -> Vec<SentLink> {
        self.state.lock().await.outbox.clone()
    }

    /// The most recent link sent to an address.
    pub async fn latest_link(&self, email: &str) -> Option<SentLink> {
        let email = normalize(email);
        self.state
            .lock()
            .await
            .outbox
            .iter()
            .rev()
            .find(|link| link.email == email)
            .cloned()
    }

    /// Simulate a backend whose mail delivery is not configured.
    pub async fn set_delivery_disabled(&self, disabled: bool) {
        self.state.lock().await.delivery_disabled = disabled;
    }

    fn emit(&self, event: AuthEvent) {
        if self.events.send(event).is_err() {
            debug!("No subscribers for auth event");
        }
    }

    fn open_session(
        &self,
        state: &mut InnerState,
        id: PrincipalId,
        email: &str,
        metadata: PrincipalMetadata,
    ) -> Principal {
        let principal = Principal {
            id,
            email: email.to_string(),
            access_token: Uuid::new_v4().simple().to_string(),
            refresh_token: Some(Uuid::new_v4().simple().to_string()),
            expires_at: Utc::now() + self.session_ttl,
            metadata,
        };
        if let Some(refresh) = &principal.refresh_token {
            state
                .refresh_tokens
                .insert(refresh.clone(), principal.access_token.clone());
        }
        state
            .sessions
            .insert(principal.access_token.clone(), principal.clone());
        principal
    }

    async fn refresh(&self, principal: &Principal) -> Option<Principal> {
        let refresh_token = principal.refresh_token.as_ref()?;
        let mut state = self.state.lock().await;

        let access_token = state.refresh_tokens.remove(refresh_token)?;
        let previous = state.sessions.remove(&access_token)?;
        Some(self.open_session(&mut state, previous.id, &previous.email, previous.metadata))
    }
}

#[async_trait]
impl AuthBackend for MemoryAuthBackend {
    async fn send_magic_link(&self, request: &MagicLinkRequest) -> Result<(), BackendError> {
        let email = normalize(&request.email);
        let now = Utc::now();
        let mut state = self.state.lock().await;

        if state.delivery_disabled {
            return Err(BackendError::api(500, "Error sending magic link email"));
        }

        if let Some(last) = state.last_sent.get(&email) {
            let elapsed = now - *last;
            if elapsed < self.rate_limit {
                let wait = (self.rate_limit - elapsed).num_seconds().max(1);
                return Err(BackendError::Api {
                    status: 429,
                    code: Some("over_email_send_rate_limit".to_string()),
                    message: format!(
                        "For security purposes, you can only request this after {wait} seconds."
                    ),
                });
            }
        }

        let token = Uuid::new_v4().simple().to_string();
        let mut url = Url::parse(&request.redirect_to)
            .map_err(|e| BackendError::api(400, format!("Invalid redirect_to: {e}")))?;
        url.query_pairs_mut()
            .append_pair("token_hash", &token)
            .append_pair("type", "magiclink");

        state.links.insert(
            digest(&token),
            IssuedLink {
                email: email.clone(),
                metadata: request.metadata.clone(),
                expires_at: now + self.link_ttl,
            },
        );
        state.last_sent.insert(email.clone(), now);
        state.outbox.push(SentLink {
            email: email.clone(),
            url: url.to_string(),
            metadata: request.metadata.clone(),
            sent_at: now,
        });

        info!(email = %email, "Magic link queued in outbox");
        Ok(())
    }

    async fn exchange_callback(&self, callback: &LinkCallback) -> Result<Principal, BackendError> {
        let principal = {
            let mut state = self.state.lock().await;
            match callback {
                LinkCallback::TokenHash { token_hash, .. } => {
                    let link = state
                        .links
                        .remove(&digest(token_hash))
                        .filter(|link| link.expires_at > Utc::now())
                        .ok_or_else(|| {
                            BackendError::InvalidLink(
                                "Email link is invalid or has expired".to_string(),
                            )
                        })?;

                    // Metadata is only recorded when the account is created.
                    let (id, metadata) = {
                        let account = state
                            .accounts
                            .entry(link.email.clone())
                            .or_insert_with(|| Account {
                                id: PrincipalId::new(),
                                metadata: link.metadata.clone(),
                            });
                        (account.id, account.metadata.clone())
                    };
                    self.open_session(&mut state, id, &link.email, metadata)
                }
                LinkCallback::Tokens { access_token, .. } => state
                    .sessions
                    .get(access_token)
                    .filter(|session| !session.is_expired())
                    .cloned()
                    .ok_or_else(|| BackendError::api(401, "invalid JWT: token is expired"))?,
            }
        };

        self.storage.save(&principal).await?;
        info!(principal_id = %principal.id, "Signed in");
        self.emit(AuthEvent::SignedIn(principal.clone()));
        Ok(principal)
    }

    async fn current_session(&self) -> Result<Option<Principal>, BackendError> {
        let Some(principal) = self.storage.load().await? else {
            return Ok(None);
        };
        if !principal.is_expired() {
            return Ok(Some(principal));
        }

        match self.refresh(&principal).await {
            Some(refreshed) => {
                self.storage.save(&refreshed).await?;
                info!(principal_id = %refreshed.id, "Session refreshed");
                self.emit(AuthEvent::TokenRefreshed(refreshed.clone()));
                Ok(Some(refreshed))
            }
            None => {
                debug!(principal_id = %principal.id, "Expired session is not refreshable");
                self.storage.clear().await?;
                Ok(None)
            }
        }
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        if let Some(principal) = self.storage.load().await? {
            let mut state = self.state.lock().await;
            state.sessions.remove(&principal.access_token);
            if let Some(refresh) = &principal.refresh_token {
                state.refresh_tokens.remove(refresh);
            }
        }

        self.storage.clear().await?;
        info!("Signed out");
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Links are stored by digest so the table never holds a usable token.
fn digest(token: &str) -> String {
    Sha256::digest(token.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use ecolearn_cache::LocalStoreManager;
    use ecolearn_entity::profile::Role;

    use super::*;
    use crate::error::CredentialError;

    fn backend() -> MemoryAuthBackend {
        let storage = SessionStorage::new(Arc::new(LocalStoreManager::in_memory()));
        MemoryAuthBackend::new(&AuthConfig::default(), storage)
    }

    fn request(email: &str) -> MagicLinkRequest {
        MagicLinkRequest {
            email: email.to_string(),
            redirect_to: "http://localhost:5173/auth".to_string(),
            metadata: PrincipalMetadata {
                role: Some(Role::Teacher),
                display_name: Some("alice".to_string()),
            },
        }
    }

    async fn confirm(backend: &MemoryAuthBackend, email: &str) -> Result<Principal, BackendError> {
        let link = backend.latest_link(email).await.expect("link sent");
        backend
            .exchange_callback(&LinkCallback::parse(&link.url)?)
            .await
    }

    #[tokio::test]
    async fn test_link_signs_in_once() {
        let backend = backend();
        let mut events = backend.subscribe();
        backend.send_magic_link(&request("alice@school.edu")).await.unwrap();

        let principal = confirm(&backend, "alice@school.edu").await.unwrap();
        assert_eq!(principal.email, "alice@school.edu");
        assert_eq!(principal.metadata.role, Some(Role::Teacher));
        assert!(matches!(events.recv().await.unwrap(), AuthEvent::SignedIn(_)));
        assert_eq!(backend.current_session().await.unwrap(), Some(principal));

        let reused = confirm(&backend, "alice@school.edu").await.unwrap_err();
        assert!(matches!(reused, BackendError::InvalidLink(_)));
    }

    #[tokio::test]
    async fn test_rate_limit_window() {
        let backend = backend();
        backend.send_magic_link(&request("alice@school.edu")).await.unwrap();

        let err = backend
            .send_magic_link(&request("ALICE@school.edu "))
            .await
            .unwrap_err();
        assert_eq!(CredentialError::from(err), CredentialError::RateLimited);

        backend.send_magic_link(&request("bob@school.edu")).await.unwrap();
        assert_eq!(backend.outbox().await.len(), 2);
    }

    #[tokio::test]
    async fn test_disabled_delivery() {
        let backend = backend();
        backend.set_delivery_disabled(true).await;
        let err = backend.send_magic_link(&request("alice@school.edu")).await.unwrap_err();
        assert_eq!(
            CredentialError::from(err),
            CredentialError::EmailUnconfirmedConfiguration
        );
        assert!(backend.outbox().await.is_empty());
    }

    #[tokio::test]
    async fn test_expired_link_is_rejected() {
        let storage = SessionStorage::new(Arc::new(LocalStoreManager::in_memory()));
        let backend = MemoryAuthBackend::with_windows(
            storage,
            Duration::zero(),
            Duration::zero(),
            Duration::minutes(5),
        );
        backend.send_magic_link(&request("alice@school.edu")).await.unwrap();
        assert!(confirm(&backend, "alice@school.edu").await.is_err());
    }

    #[tokio::test]
    async fn test_account_keeps_first_metadata() {
        let storage = SessionStorage::new(Arc::new(LocalStoreManager::in_memory()));
        let backend = MemoryAuthBackend::with_windows(
            storage,
            Duration::zero(),
            Duration::minutes(5),
            Duration::minutes(5),
        );
        backend.send_magic_link(&request("alice@school.edu")).await.unwrap();
        let first = confirm(&backend, "alice@school.edu").await.unwrap();

        let mut second_request = request("alice@school.edu");
        second_request.metadata.role = Some(Role::Ngo);
        backend.send_magic_link(&second_request).await.unwrap();
        let second = confirm(&backend, "alice@school.edu").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.metadata.role, Some(Role::Teacher));
    }

    #[tokio::test]
    async fn test_expired_session_is_refreshed() {
        let backend = backend();
        backend.send_magic_link(&request("alice@school.edu")).await.unwrap();
        let mut principal = confirm(&backend, "alice@school.edu").await.unwrap();

        principal.expires_at = Utc::now() - Duration::seconds(1);
        backend.storage.save(&principal).await.unwrap();

        let refreshed = backend.current_session().await.unwrap().expect("refreshed");
        assert_eq!(refreshed.id, principal.id);
        assert_ne!(refreshed.access_token, principal.access_token);
        assert!(!refreshed.is_expired());
    }

    #[tokio::test]
    async fn test_unrefreshable_expired_session_is_dropped() {
        let backend = backend();
        backend.send_magic_link(&request("alice@school.edu")).await.unwrap();
        let mut principal = confirm(&backend, "alice@school.edu").await.unwrap();

        principal.expires_at = Utc::now() - Duration::seconds(1);
        principal.refresh_token = None;
        backend.storage.save(&principal).await.unwrap();

        assert!(backend.current_session().await.unwrap().is_none());
        assert!(backend.storage.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_session() {
        let backend = backend();
        backend.send_magic_link(&request("alice@school.edu")).await.unwrap();
        confirm(&backend, "alice@school.edu").await.unwrap();

        let mut events = backend.subscribe();
        backend.sign_out().await.unwrap();
        assert!(backend.current_session().await.unwrap().is_none());
        assert!(matches!(events.recv().await.unwrap(), AuthEvent::SignedOut));
    }

    #[test]
    fn test_digest_is_hex_sha256() {
        let hex = digest("token");
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(hex, "token");
    }
}
