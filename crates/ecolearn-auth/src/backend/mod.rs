//! Auth backend seam.
//!
//! An [`AuthBackend`] sends magic links, exchanges the link callback for a
//! session, keeps the session in client-local storage and announces
//! every change on a broadcast channel. Two implementations:
//!
//! - [`HttpAuthBackend`]: a hosted GoTrue-compatible service
//! - [`MemoryAuthBackend`]: in-process, for tests and local development

pub mod callback;
pub mod http;
pub mod memory;

use async_trait::async_trait;
use ecolearn_entity::principal::{Principal, PrincipalMetadata};
use tokio::sync::broadcast;

use crate::error::BackendError;

pub use callback::LinkCallback;
pub use http::HttpAuthBackend;
pub use memory::{MemoryAuthBackend, SentLink};

/// Capacity of the session-change broadcast channel.
pub(crate) const EVENT_CAPACITY: usize = 16;

/// A session change announced by the backend.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    /// A link callback produced a new session.
    SignedIn(Principal),
    /// An expired session was renewed with its refresh token.
    TokenRefreshed(Principal),
    /// The session was ended.
    SignedOut,
}

impl AuthEvent {
    /// The session carried by the event, if any.
    pub fn session(&self) -> Option<&Principal> {
        match self {
            Self::SignedIn(principal) | Self::TokenRefreshed(principal) => Some(principal),
            Self::SignedOut => None,
        }
    }
}

/// Parameters of a magic-link request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicLinkRequest {
    /// Normalized recipient address.
    pub email: String,
    /// Absolute URL the link lands on after confirmation.
    pub redirect_to: String,
    /// Role and fallback display name attached to the principal.
    pub metadata: PrincipalMetadata,
}

/// Passwordless auth provider.
#[async_trait]
pub trait AuthBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Send a single-use sign-in link.
    async fn send_magic_link(&self, request: &MagicLinkRequest) -> Result<(), BackendError>;

    /// Exchange a link callback for a session, persist it and announce
    /// [`AuthEvent::SignedIn`].
    async fn exchange_callback(&self, callback: &LinkCallback) -> Result<Principal, BackendError>;

    /// The persisted session, refreshed when expired and refreshable.
    async fn current_session(&self) -> Result<Option<Principal>, BackendError>;

    /// End the session locally and on the backend.
    async fn sign_out(&self) -> Result<(), BackendError>;

    /// Subscribe to session changes.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
