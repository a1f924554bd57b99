//! Hosted auth backend speaking the GoTrue REST API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ecolearn_core::config::AuthConfig;
use ecolearn_core::error::{AppError, ErrorKind};
use ecolearn_core::types::PrincipalId;
use ecolearn_entity::principal::{Principal, PrincipalMetadata};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{AuthBackend, AuthEvent, EVENT_CAPACITY, LinkCallback, MagicLinkRequest};
use crate::error::BackendError;
use crate::session::SessionStorage;

/// Lifetime assumed when the backend omits `expires_in`.
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// GoTrue-compatible backend reached over HTTP.
#[derive(Clone)]
pub struct HttpAuthBackend {
    /// Shared HTTP client.
    client: reqwest::Client,
    /// Service root, always ending with `/`.
    base_url: Url,
    /// Public API key.
    anon_key: String,
    /// Persisted session.
    storage: SessionStorage,
    /// Session-change notifications.
    events: broadcast::Sender<AuthEvent>,
}

impl std::fmt::Debug for HttpAuthBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAuthBackend")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpAuthBackend {
    /// Create a backend from the auth configuration.
    pub fn new(config: &AuthConfig, storage: SessionStorage) -> Result<Self, AppError> {
        let mut base_url = Url::parse(&config.backend_url).map_err(|e| {
            AppError::configuration(format!(
                "Invalid auth.backend_url '{}': {e}",
                config.backend_url
            ))
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            client,
            base_url,
            anon_key: config.anon_key.clone(),
            storage,
            events,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::Transport(format!("invalid endpoint '{path}': {e}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
    }

    fn emit(&self, event: AuthEvent) {
        if self.events.send(event).is_err() {
            debug!("No subscribers for auth event");
        }
    }

    async fn verify_token_hash(
        &self,
        token_hash: &str,
        link_type: &str,
    ) -> Result<Principal, BackendError> {
        let url = self.endpoint("auth/v1/verify")?;
        let response = self
            .request(Method::POST, url)
            .json(&json!({ "type": link_type, "token_hash": token_hash }))
            .send()
            .await?;

        let session: SessionResponse = read_json(response).await?;
        session.into_principal()
    }

    async fn fetch_user(
        &self,
        access_token: &str,
        refresh_token: Option<String>,
        expires_in: Option<i64>,
    ) -> Result<Principal, BackendError> {
        let url = self.endpoint("auth/v1/user")?;
        let response = self
            .request(Method::GET, url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let user: UserResponse = read_json(response).await?;
        let expires_at = Utc::now()
            + chrono::Duration::seconds(expires_in.unwrap_or(DEFAULT_EXPIRES_IN));
        user.into_principal(access_token.to_string(), refresh_token, expires_at)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Principal, BackendError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut()
            .append_pair("grant_type", "refresh_token");

        let response = self
            .request(Method::POST, url)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let session: SessionResponse = read_json(response).await?;
        session.into_principal()
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn send_magic_link(&self, request: &MagicLinkRequest) -> Result<(), BackendError> {
        let mut url = self.endpoint("auth/v1/otp")?;
        url.query_pairs_mut()
            .append_pair("redirect_to", &request.redirect_to);

        let response = self
            .request(Method::POST, url)
            .json(&json!({
                "email": request.email,
                "create_user": true,
                "data": request.metadata,
            }))
            .send()
            .await?;

        expect_success(response).await?;
        info!(email = %request.email, "Magic link requested");
        Ok(())
    }

    async fn exchange_callback(&self, callback: &LinkCallback) -> Result<Principal, BackendError> {
        let principal = match callback {
            LinkCallback::TokenHash {
                token_hash,
                link_type,
            } => self.verify_token_hash(token_hash, link_type).await?,
            LinkCallback::Tokens {
                access_token,
                refresh_token,
                expires_in,
            } => {
                self.fetch_user(access_token, refresh_token.clone(), *expires_in)
                    .await?
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

        let Some(refresh_token) = principal.refresh_token.as_deref() else {
            debug!(principal_id = %principal.id, "Session expired without refresh token");
            self.storage.clear().await?;
            return Ok(None);
        };

        match self.refresh(refresh_token).await {
            Ok(refreshed) => {
                self.storage.save(&refreshed).await?;
                info!(principal_id = %refreshed.id, "Session refreshed");
                self.emit(AuthEvent::TokenRefreshed(refreshed.clone()));
                Ok(Some(refreshed))
            }
            Err(e) => {
                warn!(principal_id = %principal.id, error = %e, "Session refresh failed; discarding");
                self.storage.clear().await?;
                Ok(None)
            }
        }
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        if let Some(principal) = self.storage.load().await? {
            let result = match self.endpoint("auth/v1/logout") {
                Ok(url) => match self
                    .request(Method::POST, url)
                    .bearer_auth(&principal.access_token)
                    .send()
                    .await
                {
                    Ok(response) => expect_success(response).await,
                    Err(e) => Err(e.into()),
                },
                Err(e) => Err(e),
            };

            if let Err(e) = result {
                warn!(principal_id = %principal.id, error = %e, "Backend logout failed; clearing local session");
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

/// Session returned by `/verify` and `/token`.
#[derive(Debug, Deserialize)]
struct SessionResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserResponse,
}

impl SessionResponse {
    fn into_principal(self) -> Result<Principal, BackendError> {
        let expires_at = self
            .expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(|| {
                Utc::now()
                    + chrono::Duration::seconds(self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN))
            });
        self.user
            .into_principal(self.access_token, self.refresh_token, expires_at)
    }
}

/// User object returned by `/user` and embedded in sessions.
#[derive(Debug, Deserialize)]
struct UserResponse {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: serde_json::Value,
}

impl UserResponse {
    fn into_principal(
        self,
        access_token: String,
        refresh_token: Option<String>,
        expires_at: DateTime<Utc>,
    ) -> Result<Principal, BackendError> {
        let email = self
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| BackendError::Decode(format!("user {} has no email", self.id)))?;

        // Unknown roles or extra keys must not fail the sign-in.
        let metadata =
            serde_json::from_value::<PrincipalMetadata>(self.user_metadata).unwrap_or_default();

        Ok(Principal {
            id: PrincipalId::from_uuid(self.id),
            email,
            access_token,
            refresh_token,
            expires_at,
            metadata,
        })
    }
}

/// Error bodies vary between GoTrue versions and the API gateway.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

fn api_error(status: u16, body: &str) -> BackendError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .msg
        .or(parsed.error_description)
        .or(parsed.message)
        .or_else(|| parsed.error.clone())
        .unwrap_or_else(|| format!("HTTP {status}"));

    BackendError::Api {
        status,
        code: parsed.error_code.or(parsed.error),
        message,
    }
}

async fn expect_success(response: Response) -> Result<(), BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status.as_u16(), &body))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status.as_u16(), &body))
}
