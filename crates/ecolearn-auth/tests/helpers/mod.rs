//! Shared helpers for the sign-in flow integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use ecolearn_auth::{
    AuthState, IdentitySession, MemoryAuthBackend, MemoryProfileStore, PendingProfileCache,
    RecordingNavigator, SessionStorage, SignInForm,
};
use ecolearn_cache::LocalStoreManager;
use ecolearn_core::config::AppConfig;
use ecolearn_entity::ngo::NgoType;
use ecolearn_entity::teacher::InstitutionChoice;

/// A fully wired identity session over in-memory collaborators.
pub struct TestApp {
    pub config: AppConfig,
    pub local_store: Arc<LocalStoreManager>,
    pub backend: MemoryAuthBackend,
    pub profiles: MemoryProfileStore,
    pub navigator: Arc<RecordingNavigator>,
    pub session: Arc<IdentitySession>,
}

impl TestApp {
    /// Started session, user on the sign-in page.
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default(), "/auth").await
    }

    /// Started session with a custom configuration and location.
    pub async fn with_config(config: AppConfig, path: &str) -> Self {
        let local_store = Arc::new(LocalStoreManager::in_memory());
        let backend =
            MemoryAuthBackend::new(&config.auth, SessionStorage::new(local_store.clone()));
        Self::assemble(config, local_store, backend, MemoryProfileStore::new(), path).await
    }

    /// Started session over existing collaborators.
    pub async fn assemble(
        config: AppConfig,
        local_store: Arc<LocalStoreManager>,
        backend: MemoryAuthBackend,
        profiles: MemoryProfileStore,
        path: &str,
    ) -> Self {
        let navigator = Arc::new(RecordingNavigator::at(path));
        let session = IdentitySession::new(
            &config,
            Arc::new(backend.clone()),
            Arc::new(profiles.clone()),
            local_store.clone(),
            navigator.clone(),
        );
        session.start().await;

        Self {
            config,
            local_store,
            backend,
            profiles,
            navigator,
            session,
        }
    }

    /// Pending cache over the same local store.
    pub fn pending(&self) -> PendingProfileCache {
        PendingProfileCache::new(self.local_store.clone())
    }

    /// Click the most recent link sent to `email`.
    pub async fn confirm_latest_link(&self, email: &str) -> AuthState {
        let link = self
            .backend
            .latest_link(email)
            .await
            .expect("a link was sent");
        self.session
            .complete_sign_in(&link.url)
            .await
            .expect("callback accepted")
    }

    pub async fn shutdown(&self) {
        self.session.shutdown().await;
    }
}

/// Configuration without the per-address link rate limit.
pub fn unthrottled_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.link_rate_limit_seconds = 0;
    config
}

/// alice@school.edu signing up as a teacher at "Other" / Lakeside Academy.
pub fn lakeside_form() -> SignInForm {
    SignInForm::teacher(
        "alice@school.edu",
        InstitutionChoice::from_selection("Other", Some("Lakeside Academy"))
            .expect("custom institution"),
        "a@lakeside.edu",
    )
}

/// An NGO sign-up for `email`.
pub fn ngo_form(email: &str, organization_name: &str) -> SignInForm {
    SignInForm::ngo(
        email,
        organization_name,
        NgoType::Environmental,
        email,
        Some("https://river.example.org".to_string()),
    )
}
