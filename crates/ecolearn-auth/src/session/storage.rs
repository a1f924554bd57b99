//! Persisted auth session.

use std::sync::Arc;

use ecolearn_cache::LocalStoreManager;
use ecolearn_cache::keys;
use ecolearn_core::result::AppResult;
use ecolearn_core::traits::LocalStore;
use ecolearn_entity::principal::Principal;
use tracing::{debug, warn};

/// Keeps the current principal (with its tokens) in the client-local
/// store so a restarted process resumes the session.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    /// Backing store.
    store: Arc<LocalStoreManager>,
    /// Slot the session is stored under.
    key: String,
}

impl SessionStorage {
    /// Create storage over the given local store.
    pub fn new(store: Arc<LocalStoreManager>) -> Self {
        Self {
            store,
            key: keys::auth_session(),
        }
    }

    /// Load the stored principal. An unreadable entry is discarded.
    pub async fn load(&self) -> AppResult<Option<Principal>> {
        let Some(raw) = self.store.get(&self.key).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<Principal>(&raw) {
            Ok(principal) => Ok(Some(principal)),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable persisted session");
                self.store.remove(&self.key).await?;
                Ok(None)
            }
        }
    }

    /// Store the principal, replacing any previous session.
    pub async fn save(&self, principal: &Principal) -> AppResult<()> {
        self.store.set_json(&self.key, principal).await?;
        debug!(principal_id = %principal.id, "Persisted session");
        Ok(())
    }

    /// Forget the stored session.
    pub async fn clear(&self) -> AppResult<()> {
        self.store.remove(&self.key).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use ecolearn_core::types::PrincipalId;
    use ecolearn_entity::principal::PrincipalMetadata;

    use super::*;

    fn storage() -> (SessionStorage, Arc<LocalStoreManager>) {
        let store = Arc::new(LocalStoreManager::in_memory());
        (SessionStorage::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let (storage, _) = storage();
        let principal = Principal {
            id: PrincipalId::new(),
            email: "alice@school.edu".to_string(),
            access_token: "at".to_string(),
            refresh_token: None,
            expires_at: Utc::now() + Duration::minutes(5),
            metadata: PrincipalMetadata::default(),
        };

        storage.save(&principal).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), Some(principal));

        storage.clear().await.unwrap();
        assert_eq!(storage.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_session_is_discarded() {
        let (storage, store) = storage();
        store.set(&keys::auth_session(), "{not json").await.unwrap();

        assert_eq!(storage.load().await.unwrap(), None);
        assert!(!store.contains(&keys::auth_session()).await.unwrap());
    }
}
