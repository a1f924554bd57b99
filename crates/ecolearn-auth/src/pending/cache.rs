//! Single-slot pending profile cache.
//!
//! Holds the role fields collected on the sign-in form until the link is
//! confirmed. There is exactly one slot: staging again replaces the
//! previous entry (last write wins). Reading with
//! [`PendingProfileCache::take_if_present`] clears the slot atomically, so
//! the entry is handed out at most once even when two session
//! observations race.

use std::sync::Arc;

use ecolearn_cache::LocalStoreManager;
use ecolearn_cache::keys;
use ecolearn_core::result::AppResult;
use ecolearn_core::traits::LocalStore;
use ecolearn_entity::pending::PendingProfile;
use tracing::{debug, info, warn};

/// Durable staging slot for the pending profile entry.
#[derive(Debug, Clone)]
pub struct PendingProfileCache {
    store: Arc<LocalStoreManager>,
    key: String,
}

impl PendingProfileCache {
    /// Create a cache over the given local store.
    pub fn new(store: Arc<LocalStoreManager>) -> Self {
        Self {
            store,
            key: keys::pending_profile(),
        }
    }

    /// Stage an entry, replacing whatever was staged before.
    pub async fn stage(&self, entry: &PendingProfile) -> AppResult<()> {
        if self.store.contains(&self.key).await? {
            info!(email = %entry.email, "Replacing previously staged profile entry");
        }
        self.store.set_json(&self.key, entry).await?;
        debug!(email = %entry.email, role = %entry.role(), "Staged pending profile");
        Ok(())
    }

    /// Read and clear the staged entry.
    pub async fn take_if_present(&self) -> AppResult<Option<PendingProfile>> {
        let Some(raw) = self.store.take(&self.key).await? else {
            return Ok(None);
        };
        Ok(self.decode(&raw))
    }

    /// Read the staged entry without clearing it. A corrupt entry is
    /// removed.
    pub async fn peek(&self) -> AppResult<Option<PendingProfile>> {
        let Some(raw) = self.store.get(&self.key).await? else {
            return Ok(None);
        };
        let entry = self.decode(&raw);
        if entry.is_none() {
            self.store.remove(&self.key).await?;
        }
        Ok(entry)
    }

    /// Put back an entry that was taken but not used. A newer entry
    /// staged in the meantime wins; returns whether `entry` was restored.
    pub async fn restore(&self, entry: &PendingProfile) -> AppResult<bool> {
        let json = serde_json::to_string(entry)?;
        let restored = self.store.set_if_absent(&self.key, &json).await?;
        if !restored {
            debug!(email = %entry.email, "Slot re-staged meanwhile; dropping taken entry");
        }
        Ok(restored)
    }

    /// Drop the staged entry, if any.
    pub async fn discard(&self) -> AppResult<()> {
        self.store.remove(&self.key).await
    }

    fn decode(&self, raw: &str) -> Option<PendingProfile> {
        match serde_json::from_str(raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Discarding corrupt pending profile entry");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use ecolearn_cache::file::FileLocalStore;
    use ecolearn_entity::ngo::NgoType;
    use ecolearn_entity::pending::RoleDetails;

    use super::*;

    fn entry(email: &str) -> PendingProfile {
        PendingProfile {
            email: email.to_string(),
            display_name: "river".to_string(),
            details: RoleDetails::Ngo {
                organization_name: "River Keepers".to_string(),
                ngo_type: NgoType::Environmental,
                official_email: email.to_string(),
                website_url: None,
            },
            staged_at: Utc::now(),
        }
    }

    fn cache() -> (PendingProfileCache, Arc<LocalStoreManager>) {
        let store = Arc::new(LocalStoreManager::in_memory());
        (PendingProfileCache::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_take_returns_entry_once() {
        let (cache, _) = cache();
        let staged = entry("info@river.org");
        cache.stage(&staged).await.unwrap();

        assert_eq!(cache.take_if_present().await.unwrap(), Some(staged));
        assert_eq!(cache.take_if_present().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let (cache, _) = cache();
        cache.stage(&entry("first@river.org")).await.unwrap();
        cache.stage(&entry("second@river.org")).await.unwrap();

        let taken = cache.take_if_present().await.unwrap().expect("staged");
        assert_eq!(taken.email, "second@river.org");
    }

    #[tokio::test]
    async fn test_restore_does_not_clobber_newer_entry() {
        let (cache, _) = cache();
        cache.stage(&entry("first@river.org")).await.unwrap();
        let taken = cache.take_if_present().await.unwrap().expect("staged");

        cache.stage(&entry("second@river.org")).await.unwrap();
        assert!(!cache.restore(&taken).await.unwrap());
        assert_eq!(cache.peek().await.unwrap().unwrap().email, "second@river.org");

        cache.discard().await.unwrap();
        assert!(cache.restore(&taken).await.unwrap());
        assert_eq!(cache.peek().await.unwrap().unwrap().email, "first@river.org");
    }

    #[tokio::test]
    async fn test_peek_does_not_clear() {
        let (cache, _) = cache();
        cache.stage(&entry("info@river.org")).await.unwrap();

        assert!(cache.peek().await.unwrap().is_some());
        assert!(cache.peek().await.unwrap().is_some());
        assert!(cache.take_if_present().await.unwrap().is_some());
        assert!(cache.peek().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_reads_as_absent() {
        let (cache, store) = cache();
        store.set(&keys::pending_profile(), "{\"role\":\"pilot\"}").await.unwrap();

        assert!(cache.peek().await.unwrap().is_none());
        assert!(!store.contains(&keys::pending_profile()).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_take_hands_out_one_entry() {
        let (cache, _) = cache();
        cache.stage(&entry("info@river.org")).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.take_if_present().await })
            })
            .collect();

        let mut taken = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().is_some() {
                taken += 1;
            }
        }
        assert_eq!(taken, 1);
    }

    #[tokio::test]
    async fn test_entry_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local_store.json");

        let first = PendingProfileCache::new(Arc::new(LocalStoreManager::from_provider(
            Arc::new(FileLocalStore::at(&path)),
        )));
        first.stage(&entry("info@river.org")).await.unwrap();
        drop(first);

        let second = PendingProfileCache::new(Arc::new(LocalStoreManager::from_provider(
            Arc::new(FileLocalStore::at(&path)),
        )));
        let taken = second.take_if_present().await.unwrap().expect("persisted");
        assert_eq!(taken.email, "info@river.org");
        assert!(second.take_if_present().await.unwrap().is_none());
    }
}
