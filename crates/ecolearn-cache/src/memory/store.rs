//! In-memory local store using the moka crate.

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use ecolearn_core::config::local_store::MemoryStoreConfig;
use ecolearn_core::result::AppResult;
use ecolearn_core::traits::local_store::LocalStore;

/// In-process local store. Contents are lost when the process exits,
/// so this provider is meant for tests and throwaway sessions.
#[derive(Debug, Clone)]
pub struct MemoryLocalStore {
    cache: Cache<String, String>,
}

impl MemoryLocalStore {
    /// Create a new in-memory store from configuration.
    pub fn new(config: &MemoryStoreConfig) -> Self {
        let cache = Cache::builder().max_capacity(config.max_capacity).build();
        Self { cache }
    }
}

impl Default for MemoryLocalStore {
    fn default() -> Self {
        Self::new(&MemoryStoreConfig::default())
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.cache.insert(key.to_string(), value.to_string()).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn contains(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn take(&self, key: &str) -> AppResult<Option<String>> {
        // moka's remove returns the evicted value, so only one caller wins.
        let value = self.cache.remove(key).await;
        debug!(key, taken = value.is_some(), "Took key from memory store");
        Ok(value)
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> AppResult<bool> {
        let value = value.to_string();
        let entry = self
            .cache
            .entry(key.to_string())
            .or_insert_with(async move { value })
            .await;
        Ok(entry.is_fresh())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn clear(&self) -> AppResult<()> {
        self.cache.invalidate_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryLocalStore::default();
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        assert!(store.contains("k").await.unwrap());

        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_take_returns_value_once() {
        let store = MemoryLocalStore::default();
        store.set("slot", "entry").await.unwrap();

        assert_eq!(store.take("slot").await.unwrap(), Some("entry".to_string()));
        assert_eq!(store.take("slot").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_concurrent_take_has_single_winner() {
        let store = MemoryLocalStore::default();
        store.set("slot", "entry").await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.take("slot").await.unwrap() })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_set_if_absent_keeps_existing_value() {
        let store = MemoryLocalStore::default();
        assert!(store.set_if_absent("slot", "first").await.unwrap());
        assert!(!store.set_if_absent("slot", "second").await.unwrap());
        assert_eq!(store.get("slot").await.unwrap(), Some("first".to_string()));
    }

    #[tokio::test]
    async fn test_json_roundtrip() {
        let store = MemoryLocalStore::default();
        let data = serde_json::json!({"role": "teacher", "display_name": "alice"});
        store.set_json("json", &data).await.unwrap();
        let back: Option<serde_json::Value> = store.get_json("json").await.unwrap();
        assert_eq!(back, Some(data));
    }
}
