//! Local store manager that dispatches to the configured provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use ecolearn_core::config::local_store::LocalStoreConfig;
use ecolearn_core::error::AppError;
use ecolearn_core::result::AppResult;
use ecolearn_core::traits::local_store::LocalStore;

use crate::file::FileLocalStore;

/// Wraps the configured local store provider.
#[derive(Debug, Clone)]
pub struct LocalStoreManager {
    inner: Arc<dyn LocalStore>,
}

impl LocalStoreManager {
    /// Create a manager from configuration.
    pub fn new(config: &LocalStoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn LocalStore> = match config.provider.as_str() {
            "file" => {
                info!(path = %config.file.path, "Using file-backed local store");
                Arc::new(FileLocalStore::new(&config.file))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Using in-memory local store");
                Arc::new(crate::memory::MemoryLocalStore::new(&config.memory))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown local store provider: '{other}'. Supported: file, memory"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn LocalStore>) -> Self {
        Self { inner: provider }
    }

    /// Fresh in-memory manager.
    #[cfg(feature = "memory")]
    pub fn in_memory() -> Self {
        Self::from_provider(Arc::new(crate::memory::MemoryLocalStore::default()))
    }
}

#[async_trait]
impl LocalStore for LocalStoreManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.inner.remove(key).await
    }

    async fn contains(&self, key: &str) -> AppResult<bool> {
        self.inner.contains(key).await
    }

    async fn take(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.take(key).await
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> AppResult<bool> {
        self.inner.set_if_absent(key, value).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn clear(&self) -> AppResult<()> {
        self.inner.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecolearn_core::error::ErrorKind;

    #[test]
    fn test_unknown_provider_is_rejected() {
        let config = LocalStoreConfig {
            provider: "indexeddb".to_string(),
            ..LocalStoreConfig::default()
        };
        let err = LocalStoreManager::new(&config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_manager_delegates_to_provider() {
        let manager = LocalStoreManager::in_memory();
        manager.set("k", "v").await.unwrap();
        assert_eq!(manager.take("k").await.unwrap(), Some("v".to_string()));
        assert!(!manager.contains("k").await.unwrap());
    }
}
