//! Client-local key-value store trait.

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for client-local storage backends (JSON file or in-memory).
///
/// Values are plain strings; typed values are stored as JSON. Unlike a
/// cache, entries never expire on their own: a key lives until it is
/// overwritten or removed.
#[async_trait]
pub trait LocalStore: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// Check whether a key exists.
    async fn contains(&self, key: &str) -> AppResult<bool>;

    /// Atomically read and remove a value.
    ///
    /// Of several concurrent callers at most one observes `Some`.
    async fn take(&self, key: &str) -> AppResult<Option<String>>;

    /// Atomically set a value only when the key is absent. Returns whether
    /// the value was written.
    async fn set_if_absent(&self, key: &str, value: &str) -> AppResult<bool>;

    /// Get a typed value by deserializing from JSON.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key).await? {
            Some(value) => {
                let parsed = serde_json::from_str(&value)?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value by serializing to JSON.
    async fn set_json<T: serde::Serialize + Send + Sync>(&self, key: &str, value: &T) -> AppResult<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.set(key, &json).await
    }

    /// Check that the backing store is usable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Remove every key.
    async fn clear(&self) -> AppResult<()>;
}
