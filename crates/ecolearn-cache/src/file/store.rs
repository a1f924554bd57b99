//! Local store persisted as one JSON document on disk.

use std::collections::BTreeMap;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use ecolearn_core::config::local_store::FileStoreConfig;
use ecolearn_core::error::{AppError, ErrorKind};
use ecolearn_core::result::AppResult;
use ecolearn_core::traits::local_store::LocalStore;

type Document = BTreeMap<String, String>;

/// Durable key-value store backed by a JSON file.
///
/// Every operation re-reads the file, so a value written by one process
/// is visible to the next. Writes go to a sibling temp file that is then
/// renamed over the original. Operations are serialized within a process;
/// there is no cross-process lock.
#[derive(Debug)]
pub struct FileLocalStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileLocalStore {
    /// Create a store for the configured path. The file is created on
    /// first write.
    pub fn new(config: &FileStoreConfig) -> Self {
        Self::at(&config.path)
    }

    /// Create a store at an explicit path.
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> AppResult<Document> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::LocalStore,
                    format!("Failed to read local store {}", self.path.display()),
                    e,
                ));
            }
        };

        if raw.trim().is_empty() {
            return Ok(Document::new());
        }

        match serde_json::from_str(&raw) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Local store is corrupt, starting from an empty document"
                );
                Ok(Document::new())
            }
        }
    }

    async fn write_document(&self, doc: &Document) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), keys = doc.len(), "Local store written");
        Ok(())
    }
}

#[async_trait]
impl LocalStore for FileLocalStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_document().await?;
        doc.insert(key.to_string(), value.to_string());
        self.write_document(&doc).await
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_document().await?;
        if doc.remove(key).is_some() {
            self.write_document(&doc).await?;
        }
        Ok(())
    }

    async fn contains(&self, key: &str) -> AppResult<bool> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await?.contains_key(key))
    }

    async fn take(&self, key: &str) -> AppResult<Option<String>> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_document().await?;
        let value = doc.remove(key);
        if value.is_some() {
            self.write_document(&doc).await?;
        }
        Ok(value)
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> AppResult<bool> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_document().await?;
        if doc.contains_key(key) {
            return Ok(false);
        }
        doc.insert(key.to_string(), value.to_string());
        self.write_document(&doc).await?;
        Ok(true)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let _guard = self.lock.lock().await;
        self.read_document().await.map(|_| true)
    }

    async fn clear(&self) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        self.write_document(&Document::new()).await
    }
}
