//! Client-local store configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the durable key-value store that holds the pending
/// profile entry and the persisted session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStoreConfig {
    /// Store provider: `"file"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// File-backed store settings.
    #[serde(default)]
    pub file: FileStoreConfig,
    /// In-memory store settings.
    #[serde(default)]
    pub memory: MemoryStoreConfig,
}

impl Default for LocalStoreConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            file: FileStoreConfig::default(),
            memory: MemoryStoreConfig::default(),
        }
    }
}

/// File-backed store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStoreConfig {
    /// Path of the JSON document holding every key.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

/// In-memory store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStoreConfig {
    /// Maximum number of entries held.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_provider() -> String {
    "file".to_string()
}

fn default_path() -> String {
    "data/local_store.json".to_string()
}

fn default_max_capacity() -> u64 {
    1000
}
