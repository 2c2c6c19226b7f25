//! Shared key-value store contract and its change notification

use serde::{Deserialize, Serialize};

/// Errors raised by a shared store backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage is unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Failed to persist store file: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Failed to encode store contents: {source}")]
    Encode {
        #[from]
        source: serde_json::Error,
    },
}

/// Change notification delivered to every view except the writer.
///
/// `key == None` means the entire store was cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEvent {
    pub key: Option<String>,
    pub new_value: Option<String>,
}

impl StorageEvent {
    pub fn changed(key: &str, new_value: Option<String>) -> Self {
        Self {
            key: Some(key.to_string()),
            new_value,
        }
    }

    pub fn cleared() -> Self {
        Self {
            key: None,
            new_value: None,
        }
    }
}

/// Per-origin persistent key-value store as seen from one view
pub trait SharedStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
