use super::ViewId;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("View {id} not found")]
    ViewNotFound { id: ViewId },

    #[error("View {id} is no longer running")]
    ViewClosed { id: ViewId },

    #[error("Failed to lock host state: {reason}")]
    StateLock { reason: String },

    #[error("Store operation failed: {source}")]
    Store {
        #[from]
        source: StoreError,
    },
}

impl HostError {
    /// Whether the caller asked for something that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, HostError::ViewNotFound { .. } | HostError::ViewClosed { .. })
    }
}
