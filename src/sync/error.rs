//! Error types for the sync collaborators.

use thiserror::Error;

/// Sync result type.
pub type SyncResult<T> = Result<T, SyncError>;

/// Failures reported by the remote and local stores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("Photo upload failed: {0}")]
    PhotoUploadFailed(String),

    #[error("Entry save failed: {0}")]
    EntrySaveFailed(String),

    #[error("Entry fetch failed: {0}")]
    EntryFetchFailed(String),

    #[error("Entry delete failed: {0}")]
    EntryDeleteFailed(String),

    #[error("Local store error: {0}")]
    LocalStoreFailed(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

impl SyncError {
    /// Whether the failure happened on the remote side
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            SyncError::PhotoUploadFailed(_)
                | SyncError::EntrySaveFailed(_)
                | SyncError::EntryFetchFailed(_)
                | SyncError::EntryDeleteFailed(_)
        )
    }
}
