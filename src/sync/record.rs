//! Locally persisted diary records and their sync bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::model::{Photo, PhotoEntry};

use super::error::{SyncError, SyncResult};
use super::wire::EntrySnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncState {
    Synced,
    #[default]
    PendingUpload,
    PendingDownload,
    Conflict,
    Error,
}

/// One entry as kept by the local store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryRecord {
    pub snapshot: EntrySnapshot,
    /// Encoded photo; stored next to the record rather than inside it
    #[serde(skip)]
    pub photo: Option<Arc<[u8]>>,
    pub sync_state: SyncState,
    pub last_modified_at: DateTime<Utc>,
    #[serde(default)]
    pub last_synced_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pending_changes: bool,
}

impl DiaryRecord {
    /// Record for a freshly committed entry.
    ///
    /// `previous` is the stored record with the same id; its photo URL is kept
    /// so an already uploaded photo is not sent again.
    pub fn from_entry(entry: &PhotoEntry, previous: Option<&DiaryRecord>, now: DateTime<Utc>) -> Self {
        let mut snapshot = EntrySnapshot::from_entry(entry, now);
        if snapshot.photo_url.is_none() {
            snapshot.photo_url = previous.and_then(|p| p.snapshot.photo_url.clone());
        }
        let photo = match entry.photo() {
            Photo::Inline(bytes) => Some(bytes.clone()),
            Photo::Remote { .. } => previous.and_then(|p| p.photo.clone()),
        };
        Self {
            snapshot,
            photo,
            sync_state: SyncState::PendingUpload,
            last_modified_at: now,
            last_synced_at: previous.and_then(|p| p.last_synced_at),
            pending_changes: true,
        }
    }

    /// Record for a snapshot pulled from the remote store
    pub fn from_remote(snapshot: EntrySnapshot, photo: Option<Arc<[u8]>>, now: DateTime<Utc>) -> Self {
        Self {
            last_modified_at: snapshot.updated_at,
            snapshot,
            photo,
            sync_state: SyncState::Synced,
            last_synced_at: Some(now),
            pending_changes: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.snapshot.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.snapshot.timestamp
    }

    pub fn needs_upload(&self) -> bool {
        self.pending_changes || self.sync_state != SyncState::Synced
    }

    /// Photo not yet uploaded
    pub fn needs_photo_upload(&self) -> bool {
        self.photo.is_some() && self.snapshot.photo_url.is_none()
    }

    pub fn mark_pending(&mut self) {
        self.sync_state = SyncState::PendingUpload;
    }

    pub fn mark_synced(&mut self, now: DateTime<Utc>) {
        self.sync_state = SyncState::Synced;
        self.last_synced_at = Some(now);
        self.pending_changes = false;
    }

    pub fn mark_failed(&mut self) {
        self.sync_state = SyncState::Error;
        self.pending_changes = true;
    }

    /// Rebuild the edit model. Inline bytes win over the remote URL.
    pub fn to_entry(&self) -> SyncResult<PhotoEntry> {
        let photo = match (&self.photo, &self.snapshot.photo_url) {
            (Some(bytes), _) => Photo::Inline(bytes.clone()),
            (None, Some(url)) => Photo::Remote { url: url.clone() },
            (None, None) => {
                return Err(SyncError::InvalidSnapshot(format!(
                    "entry {} has no photo",
                    self.snapshot.id
                )));
            }
        };
        self.snapshot.to_entry(photo)
    }
}
