//! Remote store abstraction and its implementations.
//!
//! Supports an in-memory store and a plain folder acting as the remote.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::model::EntryId;

use super::error::{SyncError, SyncResult};
use super::wire::EntrySnapshot;

/// Remote store trait.
#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    /// Upload photo bytes for an entry. Returns the photo URL.
    async fn upload_photo(&self, bytes: &[u8], entry_id: &str) -> SyncResult<String>;

    /// Create or overwrite the entry document.
    async fn save_entry(&self, snapshot: &EntrySnapshot) -> SyncResult<()>;

    /// Documents updated strictly after `since`, oldest first.
    async fn fetch_entries_changed_since(
        &self,
        since: DateTime<Utc>,
    ) -> SyncResult<Vec<EntrySnapshot>>;

    /// Remove the entry document and its photo. Unknown ids are not an error.
    async fn delete_entry(&self, entry_id: &str) -> SyncResult<()>;
}

fn changed_since(mut snapshots: Vec<EntrySnapshot>, since: DateTime<Utc>) -> Vec<EntrySnapshot> {
    snapshots.retain(|s| s.updated_at > since);
    snapshots.sort_by_key(|s| s.updated_at);
    snapshots
}

/// Remote kept in process memory.
#[derive(Default)]
pub struct InMemoryRemoteStore {
    entries: Mutex<HashMap<String, EntrySnapshot>>,
    photos: Mutex<HashMap<String, Vec<u8>>>,
    offline: AtomicBool,
}

impl InMemoryRemoteStore {
    /// While offline every call fails
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn photo(&self, entry_id: &str) -> Option<Vec<u8>> {
        self.photos.lock().ok()?.get(entry_id).cloned()
    }

    pub fn entry(&self, entry_id: &str) -> Option<EntrySnapshot> {
        self.entries.lock().ok()?.get(entry_id).cloned()
    }

    fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn upload_photo(&self, bytes: &[u8], entry_id: &str) -> SyncResult<String> {
        if self.is_offline() {
            return Err(SyncError::PhotoUploadFailed("remote is offline".to_string()));
        }
        self.photos
            .lock()
            .map_err(|e| SyncError::PhotoUploadFailed(e.to_string()))?
            .insert(entry_id.to_string(), bytes.to_vec());
        Ok(format!("memory://photos/{}.jpg", entry_id))
    }

    async fn save_entry(&self, snapshot: &EntrySnapshot) -> SyncResult<()> {
        if self.is_offline() {
            return Err(SyncError::EntrySaveFailed("remote is offline".to_string()));
        }
        self.entries
            .lock()
            .map_err(|e| SyncError::EntrySaveFailed(e.to_string()))?
            .insert(snapshot.id.clone(), snapshot.clone());
        Ok(())
    }

    async fn fetch_entries_changed_since(
        &self,
        since: DateTime<Utc>,
    ) -> SyncResult<Vec<EntrySnapshot>> {
        if self.is_offline() {
            return Err(SyncError::EntryFetchFailed("remote is offline".to_string()));
        }
        let entries = self
            .entries
            .lock()
            .map_err(|e| SyncError::EntryFetchFailed(e.to_string()))?;
        Ok(changed_since(entries.values().cloned().collect(), since))
    }

    async fn delete_entry(&self, entry_id: &str) -> SyncResult<()> {
        if self.is_offline() {
            return Err(SyncError::EntryDeleteFailed("remote is offline".to_string()));
        }
        self.entries
            .lock()
            .map_err(|e| SyncError::EntryDeleteFailed(e.to_string()))?
            .remove(entry_id);
        self.photos
            .lock()
            .map_err(|e| SyncError::EntryDeleteFailed(e.to_string()))?
            .remove(entry_id);
        Ok(())
    }
}

/// Remote backed by a directory: `photos/<id>.jpg` and `entries/<id>.json`.
///
/// Photo URLs are `file://` URLs into the photos folder.
pub struct FolderRemoteStore {
    root: PathBuf,
}

impl FolderRemoteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn photos_dir(&self) -> PathBuf {
        self.root.join("photos")
    }

    fn entries_dir(&self) -> PathBuf {
        self.root.join("entries")
    }

    /// Only uuid ids may become file names
    fn checked_id(entry_id: &str) -> Option<String> {
        entry_id.parse::<EntryId>().ok().map(|id| id.to_string())
    }
}

#[async_trait::async_trait]
impl RemoteStore for FolderRemoteStore {
    async fn upload_photo(&self, bytes: &[u8], entry_id: &str) -> SyncResult<String> {
        let id = Self::checked_id(entry_id)
            .ok_or_else(|| SyncError::PhotoUploadFailed(format!("bad entry id {:?}", entry_id)))?;
        let dir = self.photos_dir();
        std::fs::create_dir_all(&dir)
            .map_err(|e| SyncError::PhotoUploadFailed(format!("{}: {}", dir.display(), e)))?;

        let path = dir.join(format!("{}.jpg", id));
        std::fs::write(&path, bytes)
            .map_err(|e| SyncError::PhotoUploadFailed(format!("{}: {}", path.display(), e)))?;

        let absolute = std::path::absolute(&path).unwrap_or(path);
        Ok(format!("file://{}", absolute.display()))
    }

    async fn save_entry(&self, snapshot: &EntrySnapshot) -> SyncResult<()> {
        let id = Self::checked_id(&snapshot.id)
            .ok_or_else(|| SyncError::EntrySaveFailed(format!("bad entry id {:?}", snapshot.id)))?;
        let dir = self.entries_dir();
        std::fs::create_dir_all(&dir)
            .map_err(|e| SyncError::EntrySaveFailed(format!("{}: {}", dir.display(), e)))?;

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| SyncError::EntrySaveFailed(e.to_string()))?;
        let path = dir.join(format!("{}.json", id));
        std::fs::write(&path, json)
            .map_err(|e| SyncError::EntrySaveFailed(format!("{}: {}", path.display(), e)))
    }

    async fn fetch_entries_changed_since(
        &self,
        since: DateTime<Utc>,
    ) -> SyncResult<Vec<EntrySnapshot>> {
        let dir = self.entries_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let read_dir = std::fs::read_dir(&dir)
            .map_err(|e| SyncError::EntryFetchFailed(format!("{}: {}", dir.display(), e)))?;

        let mut snapshots = Vec::new();
        for dir_entry in read_dir.flatten() {
            let path = dir_entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let json = std::fs::read_to_string(&path)
                .map_err(|e| SyncError::EntryFetchFailed(format!("{}: {}", path.display(), e)))?;
            match serde_json::from_str::<EntrySnapshot>(&json) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => bevy::log::warn!("Skipping unreadable remote entry {:?}: {}", path, e),
            }
        }
        Ok(changed_since(snapshots, since))
    }

    async fn delete_entry(&self, entry_id: &str) -> SyncResult<()> {
        let id = Self::checked_id(entry_id)
            .ok_or_else(|| SyncError::EntryDeleteFailed(format!("bad entry id {:?}", entry_id)))?;
        let paths = [
            self.entries_dir().join(format!("{}.json", id)),
            self.photos_dir().join(format!("{}.jpg", id)),
        ];
        for path in paths {
            if path.exists() {
                std::fs::remove_file(&path).map_err(|e| {
                    SyncError::EntryDeleteFailed(format!("{}: {}", path.display(), e))
                })?;
            }
        }
        Ok(())
    }
}
