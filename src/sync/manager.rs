//! Pushes local records to the remote store and pulls remote changes back.

use bevy::log::{debug, info, warn};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::error::SyncResult;
use super::local::LocalStore;
use super::record::DiaryRecord;
use super::remote::RemoteStore;

pub struct SyncManager {
    remote: Arc<dyn RemoteStore>,
    local: Arc<dyn LocalStore>,
}

impl SyncManager {
    pub fn new(remote: Arc<dyn RemoteStore>, local: Arc<dyn LocalStore>) -> Self {
        Self { remote, local }
    }

    pub fn local(&self) -> &Arc<dyn LocalStore> {
        &self.local
    }

    /// Upload one record (photo first, then the document).
    ///
    /// On failure the record is stored locally in the error state so the
    /// next attempt picks it up again.
    pub async fn sync_entry(&self, mut record: DiaryRecord) -> SyncResult<DiaryRecord> {
        if self.local.is_retired(record.id())? {
            debug!("Entry {} was retired, not uploading", record.id());
            return Ok(record);
        }
        record.mark_pending();
        match self.push(&mut record).await {
            Ok(()) => {
                if self.local.is_retired(record.id())? {
                    // Retired while the upload was running
                    self.remote.delete_entry(record.id()).await?;
                    return Ok(record);
                }
                record.mark_synced(Utc::now());
                self.local.save(&record)?;
                debug!("Synced entry {}", record.id());
                Ok(record)
            }
            Err(e) => {
                record.mark_failed();
                if let Err(save_err) = self.local.save(&record) {
                    warn!("Could not record sync failure for {}: {}", record.id(), save_err);
                }
                Err(e)
            }
        }
    }

    async fn push(&self, record: &mut DiaryRecord) -> SyncResult<()> {
        if record.needs_photo_upload()
            && let Some(photo) = record.photo.clone()
        {
            let url = self.remote.upload_photo(&photo, record.id()).await?;
            record.snapshot.photo_url = Some(url);
        }
        self.remote.save_entry(&record.snapshot).await
    }

    /// Forget an entry that was superseded (e.g. by a photo replacement).
    ///
    /// The local tombstone is written first so a failed remote delete is
    /// retried by the next pull instead of bringing the entry back.
    pub async fn retire_entry(&self, id: &str) -> SyncResult<()> {
        self.local.retire(id)?;
        self.remote.delete_entry(id).await?;
        debug!("Retired entry {} on remote", id);
        Ok(())
    }

    /// Fetch remote changes since `since` and store them locally.
    ///
    /// The remote copy wins over local edits. Photo bytes already held
    /// locally are kept since a photo never changes for a given id.
    /// Entries retired on this device are skipped and deleted remotely.
    pub async fn pull_changes(&self, since: DateTime<Utc>) -> SyncResult<Vec<DiaryRecord>> {
        let snapshots = self.remote.fetch_entries_changed_since(since).await?;
        let now = Utc::now();
        let mut pulled = Vec::with_capacity(snapshots.len());

        for snapshot in snapshots {
            match self.local.is_retired(&snapshot.id) {
                Ok(false) => {}
                Ok(true) => {
                    debug!("Remote still has retired entry {}", snapshot.id);
                    if let Err(e) = self.remote.delete_entry(&snapshot.id).await {
                        warn!("Could not delete retired entry {}: {}", snapshot.id, e);
                    }
                    continue;
                }
                Err(e) => {
                    warn!("Skipping remote entry {}: {}", snapshot.id, e);
                    continue;
                }
            }
            let existing = match self.local.fetch(&snapshot.id) {
                Ok(existing) => existing,
                Err(e) => {
                    warn!("Skipping remote entry {}: {}", snapshot.id, e);
                    continue;
                }
            };
            if let Some(local) = &existing
                && local.pending_changes
            {
                info!("Remote copy of entry {} replaces local edits", snapshot.id);
            }
            let photo = existing.and_then(|local| local.photo);
            let record = DiaryRecord::from_remote(snapshot, photo, now);
            self.local.save(&record)?;
            pulled.push(record);
        }

        if !pulled.is_empty() {
            info!("Pulled {} entries from remote", pulled.len());
        }
        Ok(pulled)
    }

    /// Every locally stored record, newest first
    pub fn load_local(&self) -> SyncResult<Vec<DiaryRecord>> {
        self.local.fetch_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Photo, PhotoEntry};
    use crate::session::EditSession;
    use crate::sync::error::SyncError;
    use crate::sync::local::InMemoryLocalStore;
    use crate::sync::record::SyncState;
    use crate::sync::remote::InMemoryRemoteStore;
    use futures_lite::future::block_on;

    fn setup() -> (Arc<InMemoryRemoteStore>, Arc<InMemoryLocalStore>, SyncManager) {
        let remote = Arc::new(InMemoryRemoteStore::default());
        let local = Arc::new(InMemoryLocalStore::default());
        let manager = SyncManager::new(remote.clone(), local.clone());
        (remote, local, manager)
    }

    fn record() -> DiaryRecord {
        let mut entry = PhotoEntry::new(Photo::from_bytes(vec![4, 2]));
        entry.diary_text = "first".to_string();
        DiaryRecord::from_entry(&entry, None, Utc::now())
    }

    #[test]
    fn test_sync_entry_uploads_photo_and_document() {
        let (remote, local, manager) = setup();
        let record = record();
        let id = record.id().to_string();

        let synced = block_on(manager.sync_entry(record)).unwrap();
        assert_eq!(synced.sync_state, SyncState::Synced);
        assert!(!synced.pending_changes);
        assert!(synced.snapshot.photo_url.is_some());

        assert_eq!(remote.photo(&id), Some(vec![4, 2]));
        assert_eq!(remote.entry(&id).unwrap().text, "first");
        assert_eq!(local.fetch(&id).unwrap().unwrap().sync_state, SyncState::Synced);
    }

    #[test]
    fn test_sync_failure_is_recorded_locally() {
        let (remote, local, manager) = setup();
        remote.set_offline(true);
        let record = record();
        let id = record.id().to_string();

        let err = block_on(manager.sync_entry(record)).unwrap_err();
        assert!(matches!(err, SyncError::PhotoUploadFailed(_)));

        let stored = local.fetch(&id).unwrap().unwrap();
        assert_eq!(stored.sync_state, SyncState::Error);
        assert!(stored.needs_upload());
    }

    #[test]
    fn test_pull_changes_remote_wins() {
        let (remote, local, manager) = setup();
        let record = record();
        let id = record.id().to_string();
        let synced = block_on(manager.sync_entry(record)).unwrap();

        // Local edit that was never pushed
        let mut local_edit = synced.clone();
        local_edit.snapshot.text = "local".to_string();
        local_edit.pending_changes = true;
        local.save(&local_edit).unwrap();

        // Another device pushes a newer version
        let mut remote_edit = synced.snapshot.clone();
        remote_edit.text = "remote".to_string();
        remote_edit.updated_at = Utc::now() + chrono::Duration::seconds(5);
        block_on(remote.save_entry(&remote_edit)).unwrap();

        let pulled = block_on(manager.pull_changes(synced.snapshot.updated_at)).unwrap();
        assert_eq!(pulled.len(), 1);

        let stored = local.fetch(&id).unwrap().unwrap();
        assert_eq!(stored.snapshot.text, "remote");
        assert!(!stored.pending_changes);
        assert_eq!(stored.photo.as_deref(), Some(&[4u8, 2][..]), "local photo bytes kept");
    }

    #[test]
    fn test_pull_changes_offline() {
        let (remote, _, manager) = setup();
        remote.set_offline(true);
        let result = block_on(manager.pull_changes(DateTime::<Utc>::MIN_UTC));
        assert!(matches!(result, Err(SyncError::EntryFetchFailed(_))));
    }

    fn session_record(session: &EditSession) -> DiaryRecord {
        DiaryRecord::from_entry(session.active_entry().unwrap(), None, Utc::now())
    }

    #[test]
    fn test_replaced_entry_is_not_pulled_back() {
        let (remote, local, manager) = setup();
        let mut session = EditSession::default();
        let old_id = session.add_entry(Photo::from_bytes(vec![1]));
        block_on(manager.sync_entry(session_record(&session))).unwrap();

        let new_id = session.replace_photo(Photo::from_bytes(vec![2])).unwrap();
        block_on(manager.retire_entry(&old_id.to_string())).unwrap();
        block_on(manager.sync_entry(session_record(&session))).unwrap();
        assert!(remote.entry(&old_id.to_string()).is_none());
        assert!(remote.photo(&old_id.to_string()).is_none());

        let pulled = block_on(manager.pull_changes(DateTime::<Utc>::MIN_UTC)).unwrap();
        let entries: Vec<_> = pulled.iter().map(|r| r.to_entry().unwrap()).collect();
        session.restore_entries(entries);
        assert_eq!(session.entry_count(), 1);
        assert!(session.entry(new_id).is_some());
        assert!(local.fetch(&old_id.to_string()).unwrap().is_none());
    }

    #[test]
    fn test_pull_deletes_entries_retired_while_offline() {
        let (remote, local, manager) = setup();
        let record = record();
        let id = record.id().to_string();
        block_on(manager.sync_entry(record)).unwrap();

        remote.set_offline(true);
        let err = block_on(manager.retire_entry(&id)).unwrap_err();
        assert!(matches!(err, SyncError::EntryDeleteFailed(_)));
        assert!(local.is_retired(&id).unwrap());

        remote.set_offline(false);
        let pulled = block_on(manager.pull_changes(DateTime::<Utc>::MIN_UTC)).unwrap();
        assert!(pulled.is_empty());
        assert!(local.fetch(&id).unwrap().is_none());
        assert!(remote.entry(&id).is_none());
    }

    #[test]
    fn test_retired_entry_is_not_uploaded() {
        let (remote, local, manager) = setup();
        let record = record();
        let id = record.id().to_string();
        local.retire(&id).unwrap();

        block_on(manager.sync_entry(record)).unwrap();
        assert!(remote.entry(&id).is_none());
        assert!(local.fetch(&id).unwrap().is_none());
    }
}
