//! On-device entry store.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use bevy::log::{debug, warn};

use crate::model::EntryId;

use super::error::{SyncError, SyncResult};
use super::record::DiaryRecord;

/// Local store trait. Calls are synchronous and cheap enough for task pools.
pub trait LocalStore: Send + Sync {
    /// Insert or overwrite the record with the same id.
    fn save(&self, record: &DiaryRecord) -> SyncResult<()>;

    /// Every record, newest entry date first.
    fn fetch_all(&self) -> SyncResult<Vec<DiaryRecord>>;

    fn fetch(&self, id: &str) -> SyncResult<Option<DiaryRecord>>;

    fn remove(&self, id: &str) -> SyncResult<()>;

    /// Remove the record and remember the id so pulls cannot bring it back.
    fn retire(&self, id: &str) -> SyncResult<()>;

    fn is_retired(&self, id: &str) -> SyncResult<bool>;
}

fn newest_first(mut records: Vec<DiaryRecord>) -> Vec<DiaryRecord> {
    records.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    records
}

fn lock_failed<E: std::fmt::Display>(e: E) -> SyncError {
    SyncError::LocalStoreFailed(e.to_string())
}

#[derive(Default)]
pub struct InMemoryLocalStore {
    records: Mutex<HashMap<String, DiaryRecord>>,
    retired: Mutex<HashSet<String>>,
}

impl LocalStore for InMemoryLocalStore {
    fn save(&self, record: &DiaryRecord) -> SyncResult<()> {
        self.records
            .lock()
            .map_err(lock_failed)?
            .insert(record.id().to_string(), record.clone());
        Ok(())
    }

    fn fetch_all(&self) -> SyncResult<Vec<DiaryRecord>> {
        let records = self.records.lock().map_err(lock_failed)?;
        Ok(newest_first(records.values().cloned().collect()))
    }

    fn fetch(&self, id: &str) -> SyncResult<Option<DiaryRecord>> {
        Ok(self.records.lock().map_err(lock_failed)?.get(id).cloned())
    }

    fn remove(&self, id: &str) -> SyncResult<()> {
        self.records.lock().map_err(lock_failed)?.remove(id);
        Ok(())
    }

    fn retire(&self, id: &str) -> SyncResult<()> {
        self.remove(id)?;
        self.retired.lock().map_err(lock_failed)?.insert(id.to_string());
        Ok(())
    }

    fn is_retired(&self, id: &str) -> SyncResult<bool> {
        Ok(self.retired.lock().map_err(lock_failed)?.contains(id))
    }
}

/// Records as `<id>.json` files with the photo in `<id>.photo` beside them.
/// Retired ids leave an empty `<id>.retired` marker.
pub struct JsonDirectoryStore {
    dir: PathBuf,
}

impl JsonDirectoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn paths(&self, id: &str) -> SyncResult<(PathBuf, PathBuf)> {
        let id: EntryId = id
            .parse()
            .map_err(|e| SyncError::InvalidSnapshot(format!("bad entry id {:?}: {}", id, e)))?;
        Ok((
            self.dir.join(format!("{}.json", id)),
            self.dir.join(format!("{}.photo", id)),
        ))
    }

    fn retired_marker(&self, id: &str) -> SyncResult<PathBuf> {
        let (json_path, _) = self.paths(id)?;
        Ok(json_path.with_extension("retired"))
    }

    fn read_record(&self, json_path: &Path, photo_path: &Path) -> SyncResult<DiaryRecord> {
        let json = std::fs::read_to_string(json_path)
            .map_err(|e| SyncError::LocalStoreFailed(format!("{}: {}", json_path.display(), e)))?;
        let mut record: DiaryRecord = serde_json::from_str(&json)
            .map_err(|e| SyncError::InvalidSnapshot(format!("{}: {}", json_path.display(), e)))?;
        if photo_path.exists() {
            let bytes = std::fs::read(photo_path).map_err(|e| {
                SyncError::LocalStoreFailed(format!("{}: {}", photo_path.display(), e))
            })?;
            record.photo = Some(Arc::from(bytes));
        }
        Ok(record)
    }
}

impl LocalStore for JsonDirectoryStore {
    fn save(&self, record: &DiaryRecord) -> SyncResult<()> {
        let (json_path, photo_path) = self.paths(record.id())?;
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| SyncError::LocalStoreFailed(format!("{}: {}", self.dir.display(), e)))?;

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| SyncError::LocalStoreFailed(e.to_string()))?;
        std::fs::write(&json_path, json)
            .map_err(|e| SyncError::LocalStoreFailed(format!("{}: {}", json_path.display(), e)))?;

        // Photos never change for a given id, so write them once
        if let Some(photo) = &record.photo
            && !photo_path.exists()
        {
            std::fs::write(&photo_path, photo).map_err(|e| {
                SyncError::LocalStoreFailed(format!("{}: {}", photo_path.display(), e))
            })?;
        }
        debug!("Saved entry {} to {:?}", record.id(), json_path);
        Ok(())
    }

    fn fetch_all(&self) -> SyncResult<Vec<DiaryRecord>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let read_dir = std::fs::read_dir(&self.dir)
            .map_err(|e| SyncError::LocalStoreFailed(format!("{}: {}", self.dir.display(), e)))?;

        let mut records = Vec::new();
        for dir_entry in read_dir.flatten() {
            let json_path = dir_entry.path();
            if json_path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let photo_path = json_path.with_extension("photo");
            match self.read_record(&json_path, &photo_path) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable entry file: {}", e),
            }
        }
        Ok(newest_first(records))
    }

    fn fetch(&self, id: &str) -> SyncResult<Option<DiaryRecord>> {
        let (json_path, photo_path) = self.paths(id)?;
        if !json_path.exists() {
            return Ok(None);
        }
        self.read_record(&json_path, &photo_path).map(Some)
    }

    fn remove(&self, id: &str) -> SyncResult<()> {
        let (json_path, photo_path) = self.paths(id)?;
        for path in [json_path, photo_path] {
            if path.exists() {
                std::fs::remove_file(&path).map_err(|e| {
                    SyncError::LocalStoreFailed(format!("{}: {}", path.display(), e))
                })?;
            }
        }
        Ok(())
    }

    fn retire(&self, id: &str) -> SyncResult<()> {
        let marker = self.retired_marker(id)?;
        self.remove(id)?;
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| SyncError::LocalStoreFailed(format!("{}: {}", self.dir.display(), e)))?;
        std::fs::write(&marker, b"")
            .map_err(|e| SyncError::LocalStoreFailed(format!("{}: {}", marker.display(), e)))?;
        debug!("Retired entry {}", id);
        Ok(())
    }

    fn is_retired(&self, id: &str) -> SyncResult<bool> {
        Ok(self.retired_marker(id)?.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Photo, PhotoEntry};
    use chrono::{TimeZone, Utc};

    fn record_dated(day: u32) -> DiaryRecord {
        let date = Utc.with_ymd_and_hms(2024, 11, day, 9, 0, 0).unwrap();
        let entry = PhotoEntry::restore(EntryId::new(), date, Photo::from_bytes(vec![day as u8]));
        DiaryRecord::from_entry(&entry, None, Utc::now())
    }

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("photo-diary-{}-{}", name, uuid::Uuid::new_v4()))
    }

    fn check_store(store: &dyn LocalStore) {
        let first = record_dated(1);
        let third = record_dated(3);
        let second = record_dated(2);
        for record in [&first, &third, &second] {
            store.save(record).unwrap();
        }

        let all = store.fetch_all().unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![third.id(), second.id(), first.id()]);

        let fetched = store.fetch(second.id()).unwrap().unwrap();
        assert_eq!(fetched, second);

        store.remove(second.id()).unwrap();
        assert!(store.fetch(second.id()).unwrap().is_none());
        assert_eq!(store.fetch_all().unwrap().len(), 2);
        assert!(!store.is_retired(second.id()).unwrap());

        store.retire(third.id()).unwrap();
        assert!(store.fetch(third.id()).unwrap().is_none());
        assert!(store.is_retired(third.id()).unwrap());
        assert!(!store.is_retired(first.id()).unwrap());
        let ids: Vec<_> = store.fetch_all().unwrap().iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, vec![first.id().to_string()]);
    }

    #[test]
    fn test_in_memory_store() {
        check_store(&InMemoryLocalStore::default());
    }

    #[test]
    fn test_json_directory_store() {
        let dir = temp_dir("local");
        check_store(&JsonDirectoryStore::new(&dir));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_json_directory_store_keeps_photo_bytes() {
        let dir = temp_dir("local-photo");
        let store = JsonDirectoryStore::new(&dir);
        let record = record_dated(5);
        store.save(&record).unwrap();

        let fetched = store.fetch(record.id()).unwrap().unwrap();
        assert_eq!(fetched.photo.as_deref(), Some(&[5u8][..]));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_json_directory_store_missing_dir_is_empty() {
        let store = JsonDirectoryStore::new(temp_dir("local-missing"));
        assert!(store.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn test_json_directory_store_rejects_bad_ids() {
        let store = JsonDirectoryStore::new(temp_dir("local-bad"));
        assert!(matches!(
            store.fetch("../../etc/passwd"),
            Err(SyncError::InvalidSnapshot(_))
        ));
    }
}
