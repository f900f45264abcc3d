//! Autosave, push and pull systems and task polling.

use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, Task};
use chrono::{DateTime, Utc};
use futures_lite::future;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::config::DiaryConfig;
use crate::identity::AuthState;
use crate::model::EntryId;
use crate::session::{EditSession, EntryCommitted, EntryRetired};

use super::error::SyncResult;
use super::local::{JsonDirectoryStore, LocalStore};
use super::manager::SyncManager;
use super::record::DiaryRecord;
use super::remote::FolderRemoteStore;

/// Stores shared with background tasks
#[derive(Resource, Clone)]
pub struct SyncStores {
    pub local: Arc<dyn LocalStore>,
    /// `None` when no remote is configured
    pub manager: Option<Arc<SyncManager>>,
}

/// Sync progress and timers
#[derive(Resource)]
pub struct SyncStatus {
    /// Entries committed since the last autosave
    pub pending: HashSet<EntryId>,
    pub uploads_in_flight: usize,
    pub is_pulling: bool,
    /// Start time of the last successful pull
    pub last_pull: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    autosave_timer: Timer,
    pull_timer: Timer,
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self {
            pending: HashSet::new(),
            uploads_in_flight: 0,
            is_pulling: false,
            last_pull: None,
            last_error: None,
            autosave_timer: Timer::from_seconds(2.0, TimerMode::Repeating),
            pull_timer: Timer::from_seconds(60.0, TimerMode::Repeating),
        }
    }
}

/// Component for an entry upload
#[derive(Component)]
pub struct SyncEntryTask(pub Task<SyncResult<DiaryRecord>>);

/// Component for a remote delete of a retired entry
#[derive(Component)]
pub struct RetireEntryTask {
    pub entry_id: EntryId,
    pub task: Task<SyncResult<()>>,
}

/// Component for a pull of remote changes
#[derive(Component)]
pub struct PullChangesTask {
    pub started_at: DateTime<Utc>,
    pub task: Task<SyncResult<Vec<DiaryRecord>>>,
}

/// Startup system building the stores from config
pub fn setup_sync_stores(
    mut commands: Commands,
    config: Res<DiaryConfig>,
    mut status: ResMut<SyncStatus>,
) {
    let local: Arc<dyn LocalStore> = Arc::new(JsonDirectoryStore::new(crate::paths::entries_dir()));
    let manager = config.data.remote_dir.as_ref().map(|dir| {
        info!("Syncing with remote folder {:?}", dir);
        Arc::new(SyncManager::new(
            Arc::new(FolderRemoteStore::new(dir)),
            local.clone(),
        ))
    });
    if manager.is_none() {
        info!("No remote configured, entries are kept on this device only");
    }

    status.autosave_timer = Timer::new(
        Duration::from_secs(config.data.autosave_interval_secs.max(1)),
        TimerMode::Repeating,
    );
    status.pull_timer = Timer::new(
        Duration::from_secs(config.data.pull_interval_secs.max(1)),
        TimerMode::Repeating,
    );
    commands.insert_resource(SyncStores { local, manager });
}

/// Startup system restoring locally stored entries into the session
pub fn load_local_entries(stores: Res<SyncStores>, mut session: ResMut<EditSession>) {
    let records = match stores.local.fetch_all() {
        Ok(records) => records,
        Err(e) => {
            error!("Failed to load local entries: {}", e);
            return;
        }
    };

    let entries: Vec<_> = records
        .iter()
        .filter_map(|record| match record.to_entry() {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping stored entry {}: {}", record.id(), e);
                None
            }
        })
        .collect();
    let count = session.restore_entries(entries);
    info!("Loaded {} entries from {:?}", count, crate::paths::entries_dir());
}

/// Queues committed entries for autosave and retires superseded ones.
///
/// Retired ids are tombstoned locally right away; the remote delete runs
/// as a task when signed in, otherwise the next pull cleans up.
pub fn track_committed_entries(
    mut commands: Commands,
    mut committed: MessageReader<EntryCommitted>,
    mut retired: MessageReader<EntryRetired>,
    mut status: ResMut<SyncStatus>,
    stores: Res<SyncStores>,
    auth: Res<AuthState>,
) {
    for message in committed.read() {
        status.pending.insert(message.entry_id);
    }
    for message in retired.read() {
        let entry_id = message.entry_id;
        status.pending.remove(&entry_id);
        let key = entry_id.to_string();
        if let Err(e) = stores.local.retire(&key) {
            warn!("Could not retire entry {}: {}", entry_id, e);
        }

        let Some(manager) = stores.manager.clone() else {
            continue;
        };
        if !auth.is_authenticated() {
            continue;
        }
        let task = IoTaskPool::get().spawn(async move { manager.retire_entry(&key).await });
        commands.spawn(RetireEntryTask { entry_id, task });
    }
}

/// Polls remote deletes of retired entries
pub fn poll_retire_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut RetireEntryTask)>,
    mut status: ResMut<SyncStatus>,
) {
    for (entity, mut retire) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut retire.task)) {
            match result {
                Ok(()) => debug!("Entry {} removed from remote", retire.entry_id),
                Err(e) => {
                    warn!("Remote delete of entry {} failed: {}", retire.entry_id, e);
                    status.last_error = Some(e.to_string());
                }
            }
            commands.entity(entity).despawn();
        }
    }
}

/// Writes pending entries locally and starts uploads on the autosave timer
pub fn autosave_entries(
    mut commands: Commands,
    time: Res<Time>,
    mut status: ResMut<SyncStatus>,
    stores: Res<SyncStores>,
    session: Res<EditSession>,
    auth: Res<AuthState>,
) {
    status.autosave_timer.tick(time.delta());
    if !status.autosave_timer.just_finished() || status.pending.is_empty() {
        return;
    }

    let now = Utc::now();
    let pending: Vec<EntryId> = status.pending.drain().collect();
    for id in pending {
        let Some(entry) = session.entry(id) else {
            continue;
        };
        let key = id.to_string();
        let previous = stores.local.fetch(&key).ok().flatten();
        let record = DiaryRecord::from_entry(entry, previous.as_ref(), now);

        if let Err(e) = stores.local.save(&record) {
            error!("Failed to save entry {}: {}", id, e);
            status.last_error = Some(e.to_string());
            continue;
        }

        let Some(manager) = stores.manager.clone() else {
            continue;
        };
        if !auth.is_authenticated() {
            debug!("Not signed in, entry {} stays local", id);
            continue;
        }
        let task = IoTaskPool::get().spawn(async move { manager.sync_entry(record).await });
        status.uploads_in_flight += 1;
        commands.spawn(SyncEntryTask(task));
    }
}

/// Polls upload tasks and handles completion
pub fn poll_sync_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut SyncEntryTask)>,
    mut status: ResMut<SyncStatus>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            status.uploads_in_flight = status.uploads_in_flight.saturating_sub(1);
            match result {
                Ok(record) => {
                    info!("Entry {} synced", record.id());
                    status.last_error = None;
                }
                Err(e) => {
                    error!("Entry sync failed: {}", e);
                    status.last_error = Some(e.to_string());
                }
            }
            commands.entity(entity).despawn();
        }
    }
}

/// Starts a pull of remote changes on the pull timer. One pull at a time.
pub fn pull_remote_changes(
    mut commands: Commands,
    time: Res<Time>,
    mut status: ResMut<SyncStatus>,
    stores: Res<SyncStores>,
    auth: Res<AuthState>,
) {
    status.pull_timer.tick(time.delta());
    if !status.pull_timer.just_finished() {
        return;
    }
    let Some(manager) = stores.manager.clone() else {
        return;
    };
    if !auth.is_authenticated() {
        return;
    }
    if status.is_pulling {
        warn!("Pull already in progress");
        return;
    }

    let since = status.last_pull.unwrap_or(DateTime::<Utc>::MIN_UTC);
    let started_at = Utc::now();
    let task = IoTaskPool::get().spawn(async move { manager.pull_changes(since).await });
    status.is_pulling = true;
    commands.spawn(PullChangesTask { started_at, task });
}

/// Polls pull tasks and restores pulled entries into the session
pub fn poll_pull_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut PullChangesTask)>,
    mut status: ResMut<SyncStatus>,
    mut session: ResMut<EditSession>,
) {
    for (entity, mut pull) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut pull.task)) {
            status.is_pulling = false;
            match result {
                Ok(records) => {
                    status.last_pull = Some(pull.started_at);
                    let entries: Vec<_> = records
                        .iter()
                        .filter_map(|record| record.to_entry().ok())
                        .collect();
                    if !entries.is_empty() {
                        session.restore_entries(entries);
                    }
                }
                Err(e) => {
                    error!("Pulling remote changes failed: {}", e);
                    status.last_error = Some(e.to_string());
                }
            }
            commands.entity(entity).despawn();
        }
    }
}
