//! Persistence and cloud sync collaborators.
//!
//! The edit session never talks to a store. Committed entries are picked up
//! from [`EntryCommitted`](crate::session::EntryCommitted) messages, written
//! to the local store on an autosave timer and pushed to the remote store
//! when one is configured and a user is signed in.
//!
//! ## Module Structure
//!
//! - [`error`] - `SyncError` and `SyncResult`
//! - [`wire`] - Remote document snapshots
//! - [`record`] - Local records with sync bookkeeping
//! - [`remote`] - `RemoteStore` trait, in-memory and folder backends
//! - [`local`] - `LocalStore` trait, in-memory and JSON directory backends
//! - [`manager`] - Push and pull logic
//! - `systems` - Bevy systems driving the above

pub mod error;
pub mod local;
pub mod manager;
pub mod record;
pub mod remote;
mod systems;
pub mod wire;

use bevy::prelude::*;

use crate::config::ConfigLoaded;

pub use error::{SyncError, SyncResult};
pub use local::{InMemoryLocalStore, JsonDirectoryStore, LocalStore};
pub use manager::SyncManager;
pub use record::{DiaryRecord, SyncState};
pub use remote::{FolderRemoteStore, InMemoryRemoteStore, RemoteStore};
pub use systems::{SyncStatus, SyncStores};
pub use wire::EntrySnapshot;

/// System set for the startup store setup (runs after config is loaded)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyncReady;

pub struct SyncPlugin;

impl Plugin for SyncPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SyncStatus>()
            .add_systems(
                Startup,
                (systems::setup_sync_stores, systems::load_local_entries)
                    .chain()
                    .in_set(SyncReady)
                    .after(ConfigLoaded),
            )
            .add_systems(
                Update,
                (
                    systems::track_committed_entries,
                    systems::autosave_entries,
                    systems::poll_sync_tasks,
                    systems::poll_retire_tasks,
                    systems::pull_remote_changes,
                    systems::poll_pull_tasks,
                )
                    .chain()
                    .run_if(resource_exists::<SyncStores>),
            );
    }
}
