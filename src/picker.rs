//! Native photo picking.
//!
//! Picks run as async tasks. Each request bumps a generation counter and a
//! finished pick is applied only if no newer request was made meanwhile.

use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use futures_lite::future;

use crate::model::Photo;
use crate::session::EditSession;

const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickMode {
    /// Start a new entry with the photo
    New,
    /// Swap the photo of the active entry
    Replace,
}

/// Message to open the photo picker
#[derive(Message, Debug, Clone, Copy)]
pub struct PickPhotoRequest {
    pub mode: PickMode,
}

/// Outcome of a finished pick
pub struct PickedPhoto {
    pub generation: u64,
    pub mode: PickMode,
    /// `None` when the dialog was cancelled
    pub result: Option<Result<Vec<u8>, String>>,
}

#[derive(Resource, Default)]
pub struct PhotoPickerState {
    /// Latest issued request
    pub generation: u64,
    pub last_error: Option<String>,
}

impl PhotoPickerState {
    /// Issue a new generation, superseding earlier picks
    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }
}

/// Component for a pending pick
#[derive(Component)]
pub struct PickPhotoTask(pub Task<PickedPhoto>);

fn start_photo_picks(
    mut commands: Commands,
    mut requests: MessageReader<PickPhotoRequest>,
    mut picker: ResMut<PhotoPickerState>,
) {
    for request in requests.read() {
        let generation = picker.next_generation();
        let mode = request.mode;
        let task = AsyncComputeTaskPool::get().spawn(async move {
            let title = match mode {
                PickMode::New => "Choose a Photo",
                PickMode::Replace => "Replace Photo",
            };
            let handle = rfd::AsyncFileDialog::new()
                .set_title(title)
                .add_filter("Photos", PHOTO_EXTENSIONS)
                .pick_file()
                .await;
            let result = match handle {
                Some(handle) => {
                    let path = handle.path().to_path_buf();
                    Some(
                        std::fs::read(&path)
                            .map_err(|e| format!("Failed to read {}: {}", path.display(), e)),
                    )
                }
                None => None,
            };
            PickedPhoto {
                generation,
                mode,
                result,
            }
        });
        commands.spawn(PickPhotoTask(task));
    }
}

/// Apply a finished pick to the session. Stale picks are dropped.
pub fn apply_picked_photo(
    picked: PickedPhoto,
    picker: &mut PhotoPickerState,
    session: &mut EditSession,
) -> bool {
    if !picker.is_current(picked.generation) {
        debug!(
            "Discarding stale photo pick {} (latest is {})",
            picked.generation, picker.generation
        );
        return false;
    }
    let bytes = match picked.result {
        None => return false,
        Some(Err(e)) => {
            error!("{}", e);
            picker.last_error = Some(e);
            return false;
        }
        Some(Ok(bytes)) => bytes,
    };
    if bytes.is_empty() {
        warn!("Picked photo is empty");
        picker.last_error = Some("The picked file is empty".to_string());
        return false;
    }

    picker.last_error = None;
    let photo = Photo::from_bytes(bytes);
    match picked.mode {
        PickMode::New => {
            session.add_entry(photo);
            true
        }
        PickMode::Replace => session.replace_photo(photo).is_some(),
    }
}

fn poll_photo_picks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut PickPhotoTask)>,
    mut picker: ResMut<PhotoPickerState>,
    mut session: ResMut<EditSession>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(picked) = future::block_on(future::poll_once(&mut task.0)) {
            apply_picked_photo(picked, &mut picker, &mut session);
            commands.entity(entity).despawn();
        }
    }
}

pub struct PhotoPickerPlugin;

impl Plugin for PhotoPickerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PhotoPickerState>()
            .add_message::<PickPhotoRequest>()
            .add_systems(
                Update,
                (
                    start_photo_picks.run_if(on_message::<PickPhotoRequest>),
                    poll_photo_picks,
                ),
            );
    }
}
