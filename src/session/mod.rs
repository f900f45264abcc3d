//! The edit session: owner of every photo entry and of the editing state
//! around the active one.
//!
//! All mutations are synchronous and go through [`EditSession::apply_updated_entry`],
//! so the entry list and the active entry can never diverge. Discrete edits
//! (add/delete/duplicate overlay, style change, committed stroke) push an undo
//! checkpoint first; continuous edits (typing, dragging, resizing) do not.
//!
//! ## Module Structure
//!
//! - [`undo`] - Checkpoints and the per-entry undo stack
//! - [`modes`] - Drawing/typing/picker/diary flags
//! - `entries` - Entry creation, photo replacement, navigation
//! - `overlays` - Text overlay operations and positioning
//! - `drawing` - Strokes and color selection
//! - `emotions` - Emotion tagging

mod drawing;
mod emotions;
mod entries;
pub mod modes;
mod overlays;
pub mod undo;

#[cfg(test)]
mod tests;

use bevy::prelude::*;
use std::collections::HashMap;

use crate::config::{ConfigLoaded, DiaryConfig};
use crate::constants::{DEFAULT_STROKE_WIDTH, OVERLAY_WIDTH_MARGIN};
use crate::emotion::EmotionCatalog;
use crate::model::{ColorPalette, DrawingPath, EntryId, OverlayId, PhotoEntry};

pub use modes::InteractionModes;
pub use undo::{UndoCheckpoint, UndoStack};

/// Tunables handed to the session, usually derived from the config file
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Width of the view hosting the photo; bounds overlay widths
    pub container_width: f32,
    pub stroke_width: f32,
    pub max_undo_depth: Option<usize>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            container_width: 390.0,
            stroke_width: DEFAULT_STROKE_WIDTH,
            max_undo_depth: None,
        }
    }
}

/// Change notification produced by a committed mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    /// The entry was created or its content changed
    Committed(EntryId),
    /// The entry was superseded (photo replaced) and no longer exists
    Retired(EntryId),
}

#[derive(Resource)]
pub struct EditSession {
    entries: HashMap<EntryId, PhotoEntry>,
    /// Entry ids in insertion order
    order: Vec<EntryId>,
    active: Option<EntryId>,
    history: HashMap<EntryId, UndoStack>,
    /// Relative positions last reported for overlays while dragging
    drag_positions: HashMap<OverlayId, Vec2>,
    catalog: EmotionCatalog,
    palette: ColorPalette,
    selected_color: Color,
    /// Stroke being drawn; not part of any entry until finished
    current_stroke: Option<DrawingPath>,
    modes: InteractionModes,
    settings: SessionSettings,
    changes: Vec<SessionChange>,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(
            EmotionCatalog::default(),
            ColorPalette::default(),
            SessionSettings::default(),
        )
    }
}

impl EditSession {
    pub fn new(catalog: EmotionCatalog, palette: ColorPalette, settings: SessionSettings) -> Self {
        let selected_color = palette.first();
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            active: None,
            history: HashMap::new(),
            drag_positions: HashMap::new(),
            catalog,
            palette,
            selected_color,
            current_stroke: None,
            modes: InteractionModes::default(),
            settings,
            changes: Vec::new(),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn apply_settings(&mut self, settings: SessionSettings) {
        for stack in self.history.values_mut() {
            stack.set_limit(settings.max_undo_depth);
        }
        self.settings = settings;
    }

    /// Upper bound for overlay widths
    pub fn max_overlay_width(&self) -> f32 {
        self.settings.container_width - OVERLAY_WIDTH_MARGIN
    }

    pub fn active_entry(&self) -> Option<&PhotoEntry> {
        self.active.and_then(|id| self.entries.get(&id))
    }

    pub fn active_entry_id(&self) -> Option<EntryId> {
        self.active
    }

    pub fn entry(&self, id: EntryId) -> Option<&PhotoEntry> {
        self.entries.get(&id)
    }

    /// Entries in insertion order
    pub fn entries(&self) -> impl Iterator<Item = &PhotoEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn entry_count(&self) -> usize {
        self.order.len()
    }

    pub fn catalog(&self) -> &EmotionCatalog {
        &self.catalog
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    pub fn modes(&self) -> &InteractionModes {
        &self.modes
    }

    pub fn modes_mut(&mut self) -> &mut InteractionModes {
        &mut self.modes
    }

    /// Cached drag position of an overlay, relative to the frame
    pub fn drag_position(&self, id: OverlayId) -> Option<Vec2> {
        self.drag_positions.get(&id).copied()
    }

    /// Replace the stored entry with the same id.
    ///
    /// When it is the active entry, overlays without a cached drag position
    /// get one seeded from their stored position. Unknown ids are ignored.
    pub fn apply_updated_entry(&mut self, entry: PhotoEntry) -> Option<&PhotoEntry> {
        let id = entry.id();
        let Some(slot) = self.entries.get_mut(&id) else {
            debug!("Ignoring update for unknown entry {}", id);
            return None;
        };
        *slot = entry;

        if self.active == Some(id) {
            for overlay in &slot.text_overlays {
                self.drag_positions
                    .entry(overlay.id)
                    .or_insert(overlay.position);
            }
        }

        self.push_change(SessionChange::Committed(id));
        self.entries.get(&id)
    }

    /// True when the active entry has overlays or drawing paths
    pub fn has_edits(&self) -> bool {
        self.active_entry().is_some_and(PhotoEntry::has_edits)
    }

    pub fn can_undo(&self) -> bool {
        self.undo_depth() > 0
    }

    /// Number of checkpoints recorded for the active entry
    pub fn undo_depth(&self) -> usize {
        self.active
            .and_then(|id| self.history.get(&id))
            .map_or(0, UndoStack::depth)
    }

    /// Restore the active entry's overlays and paths from the latest checkpoint.
    ///
    /// Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(id) = self.active else {
            return false;
        };
        let Some(checkpoint) = self.history.get_mut(&id).and_then(UndoStack::pop) else {
            debug!("Nothing to undo for entry {}", id);
            return false;
        };
        let Some(mut entry) = self.entries.get(&id).cloned() else {
            return false;
        };
        checkpoint.restore(&mut entry);

        let positions: HashMap<OverlayId, Vec2> = entry
            .text_overlays
            .iter()
            .map(|overlay| {
                let cached = self.drag_positions.get(&overlay.id).copied();
                (overlay.id, cached.unwrap_or(overlay.position))
            })
            .collect();
        self.drag_positions = positions;

        if let Some(selected) = self.modes.active_overlay()
            && entry.overlay(selected).is_none()
        {
            self.modes.forget_overlay(selected);
        }

        self.apply_updated_entry(entry);
        debug!("Undo on entry {} ({} left)", id, self.undo_depth());
        true
    }

    /// Take every change recorded since the last call
    pub fn drain_changes(&mut self) -> Vec<SessionChange> {
        std::mem::take(&mut self.changes)
    }

    fn push_change(&mut self, change: SessionChange) {
        if !self.changes.contains(&change) {
            self.changes.push(change);
        }
    }

    fn record_checkpoint(&mut self, id: EntryId, checkpoint: UndoCheckpoint) {
        let limit = self.settings.max_undo_depth;
        self.history
            .entry(id)
            .or_insert_with(|| UndoStack::with_limit(limit))
            .push(checkpoint);
    }

    /// Run `edit` on a copy of the active entry and commit it.
    ///
    /// With `checkpoint`, the pre-edit state is pushed on the undo stack.
    /// Nothing is recorded or committed when `edit` returns `None`.
    fn edit_active<R>(
        &mut self,
        checkpoint: bool,
        edit: impl FnOnce(&mut PhotoEntry) -> Option<R>,
    ) -> Option<R> {
        let mut entry = self.active_entry()?.clone();
        let before = checkpoint.then(|| UndoCheckpoint::capture(&entry));
        let result = edit(&mut entry)?;
        if let Some(before) = before {
            self.record_checkpoint(entry.id(), before);
        }
        self.apply_updated_entry(entry);
        Some(result)
    }
}

/// Emitted whenever an entry is created or its content is committed
#[derive(Message, Debug, Clone, Copy)]
pub struct EntryCommitted {
    pub entry_id: EntryId,
}

/// Emitted when an entry is superseded by a photo replacement
#[derive(Message, Debug, Clone, Copy)]
pub struct EntryRetired {
    pub entry_id: EntryId,
}

/// Startup system applying the loaded config to the session
fn configure_session(config: Res<DiaryConfig>, mut session: ResMut<EditSession>) {
    session.apply_settings(config.session_settings());
}

/// Turns recorded session changes into messages
fn publish_session_changes(
    mut session: ResMut<EditSession>,
    mut committed: MessageWriter<EntryCommitted>,
    mut retired: MessageWriter<EntryRetired>,
) {
    if session.changes.is_empty() {
        return;
    }
    for change in session.drain_changes() {
        match change {
            SessionChange::Committed(entry_id) => {
                committed.write(EntryCommitted { entry_id });
            }
            SessionChange::Retired(entry_id) => {
                retired.write(EntryRetired { entry_id });
            }
        }
    }
}

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EditSession>()
            .add_message::<EntryCommitted>()
            .add_message::<EntryRetired>()
            .add_systems(Startup, configure_session.after(ConfigLoaded))
            .add_systems(PostUpdate, publish_session_changes);
    }
}
