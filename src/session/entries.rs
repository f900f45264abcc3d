//! Entry lifecycle: creation, photo replacement, navigation and restoring
//! entries loaded from a store.

use bevy::prelude::*;

use crate::model::{EntryId, Photo, PhotoEntry};

use super::{EditSession, SessionChange};

impl EditSession {
    /// Create a new entry for `photo` and make it active.
    ///
    /// Emotion selection starts cleared. Not undoable.
    pub fn add_entry(&mut self, photo: Photo) -> EntryId {
        self.add_entry_with_diary(photo, None)
    }

    /// Like [`EditSession::add_entry`], copying diary title and text from
    /// `carry_diary_from` when that entry exists.
    pub fn add_entry_with_diary(&mut self, photo: Photo, carry_diary_from: Option<EntryId>) -> EntryId {
        self.catalog.clear_selection();

        let mut entry = PhotoEntry::new(photo);
        if let Some(source) = carry_diary_from.and_then(|id| self.entries.get(&id)) {
            entry.diary_title = source.diary_title.clone();
            entry.diary_text = source.diary_text.clone();
        }

        let id = entry.id();
        self.entries.insert(id, entry);
        self.order.push(id);
        self.activate(id);
        self.push_change(SessionChange::Committed(id));
        info!("Added entry {}", id);
        id
    }

    /// Swap the active entry's photo.
    ///
    /// The successor keeps overlays, paths, emotions and diary fields but gets
    /// a new id. It takes the old entry's place in the list and inherits its
    /// undo history. Returns the new id, or `None` without an active entry.
    pub fn replace_photo(&mut self, photo: Photo) -> Option<EntryId> {
        let old_id = self.active?;
        let successor = self.entries.get(&old_id)?.successor(photo);
        let new_id = successor.id();

        self.entries.remove(&old_id);
        self.entries.insert(new_id, successor);
        if let Some(slot) = self.order.iter_mut().find(|id| **id == old_id) {
            *slot = new_id;
        }
        if let Some(stack) = self.history.remove(&old_id) {
            self.history.insert(new_id, stack);
        }
        self.active = Some(new_id);

        self.push_change(SessionChange::Retired(old_id));
        self.push_change(SessionChange::Committed(new_id));
        info!("Replaced photo of entry {} (now {})", old_id, new_id);
        Some(new_id)
    }

    /// Make an existing entry active. Returns false for unknown ids.
    pub fn select_entry(&mut self, id: EntryId) -> bool {
        if !self.entries.contains_key(&id) {
            debug!("Cannot select unknown entry {}", id);
            return false;
        }
        if self.active != Some(id) {
            self.activate(id);
        }
        true
    }

    /// Insert entries loaded from a store.
    ///
    /// New ids are appended; known ids are replaced unless they are the
    /// active entry, which is never overwritten underneath the user.
    /// Replacing an entry drops its undo history, since those checkpoints
    /// describe the overwritten content.
    /// Returns how many entries were inserted or replaced.
    pub fn restore_entries(&mut self, entries: impl IntoIterator<Item = PhotoEntry>) -> usize {
        let mut restored = 0;
        for entry in entries {
            let id = entry.id();
            if self.active == Some(id) {
                debug!("Skipping restore of active entry {}", id);
                continue;
            }
            if self.entries.insert(id, entry).is_none() {
                self.order.push(id);
            } else {
                self.history.remove(&id);
            }
            restored += 1;
        }
        if restored > 0 {
            debug!("Restored {} entries", restored);
        }
        restored
    }

    pub fn set_diary_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        self.edit_active(false, |entry| {
            entry.diary_text = text;
            Some(())
        })
        .is_some()
    }

    pub fn set_diary_title(&mut self, title: impl Into<String>) -> bool {
        let title = title.into();
        self.edit_active(false, |entry| {
            entry.diary_title = title;
            Some(())
        })
        .is_some()
    }

    /// Switch the active entry, resetting transient per-entry state
    fn activate(&mut self, id: EntryId) {
        self.active = Some(id);
        self.current_stroke = None;
        self.modes.clear_overlay_selection();
        self.drag_positions.clear();

        if let Some(entry) = self.entries.get(&id) {
            self.catalog.load_selection(entry.emotions());
            for overlay in &entry.text_overlays {
                self.drag_positions.insert(overlay.id, overlay.position);
            }
        }
    }
}
