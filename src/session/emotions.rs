use bevy::prelude::*;

use super::EditSession;

impl EditSession {
    /// Toggle an emotion on the active entry.
    ///
    /// Selecting a fourth emotion is ignored. Returns true when the selection
    /// changed. Not undoable.
    pub fn toggle_emotion(&mut self, name: &str) -> bool {
        if self.active.is_none() {
            return false;
        }
        if !self.catalog.toggle(name) {
            debug!("Emotion toggle ignored: {}", name);
            return false;
        }
        let names = self.catalog.selected_names();
        self.edit_active(false, |entry| {
            entry.set_emotions(names);
            Some(())
        });
        true
    }

    /// Toggle the emotion at a catalog position
    pub fn toggle_emotion_at(&mut self, index: usize) -> bool {
        let Some(name) = self.catalog.get(index).map(|e| e.name.clone()) else {
            return false;
        };
        self.toggle_emotion(&name)
    }
}
