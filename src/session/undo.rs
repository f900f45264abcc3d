//! Per-entry undo checkpoints.
//!
//! A checkpoint is a deep copy of the undoable part of an entry (overlays and
//! drawing paths). Diary text, emotions and photo identity are never captured.

use crate::model::{DrawingPath, PhotoEntry, TextOverlay};

/// Snapshot of an entry's overlays and paths taken before a discrete edit
#[derive(Debug, Clone, PartialEq)]
pub struct UndoCheckpoint {
    text_overlays: Vec<TextOverlay>,
    drawing_paths: Vec<DrawingPath>,
}

impl UndoCheckpoint {
    pub fn capture(entry: &PhotoEntry) -> Self {
        Self {
            text_overlays: entry.text_overlays.clone(),
            drawing_paths: entry.drawing_paths.clone(),
        }
    }

    /// Overwrite exactly the captured fields of `entry`
    pub fn restore(self, entry: &mut PhotoEntry) {
        entry.text_overlays = self.text_overlays;
        entry.drawing_paths = self.drawing_paths;
    }

    pub fn text_overlays(&self) -> &[TextOverlay] {
        &self.text_overlays
    }

    pub fn drawing_paths(&self) -> &[DrawingPath] {
        &self.drawing_paths
    }
}

/// LIFO stack of checkpoints for one entry
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    /// Most recent last
    checkpoints: Vec<UndoCheckpoint>,
    /// Oldest checkpoints are dropped beyond this depth; `None` keeps all
    limit: Option<usize>,
}

impl UndoStack {
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            checkpoints: Vec::new(),
            limit,
        }
    }

    pub fn push(&mut self, checkpoint: UndoCheckpoint) {
        self.checkpoints.push(checkpoint);
        self.trim();
    }

    pub fn pop(&mut self) -> Option<UndoCheckpoint> {
        self.checkpoints.pop()
    }

    pub fn can_undo(&self) -> bool {
        !self.checkpoints.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
        self.trim();
    }

    pub fn clear(&mut self) {
        self.checkpoints.clear();
    }

    fn trim(&mut self) {
        if let Some(limit) = self.limit
            && self.checkpoints.len() > limit
        {
            let excess = self.checkpoints.len() - limit;
            self.checkpoints.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Photo;
    use bevy::prelude::*;

    fn entry_with_overlays(count: usize) -> PhotoEntry {
        let mut entry = PhotoEntry::new(Photo::from_bytes(vec![0]));
        for i in 0..count {
            entry
                .text_overlays
                .push(TextOverlay::new(format!("overlay {i}"), Vec2::splat(0.5)));
        }
        entry
    }

    #[test]
    fn test_undo_stack_push_pop() {
        let mut stack = UndoStack::default();
        assert!(!stack.can_undo());

        stack.push(UndoCheckpoint::capture(&entry_with_overlays(1)));
        assert!(stack.can_undo());
        assert_eq!(stack.depth(), 1);

        let checkpoint = stack.pop().unwrap();
        assert_eq!(checkpoint.text_overlays().len(), 1);
        assert!(stack.pop().is_none());
    }

    #[test]
    fn test_undo_stack_is_lifo() {
        let mut stack = UndoStack::default();
        for i in 0..3 {
            stack.push(UndoCheckpoint::capture(&entry_with_overlays(i)));
        }
        assert_eq!(stack.pop().unwrap().text_overlays().len(), 2);
        assert_eq!(stack.pop().unwrap().text_overlays().len(), 1);
        assert_eq!(stack.pop().unwrap().text_overlays().len(), 0);
    }

    #[test]
    fn test_undo_stack_limit_drops_oldest() {
        let mut stack = UndoStack::with_limit(Some(2));
        for i in 0..5 {
            stack.push(UndoCheckpoint::capture(&entry_with_overlays(i)));
        }
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.pop().unwrap().text_overlays().len(), 4);
        assert_eq!(stack.pop().unwrap().text_overlays().len(), 3);
    }

    #[test]
    fn test_lowering_limit_trims() {
        let mut stack = UndoStack::default();
        for i in 0..4 {
            stack.push(UndoCheckpoint::capture(&entry_with_overlays(i)));
        }
        stack.set_limit(Some(1));
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_restore_touches_only_captured_fields() {
        let mut entry = entry_with_overlays(1);
        let checkpoint = UndoCheckpoint::capture(&entry);

        entry.text_overlays.clear();
        entry.diary_text = "written later".to_string();
        entry.set_emotions(["Joy"]);

        checkpoint.restore(&mut entry);
        assert_eq!(entry.text_overlays.len(), 1);
        assert_eq!(entry.diary_text, "written later");
        assert_eq!(entry.emotions(), &["Joy"]);
    }
}
