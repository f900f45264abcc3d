//! Interaction mode flags and the rules tying them together.
//!
//! Rules enforced by every setter:
//! - entering drawing clears typing and the active overlay
//! - opening the emotion picker leaves drawing
//! - the diary cannot be toggled while the emotion picker is open
//! - drawing and typing are never on together

use crate::model::OverlayId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionModes {
    drawing: bool,
    typing: bool,
    active_overlay: Option<OverlayId>,
    emotion_picker: bool,
    diary: bool,
}

impl InteractionModes {
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn active_overlay(&self) -> Option<OverlayId> {
        self.active_overlay
    }

    pub fn is_showing_emotion_picker(&self) -> bool {
        self.emotion_picker
    }

    pub fn is_showing_diary(&self) -> bool {
        self.diary
    }

    pub fn set_drawing(&mut self, drawing: bool) {
        self.drawing = drawing;
        if drawing {
            self.typing = false;
            self.active_overlay = None;
        }
        self.enforce();
    }

    /// Returns the new drawing state
    pub fn toggle_drawing(&mut self) -> bool {
        self.set_drawing(!self.drawing);
        self.drawing
    }

    /// Select an overlay without typing into it. Leaves drawing mode.
    pub fn select_overlay(&mut self, id: OverlayId) {
        self.active_overlay = Some(id);
        self.typing = false;
        self.drawing = false;
        self.enforce();
    }

    pub fn begin_typing(&mut self, id: OverlayId) {
        self.active_overlay = Some(id);
        self.typing = true;
        self.drawing = false;
        self.enforce();
    }

    pub fn end_typing(&mut self) {
        self.typing = false;
        self.enforce();
    }

    pub fn clear_overlay_selection(&mut self) {
        self.active_overlay = None;
        self.typing = false;
        self.enforce();
    }

    /// Drop the selection if it points at `id`
    pub fn forget_overlay(&mut self, id: OverlayId) {
        if self.active_overlay == Some(id) {
            self.clear_overlay_selection();
        }
    }

    pub fn set_emotion_picker(&mut self, open: bool) {
        self.emotion_picker = open;
        if open {
            self.drawing = false;
        }
        self.enforce();
    }

    /// Returns the new picker state
    pub fn toggle_emotion_picker(&mut self) -> bool {
        self.set_emotion_picker(!self.emotion_picker);
        self.emotion_picker
    }

    /// Returns false (and changes nothing) while the emotion picker is open
    pub fn set_diary(&mut self, shown: bool) -> bool {
        if self.emotion_picker {
            return false;
        }
        self.diary = shown;
        self.enforce();
        true
    }

    /// Returns false (and changes nothing) while the emotion picker is open
    pub fn toggle_diary(&mut self) -> bool {
        self.set_diary(!self.diary)
    }

    /// Drop every flag back to idle
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_consistent(&self) -> bool {
        !(self.drawing && self.typing)
            && !(self.drawing && self.active_overlay.is_some())
            && (!self.typing || self.active_overlay.is_some())
    }

    fn enforce(&mut self) {
        if self.typing && self.active_overlay.is_none() {
            self.typing = false;
        }
        if self.drawing && (self.typing || self.active_overlay.is_some()) {
            self.typing = false;
            self.active_overlay = None;
        }
        debug_assert!(self.is_consistent());
    }
}
