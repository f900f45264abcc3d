use bevy::prelude::*;

use crate::constants::{MAX_FONT_SIZE, MIN_FONT_SIZE, PLACEHOLDER_TEXT};
use crate::geometry::{clamp_center_to_frame, to_absolute, to_relative};
use crate::model::{OverlayId, OverlayPatch, StylePatch, TextOverlay, clamp_overlay_width};

use super::EditSession;

const FRAME_CENTER: Vec2 = Vec2::new(0.5, 0.5);

impl EditSession {
    /// Append a placeholder overlay at the frame center. Undoable.
    pub fn add_text_overlay(&mut self) -> Option<OverlayId> {
        let overlay = TextOverlay::new(PLACEHOLDER_TEXT, FRAME_CENTER);
        let id = overlay.id;
        self.edit_active(true, |entry| {
            entry.text_overlays.push(overlay);
            Some(())
        })?;
        self.drag_positions.insert(id, FRAME_CENTER);
        debug!("Added text overlay {}", id);
        Some(id)
    }

    /// Overwrite the fields present in `patch`. Not undoable.
    pub fn update_text_overlay(&mut self, id: OverlayId, patch: OverlayPatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        let position = patch.position;
        let max_width = self.max_overlay_width();
        let updated = self
            .edit_active(false, |entry| {
                entry.overlay_mut(id)?.apply_patch(patch, max_width);
                Some(())
            })
            .is_some();
        if updated && let Some(position) = position {
            self.drag_positions.insert(id, position);
        }
        updated
    }

    /// Discrete style change. Pushes a checkpoint first.
    pub fn update_text_overlay_style(&mut self, id: OverlayId, patch: StylePatch) -> bool {
        let updated = self
            .edit_active(true, |entry| {
                entry.overlay_mut(id)?.apply_style(patch);
                Some(())
            })
            .is_some();
        if updated {
            debug!("Restyled overlay {}", id);
        }
        updated
    }

    /// Resize an overlay, clamped to `[MIN_OVERLAY_WIDTH, container_width - margin]`.
    pub fn update_text_overlay_width(&mut self, id: OverlayId, width: f32) -> bool {
        if !width.is_finite() {
            return false;
        }
        let width = clamp_overlay_width(width, self.max_overlay_width());
        self.edit_active(false, |entry| {
            entry.overlay_mut(id)?.width = width;
            Some(())
        })
        .is_some()
    }

    pub fn delete_text_overlay(&mut self, id: OverlayId) -> bool {
        let deleted = self
            .edit_active(true, |entry| {
                let index = entry.text_overlays.iter().position(|o| o.id == id)?;
                entry.text_overlays.remove(index);
                Some(())
            })
            .is_some();
        if deleted {
            self.drag_positions.remove(&id);
            self.modes.forget_overlay(id);
            debug!("Deleted overlay {}", id);
        }
        deleted
    }

    /// Copy an overlay next to the original. Returns the copy's id.
    pub fn duplicate_text_overlay(&mut self, id: OverlayId) -> Option<OverlayId> {
        let copy = self.edit_active(true, |entry| {
            let copy = entry.overlay(id)?.duplicate();
            entry.text_overlays.push(copy.clone());
            Some(copy)
        })?;
        self.drag_positions.insert(copy.id, copy.position);
        debug!("Duplicated overlay {} as {}", id, copy.id);
        Some(copy.id)
    }

    /// Store an absolute point as the overlay's relative position.
    ///
    /// No-op on a degenerate frame.
    pub fn update_position(&mut self, absolute: Vec2, id: OverlayId, frame: Rect) -> bool {
        let Some(relative) = to_relative(absolute, frame) else {
            debug!("Ignoring position update on degenerate frame {:?}", frame);
            return false;
        };
        self.update_text_overlay(id, OverlayPatch::default().position(relative))
    }

    /// Move an overlay to a proposed absolute center, keeping its box
    /// (overlay width × `text_height`) inside `frame`.
    pub fn drag_overlay(&mut self, id: OverlayId, proposed: Vec2, text_height: f32, frame: Rect) -> bool {
        let Some(width) = self.active_entry().and_then(|e| e.overlay(id)).map(|o| o.width) else {
            return false;
        };
        let clamped = clamp_center_to_frame(proposed, Vec2::new(width, text_height), frame);
        self.update_position(clamped, id, frame)
    }

    /// Absolute position to draw an overlay at: the drag cache first, then the
    /// stored position, then the frame center.
    pub fn overlay_display_position(&self, id: OverlayId, frame: Rect) -> Vec2 {
        let relative = self
            .drag_positions
            .get(&id)
            .copied()
            .or_else(|| self.active_entry().and_then(|e| e.overlay(id)).map(|o| o.position))
            .unwrap_or(FRAME_CENTER);
        to_absolute(relative, frame)
    }

    /// Step the font size within `[MIN_FONT_SIZE, MAX_FONT_SIZE]`. Undoable.
    pub fn step_font_size(&mut self, id: OverlayId, delta: f32) -> bool {
        let Some(current) = self
            .active_entry()
            .and_then(|e| e.overlay(id))
            .map(|o| o.style.font_size)
        else {
            return false;
        };
        let size = (current + delta).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        if size == current {
            return false;
        }
        self.update_text_overlay_style(id, StylePatch::default().font_size(size))
    }
}
