use bevy::prelude::*;

use crate::constants::MIN_STROKE_POINT_DISTANCE;
use crate::model::{DrawingPath, PathId};

use super::EditSession;

impl EditSession {
    pub fn selected_color(&self) -> Color {
        self.selected_color
    }

    pub fn set_selected_color(&mut self, color: Color) {
        self.selected_color = color;
    }

    /// Advance to the next palette color. Returns the new color.
    pub fn cycle_color(&mut self) -> Color {
        self.selected_color = self.palette.next_after(self.selected_color);
        self.selected_color
    }

    /// Commit a finished stroke, recolored with the selected color. Undoable.
    pub fn add_drawing_path(&mut self, path: DrawingPath) -> Option<PathId> {
        let path = path.with_color(self.selected_color);
        let id = path.id;
        self.edit_active(true, |entry| {
            entry.drawing_paths.push(path);
            Some(())
        })?;
        debug!("Added drawing path {}", id);
        Some(id)
    }

    /// Stroke in progress, not yet part of the entry
    pub fn current_stroke(&self) -> Option<&DrawingPath> {
        self.current_stroke.as_ref()
    }

    /// Start a stroke. Requires drawing mode and an active entry.
    pub fn begin_stroke(&mut self, point: Vec2) -> bool {
        if !self.modes.is_drawing() || self.active.is_none() {
            return false;
        }
        self.current_stroke = Some(DrawingPath::new(
            vec![point],
            self.selected_color,
            self.settings.stroke_width,
        ));
        true
    }

    /// Append a point unless it is too close to the previous one
    pub fn extend_stroke(&mut self, point: Vec2) -> bool {
        let Some(stroke) = self.current_stroke.as_mut() else {
            return false;
        };
        if let Some(last) = stroke.points.last()
            && last.distance(point) < MIN_STROKE_POINT_DISTANCE
        {
            return false;
        }
        stroke.points.push(point);
        true
    }

    /// Commit the stroke in progress, if it has any points
    pub fn finish_stroke(&mut self) -> Option<PathId> {
        let stroke = self.current_stroke.take()?;
        if stroke.points.is_empty() {
            return None;
        }
        self.add_drawing_path(stroke)
    }

    pub fn cancel_stroke(&mut self) {
        self.current_stroke = None;
    }

    /// Enter or leave drawing mode. Leaving drops any unfinished stroke.
    pub fn set_drawing(&mut self, drawing: bool) {
        self.modes.set_drawing(drawing);
        if !drawing {
            self.current_stroke = None;
        }
    }

    pub fn toggle_drawing(&mut self) -> bool {
        let drawing = !self.modes.is_drawing();
        self.set_drawing(drawing);
        drawing
    }
}
