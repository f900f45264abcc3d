//! Freehand drawing strokes.

use bevy::prelude::*;

use crate::constants::DEFAULT_STROKE_WIDTH;

use super::ids::PathId;

/// One committed freehand stroke. Points are absolute frame coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingPath {
    pub id: PathId,
    pub points: Vec<Vec2>,
    pub color: Color,
    pub line_width: f32,
}

impl DrawingPath {
    /// Non-positive or non-finite widths fall back to the default stroke width.
    pub fn new(points: Vec<Vec2>, color: Color, line_width: f32) -> Self {
        let line_width = if line_width.is_finite() && line_width > 0.0 {
            line_width
        } else {
            DEFAULT_STROKE_WIDTH
        };
        Self {
            id: PathId::new(),
            points,
            color,
            line_width,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}
