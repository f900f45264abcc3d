//! Normalized RGBA conversion helpers and the drawing palette.

use bevy::prelude::*;

/// Flatten a color into `[red, green, blue, opacity]`, each in `0.0..=1.0`.
pub fn color_to_array(color: Color) -> [f32; 4] {
    let srgba = color.to_srgba();
    [srgba.red, srgba.green, srgba.blue, srgba.alpha]
}

/// Build a color from `[red, green, blue, opacity]`.
///
/// Channels outside `0.0..=1.0` are clamped; NaN channels become 0.
pub fn array_to_color(arr: [f32; 4]) -> Color {
    let channel = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
    Color::srgba(
        channel(arr[0]),
        channel(arr[1]),
        channel(arr[2]),
        channel(arr[3]),
    )
}

/// Ordered set of colors offered for strokes and text.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    colors: Vec<Color>,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::new(vec![
            Color::WHITE,
            Color::BLACK,
            Color::srgb(0.0, 0.48, 1.0),
            Color::srgb(0.2, 0.78, 0.35),
            Color::srgb(1.0, 0.23, 0.19),
            Color::srgb(0.69, 0.32, 0.87),
            // Lighter pink
            Color::srgb(1.0, 0.7, 0.9),
            Color::srgb(1.0, 0.8, 0.0),
            Color::srgb(1.0, 0.58, 0.0),
        ])
    }
}

impl ColorPalette {
    /// Build a palette. An empty list falls back to white only.
    pub fn new(colors: Vec<Color>) -> Self {
        if colors.is_empty() {
            return Self {
                colors: vec![Color::WHITE],
            };
        }
        Self { colors }
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn first(&self) -> Color {
        self.colors[0]
    }

    /// The palette color after `current`, wrapping around.
    /// Colors not in the palette cycle back to the first entry.
    pub fn next_after(&self, current: Color) -> Color {
        match self.colors.iter().position(|c| *c == current) {
            Some(idx) => self.colors[(idx + 1) % self.colors.len()],
            None => self.first(),
        }
    }
}
