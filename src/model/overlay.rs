//! Text overlay entity, its style and partial-update patches.

use bevy::prelude::*;

use crate::constants::{
    DEFAULT_FONT_SIZE, DEFAULT_OVERLAY_WIDTH, DUPLICATE_OFFSET, MAX_FONT_SIZE, MIN_FONT_SIZE,
    MIN_OVERLAY_WIDTH, TEXT_LINE_HEIGHT_FACTOR,
};

use super::ids::OverlayId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Regular,
    Bold,
    Italic,
}

impl FontStyle {
    /// Name used in stored snapshots
    pub fn name(&self) -> &'static str {
        match self {
            FontStyle::Regular => "regular",
            FontStyle::Bold => "bold",
            FontStyle::Italic => "italic",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "regular" => Some(FontStyle::Regular),
            "bold" => Some(FontStyle::Bold),
            "italic" => Some(FontStyle::Italic),
            _ => None,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            FontStyle::Regular => FontStyle::Bold,
            FontStyle::Bold => FontStyle::Italic,
            FontStyle::Italic => FontStyle::Regular,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontFamily {
    #[default]
    Arial,
    TimesNewRoman,
    /// Monospace
    Courier,
    /// Elegant cursive font
    SnellRoundhand,
}

impl FontFamily {
    pub fn all() -> &'static [FontFamily] {
        &[
            FontFamily::Arial,
            FontFamily::TimesNewRoman,
            FontFamily::Courier,
            FontFamily::SnellRoundhand,
        ]
    }

    /// Human readable family name, also used in stored snapshots
    pub fn display_name(&self) -> &'static str {
        match self {
            FontFamily::Arial => "Arial",
            FontFamily::TimesNewRoman => "Times New Roman",
            FontFamily::Courier => "Courier",
            FontFamily::SnellRoundhand => "SnellRoundhand",
        }
    }

    /// Font face name handed to the text renderer
    pub fn font_name(&self) -> &'static str {
        match self {
            FontFamily::Arial => "ArialMT",
            FontFamily::TimesNewRoman => "Times New Roman",
            FontFamily::Courier => "Courier",
            FontFamily::SnellRoundhand => "SnellRoundhand",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|family| family.display_name() == name || family.font_name() == name)
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub font_style: FontStyle,
    pub font_family: FontFamily,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            font_style: FontStyle::Regular,
            font_family: FontFamily::Arial,
        }
    }
}

/// Clamp an overlay width into `[MIN_OVERLAY_WIDTH, upper]`.
///
/// The floor wins when `upper` is below it.
pub fn clamp_overlay_width(width: f32, upper: f32) -> f32 {
    width.min(upper).max(MIN_OVERLAY_WIDTH)
}

/// Clamp a requested font size into `[MIN_FONT_SIZE, MAX_FONT_SIZE]`,
/// keeping `current` when the request is not a number.
fn clamp_font_size(size: f32, current: f32) -> f32 {
    if size.is_finite() {
        size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
    } else {
        current
    }
}

/// A styled, positioned text block drawn on top of a photo.
///
/// `position` is relative to the photo frame: both axes are fractions of the
/// frame size, `(0.5, 0.5)` being the center.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOverlay {
    pub id: OverlayId,
    pub text: String,
    pub position: Vec2,
    pub style: TextStyle,
    pub color: Color,
    pub width: f32,
}

impl TextOverlay {
    pub fn new(text: impl Into<String>, position: Vec2) -> Self {
        Self {
            id: OverlayId::new(),
            text: text.into(),
            position,
            style: TextStyle::default(),
            color: Color::WHITE,
            width: DEFAULT_OVERLAY_WIDTH,
        }
    }

    /// Copy with a fresh id, nudged by the duplication offset on both axes
    pub fn duplicate(&self) -> Self {
        Self {
            id: OverlayId::new(),
            position: self.position + Vec2::splat(DUPLICATE_OFFSET),
            ..self.clone()
        }
    }

    /// Estimated rendered height: one line per `\n`-separated line of text
    pub fn text_height(&self) -> f32 {
        let lines = self.text.lines().count().max(1) as f32;
        lines * self.style.font_size * TEXT_LINE_HEIGHT_FACTOR
    }

    /// Box used for hit testing and frame clamping
    pub fn box_size(&self) -> Vec2 {
        Vec2::new(self.width, self.text_height())
    }

    /// Overwrite only the fields present in `patch`
    pub(crate) fn apply_patch(&mut self, patch: OverlayPatch, max_width: f32) {
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(style) = patch.style {
            let font_size = clamp_font_size(style.font_size, self.style.font_size);
            self.style = TextStyle { font_size, ..style };
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(width) = patch.width {
            self.width = clamp_overlay_width(width, max_width);
        }
    }

    pub(crate) fn apply_style(&mut self, patch: StylePatch) {
        if let Some(size) = patch.font_size {
            self.style.font_size = clamp_font_size(size, self.style.font_size);
        }
        if let Some(font_style) = patch.font_style {
            self.style.font_style = font_style;
        }
        if let Some(family) = patch.font_family {
            self.style.font_family = family;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
    }
}

/// Partial update for continuous overlay edits (typing, dragging, resizing).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayPatch {
    pub text: Option<String>,
    pub position: Option<Vec2>,
    pub style: Option<TextStyle>,
    pub color: Option<Color>,
    pub width: Option<f32>,
}

impl OverlayPatch {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn position(mut self, position: Vec2) -> Self {
        self.position = Some(position);
        self
    }

    pub fn style(mut self, style: TextStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Partial update for discrete style changes. Applying one is undoable.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StylePatch {
    pub font_size: Option<f32>,
    pub font_style: Option<FontStyle>,
    pub font_family: Option<FontFamily>,
    pub color: Option<Color>,
}

impl StylePatch {
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn font_style(mut self, style: FontStyle) -> Self {
        self.font_style = Some(style);
        self
    }

    pub fn font_family(mut self, family: FontFamily) -> Self {
        self.font_family = Some(family);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_overlay_defaults() {
        let overlay = TextOverlay::new("hello", Vec2::new(0.5, 0.5));
        assert_eq!(overlay.width, DEFAULT_OVERLAY_WIDTH);
        assert_eq!(overlay.style, TextStyle::default());
        assert_eq!(overlay.color, Color::WHITE);
    }

    #[test]
    fn test_duplicate_gets_new_id_and_offset() {
        let original = TextOverlay::new("hello", Vec2::new(0.2, 0.3));
        let copy = original.duplicate();
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.text, original.text);
        assert!((copy.position.x - 0.25).abs() < 1e-6);
        assert!((copy.position.y - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let mut overlay = TextOverlay::new("before", Vec2::new(0.5, 0.5));
        let original_style = overlay.style;
        overlay.apply_patch(OverlayPatch::default().text("after"), 350.0);
        assert_eq!(overlay.text, "after");
        assert_eq!(overlay.position, Vec2::new(0.5, 0.5));
        assert_eq!(overlay.style, original_style);
    }

    #[test]
    fn test_patch_width_is_clamped() {
        let mut overlay = TextOverlay::new("text", Vec2::ZERO);
        overlay.apply_patch(OverlayPatch::default().width(10.0), 350.0);
        assert_eq!(overlay.width, MIN_OVERLAY_WIDTH);
        overlay.apply_patch(OverlayPatch::default().width(900.0), 350.0);
        assert_eq!(overlay.width, 350.0);
    }

    #[test]
    fn test_font_size_is_kept_in_range() {
        let mut overlay = TextOverlay::new("text", Vec2::ZERO);
        overlay.apply_style(StylePatch::default().font_size(500.0));
        assert_eq!(overlay.style.font_size, MAX_FONT_SIZE);
        overlay.apply_style(StylePatch::default().font_size(-3.0));
        assert_eq!(overlay.style.font_size, MIN_FONT_SIZE);
        overlay.apply_style(StylePatch::default().font_size(f32::NAN));
        assert_eq!(overlay.style.font_size, MIN_FONT_SIZE);

        let style = TextStyle {
            font_size: 0.0,
            ..overlay.style
        };
        overlay.apply_patch(OverlayPatch::default().style(style), 350.0);
        assert_eq!(overlay.style.font_size, MIN_FONT_SIZE);
    }

    #[test]
    fn test_clamp_width_floor_wins_over_small_bound() {
        assert_eq!(clamp_overlay_width(150.0, 60.0), MIN_OVERLAY_WIDTH);
    }

    #[test]
    fn test_font_names_round_trip() {
        for family in FontFamily::all() {
            assert_eq!(FontFamily::from_name(family.display_name()), Some(*family));
        }
        assert_eq!(FontFamily::from_name("ArialMT"), Some(FontFamily::Arial));
        assert_eq!(FontStyle::from_name("Bold"), Some(FontStyle::Bold));
        assert_eq!(FontStyle::from_name("oblique"), None);
    }

    #[test]
    fn test_font_cycles_wrap() {
        assert_eq!(FontStyle::Italic.next(), FontStyle::Regular);
        assert_eq!(FontFamily::SnellRoundhand.next(), FontFamily::Arial);
    }

    #[test]
    fn test_text_height_counts_lines() {
        let mut overlay = TextOverlay::new("one line", Vec2::ZERO);
        let single = overlay.text_height();
        assert!((single - DEFAULT_FONT_SIZE * TEXT_LINE_HEIGHT_FACTOR).abs() < 1e-4);
        overlay.text = "two\nlines".to_string();
        assert!((overlay.text_height() - 2.0 * single).abs() < 1e-4);
        overlay.text.clear();
        assert_eq!(overlay.text_height(), single);
    }

    #[test]
    fn test_empty_patch() {
        assert!(OverlayPatch::default().is_empty());
        assert!(!OverlayPatch::default().width(120.0).is_empty());
    }
}
