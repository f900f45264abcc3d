//! Entity definitions for diary entries and their annotations.
//!
//! ## Module Structure
//!
//! - [`ids`] - Stable uuid-backed identifiers
//! - [`color`] - Normalized RGBA helpers and the drawing palette
//! - [`overlay`] - Styled, positioned text blocks and their patch types
//! - [`drawing`] - Freehand strokes
//! - [`entry`] - The photo entry that owns overlays and strokes

mod color;
mod drawing;
mod entry;
mod ids;
mod overlay;

pub use color::{ColorPalette, array_to_color, color_to_array};
pub use drawing::DrawingPath;
pub use entry::{Photo, PhotoEntry};
pub use ids::{EntryId, OverlayId, PathId};
pub use overlay::{
    FontFamily, FontStyle, OverlayPatch, StylePatch, TextOverlay, TextStyle, clamp_overlay_width,
};
