//! Centralized constants used across the application.
//!
//! This module contains magic numbers and default values that are used
//! in multiple places or would benefit from being named constants.

/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: f32 = 480.0;

/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: f32 = 860.0;

/// Maximum number of emotions that can be tagged on a single entry
pub const MAX_SELECTED_EMOTIONS: usize = 3;

/// Overlays can never be resized narrower than this (pixels)
pub const MIN_OVERLAY_WIDTH: f32 = 100.0;

/// Width given to freshly created overlays (pixels)
pub const DEFAULT_OVERLAY_WIDTH: f32 = 200.0;

/// Horizontal margin kept between an overlay and the container edges.
/// The overlay width upper bound is `container_width - OVERLAY_WIDTH_MARGIN`.
pub const OVERLAY_WIDTH_MARGIN: f32 = 40.0;

/// Relative offset applied on both axes when duplicating an overlay
pub const DUPLICATE_OFFSET: f32 = 0.05;

/// Placeholder text for new overlays
pub const PLACEHOLDER_TEXT: &str = "Tap to edit";

/// Default font size for overlay text
pub const DEFAULT_FONT_SIZE: f32 = 24.0;

/// Smallest font size reachable through the size shortcuts
pub const MIN_FONT_SIZE: f32 = 8.0;

/// Largest font size reachable through the size shortcuts
pub const MAX_FONT_SIZE: f32 = 96.0;

/// Default stroke width for freehand paths
pub const DEFAULT_STROKE_WIDTH: f32 = 3.0;

/// Points closer than this to the previous stroke point are dropped
pub const MIN_STROKE_POINT_DISTANCE: f32 = 2.0;

/// Text height is approximated as `font_size * TEXT_LINE_HEIGHT_FACTOR`
/// when no measured height is available.
pub const TEXT_LINE_HEIGHT_FACTOR: f32 = 1.4;
