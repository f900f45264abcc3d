//! Photo diary editor: photo entries with text overlays, freehand drawing,
//! emotion tags and a diary note, with per-entry undo and local/remote sync.

pub mod calendar;
pub mod config;
pub mod constants;
pub mod emotion;
pub mod geometry;
pub mod identity;
pub mod input;
pub mod model;
pub mod paths;
pub mod picker;
pub mod render;
pub mod session;
pub mod sync;
