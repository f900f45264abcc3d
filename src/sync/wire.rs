//! Wire snapshots exchanged with the remote store.
//!
//! Field names follow the stored document layout (camelCase, `{x, y}` points,
//! `{red, green, blue, opacity}` colors). Conversion from a snapshot is lenient
//! about styling (unknown fonts fall back to defaults) but strict about ids.

use bevy::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::{
    DEFAULT_OVERLAY_WIDTH, DEFAULT_STROKE_WIDTH, MAX_FONT_SIZE, MIN_FONT_SIZE, MIN_OVERLAY_WIDTH,
};
use crate::model::{
    DrawingPath, EntryId, FontFamily, FontStyle, Photo, PhotoEntry, TextOverlay, TextStyle,
    array_to_color, color_to_array,
};

use super::error::{SyncError, SyncResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointSnapshot {
    pub x: f64,
    pub y: f64,
}

impl From<Vec2> for PointSnapshot {
    fn from(point: Vec2) -> Self {
        Self {
            x: point.x as f64,
            y: point.y as f64,
        }
    }
}

impl From<PointSnapshot> for Vec2 {
    fn from(point: PointSnapshot) -> Self {
        Vec2::new(point.x as f32, point.y as f32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorSnapshot {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub opacity: f64,
}

impl From<Color> for ColorSnapshot {
    fn from(color: Color) -> Self {
        let [red, green, blue, opacity] = color_to_array(color);
        Self {
            red: red as f64,
            green: green as f64,
            blue: blue as f64,
            opacity: opacity as f64,
        }
    }
}

impl From<ColorSnapshot> for Color {
    fn from(color: ColorSnapshot) -> Self {
        array_to_color([
            color.red as f32,
            color.green as f32,
            color.blue as f32,
            color.opacity as f32,
        ])
    }
}

fn default_overlay_width() -> f64 {
    DEFAULT_OVERLAY_WIDTH as f64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySnapshot {
    pub id: String,
    pub text: String,
    pub position: PointSnapshot,
    pub color: ColorSnapshot,
    pub font_family: String,
    pub font_size: f64,
    pub font_style: String,
    #[serde(default = "default_overlay_width")]
    pub width: f64,
}

impl OverlaySnapshot {
    fn from_overlay(overlay: &TextOverlay) -> Self {
        Self {
            id: overlay.id.to_string(),
            text: overlay.text.clone(),
            position: overlay.position.into(),
            color: overlay.color.into(),
            font_family: overlay.style.font_family.display_name().to_string(),
            font_size: overlay.style.font_size as f64,
            font_style: overlay.style.font_style.name().to_string(),
            width: overlay.width as f64,
        }
    }

    fn to_overlay(&self) -> SyncResult<TextOverlay> {
        let defaults = TextStyle::default();
        let font_size = if self.font_size.is_finite() && self.font_size > 0.0 {
            (self.font_size as f32).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
        } else {
            defaults.font_size
        };
        let width = self.width as f32;
        let width = if width.is_finite() {
            width.max(MIN_OVERLAY_WIDTH)
        } else {
            DEFAULT_OVERLAY_WIDTH
        };
        let position = Vec2::from(self.position);
        let position = if position.is_finite() {
            position
        } else {
            Vec2::splat(0.5)
        };
        Ok(TextOverlay {
            id: parse_id(&self.id)?,
            text: self.text.clone(),
            position,
            style: TextStyle {
                font_size,
                font_style: FontStyle::from_name(&self.font_style).unwrap_or(defaults.font_style),
                font_family: FontFamily::from_name(&self.font_family)
                    .unwrap_or(defaults.font_family),
            },
            color: self.color.into(),
            width,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathSnapshot {
    pub id: String,
    pub points: Vec<PointSnapshot>,
    pub color: ColorSnapshot,
    pub line_width: f64,
}

impl PathSnapshot {
    fn from_path(path: &DrawingPath) -> Self {
        Self {
            id: path.id.to_string(),
            points: path.points.iter().copied().map(PointSnapshot::from).collect(),
            color: path.color.into(),
            line_width: path.line_width as f64,
        }
    }

    fn to_path(&self) -> SyncResult<DrawingPath> {
        let points: Vec<Vec2> = self
            .points
            .iter()
            .copied()
            .map(Vec2::from)
            .filter(|p| p.is_finite())
            .collect();
        if points.is_empty() {
            return Err(SyncError::InvalidSnapshot(format!(
                "drawing path {} has no usable points",
                self.id
            )));
        }
        let line_width = if self.line_width.is_finite() && self.line_width > 0.0 {
            self.line_width as f32
        } else {
            DEFAULT_STROKE_WIDTH
        };
        Ok(DrawingPath {
            id: parse_id(&self.id)?,
            points,
            color: self.color.into(),
            line_width,
        })
    }
}

/// Document stored remotely for one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySnapshot {
    pub id: String,
    pub title: String,
    pub text: String,
    pub emotions: Vec<String>,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Creation date of the entry
    pub timestamp: DateTime<Utc>,
    /// Last content change
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub text_overlays: Vec<OverlaySnapshot>,
    #[serde(default)]
    pub drawing_paths: Vec<PathSnapshot>,
}

impl EntrySnapshot {
    pub fn from_entry(entry: &PhotoEntry, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: entry.id().to_string(),
            title: entry.diary_title.clone(),
            text: entry.diary_text.clone(),
            emotions: entry.emotions().to_vec(),
            photo_url: entry.photo().remote_url().map(str::to_string),
            timestamp: entry.date(),
            updated_at,
            text_overlays: entry
                .text_overlays
                .iter()
                .map(OverlaySnapshot::from_overlay)
                .collect(),
            drawing_paths: entry
                .drawing_paths
                .iter()
                .map(PathSnapshot::from_path)
                .collect(),
        }
    }

    pub fn entry_id(&self) -> SyncResult<EntryId> {
        parse_id(&self.id)
    }

    /// Rebuild the entry around `photo`
    pub fn to_entry(&self, photo: Photo) -> SyncResult<PhotoEntry> {
        let mut entry = PhotoEntry::restore(self.entry_id()?, self.timestamp, photo);
        entry.diary_title = self.title.clone();
        entry.diary_text = self.text.clone();
        entry.set_emotions(self.emotions.iter().cloned());
        entry.text_overlays = self
            .text_overlays
            .iter()
            .map(OverlaySnapshot::to_overlay)
            .collect::<SyncResult<_>>()?;
        entry.drawing_paths = self
            .drawing_paths
            .iter()
            .map(PathSnapshot::to_path)
            .collect::<SyncResult<_>>()?;
        Ok(entry)
    }
}

fn parse_id<T: FromStr<Err = uuid::Error>>(raw: &str) -> SyncResult<T> {
    raw.parse()
        .map_err(|e| SyncError::InvalidSnapshot(format!("bad id {:?}: {}", raw, e)))
}
