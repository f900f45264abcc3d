//! The photo entry: one diary page built around one photo.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::constants::MAX_SELECTED_EMOTIONS;

use super::drawing::DrawingPath;
use super::ids::{EntryId, OverlayId};
use super::overlay::TextOverlay;

/// Photo payload of an entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Photo {
    /// Encoded image bytes held in memory
    Inline(Arc<[u8]>),
    /// Photo only available through the remote store
    Remote { url: String },
}

impl Photo {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Photo::Inline(Arc::from(bytes))
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Photo::Inline(bytes) => Some(bytes),
            Photo::Remote { .. } => None,
        }
    }

    pub fn remote_url(&self) -> Option<&str> {
        match self {
            Photo::Inline(_) => None,
            Photo::Remote { url } => Some(url),
        }
    }
}

/// One diary entry for one photo.
///
/// Identity and photo are fixed once created; swapping the photo goes through
/// [`PhotoEntry::successor`], which mints a new id.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoEntry {
    id: EntryId,
    date: DateTime<Utc>,
    photo: Photo,
    emotions: Vec<String>,
    pub diary_title: String,
    pub diary_text: String,
    pub text_overlays: Vec<TextOverlay>,
    pub drawing_paths: Vec<DrawingPath>,
}

impl PhotoEntry {
    pub fn new(photo: Photo) -> Self {
        Self::restore(EntryId::new(), Utc::now(), photo)
    }

    /// Rebuild an entry with a known id and date (loading from a store)
    pub fn restore(id: EntryId, date: DateTime<Utc>, photo: Photo) -> Self {
        Self {
            id,
            date,
            photo,
            emotions: Vec::new(),
            diary_title: String::new(),
            diary_text: String::new(),
            text_overlays: Vec::new(),
            drawing_paths: Vec::new(),
        }
    }

    /// New entry carrying every annotation of this one, with a new photo and id
    pub fn successor(&self, photo: Photo) -> Self {
        Self {
            id: EntryId::new(),
            photo,
            ..self.clone()
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn photo(&self) -> &Photo {
        &self.photo
    }

    pub fn emotions(&self) -> &[String] {
        &self.emotions
    }

    /// Replace the selected emotion names.
    ///
    /// Duplicates are dropped and the list is cut at the selection limit.
    pub fn set_emotions<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emotions.clear();
        for name in names {
            if self.emotions.len() == MAX_SELECTED_EMOTIONS {
                break;
            }
            let name = name.into();
            if !self.emotions.contains(&name) {
                self.emotions.push(name);
            }
        }
    }

    pub fn overlay(&self, id: OverlayId) -> Option<&TextOverlay> {
        self.text_overlays.iter().find(|o| o.id == id)
    }

    pub fn overlay_mut(&mut self, id: OverlayId) -> Option<&mut TextOverlay> {
        self.text_overlays.iter_mut().find(|o| o.id == id)
    }

    /// True when there is anything to undo towards
    pub fn has_edits(&self) -> bool {
        !self.text_overlays.is_empty() || !self.drawing_paths.is_empty()
    }
}
