//! Emotion catalog and per-entry selection flags.
//!
//! The catalog is a fixed, ordered list handed to the edit session at
//! construction. Selection flags live on the session's copy and are mirrored
//! into the active entry's emotion names.

use crate::constants::MAX_SELECTED_EMOTIONS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emotion {
    pub name: String,
    pub emoji: String,
    pub is_selected: bool,
}

impl Emotion {
    pub fn new(name: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emoji: emoji.into(),
            is_selected: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionCatalog {
    emotions: Vec<Emotion>,
}

impl Default for EmotionCatalog {
    fn default() -> Self {
        Self::new(vec![
            Emotion::new("Joy", "😊"),
            Emotion::new("Love", "❤️"),
            Emotion::new("Surprise", "😲"),
            Emotion::new("Fear", "😨"),
            Emotion::new("Anger", "😡"),
            Emotion::new("Sadness", "😔"),
            Emotion::new("Trust", "🤞"),
            Emotion::new("Anxious", "🤔"),
        ])
    }
}

impl EmotionCatalog {
    /// Build a catalog; every flag starts cleared and duplicate names are dropped.
    pub fn new(emotions: Vec<Emotion>) -> Self {
        let mut unique: Vec<Emotion> = Vec::with_capacity(emotions.len());
        for mut emotion in emotions {
            if unique.iter().any(|e| e.name == emotion.name) {
                continue;
            }
            emotion.is_selected = false;
            unique.push(emotion);
        }
        Self { emotions: unique }
    }

    pub fn emotions(&self) -> &[Emotion] {
        &self.emotions
    }

    pub fn get(&self, index: usize) -> Option<&Emotion> {
        self.emotions.get(index)
    }

    pub fn selected_count(&self) -> usize {
        self.emotions.iter().filter(|e| e.is_selected).count()
    }

    /// Names of selected emotions, in catalog order
    pub fn selected_names(&self) -> Vec<String> {
        self.emotions
            .iter()
            .filter(|e| e.is_selected)
            .map(|e| e.name.clone())
            .collect()
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.emotions
            .iter()
            .any(|e| e.name == name && e.is_selected)
    }

    /// Flip the named emotion.
    ///
    /// Selecting beyond the limit is ignored. Returns false when the name is
    /// unknown or the selection was refused.
    pub fn toggle(&mut self, name: &str) -> bool {
        let selected = self.selected_count();
        let Some(emotion) = self.emotions.iter_mut().find(|e| e.name == name) else {
            return false;
        };
        if emotion.is_selected {
            emotion.is_selected = false;
            true
        } else if selected < MAX_SELECTED_EMOTIONS {
            emotion.is_selected = true;
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        for emotion in &mut self.emotions {
            emotion.is_selected = false;
        }
    }

    /// Set flags from stored emotion names. Unknown names are ignored.
    pub fn load_selection(&mut self, names: &[String]) {
        self.clear_selection();
        for name in names {
            if self.selected_count() == MAX_SELECTED_EMOTIONS {
                break;
            }
            if let Some(emotion) = self.emotions.iter_mut().find(|e| &e.name == name) {
                emotion.is_selected = true;
            }
        }
    }
}
