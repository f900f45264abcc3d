//! Keyboard shortcuts for the edit screen.
//!
//! Shortcuts are suppressed while keystrokes go to text (an overlay being
//! typed into, or the diary).

use bevy::prelude::*;

use crate::model::{StylePatch, TextStyle};
use crate::picker::{PickMode, PickPhotoRequest};
use crate::session::EditSession;

use super::is_text_entry_active;

/// Font size change per key press
const FONT_SIZE_STEP: f32 = 2.0;

const EMOTION_KEYS: [KeyCode; 8] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Undo,
    AddText,
    ToggleDrawing,
    ToggleEmotionPicker,
    ToggleDiary,
    /// Index into the emotion catalog
    ToggleEmotion(usize),
    CycleColor,
    DeleteOverlay,
    DuplicateOverlay,
    FontSizeUp,
    FontSizeDown,
    CycleFontFamily,
    CycleFontStyle,
    StartTyping,
    PickPhoto(PickMode),
}

/// Map the keys pressed this frame to an action.
///
/// Ctrl combinations are checked first so Ctrl+D never toggles drawing.
/// Number keys only pick emotions while the emotion picker is open.
pub fn shortcut_from_keys(
    keyboard: &ButtonInput<KeyCode>,
    emotion_picker_open: bool,
) -> Option<ShortcutAction> {
    let ctrl = keyboard.pressed(KeyCode::ControlLeft) || keyboard.pressed(KeyCode::ControlRight);

    if ctrl {
        if keyboard.just_pressed(KeyCode::KeyZ) {
            return Some(ShortcutAction::Undo);
        }
        if keyboard.just_pressed(KeyCode::KeyD) {
            return Some(ShortcutAction::DuplicateOverlay);
        }
        return None;
    }

    if emotion_picker_open
        && let Some(index) = EMOTION_KEYS.iter().position(|key| keyboard.just_pressed(*key))
    {
        return Some(ShortcutAction::ToggleEmotion(index));
    }

    if keyboard.just_pressed(KeyCode::KeyT) {
        Some(ShortcutAction::AddText)
    } else if keyboard.just_pressed(KeyCode::KeyD) {
        Some(ShortcutAction::ToggleDrawing)
    } else if keyboard.just_pressed(KeyCode::KeyE) {
        Some(ShortcutAction::ToggleEmotionPicker)
    } else if keyboard.just_pressed(KeyCode::KeyN) {
        Some(ShortcutAction::ToggleDiary)
    } else if keyboard.just_pressed(KeyCode::KeyC) {
        Some(ShortcutAction::CycleColor)
    } else if keyboard.just_pressed(KeyCode::Delete) || keyboard.just_pressed(KeyCode::Backspace) {
        Some(ShortcutAction::DeleteOverlay)
    } else if keyboard.just_pressed(KeyCode::Equal) || keyboard.just_pressed(KeyCode::NumpadAdd) {
        Some(ShortcutAction::FontSizeUp)
    } else if keyboard.just_pressed(KeyCode::Minus)
        || keyboard.just_pressed(KeyCode::NumpadSubtract)
    {
        Some(ShortcutAction::FontSizeDown)
    } else if keyboard.just_pressed(KeyCode::KeyF) {
        Some(ShortcutAction::CycleFontFamily)
    } else if keyboard.just_pressed(KeyCode::KeyB) {
        Some(ShortcutAction::CycleFontStyle)
    } else if keyboard.just_pressed(KeyCode::Enter) {
        Some(ShortcutAction::StartTyping)
    } else if keyboard.just_pressed(KeyCode::KeyO) {
        Some(ShortcutAction::PickPhoto(PickMode::New))
    } else if keyboard.just_pressed(KeyCode::KeyR) {
        Some(ShortcutAction::PickPhoto(PickMode::Replace))
    } else {
        None
    }
}

/// Run an action against the session.
///
/// Photo picks are returned to the caller, which owns the message writer.
pub fn apply_shortcut(session: &mut EditSession, action: ShortcutAction) -> Option<PickMode> {
    let selected = session.modes().active_overlay();
    match action {
        ShortcutAction::Undo => {
            session.undo();
        }
        ShortcutAction::AddText => {
            if let Some(id) = session.add_text_overlay() {
                session.modes_mut().select_overlay(id);
            }
        }
        ShortcutAction::ToggleDrawing => {
            session.toggle_drawing();
        }
        ShortcutAction::ToggleEmotionPicker => {
            // Opening the picker leaves drawing, which must also drop the stroke
            session.cancel_stroke();
            session.modes_mut().toggle_emotion_picker();
        }
        ShortcutAction::ToggleDiary => {
            if !session.modes_mut().toggle_diary() {
                debug!("Diary stays closed while the emotion picker is open");
            }
        }
        ShortcutAction::ToggleEmotion(index) => {
            session.toggle_emotion_at(index);
        }
        ShortcutAction::CycleColor => {
            let color = session.cycle_color();
            if let Some(id) = selected {
                session.update_text_overlay_style(id, StylePatch::default().color(color));
            }
        }
        ShortcutAction::DeleteOverlay => {
            if let Some(id) = selected {
                session.delete_text_overlay(id);
            }
        }
        ShortcutAction::DuplicateOverlay => {
            if let Some(id) = selected
                && let Some(copy) = session.duplicate_text_overlay(id)
            {
                session.modes_mut().select_overlay(copy);
            }
        }
        ShortcutAction::FontSizeUp => {
            if let Some(id) = selected {
                session.step_font_size(id, FONT_SIZE_STEP);
            }
        }
        ShortcutAction::FontSizeDown => {
            if let Some(id) = selected {
                session.step_font_size(id, -FONT_SIZE_STEP);
            }
        }
        ShortcutAction::CycleFontFamily => {
            if let Some(id) = selected
                && let Some(style) = selected_style(session)
            {
                session.update_text_overlay_style(
                    id,
                    StylePatch::default().font_family(style.font_family.next()),
                );
            }
        }
        ShortcutAction::CycleFontStyle => {
            if let Some(id) = selected
                && let Some(style) = selected_style(session)
            {
                session.update_text_overlay_style(
                    id,
                    StylePatch::default().font_style(style.font_style.next()),
                );
            }
        }
        ShortcutAction::StartTyping => {
            if let Some(id) = selected {
                session.modes_mut().begin_typing(id);
            }
        }
        ShortcutAction::PickPhoto(mode) => return Some(mode),
    }
    None
}

fn selected_style(session: &EditSession) -> Option<TextStyle> {
    let id = session.modes().active_overlay()?;
    session.active_entry()?.overlay(id).map(|o| o.style)
}

pub fn handle_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut session: ResMut<EditSession>,
    mut pick_requests: MessageWriter<PickPhotoRequest>,
) {
    if is_text_entry_active(session.modes()) {
        return;
    }
    let Some(action) =
        shortcut_from_keys(&keyboard, session.modes().is_showing_emotion_picker())
    else {
        return;
    };

    if let Some(mode) = apply_shortcut(&mut session, action) {
        pick_requests.write(PickPhotoRequest { mode });
    }
}
