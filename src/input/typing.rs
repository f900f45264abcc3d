//! Text entry into the selected overlay or the diary.

use bevy::input::ButtonState;
use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::prelude::*;

use crate::constants::PLACEHOLDER_TEXT;
use crate::model::OverlayPatch;
use crate::session::EditSession;

use super::is_text_entry_active;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKeyOutcome {
    Edited,
    /// Enter or Escape: stop typing
    Finished,
    Ignored,
}

/// Apply one logical key to a text buffer.
///
/// `multiline` buffers take Enter as a newline; only Escape finishes them.
pub fn apply_text_key(text: &mut String, key: &Key, multiline: bool) -> TextKeyOutcome {
    match key {
        Key::Character(chars) => {
            let printable: String = chars.chars().filter(|c| !c.is_control()).collect();
            if printable.is_empty() {
                return TextKeyOutcome::Ignored;
            }
            text.push_str(&printable);
            TextKeyOutcome::Edited
        }
        Key::Space => {
            text.push(' ');
            TextKeyOutcome::Edited
        }
        Key::Backspace => {
            if text.pop().is_some() {
                TextKeyOutcome::Edited
            } else {
                TextKeyOutcome::Ignored
            }
        }
        Key::Enter if multiline => {
            text.push('\n');
            TextKeyOutcome::Edited
        }
        Key::Enter | Key::Escape => TextKeyOutcome::Finished,
        _ => TextKeyOutcome::Ignored,
    }
}

fn type_into_overlay(session: &mut EditSession, key: &Key) {
    let Some(id) = session.modes().active_overlay() else {
        return;
    };
    let Some(current) = session
        .active_entry()
        .and_then(|e| e.overlay(id))
        .map(|o| o.text.clone())
    else {
        session.modes_mut().end_typing();
        return;
    };

    // The placeholder is replaced by the first keystroke, not appended to
    let mut text = if current == PLACEHOLDER_TEXT {
        String::new()
    } else {
        current
    };
    match apply_text_key(&mut text, key, false) {
        TextKeyOutcome::Edited => {
            session.update_text_overlay(id, OverlayPatch::default().text(text));
        }
        TextKeyOutcome::Finished => session.modes_mut().end_typing(),
        TextKeyOutcome::Ignored => {}
    }
}

fn type_into_diary(session: &mut EditSession, key: &Key) {
    let Some(mut text) = session.active_entry().map(|e| e.diary_text.clone()) else {
        return;
    };
    match apply_text_key(&mut text, key, true) {
        TextKeyOutcome::Edited => {
            session.set_diary_text(text);
        }
        TextKeyOutcome::Finished => {
            session.modes_mut().set_diary(false);
        }
        TextKeyOutcome::Ignored => {}
    }
}

/// Route key presses to the overlay being typed into, else to the diary.
///
/// Keys are only taken once text entry was already active on the previous
/// run, so the Enter that starts typing is not read back as the Enter that
/// ends it.
pub fn handle_typing(
    mut keys: MessageReader<KeyboardInput>,
    mut session: ResMut<EditSession>,
    mut was_active: Local<bool>,
) {
    let active = is_text_entry_active(session.modes());
    if !*was_active {
        keys.clear();
        *was_active = active;
        return;
    }

    for event in keys.read() {
        if event.state != ButtonState::Pressed {
            continue;
        }
        if session.modes().is_typing() {
            type_into_overlay(&mut session, &event.logical_key);
        } else if session.modes().is_showing_diary() {
            type_into_diary(&mut session, &event.logical_key);
        }
    }
    *was_active = is_text_entry_active(session.modes());
}
