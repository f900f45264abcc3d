//! Unit tests for the edit session.

use bevy::prelude::*;

use super::{EditSession, SessionChange, SessionSettings};
use crate::constants::{DEFAULT_FONT_SIZE, MAX_FONT_SIZE, MIN_OVERLAY_WIDTH};
use crate::emotion::EmotionCatalog;
use crate::model::{
    ColorPalette, DrawingPath, EntryId, FontFamily, OverlayPatch, Photo, PhotoEntry, StylePatch,
};

fn photo() -> Photo {
    Photo::from_bytes(vec![0xFF, 0xD8, 0xFF])
}

fn session_with_entry() -> (EditSession, EntryId) {
    let mut session = EditSession::default();
    let id = session.add_entry(photo());
    (session, id)
}

fn frame() -> Rect {
    Rect::new(0.0, 0.0, 300.0, 400.0)
}

fn approx(a: Vec2, b: Vec2) -> bool {
    (a - b).length() < 1e-4
}

#[test]
fn test_add_entry_becomes_active() {
    let mut session = EditSession::default();
    assert!(session.active_entry().is_none());

    let id = session.add_entry(photo());
    assert_eq!(session.active_entry_id(), Some(id));
    assert_eq!(session.entry_count(), 1);
    assert!(!session.has_edits());
    assert!(!session.can_undo());
}

#[test]
fn test_add_entry_clears_emotion_selection() {
    let (mut session, _) = session_with_entry();
    session.toggle_emotion("Joy");
    assert_eq!(session.catalog().selected_count(), 1);

    session.add_entry(photo());
    assert_eq!(session.catalog().selected_count(), 0);
    assert!(session.active_entry().unwrap().emotions().is_empty());
}

#[test]
fn test_operations_without_active_entry_are_noops() {
    let mut session = EditSession::default();
    assert!(session.add_text_overlay().is_none());
    assert!(session.replace_photo(photo()).is_none());
    assert!(!session.toggle_emotion("Joy"));
    assert!(!session.undo());
    assert!(!session.set_diary_text("hello"));
    assert!(
        session
            .add_drawing_path(DrawingPath::new(vec![Vec2::ZERO], Color::BLACK, 3.0))
            .is_none()
    );
    assert!(session.drain_changes().is_empty());
}

#[test]
fn test_add_text_overlay_scenario() {
    let (mut session, _) = session_with_entry();
    let id = session.add_text_overlay().unwrap();

    let entry = session.active_entry().unwrap();
    assert_eq!(entry.text_overlays.len(), 1);
    assert_eq!(entry.overlay(id).unwrap().position, Vec2::new(0.5, 0.5));
    assert!(session.has_edits());
    assert_eq!(session.undo_depth(), 1);
}

#[test]
fn test_update_text_overlay_changes_only_given_fields() {
    let (mut session, _) = session_with_entry();
    let id = session.add_text_overlay().unwrap();

    assert!(session.update_text_overlay(id, OverlayPatch::default().text("Beach day")));
    let overlay = session.active_entry().unwrap().overlay(id).unwrap().clone();
    assert_eq!(overlay.text, "Beach day");
    assert_eq!(overlay.position, Vec2::new(0.5, 0.5));
    assert_eq!(overlay.style.font_size, DEFAULT_FONT_SIZE);
    assert_eq!(session.undo_depth(), 1, "continuous edits push no checkpoint");
}

#[test]
fn test_update_unknown_overlay_is_noop() {
    let (mut session, _) = session_with_entry();
    session.add_text_overlay();
    session.drain_changes();

    let stranger = crate::model::OverlayId::new();
    assert!(!session.update_text_overlay(stranger, OverlayPatch::default().text("x")));
    assert!(!session.update_text_overlay_style(stranger, StylePatch::default().font_size(40.0)));
    assert!(!session.delete_text_overlay(stranger));
    assert!(session.duplicate_text_overlay(stranger).is_none());
    assert_eq!(session.undo_depth(), 1, "failed edits record no checkpoint");
    assert!(session.drain_changes().is_empty());
}

#[test]
fn test_style_then_undo_reverts_later_text_too() {
    let (mut session, _) = session_with_entry();
    let id = session.add_text_overlay().unwrap();
    session.update_text_overlay(id, OverlayPatch::default().text("Before"));

    assert!(session.update_text_overlay_style(id, StylePatch::default().font_size(30.0)));
    session.update_text_overlay(id, OverlayPatch::default().text("After"));
    assert_eq!(
        session.active_entry().unwrap().overlay(id).unwrap().style.font_size,
        30.0
    );

    assert!(session.undo());
    let overlay = session.active_entry().unwrap().overlay(id).unwrap();
    assert_eq!(overlay.style.font_size, DEFAULT_FONT_SIZE);
    // The checkpoint predates the second text edit, so that edit is lost too
    assert_eq!(overlay.text, "Before");
    assert_eq!(overlay.position, Vec2::new(0.5, 0.5));
}

#[test]
fn test_undo_is_lifo_across_discrete_edits() {
    let (mut session, _) = session_with_entry();

    let first = session.add_text_overlay().unwrap();
    let mut states = vec![session.active_entry().unwrap().clone()];

    session.update_text_overlay_style(first, StylePatch::default().font_family(FontFamily::Courier));
    states.push(session.active_entry().unwrap().clone());

    let copy = session.duplicate_text_overlay(first).unwrap();
    states.push(session.active_entry().unwrap().clone());

    session.add_drawing_path(DrawingPath::new(
        vec![Vec2::new(1.0, 1.0), Vec2::new(40.0, 40.0)],
        Color::BLACK,
        3.0,
    ));
    states.push(session.active_entry().unwrap().clone());

    session.delete_text_overlay(copy);
    assert_eq!(session.undo_depth(), 5);

    while let Some(expected) = states.pop() {
        assert!(session.undo());
        let entry = session.active_entry().unwrap();
        assert_eq!(entry.text_overlays, expected.text_overlays);
        assert_eq!(entry.drawing_paths, expected.drawing_paths);
    }

    // Back before the very first overlay
    assert!(session.undo());
    assert!(!session.has_edits());
    assert!(!session.undo());
}

#[test]
fn test_undo_leaves_diary_and_emotions_alone() {
    let (mut session, _) = session_with_entry();
    session.add_text_overlay();
    session.set_diary_text("A long walk");
    session.toggle_emotion("Trust");

    assert!(session.undo());
    let entry = session.active_entry().unwrap();
    assert!(entry.text_overlays.is_empty());
    assert_eq!(entry.diary_text, "A long walk");
    assert_eq!(entry.emotions(), &["Trust"]);
}

#[test]
fn test_undo_keeps_cached_drag_positions() {
    let (mut session, _) = session_with_entry();
    let id = session.add_text_overlay().unwrap();
    session.update_position(Vec2::new(60.0, 100.0), id, frame());
    session.add_text_overlay();

    assert!(session.undo());
    let cached = session.drag_position(id).unwrap();
    assert!(approx(cached, Vec2::new(0.2, 0.25)));
    assert_eq!(session.active_entry().unwrap().text_overlays.len(), 1);
}

#[test]
fn test_undo_clears_selection_of_removed_overlay() {
    let (mut session, _) = session_with_entry();
    let id = session.add_text_overlay().unwrap();
    session.modes_mut().begin_typing(id);

    assert!(session.undo());
    assert!(session.modes().active_overlay().is_none());
    assert!(!session.modes().is_typing());
    assert!(session.drag_position(id).is_none());
}

#[test]
fn test_duplicate_copies_everything_but_id_and_position() {
    let (mut session, _) = session_with_entry();
    let original = session.add_text_overlay().unwrap();
    session.update_text_overlay(
        original,
        OverlayPatch::default()
            .text("Sunset")
            .position(Vec2::new(0.3, 0.4))
            .width(180.0),
    );
    session.update_text_overlay_style(
        original,
        StylePatch::default().font_size(32.0).color(Color::srgba(1.0, 0.0, 0.0, 1.0)),
    );

    let copy = session.duplicate_text_overlay(original).unwrap();
    assert_ne!(copy, original);

    let entry = session.active_entry().unwrap();
    let a = entry.overlay(original).unwrap();
    let b = entry.overlay(copy).unwrap();
    assert_eq!(a.text, b.text);
    assert_eq!(a.style, b.style);
    assert_eq!(a.color, b.color);
    assert_eq!(a.width, b.width);
    assert!(approx(b.position, a.position + Vec2::splat(0.05)));
    assert!(approx(session.drag_position(copy).unwrap(), b.position));
}

#[test]
fn test_width_is_clamped_to_container() {
    let (mut session, _) = session_with_entry();
    let id = session.add_text_overlay().unwrap();

    session.update_text_overlay_width(id, 10.0);
    assert_eq!(
        session.active_entry().unwrap().overlay(id).unwrap().width,
        MIN_OVERLAY_WIDTH
    );

    session.update_text_overlay_width(id, 5000.0);
    assert_eq!(session.active_entry().unwrap().overlay(id).unwrap().width, 350.0);
    assert_eq!(session.undo_depth(), 1);
}

#[test]
fn test_delete_clears_drag_cache() {
    let (mut session, _) = session_with_entry();
    let id = session.add_text_overlay().unwrap();
    assert!(session.drag_position(id).is_some());

    assert!(session.delete_text_overlay(id));
    assert!(session.drag_position(id).is_none());
    assert!(!session.has_edits());
    assert_eq!(session.undo_depth(), 2);
}

#[test]
fn test_update_position_converts_to_relative() {
    let (mut session, _) = session_with_entry();
    let id = session.add_text_overlay().unwrap();

    assert!(session.update_position(Vec2::new(75.0, 300.0), id, frame()));
    let stored = session.active_entry().unwrap().overlay(id).unwrap().position;
    assert!(approx(stored, Vec2::new(0.25, 0.75)));
    assert!(approx(
        session.overlay_display_position(id, frame()),
        Vec2::new(75.0, 300.0)
    ));
}

#[test]
fn test_update_position_on_degenerate_frame_is_noop() {
    let (mut session, _) = session_with_entry();
    let id = session.add_text_overlay().unwrap();
    let flat = Rect::new(0.0, 0.0, 0.0, 400.0);

    assert!(!session.update_position(Vec2::new(10.0, 10.0), id, flat));
    let stored = session.active_entry().unwrap().overlay(id).unwrap().position;
    assert!(stored.is_finite());
    assert_eq!(stored, Vec2::new(0.5, 0.5));
}

#[test]
fn test_drag_overlay_is_clamped_inside_frame() {
    let (mut session, _) = session_with_entry();
    let id = session.add_text_overlay().unwrap();

    // Default width 200, text height 40: center x stays in [100, 200]
    assert!(session.drag_overlay(id, Vec2::new(290.0, -10.0), 40.0, frame()));
    let shown = session.overlay_display_position(id, frame());
    assert!(approx(shown, Vec2::new(200.0, 20.0)));
}

#[test]
fn test_add_drawing_path_uses_selected_color() {
    let (mut session, _) = session_with_entry();
    let red = Color::srgba(1.0, 0.0, 0.0, 1.0);
    session.set_selected_color(red);

    let path = DrawingPath::new(vec![Vec2::ZERO, Vec2::ONE * 10.0], Color::BLACK, 3.0);
    let id = session.add_drawing_path(path).unwrap();

    let entry = session.active_entry().unwrap();
    assert_eq!(entry.drawing_paths.len(), 1);
    assert_eq!(entry.drawing_paths[0].id, id);
    assert_eq!(entry.drawing_paths[0].color, red);
    assert!(session.has_edits());
    assert_eq!(session.undo_depth(), 1);
}

#[test]
fn test_stroke_requires_drawing_mode() {
    let (mut session, _) = session_with_entry();
    assert!(!session.begin_stroke(Vec2::ZERO));

    session.set_drawing(true);
    assert!(session.begin_stroke(Vec2::ZERO));
    assert!(!session.extend_stroke(Vec2::new(1.0, 0.0)), "too close");
    assert!(session.extend_stroke(Vec2::new(5.0, 0.0)));
    assert_eq!(session.current_stroke().unwrap().points.len(), 2);
    assert!(!session.has_edits(), "in-progress stroke is not committed");
    assert_eq!(session.undo_depth(), 0);

    assert!(session.finish_stroke().is_some());
    assert!(session.current_stroke().is_none());
    assert_eq!(session.active_entry().unwrap().drawing_paths.len(), 1);
    assert_eq!(session.undo_depth(), 1);
}

#[test]
fn test_leaving_drawing_drops_stroke() {
    let (mut session, _) = session_with_entry();
    session.set_drawing(true);
    session.begin_stroke(Vec2::ZERO);
    session.set_drawing(false);
    assert!(session.current_stroke().is_none());
    assert!(session.finish_stroke().is_none());
}

#[test]
fn test_cycle_color_walks_palette() {
    let palette = ColorPalette::new(vec![Color::WHITE, Color::BLACK]);
    let mut session = EditSession::new(EmotionCatalog::default(), palette, SessionSettings::default());
    assert_eq!(session.selected_color(), Color::WHITE);
    assert_eq!(session.cycle_color(), Color::BLACK);
    assert_eq!(session.cycle_color(), Color::WHITE);
}

#[test]
fn test_emotion_cap_scenario() {
    let (mut session, _) = session_with_entry();
    assert!(session.toggle_emotion("Joy"));
    assert!(session.toggle_emotion("Love"));
    assert!(session.toggle_emotion("Surprise"));
    assert!(!session.toggle_emotion("Fear"));

    assert_eq!(session.catalog().selected_count(), 3);
    assert!(!session.catalog().is_selected("Fear"));
    assert_eq!(
        session.active_entry().unwrap().emotions(),
        &["Joy", "Love", "Surprise"]
    );
}

#[test]
fn test_emotion_count_never_exceeds_cap() {
    let (mut session, _) = session_with_entry();
    let count = session.catalog().emotions().len();
    for step in 0..64 {
        session.toggle_emotion_at((step * 5 + step / 3) % count);
        assert!(session.active_entry().unwrap().emotions().len() <= 3);
        assert!(session.catalog().selected_count() <= 3);
    }
}

#[test]
fn test_replace_photo_keeps_annotations_with_new_id() {
    let (mut session, old_id) = session_with_entry();
    let overlay = session.add_text_overlay().unwrap();
    session.set_diary_text("kept");
    session.toggle_emotion("Love");
    session.drain_changes();

    let new_id = session.replace_photo(Photo::from_bytes(vec![9, 9])).unwrap();
    assert_ne!(new_id, old_id);
    assert_eq!(session.active_entry_id(), Some(new_id));
    assert!(session.entry(old_id).is_none());
    assert_eq!(session.entry_count(), 1);

    let entry = session.active_entry().unwrap();
    assert!(entry.overlay(overlay).is_some());
    assert_eq!(entry.diary_text, "kept");
    assert_eq!(entry.emotions(), &["Love"]);
    assert_eq!(entry.photo().bytes(), Some(&[9u8, 9][..]));

    assert_eq!(
        session.drain_changes(),
        vec![SessionChange::Retired(old_id), SessionChange::Committed(new_id)]
    );
    // Undo history follows the successor
    assert!(session.undo());
}

#[test]
fn test_add_entry_with_diary_carries_text() {
    let (mut session, first) = session_with_entry();
    session.set_diary_title("Day one");
    session.set_diary_text("Rain all day");

    let second = session.add_entry_with_diary(photo(), Some(first));
    let entry = session.entry(second).unwrap();
    assert_eq!(entry.diary_title, "Day one");
    assert_eq!(entry.diary_text, "Rain all day");
    assert!(entry.text_overlays.is_empty());

    let third = session.add_entry(photo());
    assert!(session.entry(third).unwrap().diary_text.is_empty());
}

#[test]
fn test_select_entry_loads_emotions() {
    let (mut session, first) = session_with_entry();
    session.toggle_emotion("Anger");
    session.add_entry(photo());
    assert_eq!(session.catalog().selected_count(), 0);

    assert!(session.select_entry(first));
    assert!(session.catalog().is_selected("Anger"));
    assert!(!session.select_entry(EntryId::new()));
}

#[test]
fn test_undo_history_is_per_entry() {
    let (mut session, first) = session_with_entry();
    session.add_text_overlay();
    session.add_text_overlay();

    session.add_entry(photo());
    assert_eq!(session.undo_depth(), 0);
    assert!(!session.undo());

    session.select_entry(first);
    assert_eq!(session.undo_depth(), 2);
}

#[test]
fn test_restore_entries_skips_active() {
    let (mut session, active) = session_with_entry();
    session.set_diary_text("local");

    let mut stale = session.active_entry().unwrap().clone();
    stale.diary_text = "remote".to_string();
    let other = PhotoEntry::new(photo());
    let other_id = other.id();

    assert_eq!(session.restore_entries(vec![stale, other]), 1);
    assert_eq!(session.entry(active).unwrap().diary_text, "local");
    assert!(session.entry(other_id).is_some());
    assert_eq!(session.active_entry_id(), Some(active));
    assert_eq!(session.entries().count(), 2);
}

#[test]
fn test_restore_over_entry_drops_its_history() {
    let (mut session, first) = session_with_entry();
    session.add_text_overlay();
    session.add_text_overlay();
    let mut remote_copy = session.active_entry().unwrap().clone();
    remote_copy.text_overlays.clear();
    remote_copy.diary_text = "from another device".to_string();

    session.add_entry(photo());
    assert_eq!(session.restore_entries(vec![remote_copy]), 1);

    assert!(session.select_entry(first));
    assert_eq!(session.undo_depth(), 0);
    assert!(!session.undo());
    let entry = session.active_entry().unwrap();
    assert!(entry.text_overlays.is_empty());
    assert_eq!(entry.diary_text, "from another device");
}

#[test]
fn test_apply_updated_entry_ignores_unknown() {
    let mut session = EditSession::default();
    assert!(session.apply_updated_entry(PhotoEntry::new(photo())).is_none());
    assert!(session.drain_changes().is_empty());
}

#[test]
fn test_changes_are_deduplicated_until_drained() {
    let (mut session, id) = session_with_entry();
    session.set_diary_text("a");
    session.set_diary_text("ab");
    assert_eq!(session.drain_changes(), vec![SessionChange::Committed(id)]);
    assert!(session.drain_changes().is_empty());
}

#[test]
fn test_has_edits_tracks_overlays_and_paths() {
    let (mut session, _) = session_with_entry();
    assert!(!session.has_edits());

    let id = session.add_text_overlay().unwrap();
    assert!(session.has_edits());
    session.delete_text_overlay(id);
    assert!(!session.has_edits());

    session.add_drawing_path(DrawingPath::new(vec![Vec2::ZERO], Color::WHITE, 2.0));
    assert!(session.has_edits());
    session.undo();
    assert!(!session.has_edits());
}

#[test]
fn test_undo_limit_from_settings() {
    let settings = SessionSettings {
        max_undo_depth: Some(2),
        ..default()
    };
    let mut session = EditSession::new(EmotionCatalog::default(), ColorPalette::default(), settings);
    session.add_entry(photo());
    for _ in 0..5 {
        session.add_text_overlay();
    }
    assert_eq!(session.undo_depth(), 2);
    assert!(session.undo());
    assert!(session.undo());
    assert!(!session.undo());
    assert_eq!(session.active_entry().unwrap().text_overlays.len(), 3);
}

#[test]
fn test_step_font_size_stays_in_range() {
    let (mut session, _) = session_with_entry();
    let id = session.add_text_overlay().unwrap();
    assert!(session.step_font_size(id, 2.0));
    assert_eq!(
        session.active_entry().unwrap().overlay(id).unwrap().style.font_size,
        DEFAULT_FONT_SIZE + 2.0
    );
    assert!(session.step_font_size(id, -1000.0));
    assert!(!session.step_font_size(id, -2.0), "already at the floor");
}

#[test]
fn test_style_font_size_is_clamped() {
    let (mut session, _) = session_with_entry();
    let id = session.add_text_overlay().unwrap();
    assert!(session.update_text_overlay_style(id, StylePatch::default().font_size(1.0e6)));
    assert_eq!(
        session.active_entry().unwrap().overlay(id).unwrap().style.font_size,
        MAX_FONT_SIZE
    );
    assert!(!session.step_font_size(id, 2.0), "already at the ceiling");
    assert!(session.step_font_size(id, -2.0));
}
