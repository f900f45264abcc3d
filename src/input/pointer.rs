//! Mouse handling: freehand strokes in drawing mode, otherwise overlay
//! selection and dragging.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::config::DiaryConfig;
use crate::model::OverlayId;
use crate::session::EditSession;

use super::{DiaryCamera, world_to_frame};

/// Overlay being dragged and where it was grabbed, relative to its center
#[derive(Resource, Default)]
pub struct OverlayDrag {
    pub target: Option<(OverlayId, Vec2)>,
}

/// Topmost overlay of the active entry whose box contains `point`.
///
/// `point` is in frame space.
pub fn hit_test_overlay(session: &EditSession, point: Vec2, frame: Rect) -> Option<OverlayId> {
    let entry = session.active_entry()?;
    entry
        .text_overlays
        .iter()
        .rev()
        .find(|overlay| {
            let center = session.overlay_display_position(overlay.id, frame);
            Rect::from_center_size(center, overlay.box_size()).contains(point)
        })
        .map(|overlay| overlay.id)
}

fn handle_stroke(session: &mut EditSession, mouse: &ButtonInput<MouseButton>, point: Vec2, frame: Rect) {
    if mouse.just_pressed(MouseButton::Left) {
        if frame.contains(point) {
            session.begin_stroke(point);
        }
    } else if mouse.pressed(MouseButton::Left) {
        session.extend_stroke(point);
    } else if mouse.just_released(MouseButton::Left) {
        session.finish_stroke();
    }
}

fn handle_overlay_drag(
    session: &mut EditSession,
    drag: &mut OverlayDrag,
    mouse: &ButtonInput<MouseButton>,
    point: Vec2,
    frame: Rect,
) {
    if mouse.just_pressed(MouseButton::Left) {
        match hit_test_overlay(session, point, frame) {
            Some(id) => {
                let center = session.overlay_display_position(id, frame);
                session.modes_mut().select_overlay(id);
                drag.target = Some((id, center - point));
            }
            None => {
                session.modes_mut().clear_overlay_selection();
                drag.target = None;
            }
        }
    } else if mouse.pressed(MouseButton::Left) {
        let Some((id, offset)) = drag.target else {
            return;
        };
        let Some(height) = session
            .active_entry()
            .and_then(|e| e.overlay(id))
            .map(|o| o.text_height())
        else {
            drag.target = None;
            return;
        };
        session.drag_overlay(id, point + offset, height, frame);
    } else if mouse.just_released(MouseButton::Left) {
        drag.target = None;
    }
}

pub fn handle_pointer(
    mut session: ResMut<EditSession>,
    mut drag: ResMut<OverlayDrag>,
    mouse: Res<ButtonInput<MouseButton>>,
    config: Res<DiaryConfig>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform), With<DiaryCamera>>,
) {
    let Ok(window) = window_query.single() else {
        return;
    };

    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    let Some(cursor_pos) = window.cursor_position() else {
        return;
    };

    let Ok(world_pos) = camera.viewport_to_world_2d(camera_transform, cursor_pos) else {
        return;
    };

    let point = world_to_frame(world_pos);
    let frame = config.frame();
    if session.modes().is_drawing() {
        drag.target = None;
        handle_stroke(&mut session, &mouse, point, frame);
    } else {
        handle_overlay_drag(&mut session, &mut drag, &mouse, point, frame);
    }
}
