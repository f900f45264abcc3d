//! Gizmo view of the active entry: frame outline, strokes and overlay boxes.
//!
//! Photo decoding and glyph rendering are left to the platform shell; this
//! view only shows where things are.

use bevy::gizmos::config::{GizmoConfigGroup, GizmoConfigStore};
use bevy::prelude::*;

use crate::config::DiaryConfig;
use crate::input::frame_to_world;
use crate::model::DrawingPath;
use crate::session::EditSession;

const FRAME_COLOR: Color = Color::srgb(0.6, 0.6, 0.6);
const OVERLAY_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.4);
const SELECTED_OVERLAY_COLOR: Color = Color::srgb(0.2, 0.6, 1.0);

#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct DiaryGizmoGroup;

fn configure_diary_gizmos(mut config_store: ResMut<GizmoConfigStore>) {
    let (config, _) = config_store.config_mut::<DiaryGizmoGroup>();
    config.line.width = 2.0;
}

fn draw_path(gizmos: &mut Gizmos<DiaryGizmoGroup>, path: &DrawingPath) {
    match path.points.as_slice() {
        [] => {}
        [single] => {
            gizmos.circle_2d(
                Isometry2d::from_translation(frame_to_world(*single)),
                path.line_width / 2.0,
                path.color,
            );
        }
        points => {
            for window in points.windows(2) {
                gizmos.line_2d(frame_to_world(window[0]), frame_to_world(window[1]), path.color);
            }
        }
    }
}

pub fn render_photo_frame(mut gizmos: Gizmos<DiaryGizmoGroup>, config: Res<DiaryConfig>) {
    let frame = config.frame();
    gizmos.rect_2d(
        Isometry2d::from_translation(frame_to_world(frame.center())),
        frame.size(),
        FRAME_COLOR,
    );
}

pub fn render_drawing_paths(mut gizmos: Gizmos<DiaryGizmoGroup>, session: Res<EditSession>) {
    let Some(entry) = session.active_entry() else {
        return;
    };
    for path in &entry.drawing_paths {
        draw_path(&mut gizmos, path);
    }
    if let Some(stroke) = session.current_stroke() {
        draw_path(&mut gizmos, stroke);
    }
}

pub fn render_overlay_boxes(
    mut gizmos: Gizmos<DiaryGizmoGroup>,
    session: Res<EditSession>,
    config: Res<DiaryConfig>,
) {
    let Some(entry) = session.active_entry() else {
        return;
    };
    let frame = config.frame();
    let selected = session.modes().active_overlay();

    for overlay in &entry.text_overlays {
        let center = session.overlay_display_position(overlay.id, frame);
        let color = if selected == Some(overlay.id) {
            SELECTED_OVERLAY_COLOR
        } else {
            OVERLAY_COLOR
        };
        gizmos.rect_2d(
            Isometry2d::from_translation(frame_to_world(center)),
            overlay.box_size(),
            color,
        );
    }
}

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_gizmo_group::<DiaryGizmoGroup>()
            .add_systems(Startup, configure_diary_gizmos)
            .add_systems(
                Update,
                (render_photo_frame, render_drawing_paths, render_overlay_boxes),
            );
    }
}
