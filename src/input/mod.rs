//! Keyboard and pointer handling for the edit screen.
//!
//! Frame space is y-down with the photo frame centered on the origin, the
//! same orientation overlay positions are stored in. World space is Bevy's
//! y-up 2D space; the two differ only by the sign of `y`.

mod pointer;
mod shortcuts;
mod typing;

use bevy::prelude::*;

use crate::identity::is_authenticated;
use crate::session::InteractionModes;

pub use pointer::{OverlayDrag, hit_test_overlay};
pub use shortcuts::{ShortcutAction, apply_shortcut, shortcut_from_keys};
pub use typing::{TextKeyOutcome, apply_text_key};

/// Marker for the camera looking at the photo frame
#[derive(Component)]
pub struct DiaryCamera;

pub fn world_to_frame(world: Vec2) -> Vec2 {
    Vec2::new(world.x, -world.y)
}

pub fn frame_to_world(frame_point: Vec2) -> Vec2 {
    Vec2::new(frame_point.x, -frame_point.y)
}

/// True while keystrokes are text, not shortcuts
pub fn is_text_entry_active(modes: &InteractionModes) -> bool {
    modes.is_typing() || modes.is_showing_diary()
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((Camera2d, DiaryCamera));
}

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OverlayDrag>()
            .add_systems(Startup, spawn_camera)
            .add_systems(
                Update,
                (
                    shortcuts::handle_shortcuts,
                    typing::handle_typing,
                    pointer::handle_pointer,
                )
                    .chain()
                    .run_if(is_authenticated),
            );
    }
}
