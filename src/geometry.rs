//! Conversion between relative (fraction of frame) and absolute positions.
//!
//! Overlay positions are stored relative to the photo frame so they survive
//! layout changes. Absolute positions are derived when drawing and converted
//! back whenever a drag reports an absolute point.

use bevy::prelude::*;

/// A frame is usable only when both sides are positive and finite.
pub fn is_degenerate(frame: Rect) -> bool {
    let size = frame.size();
    !(size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0)
}

/// `(point - frame.min) / frame.size`, or `None` for a degenerate frame.
pub fn to_relative(point: Vec2, frame: Rect) -> Option<Vec2> {
    if is_degenerate(frame) {
        return None;
    }
    Some((point - frame.min) / frame.size())
}

/// `frame.min + relative * frame.size`. A degenerate frame yields `Vec2::ZERO`.
pub fn to_absolute(relative: Vec2, frame: Rect) -> Vec2 {
    if is_degenerate(frame) {
        return Vec2::ZERO;
    }
    frame.min + relative * frame.size()
}

/// Clamp a proposed overlay center so a box of `size` stays inside `frame`.
///
/// A box larger than the frame on some axis is centered on that axis.
pub fn clamp_center_to_frame(center: Vec2, size: Vec2, frame: Rect) -> Vec2 {
    let half = size.max(Vec2::ZERO) / 2.0;
    let clamp_axis = |value: f32, min: f32, max: f32, half: f32| {
        let low = min + half;
        let high = max - half;
        if low > high {
            (min + max) / 2.0
        } else {
            value.clamp(low, high)
        }
    };
    Vec2::new(
        clamp_axis(center.x, frame.min.x, frame.max.x, half.x),
        clamp_axis(center.y, frame.min.y, frame.max.y, half.y),
    )
}
