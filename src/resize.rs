//! Pure resize and rotate math for handle drags.
//!
//! Every function takes the entity as it was when the gesture started plus
//! the cumulative pointer delta, and returns the new value. Nothing here
//! touches the store.

#[cfg(test)]
#[path = "resize_test.rs"]
mod resize_test;

use crate::consts::ROTATE_HANDLE_ANGLE_DEG;
use crate::doc::{Measurement, Shape, ShapeGeometry};
use crate::geometry::{Point, normalize_degrees};
use crate::hit::Handle;

/// Resize `shape` by dragging `handle` through the global delta `(dx, dy)`.
///
/// Box-form shapes project the delta into their rotated local frame, move
/// the edges named by the handle, re-normalize so that dragging an edge past
/// its opposite flips the box instead of inverting it, floor both sides at
/// `min_size`, and map the new local center back to page space so the
/// rotation pivot stays consistent. Endpoint-form shapes move only the named
/// endpoint. Handles that do not apply return an unchanged copy.
#[must_use]
pub fn resize_shape(shape: &Shape, handle: Handle, dx: f64, dy: f64, min_size: f64) -> Shape {
    let mut next = shape.clone();
    match &mut next.geometry {
        ShapeGeometry::Rectangle { x, y, width, height } | ShapeGeometry::Circle { x, y, width, height } => {
            let Some((fx, fy)) = handle.box_anchor() else {
                return shape.clone();
            };
            let (sin, cos) = shape.rotation.to_radians().sin_cos();
            let local_dx = dx * cos + dy * sin;
            let local_dy = -dx * sin + dy * cos;

            let (left, right) = match fx {
                f if f < 0.0 => floored_span(*width / 2.0, -*width / 2.0 + local_dx, -1.0, min_size),
                f if f > 0.0 => floored_span(-*width / 2.0, *width / 2.0 + local_dx, 1.0, min_size),
                _ => centered_span(*width, min_size),
            };
            let (top, bottom) = match fy {
                f if f < 0.0 => floored_span(*height / 2.0, -*height / 2.0 + local_dy, -1.0, min_size),
                f if f > 0.0 => floored_span(-*height / 2.0, *height / 2.0 + local_dy, 1.0, min_size),
                _ => centered_span(*height, min_size),
            };

            let (new_w, new_h) = (right - left, bottom - top);
            let local_cx = (left + right) / 2.0;
            let local_cy = (top + bottom) / 2.0;

            let old_center = Point::new(*x + *width / 2.0, *y + *height / 2.0);
            let center = Point::new(
                old_center.x + local_cx * cos - local_cy * sin,
                old_center.y + local_cx * sin + local_cy * cos,
            );
            *x = center.x - new_w / 2.0;
            *y = center.y - new_h / 2.0;
            *width = new_w;
            *height = new_h;
        }
        ShapeGeometry::Line { start, end } | ShapeGeometry::Arrow { start, end } => match handle {
            Handle::Start => *start = start.offset(dx, dy),
            Handle::End => *end = end.offset(dx, dy),
            _ => {}
        },
    }
    next
}

/// Interval between a fixed edge and a dragged one, ordered low to high.
/// Shorter than `min_size` grows from the fixed edge toward the dragged
/// edge, or toward `side` when the two coincide.
fn floored_span(fixed: f64, moved: f64, side: f64, min_size: f64) -> (f64, f64) {
    let (lo, hi) = (fixed.min(moved), fixed.max(moved));
    if hi - lo >= min_size {
        return (lo, hi);
    }
    let delta = moved - fixed;
    let upward = if delta.abs() > 0.0 { delta > 0.0 } else { side > 0.0 };
    if upward { (fixed, fixed + min_size) } else { (fixed - min_size, fixed) }
}

/// An axis the handle does not move, still floored at `min_size`.
fn centered_span(size: f64, min_size: f64) -> (f64, f64) {
    let half = size.max(min_size) / 2.0;
    (-half, half)
}

/// Move vertex `i` of a point-sequence measurement by `(dx, dy)`.
#[must_use]
pub fn move_vertex(measurement: &Measurement, handle: Handle, dx: f64, dy: f64) -> Measurement {
    let Handle::Vertex(i) = handle else {
        return measurement.clone();
    };
    match measurement.vertices().get(i) {
        Some(p) => measurement.with_vertex(i, p.offset(dx, dy)),
        None => measurement.clone(),
    }
}

/// Rotation in `[0, 360)` that puts the rotate handle under `pointer`.
///
/// The handle sits straight above the center at rotation 0, so the angle
/// from center to pointer is offset by the handle's placement. With `snap`
/// set, the result is rounded to the nearest multiple of `snap_step`.
#[must_use]
pub fn rotation_toward(center: Point, pointer: Point, snap: bool, snap_step: f64) -> f64 {
    let raw = (pointer.y - center.y).atan2(pointer.x - center.x).to_degrees() - ROTATE_HANDLE_ANGLE_DEG;
    let angle = if snap && snap_step > 0.0 { (raw / snap_step).round() * snap_step } else { raw };
    normalize_degrees(angle)
}

/// A copy of a box-form `shape` rotated to face `pointer`. Endpoint-form
/// shapes never rotate and come back unchanged.
#[must_use]
pub fn rotate_shape(shape: &Shape, pointer: Point, snap: bool, snap_step: f64) -> Shape {
    let mut next = shape.clone();
    if shape.is_box_form() {
        next.rotation = rotation_toward(shape.center(), pointer, snap, snap_step);
    }
    next
}
