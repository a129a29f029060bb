//! Point and marquee hit-testing in page space.
//!
//! Tolerances are configured in screen pixels and converted to page units at
//! the current view scale, so targets stay the same size on screen at every
//! zoom level.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::config::EngineConfig;
use crate::doc::{EntityId, EntityRef, EntityStore, Measurement, MeasurementKind, Shape, ShapeGeometry};
use crate::geometry::{Point, Rect, distance, distance_to_segment, point_in_polygon, rotate_point};

/// A manipulation handle on a selected entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
    Rotate,
    /// First endpoint of a line or arrow.
    Start,
    /// Second endpoint of a line or arrow.
    End,
    /// Vertex `i` of a point-sequence measurement.
    Vertex(usize),
}

impl Handle {
    /// The eight resize handles of a box-form shape, clockwise from north.
    pub const BOX: [Self; 8] = [Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W, Self::Nw];

    /// Position on the unit box centered at the origin, as `(-0.5..=0.5)`
    /// fractions of width and height. `None` for non-box handles.
    #[must_use]
    pub fn box_anchor(self) -> Option<(f64, f64)> {
        match self {
            Self::N => Some((0.0, -0.5)),
            Self::Ne => Some((0.5, -0.5)),
            Self::E => Some((0.5, 0.0)),
            Self::Se => Some((0.5, 0.5)),
            Self::S => Some((0.0, 0.5)),
            Self::Sw => Some((-0.5, 0.5)),
            Self::W => Some((-0.5, 0.0)),
            Self::Nw => Some((-0.5, -0.5)),
            Self::Rotate | Self::Start | Self::End | Self::Vertex(_) => None,
        }
    }
}

/// Which part of an entity was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    Handle(Handle),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: EntityId,
    pub part: HitPart,
}

/// Hit tolerances converted to page units for one view scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub handle_radius: f64,
    pub slop: f64,
    pub rotate_offset: f64,
    pub marker_radius: f64,
}

impl Tolerance {
    #[must_use]
    pub fn new(config: &EngineConfig, view_scale: f64) -> Self {
        Self {
            handle_radius: config.handle_radius_px / view_scale,
            slop: config.hit_slop_px / view_scale,
            rotate_offset: config.rotate_handle_offset_px / view_scale,
            marker_radius: config.marker_radius_px / view_scale,
        }
    }
}

/// Handle positions of an entity, in drawing order.
///
/// Box-form shapes get the eight resize handles plus the rotate handle,
/// all rotated with the shape. Lines and arrows get their endpoints.
/// Point-sequence measurements get one handle per vertex. Counts and
/// comments have no handles.
#[must_use]
pub fn handle_positions(entity: EntityRef<'_>, tol: &Tolerance) -> Vec<(Handle, Point)> {
    match entity {
        EntityRef::Shape(shape) => shape_handles(shape, tol),
        EntityRef::Measurement(m) => m
            .vertices()
            .iter()
            .enumerate()
            .map(|(i, p)| (Handle::Vertex(i), *p))
            .collect(),
    }
}

fn shape_handles(shape: &Shape, tol: &Tolerance) -> Vec<(Handle, Point)> {
    if let Some((start, end)) = shape.endpoints() {
        return vec![(Handle::Start, start), (Handle::End, end)];
    }
    let bounds = shape.bounds();
    let center = bounds.center();
    let mut handles: Vec<(Handle, Point)> = Handle::BOX
        .iter()
        .filter_map(|h| {
            let (fx, fy) = h.box_anchor()?;
            let local = Point::new(center.x + fx * bounds.width, center.y + fy * bounds.height);
            Some((*h, rotate_point(local, center, shape.rotation)))
        })
        .collect();
    handles.push((Handle::Rotate, rotate_handle_position(shape, tol)));
    handles
}

/// Rotate handle position: above the top edge by the rotate offset, turned
/// with the shape.
#[must_use]
pub fn rotate_handle_position(shape: &Shape, tol: &Tolerance) -> Point {
    let bounds = shape.bounds();
    let center = bounds.center();
    let local = Point::new(center.x, bounds.y - tol.rotate_offset);
    rotate_point(local, center, shape.rotation)
}

/// Test what is under `p` on `page_index`.
///
/// Handles of the single selected entity win, then bodies from the top of
/// the draw order down: measurements over shapes, later over earlier.
#[must_use]
pub fn hit_test(p: Point, store: &EntityStore, page_index: usize, tol: &Tolerance) -> Option<Hit> {
    if let Some(hit) = hit_selected_handle(p, store, page_index, tol) {
        return Some(hit);
    }
    if let Some(m) = store.measurements_on_page(page_index).rev().find(|m| measurement_contains(m, p, tol)) {
        return Some(Hit { id: m.id, part: HitPart::Body });
    }
    store
        .shapes_on_page(page_index)
        .rev()
        .find(|s| shape_contains(s, p, tol))
        .map(|s| Hit { id: s.id, part: HitPart::Body })
}

fn hit_selected_handle(p: Point, store: &EntityStore, page_index: usize, tol: &Tolerance) -> Option<Hit> {
    let id = store.selection().single()?;
    let entity = store.entity(&id)?;
    if entity.page_index() != page_index {
        return None;
    }
    let reach = tol.handle_radius + tol.slop * 0.5;
    handle_positions(entity, tol)
        .into_iter()
        .map(|(handle, at)| (handle, distance(p, at)))
        .filter(|(_, d)| *d <= reach)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(handle, _)| Hit { id, part: HitPart::Handle(handle) })
}

/// Body test for a shape, rotation-aware for box forms.
#[must_use]
pub fn shape_contains(shape: &Shape, p: Point, tol: &Tolerance) -> bool {
    let pad = tol.slop + shape.style.stroke_width * 0.5;
    match shape.geometry {
        ShapeGeometry::Rectangle { x, y, width, height } => {
            let frame = Rect::new(x, y, width, height);
            let local = rotate_point(p, frame.center(), -shape.rotation);
            frame.inflate(pad).contains_point(local)
        }
        ShapeGeometry::Circle { x, y, width, height } => {
            let frame = Rect::new(x, y, width, height);
            let center = frame.center();
            let local = rotate_point(p, center, -shape.rotation);
            let rx = width * 0.5 + pad;
            let ry = height * 0.5 + pad;
            let nx = (local.x - center.x) / rx;
            let ny = (local.y - center.y) / ry;
            nx * nx + ny * ny <= 1.0
        }
        ShapeGeometry::Line { start, end } | ShapeGeometry::Arrow { start, end } => {
            distance_to_segment(p, start, end) <= pad
        }
    }
}

/// Body test for a measurement.
#[must_use]
pub fn measurement_contains(m: &Measurement, p: Point, tol: &Tolerance) -> bool {
    match &m.kind {
        MeasurementKind::Length { points } => distance_to_segment(p, points[0], points[1]) <= tol.slop,
        MeasurementKind::Perimeter { points } => near_polyline(p, points, false, tol.slop),
        MeasurementKind::Area { points } => point_in_polygon(p, points) || near_polyline(p, points, true, tol.slop),
        MeasurementKind::Count { point } => distance(p, *point) <= tol.marker_radius + tol.slop * 0.5,
        MeasurementKind::Comment { tip, frame, .. } => {
            frame.inflate(tol.slop).contains_point(p)
                || distance_to_segment(p, *tip, frame.clamp_point(*tip)) <= tol.slop
        }
    }
}

fn near_polyline(p: Point, points: &[Point], closed: bool, slop: f64) -> bool {
    let open = points.windows(2).any(|w| distance_to_segment(p, w[0], w[1]) <= slop);
    if open || !closed {
        return open;
    }
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 2 => distance_to_segment(p, *last, *first) <= slop,
        _ => false,
    }
}

/// Every entity on `page_index` whose unrotated bounding box overlaps
/// `marquee`, shapes first, each group in draw order.
#[must_use]
pub fn marquee_hits(store: &EntityStore, page_index: usize, marquee: &Rect) -> Vec<EntityId> {
    let shapes = store
        .shapes_on_page(page_index)
        .filter(|s| s.bounds().intersects(marquee))
        .map(|s| s.id);
    let measurements = store
        .measurements_on_page(page_index)
        .filter(|m| m.bounds().intersects(marquee))
        .map(|m| m.id);
    shapes.chain(measurements).collect()
}
