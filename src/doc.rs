//! Document model: shapes, measurements, calibration and the in-memory store.
//!
//! This module defines what is annotated on a page (`Shape`, `Measurement`),
//! sparse-update types for incremental edits (`ShapePatch`,
//! `MeasurementPatch`), per-page calibration (`Calibration`) and the runtime
//! store that owns all live entities plus the selection (`EntityStore`).
//!
//! Updates never mutate a stored entity in place: the store builds a patched
//! copy and swaps it in. Snapshots taken by the history manager are therefore
//! plain value copies. The serialized form (`ProjectData`) is what an external
//! persistence layer reads and writes.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::consts::{DEFAULT_STROKE, DEFAULT_STROKE_WIDTH, DEFAULT_UNIT, NONE};
use crate::geometry::{Point, Rect};

/// Unique identifier for a shape or measurement.
pub type EntityId = Uuid;

// =============================================================
// Shapes
// =============================================================

/// The kind of a shape, without its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Line,
    Arrow,
}

impl ShapeKind {
    /// Box-form kinds are positioned by `x,y,width,height` and may rotate.
    #[must_use]
    pub fn is_box_form(self) -> bool {
        matches!(self, Self::Rectangle | Self::Circle)
    }
}

/// Stroke and fill applied to a shape. Missing keys take the default style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapeStyle {
    pub stroke: String,
    pub stroke_width: f64,
    /// Dash pattern such as `"6,4"`, or `"none"` for a solid stroke.
    pub stroke_dasharray: String,
    /// Fill color, or `"none"`.
    pub fill: String,
    pub opacity: f64,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke: DEFAULT_STROKE.to_owned(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            stroke_dasharray: NONE.to_owned(),
            fill: NONE.to_owned(),
            opacity: 1.0,
        }
    }
}

/// Geometry of a shape in page space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeGeometry {
    /// Rectangle; `x,y` is the top-left corner before rotation.
    Rectangle { x: f64, y: f64, width: f64, height: f64 },
    /// Ellipse inscribed in the box.
    Circle { x: f64, y: f64, width: f64, height: f64 },
    /// Straight segment.
    Line { start: Point, end: Point },
    /// Segment with an arrowhead at `end`.
    Arrow { start: Point, end: Point },
}

impl ShapeGeometry {
    /// Build box-form geometry of the given kind from a frame. Endpoint-form
    /// kinds use the frame's diagonal.
    #[must_use]
    pub fn from_frame(kind: ShapeKind, frame: Rect) -> Self {
        let Rect { x, y, width, height } = frame;
        match kind {
            ShapeKind::Rectangle => Self::Rectangle { x, y, width, height },
            ShapeKind::Circle => Self::Circle { x, y, width, height },
            ShapeKind::Line => Self::Line { start: Point::new(x, y), end: Point::new(x + width, y + height) },
            ShapeKind::Arrow => Self::Arrow { start: Point::new(x, y), end: Point::new(x + width, y + height) },
        }
    }

    /// Build geometry of the given kind from a drag gesture's anchor and release.
    #[must_use]
    pub fn from_drag(kind: ShapeKind, anchor: Point, release: Point) -> Self {
        match kind {
            ShapeKind::Rectangle | ShapeKind::Circle => Self::from_frame(kind, Rect::from_corners(anchor, release)),
            ShapeKind::Line => Self::Line { start: anchor, end: release },
            ShapeKind::Arrow => Self::Arrow { start: anchor, end: release },
        }
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Rectangle { .. } => ShapeKind::Rectangle,
            Self::Circle { .. } => ShapeKind::Circle,
            Self::Line { .. } => ShapeKind::Line,
            Self::Arrow { .. } => ShapeKind::Arrow,
        }
    }
}

/// A shape as stored in the document and in project data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub id: EntityId,
    pub page_index: usize,
    #[serde(flatten)]
    pub geometry: ShapeGeometry,
    #[serde(flatten)]
    pub style: ShapeStyle,
    /// Clockwise rotation in degrees around the box center. Always 0 for
    /// line and arrow.
    #[serde(default)]
    pub rotation: f64,
}

impl Shape {
    /// Create a shape with a fresh id.
    #[must_use]
    pub fn new(page_index: usize, geometry: ShapeGeometry, style: ShapeStyle) -> Self {
        Self { id: Uuid::new_v4(), page_index, geometry, style, rotation: 0.0 }
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    #[must_use]
    pub fn is_box_form(&self) -> bool {
        self.kind().is_box_form()
    }

    /// The unrotated box of a box-form shape.
    #[must_use]
    pub fn frame(&self) -> Option<Rect> {
        match self.geometry {
            ShapeGeometry::Rectangle { x, y, width, height } | ShapeGeometry::Circle { x, y, width, height } => {
                Some(Rect::new(x, y, width, height))
            }
            ShapeGeometry::Line { .. } | ShapeGeometry::Arrow { .. } => None,
        }
    }

    /// `(start, end)` of an endpoint-form shape.
    #[must_use]
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        match self.geometry {
            ShapeGeometry::Line { start, end } | ShapeGeometry::Arrow { start, end } => Some((start, end)),
            ShapeGeometry::Rectangle { .. } | ShapeGeometry::Circle { .. } => None,
        }
    }

    /// Bounding box of the unrotated geometry.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        match self.geometry {
            ShapeGeometry::Rectangle { x, y, width, height } | ShapeGeometry::Circle { x, y, width, height } => {
                Rect::new(x, y, width, height)
            }
            ShapeGeometry::Line { start, end } | ShapeGeometry::Arrow { start, end } => Rect::from_corners(start, end),
        }
    }

    /// Rotation pivot: the box center, or the segment midpoint.
    #[must_use]
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// A copy of this shape moved by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let geometry = match self.geometry {
            ShapeGeometry::Rectangle { x, y, width, height } => {
                ShapeGeometry::Rectangle { x: x + dx, y: y + dy, width, height }
            }
            ShapeGeometry::Circle { x, y, width, height } => ShapeGeometry::Circle { x: x + dx, y: y + dy, width, height },
            ShapeGeometry::Line { start, end } => ShapeGeometry::Line { start: start.offset(dx, dy), end: end.offset(dx, dy) },
            ShapeGeometry::Arrow { start, end } => ShapeGeometry::Arrow { start: start.offset(dx, dy), end: end.offset(dx, dy) },
        };
        Self { geometry, ..self.clone() }
    }
}

// =============================================================
// Measurements
// =============================================================

/// The kind of a measurement, without its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementType {
    Length,
    Area,
    Perimeter,
    Count,
    Comment,
}

impl MeasurementType {
    /// Minimum number of captured vertices needed to finalize, for the
    /// point-sequence kinds.
    #[must_use]
    pub fn min_points(self) -> usize {
        match self {
            Self::Length | Self::Perimeter => 2,
            Self::Area => 3,
            Self::Count | Self::Comment => 1,
        }
    }
}

/// Geometry and content of a measurement in page space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MeasurementKind {
    /// Straight distance between exactly two points.
    Length { points: [Point; 2] },
    /// Closed polygon; three or more points in insertion order.
    Area { points: Vec<Point> },
    /// Open polyline; two or more points in insertion order.
    Perimeter { points: Vec<Point> },
    /// A single counted marker.
    Count { point: Point },
    /// Text box with a leader to an anchor point.
    Comment {
        tip: Point,
        #[serde(rename = "box")]
        frame: Rect,
        text: String,
    },
}

impl MeasurementKind {
    #[must_use]
    pub fn measurement_type(&self) -> MeasurementType {
        match self {
            Self::Length { .. } => MeasurementType::Length,
            Self::Area { .. } => MeasurementType::Area,
            Self::Perimeter { .. } => MeasurementType::Perimeter,
            Self::Count { .. } => MeasurementType::Count,
            Self::Comment { .. } => MeasurementType::Comment,
        }
    }
}

/// A measurement as stored in the document and in project data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub id: EntityId,
    pub page_index: usize,
    #[serde(flatten)]
    pub kind: MeasurementKind,
}

impl Measurement {
    /// Create a measurement with a fresh id.
    #[must_use]
    pub fn new(page_index: usize, kind: MeasurementKind) -> Self {
        Self { id: Uuid::new_v4(), page_index, kind }
    }

    #[must_use]
    pub fn measurement_type(&self) -> MeasurementType {
        self.kind.measurement_type()
    }

    /// Editable vertices of the point-sequence kinds, in order.
    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        match &self.kind {
            MeasurementKind::Length { points } => points.as_slice(),
            MeasurementKind::Area { points } | MeasurementKind::Perimeter { points } => points.as_slice(),
            MeasurementKind::Count { .. } | MeasurementKind::Comment { .. } => &[],
        }
    }

    /// Bounding box of every point and box the measurement is made of.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        match &self.kind {
            MeasurementKind::Length { points } => Rect::from_corners(points[0], points[1]),
            MeasurementKind::Area { points } | MeasurementKind::Perimeter { points } => {
                Rect::bounding(points).unwrap_or_default()
            }
            MeasurementKind::Count { point } => Rect::new(point.x, point.y, 0.0, 0.0),
            MeasurementKind::Comment { tip, frame, .. } => frame.union(&Rect::new(tip.x, tip.y, 0.0, 0.0)),
        }
    }

    /// A copy of this measurement moved by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let kind = match &self.kind {
            MeasurementKind::Length { points } => {
                MeasurementKind::Length { points: [points[0].offset(dx, dy), points[1].offset(dx, dy)] }
            }
            MeasurementKind::Area { points } => {
                MeasurementKind::Area { points: points.iter().map(|p| p.offset(dx, dy)).collect() }
            }
            MeasurementKind::Perimeter { points } => {
                MeasurementKind::Perimeter { points: points.iter().map(|p| p.offset(dx, dy)).collect() }
            }
            MeasurementKind::Count { point } => MeasurementKind::Count { point: point.offset(dx, dy) },
            MeasurementKind::Comment { tip, frame, text } => MeasurementKind::Comment {
                tip: tip.offset(dx, dy),
                frame: Rect { x: frame.x + dx, y: frame.y + dy, ..*frame },
                text: text.clone(),
            },
        };
        Self { id: self.id, page_index: self.page_index, kind }
    }

    /// A copy with vertex `index` moved to `to`. Out-of-range indices and
    /// non-vertex kinds return an unchanged copy.
    #[must_use]
    pub fn with_vertex(&self, index: usize, to: Point) -> Self {
        let mut next = self.clone();
        match &mut next.kind {
            MeasurementKind::Length { points } => {
                if let Some(p) = points.get_mut(index) {
                    *p = to;
                }
            }
            MeasurementKind::Area { points } | MeasurementKind::Perimeter { points } => {
                if let Some(p) = points.get_mut(index) {
                    *p = to;
                }
            }
            MeasurementKind::Count { .. } | MeasurementKind::Comment { .. } => {}
        }
        next
    }
}

/// Borrowed view of either kind of entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityRef<'a> {
    Shape(&'a Shape),
    Measurement(&'a Measurement),
}

impl EntityRef<'_> {
    /// Owned copy of the referenced entity.
    #[must_use]
    pub fn to_entity(&self) -> Entity {
        match self {
            Self::Shape(s) => Entity::Shape((*s).clone()),
            Self::Measurement(m) => Entity::Measurement((*m).clone()),
        }
    }

    #[must_use]
    pub fn id(&self) -> EntityId {
        match self {
            Self::Shape(s) => s.id,
            Self::Measurement(m) => m.id,
        }
    }

    #[must_use]
    pub fn page_index(&self) -> usize {
        match self {
            Self::Shape(s) => s.page_index,
            Self::Measurement(m) => m.page_index,
        }
    }

    /// Bounding box of the unrotated geometry.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Shape(s) => s.bounds(),
            Self::Measurement(m) => m.bounds(),
        }
    }
}

/// Owned value of either kind of entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Shape(Shape),
    Measurement(Measurement),
}

impl Entity {
    #[must_use]
    pub fn id(&self) -> EntityId {
        match self {
            Self::Shape(s) => s.id,
            Self::Measurement(m) => m.id,
        }
    }
}

// =============================================================
// Sparse updates
// =============================================================

/// Sparse update for a shape. Only present fields are applied; fields that do
/// not match the shape's geometry are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<Point>,
    /// Ignored for line and arrow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl ShapePatch {
    /// Build the patched copy of `shape`.
    #[must_use]
    pub fn apply_to(&self, shape: &Shape) -> Shape {
        let mut next = shape.clone();
        if let Some(page) = self.page_index {
            next.page_index = page;
        }
        match &mut next.geometry {
            ShapeGeometry::Rectangle { x, y, width, height } | ShapeGeometry::Circle { x, y, width, height } => {
                if let Some(v) = self.x {
                    *x = v;
                }
                if let Some(v) = self.y {
                    *y = v;
                }
                if let Some(v) = self.width {
                    *width = v.max(0.0);
                }
                if let Some(v) = self.height {
                    *height = v.max(0.0);
                }
                if let Some(r) = self.rotation {
                    next.rotation = r;
                }
            }
            ShapeGeometry::Line { start, end } | ShapeGeometry::Arrow { start, end } => {
                if let Some(p) = self.start {
                    *start = p;
                }
                if let Some(p) = self.end {
                    *end = p;
                }
            }
        }
        if let Some(ref s) = self.stroke {
            next.style.stroke.clone_from(s);
        }
        if let Some(w) = self.stroke_width {
            next.style.stroke_width = w.max(0.0);
        }
        if let Some(ref d) = self.stroke_dasharray {
            next.style.stroke_dasharray.clone_from(d);
        }
        if let Some(ref f) = self.fill {
            next.style.fill.clone_from(f);
        }
        if let Some(o) = self.opacity {
            next.style.opacity = o.clamp(0.0, 1.0);
        }
        next
    }
}

/// Sparse update for a measurement. Point lists that would violate the
/// kind's vertex count are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<Point>,
    #[serde(rename = "box", skip_serializing_if = "Option::is_none")]
    pub frame: Option<Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl MeasurementPatch {
    /// Build the patched copy of `measurement`.
    #[must_use]
    pub fn apply_to(&self, measurement: &Measurement) -> Measurement {
        let mut next = measurement.clone();
        if let Some(page) = self.page_index {
            next.page_index = page;
        }
        match &mut next.kind {
            MeasurementKind::Length { points } => {
                if let Some([a, b]) = self.points.as_deref() {
                    *points = [*a, *b];
                }
            }
            MeasurementKind::Area { points } => {
                if let Some(new_points) = self.points.as_ref().filter(|p| p.len() >= MeasurementType::Area.min_points()) {
                    points.clone_from(new_points);
                }
            }
            MeasurementKind::Perimeter { points } => {
                if let Some(new_points) =
                    self.points.as_ref().filter(|p| p.len() >= MeasurementType::Perimeter.min_points())
                {
                    points.clone_from(new_points);
                }
            }
            MeasurementKind::Count { point } => {
                if let Some(p) = self.point {
                    *point = p;
                }
            }
            MeasurementKind::Comment { tip, frame, text } => {
                if let Some(p) = self.tip {
                    *tip = p;
                }
                if let Some(f) = self.frame {
                    *frame = Rect { width: f.width.max(0.0), height: f.height.max(0.0), ..f };
                }
                if let Some(ref t) = self.text {
                    text.clone_from(t);
                }
            }
        }
        next
    }
}

// =============================================================
// Calibration
// =============================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    #[error("calibration scale must be positive and finite, got {0}")]
    InvalidScale(f64),
    #[error("calibration unit must not be empty")]
    EmptyUnit,
}

/// Page units per real unit, with the real unit's label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub scale: f64,
    pub unit: String,
}

impl Default for Calibration {
    fn default() -> Self {
        Self { scale: 1.0, unit: DEFAULT_UNIT.to_owned() }
    }
}

impl Calibration {
    /// Validate and build a calibration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidScale` for a non-positive or non-finite scale and
    /// `EmptyUnit` for a blank unit label.
    pub fn new(scale: f64, unit: &str) -> Result<Self, CalibrationError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(CalibrationError::InvalidScale(scale));
        }
        let unit = unit.trim();
        if unit.is_empty() {
            return Err(CalibrationError::EmptyUnit);
        }
        Ok(Self { scale, unit: unit.to_owned() })
    }
}

// =============================================================
// Selection
// =============================================================

/// Ordered set of selected entity ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<EntityId>,
}

impl Selection {
    #[must_use]
    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The only selected id, when exactly one entity is selected.
    #[must_use]
    pub fn single(&self) -> Option<EntityId> {
        match self.ids.as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }

    fn insert(&mut self, id: EntityId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    fn remove(&mut self, id: &EntityId) {
        self.ids.retain(|x| x != id);
    }

    fn clear(&mut self) {
        self.ids.clear();
    }

    fn retain<F: Fn(&EntityId) -> bool>(&mut self, keep: F) {
        self.ids.retain(|id| keep(id));
    }
}

// =============================================================
// Snapshots and project data
// =============================================================

/// Full value copy of the undoable document state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub shapes: Vec<Shape>,
    pub measurements: Vec<Measurement>,
    pub calibrations: BTreeMap<usize, Calibration>,
}

/// Serialized project document exchanged with an external persistence layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    #[serde(default)]
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
    #[serde(default)]
    pub calibration_scales: BTreeMap<usize, f64>,
    #[serde(default)]
    pub page_units: BTreeMap<usize, String>,
}

// =============================================================
// Store
// =============================================================

/// In-memory store of shapes, measurements, calibrations and selection.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    shapes: Vec<Shape>,
    measurements: Vec<Measurement>,
    calibrations: BTreeMap<usize, Calibration>,
    selection: Selection,
    default_style: ShapeStyle,
}

impl EntityStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Shapes ---

    /// Insert a shape, or replace the stored shape with the same `id`.
    pub fn add_shape(&mut self, shape: Shape) -> EntityId {
        let id = shape.id;
        if let Some(slot) = self.shapes.iter_mut().find(|s| s.id == id) {
            *slot = shape;
        } else {
            self.shapes.push(shape);
        }
        id
    }

    /// Apply a sparse update. Returns `false` if the shape doesn't exist.
    pub fn update_shape(&mut self, id: &EntityId, patch: &ShapePatch) -> bool {
        let Some(slot) = self.shapes.iter_mut().find(|s| s.id == *id) else {
            return false;
        };
        *slot = patch.apply_to(slot);
        true
    }

    /// Swap in a whole new value for an existing shape. Returns `false` if no
    /// shape with that id exists.
    pub fn replace_shape(&mut self, shape: Shape) -> bool {
        let Some(slot) = self.shapes.iter_mut().find(|s| s.id == shape.id) else {
            return false;
        };
        *slot = shape;
        true
    }

    /// Remove a shape by id, returning it if it was present.
    pub fn delete_shape(&mut self, id: &EntityId) -> Option<Shape> {
        let pos = self.shapes.iter().position(|s| s.id == *id)?;
        self.selection.remove(id);
        Some(self.shapes.remove(pos))
    }

    #[must_use]
    pub fn shape(&self, id: &EntityId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == *id)
    }

    /// All shapes in draw order.
    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shapes_on_page(&self, page_index: usize) -> impl DoubleEndedIterator<Item = &Shape> {
        self.shapes.iter().filter(move |s| s.page_index == page_index)
    }

    // --- Measurements ---

    /// Insert a measurement, or replace the stored one with the same `id`.
    pub fn add_measurement(&mut self, measurement: Measurement) -> EntityId {
        let id = measurement.id;
        if let Some(slot) = self.measurements.iter_mut().find(|m| m.id == id) {
            *slot = measurement;
        } else {
            self.measurements.push(measurement);
        }
        id
    }

    /// Apply a sparse update. Returns `false` if the measurement doesn't exist.
    pub fn update_measurement(&mut self, id: &EntityId, patch: &MeasurementPatch) -> bool {
        let Some(slot) = self.measurements.iter_mut().find(|m| m.id == *id) else {
            return false;
        };
        *slot = patch.apply_to(slot);
        true
    }

    /// Swap in a whole new value for an existing measurement.
    pub fn replace_measurement(&mut self, measurement: Measurement) -> bool {
        let Some(slot) = self.measurements.iter_mut().find(|m| m.id == measurement.id) else {
            return false;
        };
        *slot = measurement;
        true
    }

    /// Remove a measurement by id, returning it if it was present.
    pub fn delete_measurement(&mut self, id: &EntityId) -> Option<Measurement> {
        let pos = self.measurements.iter().position(|m| m.id == *id)?;
        self.selection.remove(id);
        Some(self.measurements.remove(pos))
    }

    #[must_use]
    pub fn measurement(&self, id: &EntityId) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.id == *id)
    }

    /// All measurements in draw order.
    #[must_use]
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn measurements_on_page(&self, page_index: usize) -> impl DoubleEndedIterator<Item = &Measurement> {
        self.measurements.iter().filter(move |m| m.page_index == page_index)
    }

    // --- Entities ---

    /// Whether a shape or measurement with this id exists.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.shape(id).is_some() || self.measurement(id).is_some()
    }

    /// Look up a shape or measurement by id.
    #[must_use]
    pub fn entity(&self, id: &EntityId) -> Option<EntityRef<'_>> {
        self.shape(id)
            .map(EntityRef::Shape)
            .or_else(|| self.measurement(id).map(EntityRef::Measurement))
    }

    /// Swap in a whole new value for an existing entity of either kind.
    pub fn replace(&mut self, entity: Entity) -> bool {
        match entity {
            Entity::Shape(s) => self.replace_shape(s),
            Entity::Measurement(m) => self.replace_measurement(m),
        }
    }

    /// A copy of the entity moved by `(dx, dy)` replaces the stored one.
    /// Returns `false` for unknown ids.
    pub fn translate(&mut self, id: &EntityId, dx: f64, dy: f64) -> bool {
        if let Some(slot) = self.shapes.iter_mut().find(|s| s.id == *id) {
            *slot = slot.translated(dx, dy);
            return true;
        }
        if let Some(slot) = self.measurements.iter_mut().find(|m| m.id == *id) {
            *slot = slot.translated(dx, dy);
            return true;
        }
        false
    }

    /// Delete a shape or measurement. Returns `true` if something was removed.
    pub fn delete(&mut self, id: &EntityId) -> bool {
        self.delete_shape(id).is_some() || self.delete_measurement(id).is_some()
    }

    /// Total number of shapes and measurements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len() + self.measurements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.measurements.is_empty()
    }

    // --- Selection ---

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn is_selected(&self, id: &EntityId) -> bool {
        self.selection.contains(id)
    }

    /// Replace the selection with a single id. Unknown ids clear it.
    pub fn select(&mut self, id: EntityId) {
        self.selection.clear();
        if self.contains(&id) {
            self.selection.insert(id);
        }
    }

    /// Replace the selection with `ids`, dropping unknown ones.
    pub fn set_selection<I: IntoIterator<Item = EntityId>>(&mut self, ids: I) {
        self.selection.clear();
        for id in ids {
            if self.contains(&id) {
                self.selection.insert(id);
            }
        }
    }

    /// Add `id` to the selection if absent, remove it if present.
    pub fn toggle_selection(&mut self, id: EntityId) {
        if self.selection.contains(&id) {
            self.selection.remove(&id);
        } else if self.contains(&id) {
            self.selection.insert(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Delete every selected entity and clear the selection. Returns the ids
    /// that were removed.
    pub fn delete_selected(&mut self) -> Vec<EntityId> {
        let ids = self.selection.ids().to_vec();
        let removed: Vec<EntityId> = ids.into_iter().filter(|id| self.delete(id)).collect();
        self.selection.clear();
        removed
    }

    // --- Calibration ---

    /// Calibration for a page, falling back to scale 1 in `"px"`.
    #[must_use]
    pub fn calibration(&self, page_index: usize) -> Calibration {
        self.calibrations.get(&page_index).cloned().unwrap_or_default()
    }

    /// Assign a page's calibration.
    ///
    /// # Errors
    ///
    /// Rejects invalid scales and blank units; the store is left unchanged.
    pub fn set_calibration(&mut self, page_index: usize, scale: f64, unit: &str) -> Result<(), CalibrationError> {
        let calibration = Calibration::new(scale, unit).inspect_err(|e| {
            warn!(page_index, scale, error = %e, "rejected calibration");
        })?;
        info!(page_index, scale, unit = %calibration.unit, "page calibrated");
        self.calibrations.insert(page_index, calibration);
        Ok(())
    }

    // --- Default style ---

    #[must_use]
    pub fn default_style(&self) -> &ShapeStyle {
        &self.default_style
    }

    pub fn set_default_style(&mut self, style: ShapeStyle) {
        self.default_style = style;
    }

    // --- Snapshots ---

    /// Deep copy of the undoable state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            shapes: self.shapes.clone(),
            measurements: self.measurements.clone(),
            calibrations: self.calibrations.clone(),
        }
    }

    /// Replace the undoable state with a copy of `snapshot`. Selected ids that
    /// no longer exist are dropped from the selection.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.shapes.clone_from(&snapshot.shapes);
        self.measurements.clone_from(&snapshot.measurements);
        self.calibrations.clone_from(&snapshot.calibrations);
        let shapes = &self.shapes;
        let measurements = &self.measurements;
        self.selection
            .retain(|id| shapes.iter().any(|s| s.id == *id) || measurements.iter().any(|m| m.id == *id));
    }

    // --- Project data ---

    /// Export the persisted document shape.
    #[must_use]
    pub fn to_project(&self) -> ProjectData {
        ProjectData {
            shapes: self.shapes.clone(),
            measurements: self.measurements.clone(),
            calibration_scales: self.calibrations.iter().map(|(page, c)| (*page, c.scale)).collect(),
            page_units: self.calibrations.iter().map(|(page, c)| (*page, c.unit.clone())).collect(),
        }
    }

    /// Replace the whole document with `data` and clear the selection.
    /// Invalid calibration entries are skipped.
    pub fn load_project(&mut self, data: ProjectData) {
        let ProjectData { shapes, measurements, calibration_scales, page_units } = data;
        self.shapes = shapes;
        self.measurements = measurements;
        self.calibrations.clear();
        self.selection.clear();

        let mut pages: Vec<usize> = calibration_scales.keys().chain(page_units.keys()).copied().collect();
        pages.sort_unstable();
        pages.dedup();
        for page in pages {
            let scale = calibration_scales.get(&page).copied().unwrap_or(1.0);
            let unit = page_units.get(&page).map_or(DEFAULT_UNIT, String::as_str);
            match Calibration::new(scale, unit) {
                Ok(c) => {
                    self.calibrations.insert(page, c);
                }
                Err(e) => warn!(page, error = %e, "skipping invalid calibration in project"),
            }
        }
        info!(
            shapes = self.shapes.len(),
            measurements = self.measurements.len(),
            calibrations = self.calibrations.len(),
            "project loaded"
        );
    }
}
