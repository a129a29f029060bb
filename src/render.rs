//! Scene building: turns document and interaction state into draw primitives.
//!
//! This module decides what is visible and how it looks, but never draws.
//! It reads the store, the gesture in progress and the view scale, and emits
//! an ordered [`Scene`] that a host-supplied [`Renderer`] paints. Entity
//! geometry is in page units. Decorations (selection frames, handles, labels,
//! previews) are sized as screen pixels divided by the view scale so they
//! look the same at every zoom.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::PI;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::consts::{
    ACCENT, AREA_FILL, COMMENT_FILL, COMMENT_FONT_SIZE, COMMENT_PADDING, COMMENT_TEXT, DEFAULT_UNIT, HANDLE_FILL,
    MARQUEE_FILL, MEASURE_COLOR, NONE,
};
use crate::doc::{
    Calibration, EntityId, EntityRef, EntityStore, Measurement, MeasurementKind, Shape, ShapeGeometry, ShapeStyle,
};
use crate::geometry::{
    Point, Rect, centroid, distance, polygon_area, polyline_length, rotate_point, to_real_area, to_real_length,
};
use crate::hit::{Handle, Tolerance, handle_positions};
use crate::input::{InteractionState, Tool};

/// Arrowhead half-angle in radians (~30°).
const ARROW_ANGLE: f64 = PI / 6.0;

/// Capture vertex dots are this fraction of a handle.
const VERTEX_DOT_RATIO: f64 = 0.6;

// =============================================================
// Host contract
// =============================================================

/// What kind of surface the renderer paints on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceKind {
    /// A fixed-size bitmap: content outside the page is wasted work.
    BoundedRaster,
    /// A resolution-independent surface such as SVG: include everything.
    UnboundedVector,
}

/// A host-supplied drawing backend.
pub trait Renderer {
    type Error;

    /// The surface this renderer paints on.
    fn capabilities(&self) -> SurfaceKind;

    /// Paint a complete scene, replacing whatever was drawn before.
    ///
    /// # Errors
    ///
    /// Whatever the backend reports; the engine passes it through.
    fn draw(&mut self, scene: &Scene) -> Result<(), Self::Error>;
}

// =============================================================
// Scene model
// =============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Layer {
    /// Document content: shapes, measurements and their labels.
    Entity,
    /// Selection frames, handles, marquee and gesture previews.
    Decoration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub color: String,
    pub width: f64,
    /// Alternating dash and gap lengths; `None` for a solid line.
    pub dash: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paint {
    pub stroke: Option<Stroke>,
    pub fill: Option<String>,
    pub opacity: f64,
}

/// Where a text primitive's `at` point sits relative to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAnchor {
    Center,
    TopLeft,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Primitive {
    /// Rectangle rotated clockwise by `rotation` degrees about its center.
    Rect { x: f64, y: f64, width: f64, height: f64, rotation: f64 },
    /// Ellipse rotated clockwise by `rotation` degrees about its center.
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64, rotation: f64 },
    Segment { from: Point, to: Point },
    Polyline { points: Vec<Point>, closed: bool },
    Circle { center: Point, radius: f64 },
    #[serde(rename_all = "camelCase")]
    Text { at: Point, text: String, font_size: f64, anchor: TextAnchor },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneItem {
    pub layer: Layer,
    /// The entity this item depicts, if any.
    pub source: Option<EntityId>,
    pub primitive: Primitive,
    pub paint: Paint,
}

/// Ordered draw list: earlier items are painted first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scene {
    pub items: Vec<SceneItem>,
}

impl Scene {
    #[must_use]
    pub fn items(&self) -> &[SceneItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &SceneItem> {
        self.items.iter().filter(move |i| i.layer == layer)
    }

    /// Items that depict `id`.
    pub fn for_entity(&self, id: EntityId) -> impl Iterator<Item = &SceneItem> {
        self.items.iter().filter(move |i| i.source == Some(id))
    }

    /// Every text string in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|i| match &i.primitive {
            Primitive::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

// =============================================================
// Labels
// =============================================================

/// `"2.00 m"`
#[must_use]
pub fn format_length(value: f64, unit: &str) -> String {
    format!("{value:.2} {unit}")
}

/// `"12.50 m²"`
#[must_use]
pub fn format_area(value: f64, unit: &str) -> String {
    format!("{value:.2} {unit}²")
}

/// Parse a dash pattern such as `"6,4"` or `"6 4"`. `"none"`, empty and
/// malformed patterns yield `None`.
#[must_use]
pub fn parse_dasharray(raw: &str) -> Option<Vec<f64>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case(NONE) {
        return None;
    }
    let mut dashes = Vec::new();
    for part in raw.split(|c: char| c == ',' || c.is_whitespace()).filter(|p| !p.is_empty()) {
        let Ok(v) = part.parse::<f64>() else {
            return None;
        };
        if !v.is_finite() || v < 0.0 {
            return None;
        }
        dashes.push(v);
    }
    if dashes.iter().all(|d| *d == 0.0) {
        return None;
    }
    Some(dashes)
}

// =============================================================
// Builder
// =============================================================

/// Everything the scene depends on.
#[derive(Debug, Clone, Copy)]
pub struct SceneInput<'a> {
    pub store: &'a EntityStore,
    pub page_index: usize,
    /// Page rectangle in page units, when the host has reported it.
    pub page_bounds: Option<Rect>,
    pub view_scale: f64,
    pub state: &'a InteractionState,
    /// Comment whose text the host is editing; its text is not drawn.
    pub editing: Option<EntityId>,
    pub config: &'a EngineConfig,
    pub surface: SurfaceKind,
}

/// Build the scene for the active page.
#[must_use]
pub fn build_scene(input: &SceneInput<'_>) -> Scene {
    let mut b = Builder { input, scale: input.view_scale, items: Vec::new() };
    b.entities();
    b.selection();
    b.interaction();
    Scene { items: b.items }
}

struct Builder<'a> {
    input: &'a SceneInput<'a>,
    scale: f64,
    items: Vec<SceneItem>,
}

impl Builder<'_> {
    fn px(&self, v: f64) -> f64 {
        v / self.scale
    }

    fn visible(&self, bounds: Rect) -> bool {
        match (self.input.surface, self.input.page_bounds) {
            (SurfaceKind::BoundedRaster, Some(page)) => page.intersects(&bounds),
            _ => true,
        }
    }

    fn push(&mut self, layer: Layer, source: Option<EntityId>, primitive: Primitive, paint: Paint) {
        self.items.push(SceneItem { layer, source, primitive, paint });
    }

    fn accent_stroke(&self, dashed: bool) -> Stroke {
        let c = self.input.config;
        let dash = self.px(c.selection_dash_px);
        Stroke {
            color: ACCENT.to_owned(),
            width: self.px(c.selection_stroke_px),
            dash: dashed.then(|| vec![dash, dash]),
        }
    }

    fn measure_stroke(&self) -> Stroke {
        Stroke { color: MEASURE_COLOR.to_owned(), width: self.px(self.input.config.measure_stroke_px), dash: None }
    }

    fn label(&mut self, source: Option<EntityId>, layer: Layer, at: Point, text: String) {
        let font_size = self.px(self.input.config.label_font_px);
        self.push(
            layer,
            source,
            Primitive::Text { at, text, font_size, anchor: TextAnchor::Center },
            filled(MEASURE_COLOR),
        );
    }

    // --- Entities ---

    fn entities(&mut self) {
        let store = self.input.store;
        let page = self.input.page_index;
        for shape in store.shapes_on_page(page) {
            if self.visible(shape_visual_bounds(shape)) {
                self.shape(&shape.geometry, shape.rotation, &shape.style, Layer::Entity, Some(shape.id));
            }
        }

        let calibration = store.calibration(page);
        let marker = self.px(self.input.config.marker_radius_px);
        let mut ordinal = 0usize;
        for m in store.measurements_on_page(page) {
            if matches!(m.kind, MeasurementKind::Count { .. }) {
                ordinal += 1;
            }
            if self.visible(m.bounds().inflate(marker)) {
                self.measurement(m, &calibration, ordinal);
            }
        }
    }

    fn shape(
        &mut self,
        geometry: &ShapeGeometry,
        rotation: f64,
        style: &ShapeStyle,
        layer: Layer,
        source: Option<EntityId>,
    ) {
        let paint = shape_paint(style);
        match *geometry {
            ShapeGeometry::Rectangle { x, y, width, height } => {
                self.push(layer, source, Primitive::Rect { x, y, width, height, rotation }, paint);
            }
            ShapeGeometry::Circle { x, y, width, height } => {
                let (rx, ry) = (width / 2.0, height / 2.0);
                self.push(layer, source, Primitive::Ellipse { cx: x + rx, cy: y + ry, rx, ry, rotation }, paint);
            }
            ShapeGeometry::Line { start, end } => {
                self.push(layer, source, Primitive::Segment { from: start, to: end }, paint);
            }
            ShapeGeometry::Arrow { start, end } => {
                let head_len = self.px(self.input.config.arrow_head_px).max(style.stroke_width * 2.0);
                self.push(layer, source, Primitive::Segment { from: start, to: end }, paint);
                let head = Paint {
                    stroke: None,
                    fill: (style.stroke != NONE).then(|| style.stroke.clone()),
                    opacity: style.opacity,
                };
                self.push(layer, source, arrowhead(start, end, head_len), head);
            }
        }
    }

    fn measurement(&mut self, m: &Measurement, calibration: &Calibration, ordinal: usize) {
        let id = Some(m.id);
        let offset = self.px(self.input.config.label_offset_px);
        let line = Paint { stroke: Some(self.measure_stroke()), fill: None, opacity: 1.0 };
        match &m.kind {
            MeasurementKind::Length { points } => {
                let [a, b] = *points;
                self.push(Layer::Entity, id, Primitive::Segment { from: a, to: b }, line);
                let value = to_real_length(distance(a, b), calibration.scale);
                let mid = a.midpoint(b);
                self.label(id, Layer::Entity, mid.offset(0.0, -offset), format_length(value, &calibration.unit));
            }
            MeasurementKind::Area { points } => {
                let paint = Paint { fill: Some(AREA_FILL.to_owned()), ..line };
                self.push(Layer::Entity, id, Primitive::Polyline { points: points.clone(), closed: true }, paint);
                if let (Ok(area), Some(at)) = (polygon_area(points), centroid(points)) {
                    let value = to_real_area(area, calibration.scale);
                    self.label(id, Layer::Entity, at, format_area(value, &calibration.unit));
                }
            }
            MeasurementKind::Perimeter { points } => {
                self.push(Layer::Entity, id, Primitive::Polyline { points: points.clone(), closed: false }, line);
                if let Some(at) = centroid(points) {
                    let value = to_real_length(polyline_length(points), calibration.scale);
                    self.label(id, Layer::Entity, at, format_length(value, &calibration.unit));
                }
            }
            MeasurementKind::Count { point } => {
                let radius = self.px(self.input.config.marker_radius_px);
                let marker = Paint {
                    stroke: Some(Stroke { color: HANDLE_FILL.to_owned(), ..self.measure_stroke() }),
                    fill: Some(MEASURE_COLOR.to_owned()),
                    opacity: 1.0,
                };
                self.push(Layer::Entity, id, Primitive::Circle { center: *point, radius }, marker);
                let font_size = self.px(self.input.config.label_font_px);
                self.push(
                    Layer::Entity,
                    id,
                    Primitive::Text { at: *point, text: ordinal.to_string(), font_size, anchor: TextAnchor::Center },
                    filled(HANDLE_FILL),
                );
            }
            MeasurementKind::Comment { tip, frame, text } => {
                let leader = Paint {
                    stroke: Some(Stroke { color: COMMENT_TEXT.to_owned(), ..self.measure_stroke() }),
                    fill: None,
                    opacity: 1.0,
                };
                let to = frame.clamp_point(*tip);
                self.push(Layer::Entity, id, Primitive::Segment { from: *tip, to }, leader.clone());
                let body = Paint { fill: Some(COMMENT_FILL.to_owned()), ..leader };
                self.push(Layer::Entity, id, rect_primitive(*frame, 0.0), body);
                if self.input.editing != Some(m.id) && !text.is_empty() {
                    self.push(
                        Layer::Entity,
                        id,
                        Primitive::Text {
                            at: Point::new(frame.x + COMMENT_PADDING, frame.y + COMMENT_PADDING),
                            text: text.clone(),
                            font_size: COMMENT_FONT_SIZE,
                            anchor: TextAnchor::TopLeft,
                        },
                        filled(COMMENT_TEXT),
                    );
                }
            }
        }
    }

    // --- Selection ---

    fn selection(&mut self) {
        let store = self.input.store;
        let page = self.input.page_index;
        let selection = store.selection();
        for id in selection.ids() {
            if let Some(entity) = store.entity(id).filter(|e| e.page_index() == page) {
                self.selection_frame(entity, selection.len() == 1);
            }
        }
        if let Some(entity) = selection.single().and_then(|id| store.entity(&id)) {
            if entity.page_index() == page {
                self.handles(entity);
            }
        }
    }

    fn selection_frame(&mut self, entity: EntityRef<'_>, single: bool) {
        let source = Some(entity.id());
        let frame = Paint { stroke: Some(self.accent_stroke(true)), fill: None, opacity: 1.0 };
        match entity {
            EntityRef::Shape(shape) => {
                if let Some(f) = shape.frame() {
                    self.push(Layer::Decoration, source, rect_primitive(f, shape.rotation), frame);
                } else if let (Some((a, b)), false) = (shape.endpoints(), single) {
                    let radius = self.px(self.input.config.handle_radius_px) * VERTEX_DOT_RATIO;
                    let dot = self.handle_paint();
                    for center in [a, b] {
                        self.push(Layer::Decoration, source, Primitive::Circle { center, radius }, dot.clone());
                    }
                }
            }
            EntityRef::Measurement(m) => {
                self.push(Layer::Decoration, source, rect_primitive(m.bounds(), 0.0), frame);
            }
        }
    }

    fn handle_paint(&self) -> Paint {
        Paint { stroke: Some(self.accent_stroke(false)), fill: Some(HANDLE_FILL.to_owned()), opacity: 1.0 }
    }

    fn handles(&mut self, entity: EntityRef<'_>) {
        let source = Some(entity.id());
        let tol = Tolerance::new(self.input.config, self.scale);
        let r = tol.handle_radius;
        let paint = self.handle_paint();
        let positions = handle_positions(entity, &tol);

        let north = positions.iter().find(|(h, _)| *h == Handle::N).map(|(_, p)| *p);
        let rotate = positions.iter().find(|(h, _)| *h == Handle::Rotate).map(|(_, p)| *p);
        if let (Some(from), Some(to)) = (north, rotate) {
            let connector = Paint { stroke: Some(self.accent_stroke(false)), fill: None, opacity: 1.0 };
            self.push(Layer::Decoration, source, Primitive::Segment { from, to }, connector);
        }

        for (handle, at) in positions {
            let primitive = match handle {
                Handle::Rotate | Handle::Start | Handle::End | Handle::Vertex(_) => {
                    Primitive::Circle { center: at, radius: r }
                }
                _ => Primitive::Rect { x: at.x - r, y: at.y - r, width: r * 2.0, height: r * 2.0, rotation: 0.0 },
            };
            self.push(Layer::Decoration, source, primitive, paint.clone());
        }
    }

    // --- Gesture previews ---

    fn interaction(&mut self) {
        let config = self.input.config;
        match self.input.state {
            InteractionState::Drawing { tool, anchor, current } => {
                if let Some(kind) = tool.shape_kind() {
                    let geometry = ShapeGeometry::from_drag(kind, *anchor, *current);
                    self.shape(&geometry, 0.0, self.input.store.default_style(), Layer::Decoration, None);
                }
            }
            InteractionState::Capturing { tool, points, hover } => {
                self.capture_preview(*tool, points, *hover);
            }
            InteractionState::PlacingComment { tip, hover, .. } => {
                let Some(at) = *hover else {
                    return;
                };
                let dashed = Paint { stroke: Some(self.accent_stroke(true)), fill: None, opacity: 1.0 };
                let frame = Rect::new(at.x, at.y, config.comment_box_width, config.comment_box_height);
                let to = frame.clamp_point(*tip);
                self.push(Layer::Decoration, None, Primitive::Segment { from: *tip, to }, dashed.clone());
                self.push(Layer::Decoration, None, rect_primitive(frame, 0.0), dashed);
            }
            InteractionState::SelectionDragging { anchor, current, .. } => {
                let paint =
                    Paint { stroke: Some(self.accent_stroke(true)), fill: Some(MARQUEE_FILL.to_owned()), opacity: 1.0 };
                self.push(Layer::Decoration, None, rect_primitive(Rect::from_corners(*anchor, *current), 0.0), paint);
            }
            InteractionState::Idle
            | InteractionState::DraggingItems { .. }
            | InteractionState::Resizing { .. }
            | InteractionState::Rotating { .. }
            | InteractionState::Panning { .. } => {}
        }
    }

    fn capture_preview(&mut self, tool: Tool, points: &[Point], hover: Option<Point>) {
        let mut path = points.to_vec();
        if let Some(h) = hover {
            path.push(h);
        }
        if path.len() >= 2 {
            let stroke = if tool == Tool::Calibrate { self.accent_stroke(true) } else { self.measure_stroke() };
            let closed = tool == Tool::Area && path.len() >= 3;
            let fill = closed.then(|| AREA_FILL.to_owned());
            self.push(
                Layer::Decoration,
                None,
                Primitive::Polyline { points: path.clone(), closed },
                Paint { stroke: Some(stroke), fill, opacity: 1.0 },
            );
        }
        if tool.is_two_click() && path.len() == 2 {
            let page_len = distance(path[0], path[1]);
            let text = if tool == Tool::Calibrate {
                format_length(page_len, DEFAULT_UNIT)
            } else {
                let c = self.input.store.calibration(self.input.page_index);
                format_length(to_real_length(page_len, c.scale), &c.unit)
            };
            let offset = self.px(self.input.config.label_offset_px);
            self.label(None, Layer::Decoration, path[0].midpoint(path[1]).offset(0.0, -offset), text);
        }
        let radius = self.px(self.input.config.handle_radius_px) * VERTEX_DOT_RATIO;
        let dot = self.handle_paint();
        for center in points {
            self.push(Layer::Decoration, None, Primitive::Circle { center: *center, radius }, dot.clone());
        }
    }
}

// =============================================================
// Helpers
// =============================================================

fn filled(color: &str) -> Paint {
    Paint { stroke: None, fill: Some(color.to_owned()), opacity: 1.0 }
}

fn rect_primitive(r: Rect, rotation: f64) -> Primitive {
    Primitive::Rect { x: r.x, y: r.y, width: r.width, height: r.height, rotation }
}

fn shape_paint(style: &ShapeStyle) -> Paint {
    let stroke = (style.stroke != NONE && style.stroke_width > 0.0).then(|| Stroke {
        color: style.stroke.clone(),
        width: style.stroke_width,
        dash: parse_dasharray(&style.stroke_dasharray),
    });
    let fill = (style.fill != NONE).then(|| style.fill.clone());
    Paint { stroke, fill, opacity: style.opacity }
}

fn arrowhead(start: Point, end: Point, len: f64) -> Primitive {
    let angle = (end.y - start.y).atan2(end.x - start.x);
    let left = Point::new(end.x - len * (angle - ARROW_ANGLE).cos(), end.y - len * (angle - ARROW_ANGLE).sin());
    let right = Point::new(end.x - len * (angle + ARROW_ANGLE).cos(), end.y - len * (angle + ARROW_ANGLE).sin());
    Primitive::Polyline { points: vec![end, left, right], closed: true }
}

/// Page-space footprint of a shape including rotation and stroke.
fn shape_visual_bounds(shape: &Shape) -> Rect {
    let pad = shape.style.stroke_width / 2.0;
    let Some(frame) = shape.frame() else {
        return shape.bounds().inflate(pad);
    };
    let c = frame.center();
    let corners = [
        Point::new(frame.x, frame.y),
        Point::new(frame.right(), frame.y),
        Point::new(frame.right(), frame.bottom()),
        Point::new(frame.x, frame.bottom()),
    ]
    .map(|p| rotate_point(p, c, shape.rotation));
    Rect::bounding(&corners).unwrap_or(frame).inflate(pad)
}
