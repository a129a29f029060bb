//! Engine core: pointer and keyboard dispatch over the document.
//!
//! `EngineCore` owns every piece of editor state and is driven entirely by
//! method calls, so it can be tested without a host. `Engine` wraps it
//! together with a host [`Renderer`].
//!
//! Pointer positions arrive already converted to page space. Handlers never
//! fail: each returns the [`Action`]s the host should react to.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::debug;

use crate::camera::Camera;
use crate::clipboard::Clipboard;
use crate::config::EngineConfig;
use crate::doc::{
    Calibration, CalibrationError, Entity, EntityId, EntityStore, Measurement, MeasurementKind, MeasurementPatch,
    ProjectData, Shape, ShapeGeometry, ShapePatch, ShapeStyle,
};
use crate::geometry::{Point, Rect, distance};
use crate::hit::{Handle, Hit, HitPart, Tolerance, hit_test, marquee_hits};
use crate::history::History;
use crate::input::{Button, CursorHint, InteractionState, Key, Modifiers, Tool, UiState};
use crate::render::{Renderer, Scene, SceneInput, SurfaceKind, build_scene};
use crate::resize::{move_vertex, resize_shape, rotate_shape};

/// Two clicks closer than this are the same vertex.
const DUPLICATE_VERTEX_EPSILON: f64 = 1e-9;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    EntityCreated { id: EntityId },
    EntitiesChanged { ids: Vec<EntityId> },
    EntitiesDeleted { ids: Vec<EntityId> },
    /// Ask the host how long the captured distance is in real units, then
    /// call [`EngineCore::set_page_scale`].
    CalibrationRequested { page_index: usize, page_distance: f64 },
    /// Open a text editor over this comment, then call
    /// [`EngineCore::commit_comment_text`].
    EditCommentRequested { id: EntityId },
    ToolChanged { tool: Tool },
    HistoryChanged { can_undo: bool, can_redo: bool },
    /// Pan the viewport by this many screen pixels.
    PanRequested { dx: f64, dy: f64 },
    RenderNeeded,
}

/// Core engine state: all logic that doesn't depend on a drawing backend.
pub struct EngineCore {
    pub store: EntityStore,
    pub history: History,
    pub clipboard: Clipboard,
    pub ui: UiState,
    pub state: InteractionState,
    pub camera: Camera,
    pub page_index: usize,
    /// Page rectangle in page units, once the host has reported a size.
    pub page_bounds: Option<Rect>,
    pub config: EngineConfig,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        let mut store = EntityStore::new();
        store.set_default_style(config.default_style.clone());
        let history = History::new(&store, config.history_limit);
        Self {
            store,
            history,
            clipboard: Clipboard::new(),
            ui: UiState::default(),
            state: InteractionState::Idle,
            camera: Camera::default(),
            page_index: 0,
            page_bounds: None,
            config,
        }
    }

    // --- Host inputs ---

    /// Switch tools. Any gesture in progress is cancelled.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.cancel_gesture();
        self.ui.editing = None;
        self.ui.tool = tool;
        vec![Action::ToolChanged { tool }, Action::RenderNeeded]
    }

    /// Make `page_index` the active page. A non-positive or non-finite size
    /// means the page size is unknown.
    pub fn set_page(&mut self, page_index: usize, width: f64, height: f64) -> Vec<Action> {
        self.cancel_gesture();
        if page_index != self.page_index {
            self.ui.editing = None;
            self.store.clear_selection();
        }
        self.page_index = page_index;
        let known = width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0;
        self.page_bounds = known.then(|| Rect::new(0.0, 0.0, width, height));
        vec![Action::RenderNeeded]
    }

    /// Mirror the host viewport.
    pub fn set_camera(&mut self, camera: Camera) -> Vec<Action> {
        self.camera = camera;
        vec![Action::RenderNeeded]
    }

    pub fn set_default_style(&mut self, style: ShapeStyle) {
        self.store.set_default_style(style);
    }

    #[must_use]
    pub fn view_scale(&self) -> f64 {
        self.camera.view_scale()
    }

    fn tolerance(&self) -> Tolerance {
        Tolerance::new(&self.config, self.view_scale())
    }

    // --- Pointer events ---

    pub fn on_pointer_down(&mut self, p: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if button == Button::Secondary {
            return Vec::new();
        }
        if self.state.is_drag() {
            self.cancel_gesture();
        }
        self.ui.editing = None;

        let mut actions = Vec::new();
        if button == Button::Middle || self.ui.tool == Tool::Pan {
            let suspended = std::mem::take(&mut self.state);
            let resume = (!suspended.is_idle()).then(|| Box::new(suspended));
            self.state = InteractionState::Panning { anchor: p, resume };
            return actions;
        }

        let tool = self.ui.tool;
        match tool {
            Tool::Select => self.select_down(p, modifiers),
            Tool::Rectangle | Tool::Circle | Tool::Line | Tool::Arrow => {
                self.state = InteractionState::Drawing { tool, anchor: p, current: p };
            }
            Tool::Length | Tool::Calibrate | Tool::Area | Tool::Perimeter => self.capture_click(tool, p, &mut actions),
            Tool::Count => {
                self.create_measurement(MeasurementKind::Count { point: p }, &mut actions);
            }
            Tool::Comment => self.comment_down(p),
            Tool::Pan => {}
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn on_pointer_move(&mut self, p: Point, modifiers: Modifiers) -> Vec<Action> {
        let scale = self.view_scale();
        match &mut self.state {
            InteractionState::Idle => return Vec::new(),
            InteractionState::Drawing { current, .. } | InteractionState::SelectionDragging { current, .. } => {
                *current = p;
            }
            InteractionState::Capturing { hover, .. } | InteractionState::PlacingComment { hover, .. } => {
                *hover = Some(p);
            }
            InteractionState::DraggingItems { origin, base } => {
                let (dx, dy) = (p.x - origin.x, p.y - origin.y);
                self.store.restore(base);
                let ids = self.store.selection().ids().to_vec();
                for id in &ids {
                    self.store.translate(id, dx, dy);
                }
            }
            InteractionState::Resizing { handle, origin, original, .. } => {
                let (dx, dy) = (p.x - origin.x, p.y - origin.y);
                let next = match original {
                    Entity::Shape(s) => Entity::Shape(resize_shape(s, *handle, dx, dy, self.config.min_shape_size)),
                    Entity::Measurement(m) => Entity::Measurement(move_vertex(m, *handle, dx, dy)),
                };
                self.store.replace(next);
            }
            InteractionState::Rotating { original, .. } => {
                if let Entity::Shape(s) = original {
                    let next = rotate_shape(s, p, modifiers.shift, self.config.rotate_snap_deg);
                    self.store.replace_shape(next);
                }
            }
            InteractionState::Panning { anchor, .. } => {
                let (dx, dy) = ((p.x - anchor.x) * scale, (p.y - anchor.y) * scale);
                return vec![Action::PanRequested { dx, dy }];
            }
        }
        vec![Action::RenderNeeded]
    }

    pub fn on_pointer_up(&mut self, p: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        match std::mem::take(&mut self.state) {
            InteractionState::Idle => return actions,
            state @ InteractionState::Capturing { .. } => {
                self.state = state;
                return actions;
            }
            InteractionState::PlacingComment { tip, hover, confirming } => {
                if confirming {
                    self.create_comment(tip, p, &mut actions);
                } else {
                    self.state = InteractionState::PlacingComment { tip, hover, confirming };
                    return actions;
                }
            }
            InteractionState::Drawing { tool, anchor, .. } => self.finish_drawing(tool, anchor, p, &mut actions),
            InteractionState::SelectionDragging { anchor, additive, .. } => {
                self.finish_marquee(Rect::from_corners(anchor, p), additive);
            }
            InteractionState::DraggingItems { base, .. } => {
                if self.store.snapshot() != base {
                    actions.push(Action::EntitiesChanged { ids: self.store.selection().ids().to_vec() });
                    self.commit(&mut actions);
                }
            }
            InteractionState::Resizing { id, original, .. } | InteractionState::Rotating { id, original, .. } => {
                let changed = self.store.entity(&id).is_some_and(|e| e.to_entity() != original);
                if changed {
                    actions.push(Action::EntitiesChanged { ids: vec![id] });
                    self.commit(&mut actions);
                }
            }
            InteractionState::Panning { resume, .. } => {
                self.state = resume.map(|s| *s).unwrap_or_default();
                return actions;
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Finish a polygon capture, or open the editor on a comment.
    pub fn on_double_click(&mut self, p: Point, _modifiers: Modifiers) -> Vec<Action> {
        if matches!(self.state, InteractionState::Capturing { .. }) {
            return self.finalize();
        }
        if self.ui.tool != Tool::Select || !self.state.is_idle() {
            return Vec::new();
        }
        let Some(Hit { id, part: HitPart::Body }) = hit_test(p, &self.store, self.page_index, &self.tolerance()) else {
            return Vec::new();
        };
        let is_comment = self.store.measurement(&id).is_some_and(|m| matches!(m.kind, MeasurementKind::Comment { .. }));
        if !is_comment {
            return Vec::new();
        }
        self.store.select(id);
        self.ui.editing = Some(id);
        vec![Action::EditCommentRequested { id }, Action::RenderNeeded]
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if self.ui.editing.is_some() {
            if key.0 == "Escape" {
                self.ui.editing = None;
                return vec![Action::RenderNeeded];
            }
            return Vec::new();
        }
        match key.0.as_str() {
            "Escape" => return self.escape(),
            "Enter" => return self.finalize(),
            "Delete" | "Backspace" => return self.delete_selected(),
            _ => {}
        }
        if !modifiers.command() {
            return Vec::new();
        }
        if key.is_letter('z') {
            if modifiers.shift { self.redo() } else { self.undo() }
        } else if key.is_letter('y') {
            self.redo()
        } else if key.is_letter('c') {
            self.copy();
            Vec::new()
        } else if key.is_letter('x') {
            self.cut()
        } else if key.is_letter('v') {
            self.paste()
        } else {
            Vec::new()
        }
    }

    // --- Commands ---

    /// Cancel the gesture in progress, restoring the document exactly. With
    /// nothing in progress, clear the selection instead.
    pub fn escape(&mut self) -> Vec<Action> {
        if self.ui.editing.take().is_some() {
            return vec![Action::RenderNeeded];
        }
        if !self.cancel_gesture() {
            if self.store.selection().is_empty() {
                return Vec::new();
            }
            self.store.clear_selection();
        }
        vec![Action::RenderNeeded]
    }

    /// Whether the polygon capture in progress has enough vertices.
    #[must_use]
    pub fn can_finalize(&self) -> bool {
        match &self.state {
            InteractionState::Capturing { tool, points, .. } if tool.is_multi_click() => {
                let needed = tool.measurement_type().map_or(usize::MAX, |t| t.min_points());
                collapse_duplicates(points.clone()).len() >= needed
            }
            _ => false,
        }
    }

    /// Complete an area or perimeter capture. With too few vertices the
    /// capture stays open.
    pub fn finalize(&mut self) -> Vec<Action> {
        let InteractionState::Capturing { tool, points, hover } = std::mem::take(&mut self.state) else {
            return Vec::new();
        };
        let points = collapse_duplicates(points);
        let needed = tool.measurement_type().map_or(usize::MAX, |t| t.min_points());
        if !tool.is_multi_click() || points.len() < needed {
            debug!(?tool, vertices = points.len(), "capture not ready to finalize");
            self.state = InteractionState::Capturing { tool, points, hover };
            return Vec::new();
        }
        let kind = match tool {
            Tool::Area => MeasurementKind::Area { points },
            _ => MeasurementKind::Perimeter { points },
        };
        let mut actions = Vec::new();
        self.create_measurement(kind, &mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn undo(&mut self) -> Vec<Action> {
        self.cancel_gesture();
        if !self.history.undo(&mut self.store) {
            return Vec::new();
        }
        self.after_restore()
    }

    pub fn redo(&mut self) -> Vec<Action> {
        self.cancel_gesture();
        if !self.history.redo(&mut self.store) {
            return Vec::new();
        }
        self.after_restore()
    }

    /// Copy the selection. Returns the number of entities copied.
    pub fn copy(&mut self) -> usize {
        self.clipboard.copy(&self.store)
    }

    pub fn cut(&mut self) -> Vec<Action> {
        self.cancel_gesture();
        let ids = self.clipboard.cut(&mut self.store);
        self.deleted(ids)
    }

    /// Paste onto the active page, offset from the originals.
    pub fn paste(&mut self) -> Vec<Action> {
        self.cancel_gesture();
        let ids = self.clipboard.paste(&mut self.store, self.page_index, self.config.paste_offset);
        if ids.is_empty() {
            return Vec::new();
        }
        let mut actions: Vec<Action> = ids.into_iter().map(|id| Action::EntityCreated { id }).collect();
        self.commit(&mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn delete_selected(&mut self) -> Vec<Action> {
        self.cancel_gesture();
        let ids = self.store.delete_selected();
        self.deleted(ids)
    }

    /// Property edit from the host's style or geometry panel. A gesture in
    /// progress is cancelled first.
    pub fn update_shape(&mut self, id: &EntityId, patch: &ShapePatch) -> Vec<Action> {
        self.cancel_gesture();
        let before = self.store.shape(id).cloned();
        if !self.store.update_shape(id, patch) || self.store.shape(id).cloned() == before {
            return Vec::new();
        }
        let mut actions = vec![Action::EntitiesChanged { ids: vec![*id] }];
        self.commit(&mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn update_measurement(&mut self, id: &EntityId, patch: &MeasurementPatch) -> Vec<Action> {
        self.cancel_gesture();
        let before = self.store.measurement(id).cloned();
        if !self.store.update_measurement(id, patch) || self.store.measurement(id).cloned() == before {
            return Vec::new();
        }
        let mut actions = vec![Action::EntitiesChanged { ids: vec![*id] }];
        self.commit(&mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Store edited comment text. Pushes history only when the text changed.
    /// Ends editing of that comment either way, and cancels any gesture in
    /// progress.
    pub fn commit_comment_text(&mut self, id: &EntityId, text: &str) -> Vec<Action> {
        self.cancel_gesture();
        if self.ui.editing == Some(*id) {
            self.ui.editing = None;
        }
        let unchanged = match self.store.measurement(id).map(|m| &m.kind) {
            Some(MeasurementKind::Comment { text: current, .. }) => current == text,
            _ => return Vec::new(),
        };
        if unchanged {
            return vec![Action::RenderNeeded];
        }
        let patch = MeasurementPatch { text: Some(text.to_owned()), ..Default::default() };
        self.store.update_measurement(id, &patch);
        let mut actions = vec![Action::EntitiesChanged { ids: vec![*id] }];
        self.commit(&mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Calibrate a page: `scale` page units per `unit`. A gesture in
    /// progress is cancelled before the change is recorded.
    ///
    /// # Errors
    ///
    /// Rejects a non-positive or non-finite scale and a blank unit. Nothing
    /// changes, an open gesture continues, and no history entry is pushed.
    pub fn set_page_scale(
        &mut self,
        page_index: usize,
        scale: f64,
        unit: &str,
    ) -> Result<Vec<Action>, CalibrationError> {
        Calibration::new(scale, unit)?;
        self.cancel_gesture();
        self.store.set_calibration(page_index, scale, unit)?;
        let mut actions = Vec::new();
        self.commit(&mut actions);
        actions.push(Action::RenderNeeded);
        Ok(actions)
    }

    /// Replace the document with imported project data and start a fresh
    /// history.
    pub fn load_project(&mut self, data: ProjectData) -> Vec<Action> {
        self.cancel_gesture();
        self.ui.editing = None;
        self.store.load_project(data);
        self.history.reset(&self.store);
        vec![self.history_changed(), Action::RenderNeeded]
    }

    #[must_use]
    pub fn project(&self) -> ProjectData {
        self.store.to_project()
    }

    // --- Queries ---

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.ui.tool
    }

    #[must_use]
    pub fn editing(&self) -> Option<EntityId> {
        self.ui.editing
    }

    #[must_use]
    pub fn selection(&self) -> &[EntityId] {
        self.store.selection().ids()
    }

    /// Cursor for the pointer hovering at `p`.
    #[must_use]
    pub fn cursor_hint(&self, p: Point) -> CursorHint {
        match &self.state {
            InteractionState::Panning { .. } => CursorHint::Grabbing,
            InteractionState::DraggingItems { .. } => CursorHint::Move,
            InteractionState::Resizing { handle, .. } => CursorHint::Resize(*handle),
            InteractionState::Rotating { .. } => CursorHint::Rotate,
            InteractionState::Drawing { .. } | InteractionState::Capturing { .. } => CursorHint::Crosshair,
            InteractionState::PlacingComment { .. } => CursorHint::Text,
            InteractionState::SelectionDragging { .. } => CursorHint::Default,
            InteractionState::Idle => match self.ui.tool {
                Tool::Select => match hit_test(p, &self.store, self.page_index, &self.tolerance()) {
                    Some(Hit { part: HitPart::Handle(Handle::Rotate), .. }) => CursorHint::Rotate,
                    Some(Hit { part: HitPart::Handle(h), .. }) => CursorHint::Resize(h),
                    Some(Hit { part: HitPart::Body, .. }) => CursorHint::Move,
                    None => CursorHint::Default,
                },
                Tool::Pan => CursorHint::Grab,
                Tool::Comment => CursorHint::Text,
                _ => CursorHint::Crosshair,
            },
        }
    }

    /// Build the scene for the active page.
    #[must_use]
    pub fn scene(&self, surface: SurfaceKind) -> Scene {
        build_scene(&SceneInput {
            store: &self.store,
            page_index: self.page_index,
            page_bounds: self.page_bounds,
            view_scale: self.view_scale(),
            state: &self.state,
            editing: self.ui.editing,
            config: &self.config,
            surface,
        })
    }

    // --- Gesture helpers ---

    fn select_down(&mut self, p: Point, modifiers: Modifiers) {
        let additive = modifiers.additive();
        let Some(hit) = hit_test(p, &self.store, self.page_index, &self.tolerance()) else {
            let base_selection = self.store.selection().ids().to_vec();
            if !additive {
                self.store.clear_selection();
            }
            self.state = InteractionState::SelectionDragging { anchor: p, current: p, additive, base_selection };
            return;
        };
        let Some((center, original)) = self.store.entity(&hit.id).map(|e| (e.bounds().center(), e.to_entity()))
        else {
            return;
        };
        match hit.part {
            HitPart::Handle(Handle::Rotate) => {
                self.state = InteractionState::Rotating { id: hit.id, center, original };
            }
            HitPart::Handle(handle) => {
                self.state = InteractionState::Resizing { id: hit.id, handle, origin: p, original };
            }
            HitPart::Body => {
                if additive {
                    self.store.toggle_selection(hit.id);
                    if !self.store.is_selected(&hit.id) {
                        return;
                    }
                } else if !self.store.is_selected(&hit.id) {
                    self.store.select(hit.id);
                }
                self.state = InteractionState::DraggingItems { origin: p, base: self.store.snapshot() };
            }
        }
    }

    fn capture_click(&mut self, tool: Tool, p: Point, actions: &mut Vec<Action>) {
        let mut points = match std::mem::take(&mut self.state) {
            InteractionState::Capturing { tool: current, points, .. } if current == tool => points,
            _ => Vec::new(),
        };
        points.push(p);
        if tool.is_two_click() && points.len() == 2 {
            self.finish_two_click(tool, points[0], points[1], actions);
        } else {
            self.state = InteractionState::Capturing { tool, points, hover: None };
        }
    }

    fn finish_two_click(&mut self, tool: Tool, a: Point, b: Point, actions: &mut Vec<Action>) {
        let page_distance = distance(a, b);
        if page_distance <= DUPLICATE_VERTEX_EPSILON {
            debug!(?tool, "discarded zero-length capture");
            return;
        }
        if tool == Tool::Calibrate {
            actions.push(Action::CalibrationRequested { page_index: self.page_index, page_distance });
            self.finish_tool(actions);
        } else {
            self.create_measurement(MeasurementKind::Length { points: [a, b] }, actions);
        }
    }

    fn comment_down(&mut self, p: Point) {
        self.state = match std::mem::take(&mut self.state) {
            InteractionState::PlacingComment { tip, .. } => {
                InteractionState::PlacingComment { tip, hover: Some(p), confirming: true }
            }
            _ => InteractionState::PlacingComment { tip: p, hover: None, confirming: false },
        };
    }

    fn create_comment(&mut self, tip: Point, at: Point, actions: &mut Vec<Action>) {
        let frame = Rect::new(at.x, at.y, self.config.comment_box_width, self.config.comment_box_height);
        let id = self.create_measurement(MeasurementKind::Comment { tip, frame, text: String::new() }, actions);
        self.ui.editing = Some(id);
        actions.push(Action::EditCommentRequested { id });
    }

    fn finish_drawing(&mut self, tool: Tool, anchor: Point, release: Point, actions: &mut Vec<Action>) {
        let Some(kind) = tool.shape_kind() else {
            return;
        };
        if distance(anchor, release) <= self.config.min_draw_px / self.view_scale() {
            debug!(?tool, "drag too short, nothing drawn");
            return;
        }
        let shape = Shape::new(
            self.page_index,
            ShapeGeometry::from_drag(kind, anchor, release),
            self.store.default_style().clone(),
        );
        let id = self.store.add_shape(shape);
        debug!(%id, ?kind, page_index = self.page_index, "shape created");
        self.store.select(id);
        actions.push(Action::EntityCreated { id });
        self.commit(actions);
        self.finish_tool(actions);
    }

    fn finish_marquee(&mut self, marquee: Rect, additive: bool) {
        let min = self.config.min_draw_px / self.view_scale();
        if marquee.width <= min && marquee.height <= min {
            return;
        }
        let hits = marquee_hits(&self.store, self.page_index, &marquee);
        if additive {
            for id in hits {
                self.store.toggle_selection(id);
            }
        } else {
            self.store.set_selection(hits);
        }
    }

    fn create_measurement(&mut self, kind: MeasurementKind, actions: &mut Vec<Action>) -> EntityId {
        let measurement = Measurement::new(self.page_index, kind);
        let measurement_type = measurement.measurement_type();
        let id = self.store.add_measurement(measurement);
        debug!(%id, ?measurement_type, page_index = self.page_index, "measurement created");
        self.store.select(id);
        actions.push(Action::EntityCreated { id });
        self.commit(actions);
        self.finish_tool(actions);
        id
    }

    /// Abandon the gesture in progress. Drags put the document back exactly
    /// as it was at pointer-down. Returns `false` if nothing was in progress.
    fn cancel_gesture(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            InteractionState::Idle => return false,
            InteractionState::DraggingItems { base, .. } => self.store.restore(&base),
            InteractionState::Resizing { original, .. } | InteractionState::Rotating { original, .. } => {
                self.store.replace(original);
            }
            InteractionState::SelectionDragging { base_selection, .. } => self.store.set_selection(base_selection),
            InteractionState::Panning { resume, .. } => {
                self.state = resume.map(|s| *s).unwrap_or_default();
            }
            InteractionState::Drawing { .. }
            | InteractionState::Capturing { .. }
            | InteractionState::PlacingComment { .. } => {}
        }
        debug!("gesture cancelled");
        true
    }

    fn deleted(&mut self, ids: Vec<EntityId>) -> Vec<Action> {
        if ids.is_empty() {
            return Vec::new();
        }
        if self.ui.editing.is_some_and(|id| ids.contains(&id)) {
            self.ui.editing = None;
        }
        let mut actions = vec![Action::EntitiesDeleted { ids }];
        self.commit(&mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    fn after_restore(&mut self) -> Vec<Action> {
        if self.ui.editing.is_some_and(|id| !self.store.contains(&id)) {
            self.ui.editing = None;
        }
        vec![self.history_changed(), Action::RenderNeeded]
    }

    fn commit(&mut self, actions: &mut Vec<Action>) {
        self.history.push(&self.store);
        actions.push(self.history_changed());
    }

    fn history_changed(&self) -> Action {
        Action::HistoryChanged { can_undo: self.history.can_undo(), can_redo: self.history.can_redo() }
    }

    fn finish_tool(&mut self, actions: &mut Vec<Action>) {
        if self.ui.tool != Tool::Select {
            self.ui.tool = Tool::Select;
            actions.push(Action::ToolChanged { tool: Tool::Select });
        }
    }
}

/// Drop vertices that repeat the one before them.
fn collapse_duplicates(mut points: Vec<Point>) -> Vec<Point> {
    points.dedup_by(|b, a| distance(*a, *b) <= DUPLICATE_VERTEX_EPSILON);
    points
}

/// The full engine: `EngineCore` plus the host's renderer.
pub struct Engine<R: Renderer> {
    renderer: R,
    pub core: EngineCore,
}

impl<R: Renderer> Engine<R> {
    #[must_use]
    pub fn new(renderer: R) -> Self {
        Self { renderer, core: EngineCore::new() }
    }

    #[must_use]
    pub fn with_config(renderer: R, config: EngineConfig) -> Self {
        Self { renderer, core: EngineCore::with_config(config) }
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    // --- Delegated input events ---

    pub fn on_pointer_down(&mut self, p: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(p, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, p: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(p, modifiers)
    }

    pub fn on_pointer_up(&mut self, p: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(p, button, modifiers)
    }

    pub fn on_double_click(&mut self, p: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_double_click(p, modifiers)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    // --- Render ---

    /// The scene for the active page, filtered for this renderer's surface.
    #[must_use]
    pub fn scene(&self) -> Scene {
        self.core.scene(self.renderer.capabilities())
    }

    /// Build the scene and hand it to the renderer.
    ///
    /// # Errors
    ///
    /// Whatever the renderer reports.
    pub fn render(&mut self) -> Result<(), R::Error> {
        let scene = self.scene();
        self.renderer.draw(&scene)
    }
}
