//! Shared numeric constants for the engine.
//!
//! Values suffixed `_PX` are screen pixels and are divided by the current
//! view scale before use so they stay visually fixed under zoom.

// ── Math ────────────────────────────────────────────────────────

/// Floor applied to calibration scales before dividing by them.
pub const SCALE_EPSILON: f64 = 1e-9;

/// Angular placement of the rotate handle relative to the shape center.
/// The handle sits straight above the top edge, i.e. at -90° in screen space.
pub const ROTATE_HANDLE_ANGLE_DEG: f64 = -90.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Half-size of a square resize handle, in screen pixels.
pub const HANDLE_RADIUS_PX: f64 = 5.0;

/// Screen-space hit slop in pixels for handles and thin edges.
pub const HIT_SLOP_PX: f64 = 6.0;

/// Distance from the bounding box edge to the rotate handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;

// ── Decorations ─────────────────────────────────────────────────

/// Selection frame and marquee stroke width, in screen pixels.
pub const SELECTION_STROKE_PX: f64 = 1.0;

/// Selection dash segment length in screen pixels.
pub const SELECTION_DASH_PX: f64 = 4.0;

/// Measurement label font size, in screen pixels.
pub const LABEL_FONT_PX: f64 = 12.0;

/// Radius of a count marker, in screen pixels.
pub const MARKER_RADIUS_PX: f64 = 6.0;

/// Arrowhead length, in screen pixels.
pub const ARROW_HEAD_PX: f64 = 12.0;

/// Measurement stroke width, in screen pixels.
pub const MEASURE_STROKE_PX: f64 = 2.0;

/// Gap between a measurement and its label, in screen pixels.
pub const LABEL_OFFSET_PX: f64 = 8.0;

// ── Gestures ────────────────────────────────────────────────────

/// Minimum anchor-to-release distance for a drawn shape, in screen pixels.
pub const MIN_DRAW_PX: f64 = 3.0;

/// Minimum width/height of a resized box shape, in page units.
pub const MIN_SHAPE_SIZE: f64 = 1.0;

/// Rotation snap increment when the snap modifier is held.
pub const ROTATE_SNAP_DEG: f64 = 15.0;

/// Spatial offset applied to every pasted entity, in page units.
pub const PASTE_OFFSET: f64 = 20.0;

/// Default comment text box size, in page units.
pub const COMMENT_BOX_WIDTH: f64 = 160.0;
pub const COMMENT_BOX_HEIGHT: f64 = 60.0;

/// Maximum number of snapshots kept by the history manager.
pub const HISTORY_LIMIT: usize = 200;

// ── Default style ───────────────────────────────────────────────

pub const DEFAULT_STROKE: &str = "#E53935";
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;
pub const NONE: &str = "none";

/// Stroke and label color for measurements.
pub const MEASURE_COLOR: &str = "#2E7D32";

/// Translucent fill for area polygons.
pub const AREA_FILL: &str = "rgba(46, 125, 50, 0.15)";

/// Translucent fill for the marquee.
pub const MARQUEE_FILL: &str = "rgba(30, 144, 255, 0.12)";

pub const HANDLE_FILL: &str = "#FFFFFF";
pub const COMMENT_FILL: &str = "#FFFDE7";
pub const COMMENT_TEXT: &str = "#212121";

/// Comment text size, in page units. The box is page-sized, so its text is too.
pub const COMMENT_FONT_SIZE: f64 = 12.0;

/// Inner padding of a comment box, in page units.
pub const COMMENT_PADDING: f64 = 6.0;

/// Accent color used for selection frames, handles and previews.
pub const ACCENT: &str = "#1E90FF";

/// Default unit label for uncalibrated pages.
pub const DEFAULT_UNIT: &str = "px";
