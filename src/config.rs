//! Engine tunables with defaults from [`crate::consts`].
//!
//! A host may pass a partial JSON object to [`EngineConfig::from_json`]; every
//! key it omits keeps its default.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    ARROW_HEAD_PX, COMMENT_BOX_HEIGHT, COMMENT_BOX_WIDTH, HANDLE_RADIUS_PX, HISTORY_LIMIT, HIT_SLOP_PX, LABEL_FONT_PX,
    LABEL_OFFSET_PX, MARKER_RADIUS_PX, MEASURE_STROKE_PX, MIN_DRAW_PX, MIN_SHAPE_SIZE, PASTE_OFFSET,
    ROTATE_HANDLE_OFFSET_PX, ROTATE_SNAP_DEG, SELECTION_DASH_PX, SELECTION_STROKE_PX,
};
use crate::doc::ShapeStyle;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("historyLimit must be at least 1")]
    EmptyHistory,
    #[error("defaultStyle.opacity must be within [0, 1], got {0}")]
    Opacity(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub handle_radius_px: f64,
    pub hit_slop_px: f64,
    pub rotate_handle_offset_px: f64,
    pub selection_stroke_px: f64,
    pub selection_dash_px: f64,
    pub label_font_px: f64,
    pub label_offset_px: f64,
    pub measure_stroke_px: f64,
    pub marker_radius_px: f64,
    pub arrow_head_px: f64,
    /// Minimum anchor-to-release distance for drawing, in screen pixels.
    pub min_draw_px: f64,
    /// Page units.
    pub min_shape_size: f64,
    pub rotate_snap_deg: f64,
    /// Page units; may be zero or negative.
    pub paste_offset: f64,
    pub comment_box_width: f64,
    pub comment_box_height: f64,
    pub history_limit: usize,
    pub default_style: ShapeStyle,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            handle_radius_px: HANDLE_RADIUS_PX,
            hit_slop_px: HIT_SLOP_PX,
            rotate_handle_offset_px: ROTATE_HANDLE_OFFSET_PX,
            selection_stroke_px: SELECTION_STROKE_PX,
            selection_dash_px: SELECTION_DASH_PX,
            label_font_px: LABEL_FONT_PX,
            label_offset_px: LABEL_OFFSET_PX,
            measure_stroke_px: MEASURE_STROKE_PX,
            marker_radius_px: MARKER_RADIUS_PX,
            arrow_head_px: ARROW_HEAD_PX,
            min_draw_px: MIN_DRAW_PX,
            min_shape_size: MIN_SHAPE_SIZE,
            rotate_snap_deg: ROTATE_SNAP_DEG,
            paste_offset: PASTE_OFFSET,
            comment_box_width: COMMENT_BOX_WIDTH,
            comment_box_height: COMMENT_BOX_HEIGHT,
            history_limit: HISTORY_LIMIT,
            default_style: ShapeStyle::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON object and validate it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON or wrongly typed keys,
    /// and a validation variant for out-of-range values.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every tunable is usable.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("handleRadiusPx", self.handle_radius_px),
            ("hitSlopPx", self.hit_slop_px),
            ("rotateHandleOffsetPx", self.rotate_handle_offset_px),
            ("selectionStrokePx", self.selection_stroke_px),
            ("selectionDashPx", self.selection_dash_px),
            ("labelFontPx", self.label_font_px),
            ("labelOffsetPx", self.label_offset_px),
            ("measureStrokePx", self.measure_stroke_px),
            ("markerRadiusPx", self.marker_radius_px),
            ("arrowHeadPx", self.arrow_head_px),
            ("minDrawPx", self.min_draw_px),
            ("minShapeSize", self.min_shape_size),
            ("rotateSnapDeg", self.rotate_snap_deg),
            ("commentBoxWidth", self.comment_box_width),
            ("commentBoxHeight", self.comment_box_height),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        let stroke_width = self.default_style.stroke_width;
        if !stroke_width.is_finite() || stroke_width < 0.0 {
            return Err(ConfigError::OutOfRange { field: "defaultStyle.strokeWidth", value: stroke_width });
        }
        if !self.paste_offset.is_finite() {
            return Err(ConfigError::OutOfRange { field: "pasteOffset", value: self.paste_offset });
        }
        if self.history_limit == 0 {
            return Err(ConfigError::EmptyHistory);
        }
        let opacity = self.default_style.opacity;
        if !(0.0..=1.0).contains(&opacity) {
            return Err(ConfigError::Opacity(opacity));
        }
        Ok(())
    }
}
