#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Host viewport state mirrored into the engine.
///
/// `pan_x` / `pan_y` are the screen position (CSS pixels) of the page origin.
/// `zoom` is screen pixels per page unit, i.e. the view scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Smallest zoom the engine divides by.
    pub const MIN_ZOOM: f64 = 1e-6;

    #[must_use]
    pub fn new(pan_x: f64, pan_y: f64, zoom: f64) -> Self {
        Self { pan_x, pan_y, zoom }
    }

    /// Screen pixels per page unit, floored so callers can divide by it.
    #[must_use]
    pub fn view_scale(&self) -> f64 {
        if self.zoom.is_finite() { self.zoom.max(Self::MIN_ZOOM) } else { 1.0 }
    }

    /// Convert a screen-space point (CSS pixels) to page coordinates.
    #[must_use]
    pub fn screen_to_page(&self, screen: Point) -> Point {
        let s = self.view_scale();
        Point { x: (screen.x - self.pan_x) / s, y: (screen.y - self.pan_y) / s }
    }

    /// Convert a page-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn page_to_screen(&self, page: Point) -> Point {
        let s = self.view_scale();
        Point { x: page.x * s + self.pan_x, y: page.y * s + self.pan_y }
    }

    /// Convert a screen-space distance (pixels) to a page-space distance.
    #[must_use]
    pub fn screen_dist_to_page(&self, screen_dist: f64) -> f64 {
        screen_dist / self.view_scale()
    }
}
