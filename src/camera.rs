//! Camera and viewport: pan/zoom and screen ↔ page conversion.
//!
//! `Camera` is the raw transform, `screen = page * zoom + pan`, with pan in
//! screen pixels. `Viewport` adds the on-screen rectangle the canvas occupies
//! and the zoom limits, and implements the navigation commands (wheel pan,
//! pinch zoom, zoom steps, zoom to fit, auto-pan near edges).

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::config::EngineConfig;
use crate::consts::WHEEL_ZOOM_SENSITIVITY;
use crate::vec::Point;

/// Camera state for pan/zoom on the infinite canvas.
///
/// `pan_x` / `pan_y` are in screen pixels.
/// `zoom` is a scale factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
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
    /// Convert a canvas-relative screen point to page coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new((screen.x - self.pan_x) / self.zoom, (screen.y - self.pan_y) / self.zoom)
    }

    /// Convert a page point to canvas-relative screen coordinates.
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(world.x * self.zoom + self.pan_x, world.y * self.zoom + self.pan_y)
    }

    /// Convert a screen-space distance (pixels) to page-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }
}

/// The canvas element's screen rectangle plus the camera looking through it.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    /// Screen rectangle of the canvas, in client pixels.
    pub bounds: Bounds,
    pub camera: Camera,
    config: EngineConfig,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Viewport {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { bounds: Bounds::from_xywh(0.0, 0.0, 1080.0, 720.0), camera: Camera::default(), config }
    }

    pub fn update_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.camera.zoom
    }

    /// Set pan and zoom, ignoring non-finite values and clamping zoom.
    pub fn set_camera(&mut self, pan: Option<Point>, zoom: Option<f64>) {
        if let Some(p) = pan.filter(|p| p.x.is_finite() && p.y.is_finite()) {
            self.camera.pan_x = p.x;
            self.camera.pan_y = p.y;
        }
        if let Some(z) = zoom.filter(|z| z.is_finite()) {
            self.camera.zoom = z.clamp(self.config.min_zoom, self.config.max_zoom);
        }
    }

    /// Page point under a client-space point.
    #[must_use]
    pub fn page_point(&self, client: Point) -> Point {
        self.camera.screen_to_world(client - self.bounds.top_left())
    }

    /// Canvas-relative screen point of a page point.
    #[must_use]
    pub fn screen_point(&self, page: Point) -> Point {
        self.camera.world_to_screen(page)
    }

    /// Page-space rectangle currently visible.
    #[must_use]
    pub fn current_view(&self) -> Bounds {
        let top_left = self.camera.screen_to_world(Point::ZERO);
        let size = self.bounds.size() / self.camera.zoom;
        Bounds::from_xywh(top_left.x, top_left.y, size.x, size.y)
    }

    /// Move the content by `delta` screen pixels.
    pub fn pan_by(&mut self, delta: Point) {
        let pan = Point::new(self.camera.pan_x, self.camera.pan_y) + delta;
        self.set_camera(Some(pan), None);
    }

    /// Zoom to `zoom` around a canvas-relative screen point, after first
    /// panning by `delta`. The page point under `point` stays put.
    pub fn pinch_zoom(&mut self, point: Point, delta: Point, zoom: f64) {
        self.pan_by(delta);
        let anchor = self.camera.screen_to_world(point);
        let zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        let pan = (point - anchor * zoom).to_fixed();
        self.set_camera(Some(pan), Some(zoom));
    }

    /// Zoom around the centre of the canvas.
    pub fn set_zoom(&mut self, zoom: f64) {
        let center = self.bounds.size() / 2.0;
        self.pinch_zoom(center, Point::ZERO, zoom);
    }

    /// Next zoom step up, snapped to multiples of the step.
    pub fn zoom_in(&mut self) {
        let step = self.config.zoom_step;
        self.set_zoom(((self.camera.zoom / step).round() + 1.0) * step);
    }

    /// Next zoom step down, snapped to multiples of the step.
    pub fn zoom_out(&mut self) {
        let step = self.config.zoom_step;
        self.set_zoom(((self.camera.zoom / step).round() - 1.0) * step);
    }

    pub fn reset_zoom(&mut self) {
        self.set_zoom(1.0);
    }

    /// Scroll-wheel input: pan, or zoom about `point` when `zoom` is held.
    pub fn wheel(&mut self, point: Point, delta: Point, zoom: bool) {
        if zoom {
            let next = self.camera.zoom * (1.0 - delta.y / WHEEL_ZOOM_SENSITIVITY);
            self.pinch_zoom(point, Point::ZERO, next);
        } else {
            self.pan_by(-delta);
        }
    }

    /// Centre `target` on screen, zooming out to fit it (never in past 1).
    pub fn zoom_to_bounds(&mut self, target: &Bounds) {
        let padding = self.config.fit_padding;
        let fit = ((self.bounds.width - padding) / target.width).min((self.bounds.height - padding) / target.height);
        let zoom = if fit.is_finite() { fit.clamp(self.config.min_zoom, 1.0) } else { 1.0 };
        let screen_center = self.bounds.size() / 2.0;
        let pan = screen_center - target.center() * zoom;
        self.set_camera(Some(pan), Some(zoom));
    }

    /// Auto-pan while dragging near the canvas edge. `page` is the pointer in
    /// page space. Returns whether the camera moved.
    pub fn pan_when_near_edge(&mut self, page: Point) -> bool {
        let view = self.current_view();
        let margin = self.camera.screen_dist_to_world(self.config.pan_edge_margin);
        let speed = self.config.pan_edge_speed;
        let axis = |p: f64, min: f64, max: f64| {
            if p > max - margin {
                -speed
            } else if p < min + margin {
                speed
            } else {
                0.0
            }
        };
        let delta = Point::new(axis(page.x, view.min_x, view.max_x), axis(page.y, view.min_y, view.max_y));
        if delta == Point::ZERO {
            return false;
        }
        self.pan_by(delta);
        true
    }
}
