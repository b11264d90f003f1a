//! Viewport state: pan, zoom and canvas size.
//!
//! Snapping and rulers only ever read the viewport through
//! [`ViewportSource`]. [`Camera`] is the in-crate implementation used by
//! headless hosts and tests.

use crate::error::GeometryResult;
use crate::transform::to_scene;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Read access to the host's viewport.
pub trait ViewportSource {
    /// Scene-to-screen transform.
    fn transform(&self) -> Affine;

    /// Canvas size in screen pixels.
    fn size(&self) -> Size;
}

/// Uniform-zoom viewport. Screen = offset + zoom * scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// Screen position of the scene origin.
    pub offset: Vec2,
    /// 1.0 shows one scene unit per pixel.
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub size: Size,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            // Matches the coarsest and finest rows of the tick gap table.
            min_zoom: 0.02,
            max_zoom: 40.0,
            size: Size::new(800.0, 600.0),
        }
    }
}

impl ViewportSource for Camera {
    fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    fn size(&self) -> Size {
        self.size
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Scene point under a screen point.
    pub fn to_scene(&self, screen_point: Point) -> GeometryResult<Point> {
        to_scene(screen_point, self.transform())
    }

    /// Shift the view by a screen-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Multiply the zoom by `factor` around `anchor`, which stays over the
    /// same scene point. The result is clamped to the zoom limits.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) -> GeometryResult<()> {
        let zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        let pinned = self.to_scene(anchor)?;
        self.zoom = zoom;
        self.offset = anchor.to_vec2() - pinned.to_vec2() * zoom;
        Ok(())
    }

    /// Scene rectangle covered by the canvas.
    pub fn visible_rect(&self) -> GeometryResult<Rect> {
        let top_left = self.to_scene(Point::ZERO)?;
        let bottom_right = self.to_scene(self.size.to_vec2().to_point())?;
        Ok(Rect::from_points(top_left, bottom_right))
    }

    /// Zoom and pan so `bounds` fills the canvas minus `padding` pixels on
    /// every side, centered. Empty bounds only recenter.
    pub fn fit_to_bounds(&mut self, bounds: Rect, padding: f64) {
        if bounds.width() > 0.0 && bounds.height() > 0.0 {
            let room_x = (self.size.width - 2.0 * padding).max(1.0);
            let room_y = (self.size.height - 2.0 * padding).max(1.0);
            self.zoom = (room_x / bounds.width())
                .min(room_y / bounds.height())
                .clamp(self.min_zoom, self.max_zoom);
        }
        let canvas_center = (self.size.to_vec2() / 2.0).to_point();
        self.offset = canvas_center.to_vec2() - bounds.center().to_vec2() * self.zoom;
    }
}
