//! Coordinate transforms between screen space and scene space.
//!
//! The viewport keeps pan and zoom as a single affine matrix. Rulers and the
//! snap tolerance need the scale and translation per axis, which is what
//! [`decompose`] extracts.

use crate::error::{GeometryError, GeometryResult};
use crate::geometry::Axis;
use kurbo::{Affine, Point};
use serde::{Deserialize, Serialize};

/// Smallest determinant magnitude still treated as invertible.
const MIN_DETERMINANT: f64 = 1e-12;

/// Axis-independent pan/zoom parameters of a viewport transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    pub scale_x: f64,
    pub scale_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    pub const IDENTITY: Self = Self {
        scale_x: 1.0,
        scale_y: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    /// Build the equivalent scene-to-screen matrix.
    pub fn to_affine(&self) -> Affine {
        Affine::new([
            self.scale_x,
            0.0,
            0.0,
            self.scale_y,
            self.translate_x,
            self.translate_y,
        ])
    }

    /// Scale along one axis.
    pub fn scale(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.scale_x,
            Axis::Y => self.scale_y,
        }
    }

    /// Translation along one axis.
    pub fn translate(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.translate_x,
            Axis::Y => self.translate_y,
        }
    }

    /// Convert a length in screen pixels into scene units along `axis`.
    pub fn scene_length(&self, pixels: f64, axis: Axis) -> f64 {
        pixels / self.scale(axis).abs()
    }

    /// Scene coordinate shown at screen coordinate `screen` along `axis`.
    pub fn scene_coord(&self, screen: f64, axis: Axis) -> f64 {
        (screen - self.translate(axis)) / self.scale(axis)
    }

    /// Screen coordinate of scene coordinate `scene` along `axis`.
    pub fn screen_coord(&self, scene: f64, axis: Axis) -> f64 {
        scene * self.scale(axis) + self.translate(axis)
    }
}

/// Fail with [`GeometryError::DegenerateTransform`] unless `transform` is invertible.
fn ensure_invertible(transform: Affine) -> GeometryResult<()> {
    let determinant = transform.determinant();
    if !transform.is_finite() || !determinant.is_finite() || determinant.abs() < MIN_DETERMINANT {
        return Err(GeometryError::DegenerateTransform { determinant });
    }
    Ok(())
}

/// Map a screen point to scene space (inverse of the viewport transform).
pub fn to_scene(screen_point: Point, transform: Affine) -> GeometryResult<Point> {
    ensure_invertible(transform)?;
    Ok(transform.inverse() * screen_point)
}

/// Map a scene point to screen space.
pub fn to_screen(scene_point: Point, transform: Affine) -> Point {
    transform * scene_point
}

/// Extract per-axis scale and translation from a combined viewport matrix.
///
/// The scale of each axis is the length of the corresponding basis vector,
/// so a viewport that happens to carry a small rotation still reports a
/// sensible zoom.
pub fn decompose(transform: Affine) -> GeometryResult<Transform2D> {
    ensure_invertible(transform)?;
    let [a, b, c, d, e, f] = transform.as_coeffs();
    let scale_x = a.hypot(b).copysign(if a == 0.0 { b } else { a });
    let scale_y = c.hypot(d).copysign(if d == 0.0 { c } else { d });
    Ok(Transform2D {
        scale_x,
        scale_y,
        translate_x: e,
        translate_y: f,
    })
}
