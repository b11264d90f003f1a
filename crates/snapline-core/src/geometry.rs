//! Per-frame object geometry: axes, axis-aligned rects and oriented corners.

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Tolerance used to decide whether a corner sits on the extreme of an axis.
const EXTREMAL_EPSILON: f64 = 1e-6;

/// One of the two scene axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Both axes, X first.
    pub const BOTH: [Axis; 2] = [Axis::X, Axis::Y];

    /// The perpendicular axis.
    pub fn other(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// Coordinate of `point` on this axis.
    pub fn coord(self, point: Point) -> f64 {
        match self {
            Axis::X => point.x,
            Axis::Y => point.y,
        }
    }

    /// Offset along this axis as a vector.
    pub fn vec(self, amount: f64) -> Vec2 {
        match self {
            Axis::X => Vec2::new(amount, 0.0),
            Axis::Y => Vec2::new(0.0, amount),
        }
    }
}

/// Axis-aligned box in scene space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisAlignedRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl AxisAlignedRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.left + self.width,
            self.top + self.height,
        )
    }

    /// `(min, max)` extent on `axis`.
    pub fn extent(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::X => (self.left, self.left + self.width),
            Axis::Y => (self.top, self.top + self.height),
        }
    }
}

/// The four oriented corners and the center of an object, in scene space.
///
/// Always derived from the object's transform at the moment of the call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerSet {
    pub tl: Point,
    pub tr: Point,
    pub br: Point,
    pub bl: Point,
    pub c: Point,
}

impl CornerSet {
    /// Corners of an unrotated rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self {
            tl: Point::new(rect.x0, rect.y0),
            tr: Point::new(rect.x1, rect.y0),
            br: Point::new(rect.x1, rect.y1),
            bl: Point::new(rect.x0, rect.y1),
            c: rect.center(),
        }
    }

    /// Corners of `rect` rotated clockwise by `angle_degrees` about its center.
    pub fn oriented(rect: Rect, angle_degrees: f64) -> Self {
        let base = Self::from_rect(rect);
        if angle_degrees % 360.0 == 0.0 {
            return base;
        }
        let rotation = Affine::rotate_about(angle_degrees.to_radians(), base.c);
        Self {
            tl: rotation * base.tl,
            tr: rotation * base.tr,
            br: rotation * base.br,
            bl: rotation * base.bl,
            c: base.c,
        }
    }

    /// The four corners in `tl, tr, br, bl` order.
    pub fn corners(&self) -> [Point; 4] {
        [self.tl, self.tr, self.br, self.bl]
    }

    /// All five points, corners first and center last.
    pub fn points(&self) -> [Point; 5] {
        [self.tl, self.tr, self.br, self.bl, self.c]
    }

    /// `(min, max)` extent of the corners on `axis`.
    pub fn extent(&self, axis: Axis) -> (f64, f64) {
        self.corners()
            .iter()
            .map(|p| axis.coord(*p))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Axis-aligned bounding box of the corners.
    pub fn bounds(&self) -> Rect {
        let (x0, x1) = self.extent(Axis::X);
        let (y0, y1) = self.extent(Axis::Y);
        Rect::new(x0, y0, x1, y1)
    }

    /// Points that take part in alignment along `axis`.
    ///
    /// Only corners lying on the minimum or maximum of the axis participate,
    /// plus the center. For an axis-aligned box that is every point; for a
    /// rotated one the vertices sitting between the extremes are left out so
    /// they cannot produce guides that look like edge alignments.
    pub fn axis_points(&self, axis: Axis) -> Vec<Point> {
        let (lo, hi) = self.extent(axis);
        let mut points: Vec<Point> = self
            .corners()
            .into_iter()
            .filter(|p| {
                let v = axis.coord(*p);
                (v - lo).abs() <= EXTREMAL_EPSILON || (v - hi).abs() <= EXTREMAL_EPSILON
            })
            .collect();
        points.push(self.c);
        points
    }

    /// Same corner set moved by `delta`.
    pub fn translate(&self, delta: Vec2) -> Self {
        Self {
            tl: self.tl + delta,
            tr: self.tr + delta,
            br: self.br + delta,
            bl: self.bl + delta,
            c: self.c + delta,
        }
    }

    /// Whether every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.points().iter().all(|p| p.x.is_finite() && p.y.is_finite())
    }
}
