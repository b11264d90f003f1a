//! Transient alignment guide lines shown while dragging.

use kurbo::{Affine, Point, Vec2};
use peniko::Color;
use snapline_core::{GuideSegment, to_screen};

use crate::surface::DrawSurface;

/// Guide line appearance, in screen pixels.
#[derive(Debug, Clone, Copy)]
pub struct GuideStyle {
    pub color: Color,
    pub width: f64,
    /// Half-size of the cross drawn at each end.
    pub marker_size: f64,
}

impl Default for GuideStyle {
    fn default() -> Self {
        Self {
            color: Color::from_rgba8(236, 72, 153, 220), // Pink-500
            width: 1.0,
            marker_size: 3.0,
        }
    }
}

/// Holds the guides of the current drag frame and paints them.
#[derive(Debug, Clone, Default)]
pub struct GuideOverlay {
    segments: Vec<GuideSegment>,
    pub style: GuideStyle,
}

impl GuideOverlay {
    pub fn new(style: GuideStyle) -> Self {
        Self {
            segments: Vec::new(),
            style,
        }
    }

    /// Replace the guides with this frame's.
    pub fn update(&mut self, segments: &[GuideSegment]) {
        self.segments.clear();
        self.segments.extend_from_slice(segments);
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    pub fn segments(&self) -> &[GuideSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Stroke every guide in screen space with a small cross at each end.
    pub fn paint(&self, surface: &mut dyn DrawSurface, transform: Affine) {
        let GuideStyle {
            color,
            width,
            marker_size,
        } = self.style;

        for segment in &self.segments {
            let (start, end) = segment.endpoints();
            let start = to_screen(start, transform);
            let end = to_screen(end, transform);
            if !(start.is_finite() && end.is_finite()) {
                continue;
            }
            surface.line(start, end, color, width);
            for point in [start, end] {
                cross(surface, point, marker_size, color, width);
            }
        }
    }
}

fn cross(surface: &mut dyn DrawSurface, center: Point, size: f64, color: Color, width: f64) {
    let a = Vec2::new(size, size);
    let b = Vec2::new(size, -size);
    surface.line(center - a, center + a, color, width);
    surface.line(center - b, center + b, color, width);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::DisplayList;
    use snapline_core::Axis;

    fn vertical_at_150() -> GuideSegment {
        GuideSegment {
            axis: Axis::X,
            position: 150.0,
            range_start: 0.0,
            range_end: 100.0,
        }
    }

    #[test]
    fn test_update_replaces_and_clear_empties() {
        let mut overlay = GuideOverlay::default();
        overlay.update(&[vertical_at_150(), vertical_at_150()]);
        assert_eq!(overlay.segments().len(), 2);
        overlay.update(&[vertical_at_150()]);
        assert_eq!(overlay.segments().len(), 1);
        overlay.clear();
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_paint_in_screen_space() {
        let mut overlay = GuideOverlay::default();
        overlay.update(&[vertical_at_150()]);
        let mut list = DisplayList::new();
        let transform = Affine::translate(Vec2::new(10.0, 20.0)) * Affine::scale(2.0);
        overlay.paint(&mut list, transform);

        let lines = list.lines();
        // The guide itself plus two strokes per end marker.
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], (Point::new(310.0, 20.0), Point::new(310.0, 220.0)));
        assert_eq!(lines[1], (Point::new(307.0, 17.0), Point::new(313.0, 23.0)));
    }

    #[test]
    fn test_paint_horizontal() {
        let mut overlay = GuideOverlay::default();
        overlay.update(&[GuideSegment {
            axis: Axis::Y,
            position: 5.0,
            range_start: -10.0,
            range_end: 10.0,
        }]);
        let mut list = DisplayList::new();
        overlay.paint(&mut list, Affine::IDENTITY);
        assert_eq!(list.lines()[0], (Point::new(-10.0, 5.0), Point::new(10.0, 5.0)));
    }

    #[test]
    fn test_empty_overlay_paints_nothing() {
        let overlay = GuideOverlay::default();
        let mut list = DisplayList::new();
        overlay.paint(&mut list, Affine::IDENTITY);
        assert!(list.is_empty());
    }
}
