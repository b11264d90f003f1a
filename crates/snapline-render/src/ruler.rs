//! Coordinate rulers along the top and left canvas edges.
//!
//! Rulers are redrawn from scratch every frame: the tick spacing follows the
//! current zoom and the highlight bands follow the current selection.

use kurbo::{Affine, Point, Rect, Size};
use peniko::Color;
use snapline_core::config::{DEFAULT_GAP_TABLE, GapStep, RulerConfig};
use snapline_core::error::GeometryResult;
use snapline_core::interval::{HighlightInterval, merge, selection_intervals};
use snapline_core::{Axis, ObjectId, SceneGraph, SceneObject, Transform2D, decompose, to_scene};

use crate::surface::{DrawSurface, TextAlign, TextStyle};

/// Tick mark length as a fraction of the ruler thickness.
const TICK_RATIO: f64 = 0.3;
/// Distance between a tick or band edge and its label.
const LABEL_PADDING: f64 = 2.0;
/// Guard against pathological zoom/pan combinations.
const MAX_TICKS: i64 = 4096;

/// Ruler colors.
#[derive(Debug, Clone, Copy)]
pub struct RulerTheme {
    pub background: Color,
    pub text: Color,
    pub border: Color,
    pub tick: Color,
    pub highlight: Color,
    pub highlight_text: Color,
}

impl Default for RulerTheme {
    fn default() -> Self {
        Self {
            background: Color::from_rgba8(247, 247, 247, 255),
            text: Color::from_rgba8(136, 136, 136, 255),
            border: Color::from_rgba8(221, 221, 221, 255),
            tick: Color::from_rgba8(204, 204, 204, 255),
            highlight: Color::from_rgba8(59, 130, 246, 64), // Blue, translucent
            highlight_text: Color::from_rgba8(59, 130, 246, 255),
        }
    }
}

/// A tick mark: its scene value and where it lands on the ruler in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub offset: f64,
}

/// Scene distance between ticks at `zoom`.
///
/// Picks the smallest gap whose zoom threshold is reached. Below every
/// threshold the largest gap is used.
pub fn tick_gap(zoom: f64, table: &[GapStep]) -> f64 {
    let table: &[GapStep] = if table.is_empty() { &DEFAULT_GAP_TABLE } else { table };
    let zoom = zoom.abs();
    table
        .iter()
        .filter(|step| step.min_zoom <= zoom)
        .map(|step| step.gap)
        .reduce(f64::min)
        .or_else(|| table.iter().map(|step| step.gap).reduce(f64::max))
        .unwrap_or(50.0)
}

/// Ticks visible on a ruler of `length_px` pixels along `axis`.
///
/// Tick values are integer multiples of `gap`, so they never drift. When
/// `gap` would put more than `MAX_TICKS` ticks on the ruler, the smallest
/// multiple of `gap` that fits is used instead.
pub fn visible_ticks(viewport: &Transform2D, axis: Axis, length_px: f64, gap: f64) -> Vec<Tick> {
    let scale = viewport.scale(axis);
    let start = -viewport.translate(axis) / scale;
    let end = start + length_px / scale;
    let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
    if !(lo.is_finite() && hi.is_finite() && gap.is_finite() && gap > 0.0) {
        return Vec::new();
    }

    let span = (hi - lo) / gap;
    let gap = if span > MAX_TICKS as f64 {
        let coarse = gap * (span / MAX_TICKS as f64).ceil();
        log::debug!("Ruler gap {gap} too fine for {span:.0} ticks, using {coarse}");
        coarse
    } else {
        gap
    };

    let first = (lo / gap).floor() as i64;
    let last = (hi / gap).ceil() as i64;
    (first..=last)
        .map(|i| {
            let value = i as f64 * gap;
            Tick {
                value,
                offset: viewport.screen_coord(value, axis),
            }
        })
        .filter(|tick| tick.offset >= 0.0 && tick.offset <= length_px)
        .collect()
}

/// Label for a scene coordinate.
pub fn format_label(value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() < 1e-6 {
        format!("{}", rounded as i64)
    } else {
        format!("{value:.1}")
    }
}

/// Paints the two rulers and the selection bands on them.
#[derive(Debug, Clone, Default)]
pub struct RulerRenderer {
    pub config: RulerConfig,
    pub theme: RulerTheme,
}

impl RulerRenderer {
    pub fn new(config: RulerConfig) -> Self {
        Self {
            config,
            theme: RulerTheme::default(),
        }
    }

    pub fn with_theme(mut self, theme: RulerTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Draw both rulers for the current viewport.
    ///
    /// Nothing is drawn for an empty canvas or a degenerate transform.
    pub fn paint(
        &self,
        surface: &mut dyn DrawSurface,
        scene: &dyn SceneGraph,
        selection: &[ObjectId],
        transform: Affine,
        size: Size,
    ) {
        if !self.config.enabled {
            return;
        }
        if !(size.width > 0.0 && size.height > 0.0) {
            log::trace!("Skipping rulers for empty canvas {size:?}");
            return;
        }
        let viewport = match decompose(transform) {
            Ok(viewport) => viewport,
            Err(err) => {
                log::debug!("Skipping ruler redraw: {err}");
                return;
            }
        };

        surface.save();
        for axis in Axis::BOTH {
            let bands = merge(&selection_intervals(scene, selection, axis), axis);
            self.paint_ruler(surface, axis, &viewport, size, &bands);
        }

        // Corner square where the rulers meet
        let s = self.config.size_px;
        let corner = Rect::new(0.0, 0.0, s, s);
        surface.fill_rect(corner, self.theme.background);
        surface.stroke_rect(corner, self.theme.border, 1.0);
        surface.restore();
    }

    fn paint_ruler(
        &self,
        surface: &mut dyn DrawSurface,
        axis: Axis,
        viewport: &Transform2D,
        size: Size,
        bands: &[HighlightInterval],
    ) {
        let s = self.config.size_px;
        let length = match axis {
            Axis::X => size.width,
            Axis::Y => size.height,
        };
        let tick_length = s * TICK_RATIO;
        let label_middle = (s - tick_length) / 2.0;
        // Vertical ruler labels read bottom to top
        let angle = match axis {
            Axis::X => 0.0,
            Axis::Y => -90.0,
        };

        surface.fill_rect(strip(axis, 0.0, length, 0.0, s), self.theme.background);
        surface.line(
            along(axis, 0.0, s),
            along(axis, length, s),
            self.theme.border,
            1.0,
        );

        let gap = tick_gap(viewport.scale(axis), &self.config.gap_table);
        let label_style = TextStyle::new(self.config.font_size, self.theme.text);
        for tick in visible_ticks(viewport, axis, length, gap) {
            if tick.offset < s {
                continue;
            }
            surface.line(
                along(axis, tick.offset, s - tick_length),
                along(axis, tick.offset, s),
                self.theme.tick,
                1.0,
            );
            let anchor = match axis {
                Axis::X => along(axis, tick.offset + LABEL_PADDING, label_middle),
                Axis::Y => along(axis, tick.offset - LABEL_PADDING, label_middle),
            };
            surface.text(&format_label(tick.value), anchor, &label_style, angle);
        }

        // Text runs along +x on the top ruler but along -y on the left one,
        // so the alignment that keeps a label outside the band flips.
        let (before, after) = match axis {
            Axis::X => (TextAlign::End, TextAlign::Start),
            Axis::Y => (TextAlign::Start, TextAlign::End),
        };
        let half_window = self.config.mask_window_px / 2.0;
        let transparent = self.theme.background.with_alpha(0.0);
        let mask_stops = [
            (0.0, transparent),
            (0.35, self.theme.background),
            (0.65, self.theme.background),
            (1.0, transparent),
        ];

        for band in bands {
            let mut edges = [
                (viewport.screen_coord(band.start, axis), band.start),
                (viewport.screen_coord(band.end, axis), band.end),
            ];
            edges.sort_by(|a, b| a.0.total_cmp(&b.0));
            let [(lo, lo_value), (hi, hi_value)] = edges;

            if half_window > 0.0 {
                for edge in [lo, hi] {
                    surface.fill_gradient_rect(
                        strip(axis, edge - half_window, edge + half_window, 0.0, s),
                        along(axis, edge - half_window, 0.0),
                        along(axis, edge + half_window, 0.0),
                        &mask_stops,
                    );
                }
            }
            surface.fill_rect(strip(axis, lo, hi, 0.0, s), self.theme.highlight);

            let style = TextStyle::new(self.config.font_size, self.theme.highlight_text);
            surface.text(
                &format_label(lo_value),
                along(axis, lo - LABEL_PADDING, label_middle),
                &style.with_align(before),
                angle,
            );
            surface.text(
                &format_label(hi_value),
                along(axis, hi + LABEL_PADDING, label_middle),
                &style.with_align(after),
                angle,
            );
        }
    }

    /// Which ruler strip is under `point`, named by the axis it measures.
    /// The corner square belongs to neither.
    pub fn hit_test(&self, point: Point, size: Size) -> Option<Axis> {
        let s = self.config.size_px;
        if !self.config.enabled
            || point.x < 0.0
            || point.y < 0.0
            || point.x > size.width
            || point.y > size.height
        {
            return None;
        }
        match (point.x < s, point.y < s) {
            (true, true) => None,
            (false, true) => Some(Axis::X),
            (true, false) => Some(Axis::Y),
            (false, false) => None,
        }
    }

    /// Scene coordinate for a reference line dragged out of `ruler`.
    ///
    /// A line pulled from the top ruler is horizontal, so its position is
    /// measured on the other axis.
    pub fn reference_position(&self, ruler: Axis, pointer: Point, transform: Affine) -> GeometryResult<f64> {
        let scene_point = to_scene(pointer, transform)?;
        Ok(ruler.other().coord(scene_point))
    }

    /// Reference line object for the host to insert when a drag out of
    /// `ruler` is released at `pointer`.
    pub fn reference_line(
        &self,
        ruler: Axis,
        pointer: Point,
        transform: Affine,
        span: f64,
    ) -> GeometryResult<SceneObject> {
        let position = self.reference_position(ruler, pointer, transform)?;
        Ok(SceneObject::guide(ruler.other(), position, span))
    }
}

/// Point at `offset` along the ruler for `axis` and `across` into its
/// thickness.
fn along(axis: Axis, offset: f64, across: f64) -> Point {
    match axis {
        Axis::X => Point::new(offset, across),
        Axis::Y => Point::new(across, offset),
    }
}

/// Rectangle spanning `[start, end]` along the ruler and `[near, far]` across.
fn strip(axis: Axis, start: f64, end: f64, near: f64, far: f64) -> Rect {
    Rect::from_points(along(axis, start, near), along(axis, end, far))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DisplayList, DrawCommand, SerializableColor};
    use kurbo::Vec2;
    use snapline_core::Scene;

    fn table() -> Vec<GapStep> {
        DEFAULT_GAP_TABLE.to_vec()
    }

    fn texts_at_angle(list: &DisplayList, wanted: f64) -> Vec<String> {
        list.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, angle, .. } if *angle == wanted => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_tick_gap_lookup() {
        let t = table();
        assert_eq!(tick_gap(1.0, &t), 50.0);
        assert_eq!(tick_gap(18.0, &t), 2.0);
        assert_eq!(tick_gap(0.99, &t), 100.0);
        assert_eq!(tick_gap(100.0, &t), 1.0);
        assert_eq!(tick_gap(0.001, &t), 5000.0);
    }

    #[test]
    fn test_tick_gap_is_monotonic() {
        let t = table();
        let mut zoom = 0.005;
        let mut previous = tick_gap(zoom, &t);
        while zoom < 100.0 {
            zoom *= 1.07;
            let gap = tick_gap(zoom, &t);
            assert!(gap <= previous, "gap grew from {previous} to {gap} at zoom {zoom}");
            previous = gap;
        }
    }

    #[test]
    fn test_tick_gap_empty_table_uses_defaults() {
        assert_eq!(tick_gap(1.0, &[]), 50.0);
    }

    #[test]
    fn test_visible_ticks_identity() {
        let ticks = visible_ticks(&Transform2D::IDENTITY, Axis::X, 200.0, 50.0);
        let values: Vec<f64> = ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![0.0, 50.0, 100.0, 150.0, 200.0]);
    }

    #[test]
    fn test_visible_ticks_panned_and_zoomed() {
        let viewport = Transform2D {
            translate_x: 30.0,
            ..Transform2D::IDENTITY
        };
        let ticks = visible_ticks(&viewport, Axis::X, 200.0, 50.0);
        let values: Vec<f64> = ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![0.0, 50.0, 100.0, 150.0]);
        assert!((ticks[0].offset - 30.0).abs() < 1e-9);

        let zoomed = Transform2D {
            scale_y: 2.0,
            translate_y: -100.0,
            ..Transform2D::IDENTITY
        };
        let ticks = visible_ticks(&zoomed, Axis::Y, 100.0, 25.0);
        let values: Vec<f64> = ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![50.0, 75.0, 100.0]);
        assert!((ticks[1].offset - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_visible_ticks_coarsens_instead_of_dropping() {
        let far_out = Transform2D {
            scale_x: 0.02,
            ..Transform2D::IDENTITY
        };
        // 2000 px at zoom 0.02 covers 100000 units: 100000 ticks at gap 1.
        let ticks = visible_ticks(&far_out, Axis::X, 2000.0, 1.0);
        assert!(!ticks.is_empty());
        assert!(ticks.len() as i64 <= MAX_TICKS + 1);
        // ceil(100000 / 4096) = 25
        assert_eq!(ticks[1].value - ticks[0].value, 25.0);
        assert!(ticks.iter().all(|t| t.value % 25.0 == 0.0));
    }

    #[test]
    fn test_visible_ticks_rejects_bad_gap() {
        assert!(visible_ticks(&Transform2D::IDENTITY, Axis::X, 200.0, 0.0).is_empty());
        assert!(visible_ticks(&Transform2D::IDENTITY, Axis::X, 200.0, f64::NAN).is_empty());
    }

    #[test]
    fn test_paint_labels_with_unvalidated_fine_table() {
        let ruler = RulerRenderer::new(RulerConfig {
            gap_table: vec![GapStep::new(1.0, 1.0)],
            ..RulerConfig::default()
        });
        let scene = Scene::new();
        let mut list = DisplayList::new();
        ruler.paint(&mut list, &scene, &[], Affine::scale(0.02), Size::new(1000.0, 100.0));
        // Gap 1 would need 50000 ticks; it becomes 13, and the first label
        // clear of the 20 px corner is 77 * 13.
        let top = texts_at_angle(&list, 0.0);
        assert_eq!(top.first().map(String::as_str), Some("1001"));
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(150.0), "150");
        assert_eq!(format_label(-0.0), "0");
        assert_eq!(format_label(-250.0), "-250");
        assert_eq!(format_label(47.3), "47.3");
    }

    #[test]
    fn test_paint_ticks_and_labels() {
        let ruler = RulerRenderer::default();
        let scene = Scene::new();
        let mut list = DisplayList::new();
        ruler.paint(&mut list, &scene, &[], Affine::IDENTITY, Size::new(200.0, 100.0));

        // Ticks under the 20 px corner are skipped.
        assert_eq!(texts_at_angle(&list, 0.0), vec!["50", "100", "150", "200"]);
        assert_eq!(texts_at_angle(&list, -90.0), vec!["50", "100"]);
        assert_eq!(list.commands.first(), Some(&DrawCommand::Save));
        assert_eq!(list.commands.last(), Some(&DrawCommand::Restore));
    }

    #[test]
    fn test_paint_follows_zoom() {
        let ruler = RulerRenderer::default();
        let scene = Scene::new();
        let mut list = DisplayList::new();
        let transform = Affine::scale(18.0);
        ruler.paint(&mut list, &scene, &[], transform, Size::new(100.0, 100.0));
        // Gap 2 at zoom 18: ticks every 36 px.
        assert_eq!(texts_at_angle(&list, 0.0), vec!["2", "4"]);
    }

    #[test]
    fn test_empty_canvas_draws_nothing() {
        let ruler = RulerRenderer::default();
        let scene = Scene::new();
        let mut list = DisplayList::new();
        ruler.paint(&mut list, &scene, &[], Affine::IDENTITY, Size::new(0.0, 300.0));
        ruler.paint(&mut list, &scene, &[], Affine::IDENTITY, Size::new(300.0, 0.0));
        assert!(list.is_empty());
    }

    #[test]
    fn test_degenerate_transform_draws_nothing() {
        let ruler = RulerRenderer::default();
        let scene = Scene::new();
        let mut list = DisplayList::new();
        ruler.paint(&mut list, &scene, &[], Affine::scale(0.0), Size::new(300.0, 300.0));
        assert!(list.is_empty());
    }

    #[test]
    fn test_selection_band() {
        let mut scene = Scene::new();
        let id = scene.add(SceneObject::new(40.0, 30.0, 60.0, 20.0));
        let ruler = RulerRenderer::default();
        let mut list = DisplayList::new();
        ruler.paint(&mut list, &scene, &[id], Affine::IDENTITY, Size::new(400.0, 300.0));

        let band: SerializableColor = ruler.theme.highlight.into();
        assert!(list.commands.contains(&DrawCommand::FillRect {
            rect: Rect::new(40.0, 0.0, 100.0, 20.0),
            color: band,
        }));
        assert!(list.commands.contains(&DrawCommand::FillRect {
            rect: Rect::new(0.0, 30.0, 20.0, 50.0),
            color: band,
        }));

        let masks: Vec<_> = list
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::GradientRect { rect, stops, .. } => Some((*rect, stops.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(masks.len(), 4);
        assert_eq!(masks[0].0, Rect::new(-40.0, 0.0, 120.0, 20.0));
        let offsets: Vec<f32> = masks[0].1.iter().map(|(o, _)| *o).collect();
        assert_eq!(offsets, vec![0.0, 0.35, 0.65, 1.0]);
        assert_eq!(masks[0].1[0].1.a, 0);
        assert_eq!(masks[0].1[1].1.a, 255);

        let texts = list.texts();
        for label in ["40", "100", "30", "50"] {
            assert!(texts.contains(&label), "missing band label {label}");
        }
    }

    #[test]
    fn test_band_merges_overlapping_selection() {
        let mut scene = Scene::new();
        let a = scene.add(SceneObject::new(0.0, 0.0, 50.0, 10.0));
        let b = scene.add(SceneObject::new(40.0, 200.0, 50.0, 10.0));
        let ruler = RulerRenderer::default();
        let mut list = DisplayList::new();
        let transform = Affine::translate(Vec2::new(100.0, 100.0));
        ruler.paint(&mut list, &scene, &[a, b], transform, Size::new(400.0, 400.0));

        let band: SerializableColor = ruler.theme.highlight.into();
        let horizontal_bands = list
            .commands
            .iter()
            .filter(|c| match c {
                DrawCommand::FillRect { rect, color } => *color == band && rect.y0 == 0.0 && rect.width() != 20.0,
                _ => false,
            })
            .count();
        assert_eq!(horizontal_bands, 1);
        assert!(list.commands.contains(&DrawCommand::FillRect {
            rect: Rect::new(100.0, 0.0, 190.0, 20.0),
            color: band,
        }));
    }

    #[test]
    fn test_hit_test() {
        let ruler = RulerRenderer::default();
        let size = Size::new(400.0, 300.0);
        assert_eq!(ruler.hit_test(Point::new(100.0, 10.0), size), Some(Axis::X));
        assert_eq!(ruler.hit_test(Point::new(10.0, 100.0), size), Some(Axis::Y));
        assert_eq!(ruler.hit_test(Point::new(10.0, 10.0), size), None);
        assert_eq!(ruler.hit_test(Point::new(100.0, 100.0), size), None);
        assert_eq!(ruler.hit_test(Point::new(500.0, 10.0), size), None);
    }

    #[test]
    fn test_reference_line_from_top_ruler() {
        let ruler = RulerRenderer::default();
        let transform = Affine::translate(Vec2::new(10.0, 20.0)) * Affine::scale(2.0);
        let position = ruler.reference_position(Axis::X, Point::new(100.0, 60.0), transform).unwrap();
        assert!((position - 20.0).abs() < 1e-9);

        let line = ruler.reference_line(Axis::X, Point::new(100.0, 60.0), transform, 1000.0).unwrap();
        assert_eq!(line.guide_axis(), Some(Axis::Y));
        assert!((line.top - 20.0).abs() < 1e-9);

        assert!(ruler.reference_position(Axis::Y, Point::ZERO, Affine::scale(0.0)).is_err());
    }
}
