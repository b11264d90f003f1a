//! Vello-based renderer implementation.

use kurbo::{Affine, Line, Point, Rect, Stroke};
use parley::layout::PositionedLayoutItem;
use parley::{FontContext, LayoutContext, StyleProperty};
use peniko::{Brush, Color, ColorStop, Fill, Gradient};
use vello::Scene;

use crate::renderer::{OverlayRenderer, RenderContext, Renderer};
use crate::surface::{DrawSurface, TextAlign, TextStyle};

/// [`DrawSurface`] that encodes into a Vello scene.
pub struct VelloSurface<'a> {
    scene: &'a mut Scene,
    font_cx: &'a mut FontContext,
    layout_cx: &'a mut LayoutContext<Brush>,
    transform: Affine,
    stack: Vec<Affine>,
}

impl<'a> VelloSurface<'a> {
    pub fn new(
        scene: &'a mut Scene,
        font_cx: &'a mut FontContext,
        layout_cx: &'a mut LayoutContext<Brush>,
    ) -> Self {
        Self {
            scene,
            font_cx,
            layout_cx,
            transform: Affine::IDENTITY,
            stack: Vec::new(),
        }
    }
}

impl DrawSurface for VelloSurface<'_> {
    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(transform) = self.stack.pop() {
            self.transform = transform;
        }
    }

    fn concat_transform(&mut self, transform: Affine) {
        self.transform *= transform;
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.scene.fill(Fill::NonZero, self.transform, color, None, &rect);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64) {
        self.scene
            .stroke(&Stroke::new(width), self.transform, color, None, &rect);
    }

    fn line(&mut self, from: Point, to: Point, color: Color, width: f64) {
        let line = Line::new(from, to);
        self.scene
            .stroke(&Stroke::new(width), self.transform, color, None, &line);
    }

    fn fill_gradient_rect(&mut self, rect: Rect, start: Point, end: Point, stops: &[(f32, Color)]) {
        let stops: Vec<ColorStop> = stops
            .iter()
            .map(|&(offset, color)| ColorStop {
                offset,
                color: color.into(),
            })
            .collect();
        let gradient = Gradient::new_linear(start, end).with_stops(stops.as_slice());
        self.scene
            .fill(Fill::NonZero, self.transform, &gradient, None, &rect);
    }

    fn text(&mut self, text: &str, anchor: Point, style: &TextStyle, angle: f64) {
        if text.is_empty() {
            return;
        }
        let brush = Brush::Solid(style.color);

        let mut builder = self.layout_cx.ranged_builder(&mut *self.font_cx, text, 1.0, false);
        builder.push_default(StyleProperty::FontSize(style.size as f32));
        builder.push_default(StyleProperty::Brush(brush.clone()));
        builder.push_default(StyleProperty::FontStack(parley::FontStack::Source(
            "sans-serif".into(),
        )));
        let mut layout = builder.build(text);
        layout.break_all_lines(None);
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());

        let width = layout.width() as f64;
        let height = layout.height() as f64;
        let dx = match style.align {
            TextAlign::Start => 0.0,
            TextAlign::Center => -width / 2.0,
            TextAlign::End => -width,
        };
        // Parley layouts have y=0 at top; center the box on the anchor
        let text_transform = self.transform
            * Affine::translate(anchor.to_vec2())
            * Affine::rotate(angle.to_radians())
            * Affine::translate((dx, -height / 2.0));

        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let synthesis = run.synthesis();
                let glyph_xform = synthesis
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        vello::Glyph {
                            id: glyph.id,
                            x: gx,
                            y: gy,
                        }
                    })
                    .collect();

                if !glyphs.is_empty() {
                    self.scene
                        .draw_glyphs(run.font())
                        .brush(&brush)
                        .hint(true)
                        .transform(text_transform)
                        .glyph_transform(glyph_xform)
                        .font_size(run.font_size())
                        .normalized_coords(run.normalized_coords())
                        .draw(Fill::NonZero, glyphs.into_iter());
                }
            }
        }
    }
}

/// Vello-based renderer for the overlay.
pub struct VelloRenderer {
    /// The Vello scene being built.
    scene: Scene,
    overlay: OverlayRenderer,
    /// Font context for text rendering (cached across frames).
    font_cx: FontContext,
    /// Layout context for text rendering.
    layout_cx: LayoutContext<Brush>,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new(OverlayRenderer::default())
    }
}

impl VelloRenderer {
    /// Create a new Vello renderer.
    pub fn new(overlay: OverlayRenderer) -> Self {
        Self {
            scene: Scene::new(),
            overlay,
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }
}

impl Renderer for VelloRenderer {
    fn overlay(&self) -> &OverlayRenderer {
        &self.overlay
    }

    fn overlay_mut(&mut self) -> &mut OverlayRenderer {
        &mut self.overlay
    }

    fn build_scene(&mut self, ctx: &RenderContext) {
        self.scene.reset();
        let mut surface = VelloSurface::new(&mut self.scene, &mut self.font_cx, &mut self.layout_cx);
        self.overlay.paint(ctx, &mut surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use snapline_core::{Axis, GuideSegment, Scene as SnapScene};

    #[test]
    fn test_renderer_creation() {
        let renderer = VelloRenderer::default();
        assert!(renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_build_scene_encodes_overlay() {
        let mut renderer = VelloRenderer::default();
        renderer.overlay_mut().guides.update(&[GuideSegment {
            axis: Axis::Y,
            position: 40.0,
            range_start: 0.0,
            range_end: 300.0,
        }]);
        let scene = SnapScene::new();
        let ctx = RenderContext::new(&scene, Affine::IDENTITY, Size::new(800.0, 600.0));
        renderer.build_scene(&ctx);
        assert!(!renderer.scene().encoding().is_empty());

        let taken = renderer.take_scene();
        assert!(!taken.encoding().is_empty());
        assert!(renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_restore_without_save_is_ignored() {
        let mut scene = Scene::new();
        let mut font_cx = FontContext::new();
        let mut layout_cx = LayoutContext::new();
        let mut surface = VelloSurface::new(&mut scene, &mut font_cx, &mut layout_cx);
        surface.restore();
        surface.save();
        surface.concat_transform(Affine::scale(2.0));
        surface.restore();
        assert_eq!(surface.transform, Affine::IDENTITY);
    }
}
