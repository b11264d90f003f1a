//! Renderer trait abstraction.

use kurbo::{Affine, Size};
use snapline_core::{Config, ObjectId, SceneGraph};
use thiserror::Error;

use crate::guides::GuideOverlay;
use crate::ruler::RulerRenderer;
use crate::surface::{DisplayList, DrawSurface};

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The scene the overlay annotates.
    pub scene: &'a dyn SceneGraph,
    /// Scene-to-screen transform.
    pub transform: Affine,
    /// Viewport size in logical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Selected objects, highlighted on the rulers.
    pub selection: &'a [ObjectId],
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(scene: &'a dyn SceneGraph, transform: Affine, viewport_size: Size) -> Self {
        Self {
            scene,
            transform,
            viewport_size,
            scale_factor: 1.0,
            selection: &[],
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the selection to highlight.
    pub fn with_selection(mut self, selection: &'a [ObjectId]) -> Self {
        self.selection = selection;
        self
    }
}

/// Rulers and guides composed into one overlay pass.
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    pub ruler: RulerRenderer,
    pub guides: GuideOverlay,
}

impl OverlayRenderer {
    pub fn new(config: &Config) -> Self {
        Self {
            ruler: RulerRenderer::new(config.ruler.clone()),
            guides: GuideOverlay::default(),
        }
    }

    /// Paint guides, then rulers on top.
    pub fn paint(&self, ctx: &RenderContext, surface: &mut dyn DrawSurface) {
        surface.save();
        if ctx.scale_factor != 1.0 {
            surface.concat_transform(Affine::scale(ctx.scale_factor));
        }
        self.guides.paint(surface, ctx.transform);
        self.ruler
            .paint(surface, ctx.scene, ctx.selection, ctx.transform, ctx.viewport_size);
        surface.restore();
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// The overlay this renderer paints.
    fn overlay(&self) -> &OverlayRenderer;

    fn overlay_mut(&mut self) -> &mut OverlayRenderer;

    /// Build the command buffer for a frame.
    ///
    /// This method is called once per frame and replaces the previous
    /// frame's output.
    fn build_scene(&mut self, ctx: &RenderContext);
}

/// Renderer that records the overlay into a [`DisplayList`].
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    overlay: OverlayRenderer,
    list: DisplayList,
}

impl RecordingRenderer {
    pub fn new(overlay: OverlayRenderer) -> Self {
        Self {
            overlay,
            list: DisplayList::new(),
        }
    }

    /// Commands recorded by the last frame.
    pub fn display_list(&self) -> &DisplayList {
        &self.list
    }

    /// Take ownership of the recorded commands.
    pub fn take_display_list(&mut self) -> DisplayList {
        std::mem::take(&mut self.list)
    }
}

impl Renderer for RecordingRenderer {
    fn overlay(&self) -> &OverlayRenderer {
        &self.overlay
    }

    fn overlay_mut(&mut self) -> &mut OverlayRenderer {
        &mut self.overlay
    }

    fn build_scene(&mut self, ctx: &RenderContext) {
        self.list.clear();
        self.overlay.paint(ctx, &mut self.list);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::DrawCommand;
    use snapline_core::{Axis, GuideSegment, Scene, SceneObject};

    #[test]
    fn test_build_empty_scene() {
        let mut renderer = RecordingRenderer::default();
        let scene = Scene::new();
        let ctx = RenderContext::new(&scene, Affine::IDENTITY, Size::new(800.0, 600.0));
        renderer.build_scene(&ctx);
        // Rulers at minimum
        assert!(!renderer.display_list().texts().is_empty());
    }

    #[test]
    fn test_guides_paint_below_rulers() {
        let mut renderer = RecordingRenderer::default();
        renderer.overlay_mut().guides.update(&[GuideSegment {
            axis: Axis::X,
            position: 150.0,
            range_start: 0.0,
            range_end: 100.0,
        }]);
        let mut scene = Scene::new();
        let id = scene.add(SceneObject::new(0.0, 0.0, 10.0, 10.0));
        let selection = [id];
        let ctx = RenderContext::new(&scene, Affine::IDENTITY, Size::new(400.0, 300.0))
            .with_selection(&selection);
        renderer.build_scene(&ctx);

        let commands = &renderer.display_list().commands;
        let first_line = commands
            .iter()
            .position(|c| matches!(c, DrawCommand::Line { .. }));
        let first_fill = commands
            .iter()
            .position(|c| matches!(c, DrawCommand::FillRect { .. }));
        assert!(first_line < first_fill);
    }

    #[test]
    fn test_scale_factor_wraps_frame() {
        let mut renderer = RecordingRenderer::default();
        let scene = Scene::new();
        let ctx = RenderContext::new(&scene, Affine::IDENTITY, Size::new(100.0, 100.0))
            .with_scale_factor(2.0);
        renderer.build_scene(&ctx);
        let list = renderer.take_display_list();
        assert_eq!(list.commands[0], DrawCommand::Save);
        assert_eq!(
            list.commands[1],
            DrawCommand::Transform {
                transform: Affine::scale(2.0)
            }
        );
        assert_eq!(list.commands.last(), Some(&DrawCommand::Restore));
        assert!(renderer.display_list().is_empty());
    }

    #[test]
    fn test_rebuild_replaces_previous_frame() {
        let mut renderer = RecordingRenderer::default();
        let scene = Scene::new();
        let ctx = RenderContext::new(&scene, Affine::IDENTITY, Size::new(200.0, 200.0));
        renderer.build_scene(&ctx);
        let first = renderer.display_list().len();
        renderer.build_scene(&ctx);
        assert_eq!(renderer.display_list().len(), first);
    }
}
