//! Snapline Render Library
//!
//! Rulers and alignment guides painted through the [`DrawSurface`] trait.
//! The default implementation uses Vello for GPU-accelerated rendering.

pub mod guides;
mod renderer;
pub mod ruler;
pub mod surface;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use guides::{GuideOverlay, GuideStyle};
pub use renderer::{
    OverlayRenderer, RecordingRenderer, RenderContext, RenderResult, Renderer, RendererError,
};
pub use ruler::{RulerRenderer, RulerTheme, Tick, tick_gap, visible_ticks};
pub use surface::{DisplayList, DrawCommand, DrawSurface, SerializableColor, TextAlign, TextStyle};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::{VelloRenderer, VelloSurface};
