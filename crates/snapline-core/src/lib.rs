//! Snapline Core Library
//!
//! Platform-agnostic geometry for alignment guides, object snapping and
//! coordinate rulers. The host canvas is reached only through the
//! [`scene::SceneGraph`] and [`camera::ViewportSource`] traits.

pub mod camera;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod interval;
pub mod scene;
pub mod snap;
pub mod throttle;
pub mod transform;

pub use camera::{Camera, ViewportSource};
pub use config::{Config, ConfigError, GapStep, RulerConfig, SnapConfig};
pub use error::GeometryError;
pub use geometry::{Axis, AxisAlignedRect, CornerSet};
pub use gesture::{DragSession, TransformEvent};
pub use interval::{HighlightInterval, merge};
pub use scene::{ObjectId, ObjectKind, Scene, SceneGraph, SceneGraphMut, SceneObject};
pub use snap::{GuideSegment, SnapEngine, SnapOutcome, SnapPointSet, SnapTarget};
pub use throttle::{FrameThrottle, Instant};
pub use transform::{Transform2D, decompose, to_scene, to_screen};
