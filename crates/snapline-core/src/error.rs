//! Geometry errors.
//!
//! None of these are fatal to the host: callers on the event loop side
//! recover by skipping the current snap or ruler pass.

use crate::scene::ObjectId;
use thiserror::Error;

/// Errors produced while deriving per-frame geometry.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    /// The viewport transform cannot be inverted (zero scale or collapsed axes).
    #[error("Degenerate viewport transform (determinant {determinant})")]
    DegenerateTransform { determinant: f64 },
    /// The object has no resolvable bounds (removed from the scene or zero-size).
    #[error("Object {0} has no resolvable bounds")]
    DetachedObject(ObjectId),
}

/// Result type for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;
