//! Drag gesture handling: follows the pointer, snaps, and keeps the guides
//! for the overlay.

use crate::config::SnapConfig;
use crate::scene::{ObjectId, SceneGraphMut};
use crate::snap::{GuideSegment, SnapEngine};
use crate::throttle::{FrameThrottle, Instant};
use crate::transform::to_scene;
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Object transform events delivered by the host. Pointer positions are in
/// screen space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransformEvent {
    /// A drag of `targets` begins at `pointer`.
    Start { pointer: Point, targets: Vec<ObjectId> },
    /// The pointer moved while dragging.
    Move { pointer: Point },
    /// The drag finished.
    End { pointer: Point },
    /// The drag was aborted. Frames already applied are kept.
    Cancel,
}

#[derive(Debug, Clone)]
struct ActiveDrag {
    targets: Vec<ObjectId>,
    /// Pointer position at drag start, in scene space.
    start: Point,
    /// Total translation applied so far, snap corrections included.
    applied: Vec2,
    candidate_ids: Vec<ObjectId>,
}

/// State of one object drag, from start to end or cancel.
#[derive(Debug, Clone)]
pub struct DragSession {
    engine: SnapEngine,
    throttle: FrameThrottle,
    drag: Option<ActiveDrag>,
    guides: Vec<GuideSegment>,
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new(SnapConfig::default())
    }
}

impl DragSession {
    pub fn new(config: SnapConfig) -> Self {
        Self {
            throttle: FrameThrottle::new(config.throttle_interval()),
            engine: SnapEngine::new(config),
            drag: None,
            guides: Vec::new(),
        }
    }

    pub fn engine(&self) -> &SnapEngine {
        &self.engine
    }

    /// Check if a drag is in progress.
    pub fn is_active(&self) -> bool {
        self.drag.is_some()
    }

    /// Objects being dragged, empty when idle.
    pub fn targets(&self) -> &[ObjectId] {
        self.drag.as_ref().map(|d| d.targets.as_slice()).unwrap_or(&[])
    }

    /// Guides produced by the last frame.
    pub fn guides(&self) -> &[GuideSegment] {
        &self.guides
    }

    /// Process one event. Returns true if the scene or the guides changed
    /// and the host should redraw.
    ///
    /// Geometry failures are logged and skip the frame; they never reach the
    /// caller.
    pub fn handle<S: SceneGraphMut>(
        &mut self,
        event: &TransformEvent,
        scene: &mut S,
        transform: Affine,
        now: Instant,
    ) -> bool {
        match event {
            TransformEvent::Start { pointer, targets } => self.start(*pointer, targets, transform),
            TransformEvent::Move { pointer } => self.drag_to(*pointer, scene, transform, now),
            TransformEvent::End { .. } => {
                if self.drag.is_some() {
                    log::trace!("Drag ended");
                }
                self.finish()
            }
            TransformEvent::Cancel => {
                if self.drag.is_some() {
                    log::trace!("Drag cancelled");
                }
                self.finish()
            }
        }
    }

    fn start(&mut self, pointer: Point, targets: &[ObjectId], transform: Affine) -> bool {
        let had_guides = !self.guides.is_empty();
        self.guides.clear();
        self.drag = None;

        let start = match to_scene(pointer, transform) {
            Ok(point) => point,
            Err(err) => {
                log::debug!("Ignoring drag start: {err}");
                return had_guides;
            }
        };
        self.throttle.reset();
        self.drag = Some(ActiveDrag {
            targets: targets.to_vec(),
            start,
            applied: Vec2::ZERO,
            candidate_ids: Vec::new(),
        });
        had_guides
    }

    fn drag_to<S: SceneGraphMut>(&mut self, pointer: Point, scene: &mut S, transform: Affine, now: Instant) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        let pointer = match to_scene(pointer, transform) {
            Ok(point) => point,
            Err(err) => {
                log::debug!("Skipping drag frame: {err}");
                return false;
            }
        };

        // Follow the pointer, undoing last frame's snap correction.
        let desired = pointer - drag.start;
        let step = desired - drag.applied;
        drag.targets.retain(|id| scene.translate(*id, step));
        if drag.targets.is_empty() {
            log::debug!("Every dragged object is gone, ending drag");
            self.finish();
            return true;
        }
        drag.applied = desired;

        if self.throttle.ready(now) {
            drag.candidate_ids = self.engine.candidate_ids(&*scene, &drag.targets);
        }

        let outcome = self
            .engine
            .active_target(&*scene, &drag.targets)
            .and_then(|active| {
                let candidates = self.engine.resolve_candidates(&*scene, &drag.candidate_ids);
                self.engine.compute_snap(&active, &candidates, transform)
            });
        match outcome {
            Ok(outcome) => {
                let delta = outcome.delta();
                if delta != Vec2::ZERO {
                    for id in &drag.targets {
                        scene.translate(*id, delta);
                    }
                    drag.applied += delta;
                }
                self.guides = outcome.guides;
            }
            Err(err) => {
                log::debug!("No snap this frame: {err}");
                self.guides.clear();
            }
        }
        true
    }

    fn finish(&mut self) -> bool {
        let was_active = self.drag.take().is_some();
        let had_guides = !self.guides.is_empty();
        self.guides.clear();
        was_active || had_guides
    }
}
