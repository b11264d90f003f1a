//! Object-to-object snapping with alignment guides.
//!
//! Each drag frame the engine collects the corner sets of every other
//! visible object, finds edges and centers within the snap margin of the
//! dragged object's own edges and center, and moves the dragged object's
//! center so the closest of them lines up exactly. The aligned pairs are
//! reported as [`GuideSegment`]s for the overlay to paint.

use crate::config::SnapConfig;
use crate::error::{GeometryError, GeometryResult};
use crate::geometry::{Axis, CornerSet};
use crate::interval::{HighlightInterval, merge};
use crate::scene::{ObjectId, SceneGraph, SceneObject};
use crate::transform::{Transform2D, decompose};
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An object taking part in a snap computation, with geometry freshly
/// derived for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTarget {
    pub id: ObjectId,
    pub corners: CornerSet,
    /// Axis on which this object neither snaps nor is snapped to.
    pub skip_axis: Option<Axis>,
}

impl SnapTarget {
    /// Build a target from the object's current geometry.
    pub fn from_object(object: &SceneObject) -> Option<Self> {
        object.corners().map(|corners| Self {
            id: object.id(),
            corners,
            skip_axis: object.skip_axis(),
        })
    }

    fn participates(&self, axis: Axis) -> bool {
        self.skip_axis != Some(axis)
    }
}

/// Candidate center coordinates recorded during one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapPointSet {
    pub snap_x: Vec<f64>,
    pub snap_y: Vec<f64>,
}

impl SnapPointSet {
    pub fn record(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.snap_x.push(value),
            Axis::Y => self.snap_y.push(value),
        }
    }

    pub fn values(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::X => &self.snap_x,
            Axis::Y => &self.snap_y,
        }
    }

    /// The recorded value closest to `center`. On a tie the value recorded
    /// first wins.
    pub fn best(&self, axis: Axis, center: f64) -> Option<f64> {
        let mut best: Option<f64> = None;
        for &value in self.values(axis) {
            match best {
                Some(current) if (value - center).abs() >= (current - center).abs() => {}
                _ => best = Some(value),
            }
        }
        best
    }

    pub fn is_empty(&self) -> bool {
        self.snap_x.is_empty() && self.snap_y.is_empty()
    }
}

/// A guide line to display while dragging.
///
/// `axis` is the axis `position` is measured on: an `Axis::X` segment is the
/// vertical line `x = position` running from `range_start` to `range_end`
/// in y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideSegment {
    pub axis: Axis,
    pub position: f64,
    pub range_start: f64,
    pub range_end: f64,
}

impl GuideSegment {
    /// End points in scene space.
    pub fn endpoints(&self) -> (Point, Point) {
        match self.axis {
            Axis::X => (
                Point::new(self.position, self.range_start),
                Point::new(self.position, self.range_end),
            ),
            Axis::Y => (
                Point::new(self.range_start, self.position),
                Point::new(self.range_end, self.position),
            ),
        }
    }
}

/// Result of one snap computation.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapOutcome {
    pub original_center: Point,
    pub adjusted_center: Point,
    pub snapped_x: bool,
    pub snapped_y: bool,
    pub guides: Vec<GuideSegment>,
}

impl SnapOutcome {
    /// Outcome that leaves the object where it is.
    pub fn none(center: Point) -> Self {
        Self {
            original_center: center,
            adjusted_center: center,
            snapped_x: false,
            snapped_y: false,
            guides: Vec::new(),
        }
    }

    /// Translation to apply to the dragged objects.
    pub fn delta(&self) -> Vec2 {
        self.adjusted_center - self.original_center
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Computes snap corrections and guide segments.
#[derive(Debug, Clone, Default)]
pub struct SnapEngine {
    pub config: SnapConfig,
}

impl SnapEngine {
    pub fn new(config: SnapConfig) -> Self {
        Self { config }
    }

    /// IDs of every object the active selection may snap to, in scene walk
    /// order.
    ///
    /// Invisible objects and the active objects are skipped together with
    /// their subtrees. A group is a candidate on its own unless it contains
    /// an active object; its children are walked either way.
    pub fn candidate_ids(&self, scene: &dyn SceneGraph, active_ids: &[ObjectId]) -> Vec<ObjectId> {
        let active: HashSet<ObjectId> = active_ids.iter().copied().collect();
        let containing: HashSet<ObjectId> = active_ids
            .iter()
            .flat_map(|id| scene.ancestors(*id))
            .collect();

        let mut ids = Vec::new();
        for object in scene.objects() {
            collect_candidates(object, &active, &containing, &mut ids);
        }
        ids
    }

    /// Resolve candidate IDs to targets with current geometry. IDs that no
    /// longer exist or have no geometry are dropped.
    pub fn resolve_candidates(&self, scene: &dyn SceneGraph, ids: &[ObjectId]) -> Vec<SnapTarget> {
        ids.iter()
            .filter_map(|id| scene.find(*id))
            .filter(|object| object.visible)
            .filter_map(SnapTarget::from_object)
            .collect()
    }

    /// Candidate targets for the current frame.
    pub fn gather_candidates(&self, scene: &dyn SceneGraph, active_ids: &[ObjectId]) -> Vec<SnapTarget> {
        let ids = self.candidate_ids(scene, active_ids);
        self.resolve_candidates(scene, &ids)
    }

    /// The dragged selection as one target.
    ///
    /// A single object keeps its oriented corners. Several objects snap with
    /// the axis-aligned union of their bounds.
    pub fn active_target(&self, scene: &dyn SceneGraph, ids: &[ObjectId]) -> GeometryResult<SnapTarget> {
        let targets: Vec<SnapTarget> = ids
            .iter()
            .filter_map(|id| scene.find(*id))
            .filter_map(SnapTarget::from_object)
            .collect();

        match targets.as_slice() {
            [] => Err(GeometryError::DetachedObject(
                ids.first().copied().unwrap_or_default(),
            )),
            [single] => Ok(*single),
            [first, rest @ ..] => {
                let bounds = rest
                    .iter()
                    .fold(first.corners.bounds(), |acc, t| acc.union(t.corners.bounds()));
                Ok(SnapTarget {
                    id: first.id,
                    corners: CornerSet::from_rect(bounds),
                    skip_axis: None,
                })
            }
        }
    }

    /// Snap distance in scene units on `axis`.
    pub fn tolerance(&self, viewport: &Transform2D, axis: Axis) -> f64 {
        let tolerance = viewport.scene_length(self.config.margin_px, axis);
        match self.config.max_scene_tolerance {
            Some(max) => tolerance.min(max),
            None => tolerance,
        }
    }

    /// Compute the snap correction for `active` against `candidates`.
    pub fn compute_snap(
        &self,
        active: &SnapTarget,
        candidates: &[SnapTarget],
        transform: Affine,
    ) -> GeometryResult<SnapOutcome> {
        let viewport = decompose(transform)?;
        let center = active.corners.c;
        if !self.config.enabled {
            return Ok(SnapOutcome::none(center));
        }

        let candidates: Vec<&SnapTarget> = candidates.iter().filter(|c| c.id != active.id).collect();
        let mut points = SnapPointSet::default();

        for axis in Axis::BOTH {
            if !active.participates(axis) {
                continue;
            }
            let tolerance = self.tolerance(&viewport, axis);
            let center_coord = axis.coord(center);
            let active_points = active.corners.axis_points(axis);

            for candidate in candidates.iter().filter(|c| c.participates(axis)) {
                for active_point in &active_points {
                    let from = axis.coord(*active_point);
                    for candidate_point in candidate.corners.axis_points(axis) {
                        let to = axis.coord(candidate_point);
                        if (to - from).abs() <= tolerance {
                            points.record(axis, center_coord + (to - from));
                        }
                    }
                }
            }
        }

        let best_x = points.best(Axis::X, center.x);
        let best_y = points.best(Axis::Y, center.y);
        let adjusted_center = Point::new(best_x.unwrap_or(center.x), best_y.unwrap_or(center.y));
        log::trace!(
            "Snap: {} candidates, {} x / {} y values, center {:?} -> {:?}",
            candidates.len(),
            points.snap_x.len(),
            points.snap_y.len(),
            center,
            adjusted_center
        );

        let moved = active.corners.translate(adjusted_center - center);
        let mut guides = Vec::new();
        if best_x.is_some() {
            guides.extend(self.guides_for_axis(&moved, Axis::X, &candidates));
        }
        if best_y.is_some() {
            guides.extend(self.guides_for_axis(&moved, Axis::Y, &candidates));
        }

        Ok(SnapOutcome {
            original_center: center,
            adjusted_center,
            snapped_x: best_x.is_some(),
            snapped_y: best_y.is_some(),
            guides,
        })
    }

    /// Gather candidates and snap the selection in one call.
    pub fn snap_selection(
        &self,
        scene: &dyn SceneGraph,
        active_ids: &[ObjectId],
        transform: Affine,
    ) -> GeometryResult<SnapOutcome> {
        let active = self.active_target(scene, active_ids)?;
        let candidates = self.gather_candidates(scene, active_ids);
        self.compute_snap(&active, &candidates, transform)
    }

    /// Guides where the moved selection lines up with a candidate on `axis`.
    fn guides_for_axis(&self, moved: &CornerSet, axis: Axis, candidates: &[&SnapTarget]) -> Vec<GuideSegment> {
        let epsilon = self.config.coincidence_epsilon;
        let other = axis.other();
        let active_positions: Vec<f64> = moved.axis_points(axis).iter().map(|p| axis.coord(*p)).collect();
        let (active_lo, active_hi) = moved.extent(other);

        // (position, spans) buckets in discovery order
        let mut buckets: Vec<(f64, Vec<HighlightInterval>)> = Vec::new();
        for candidate in candidates.iter().filter(|c| c.participates(axis)) {
            let (lo, hi) = candidate.corners.extent(other);
            let span = HighlightInterval::new(active_lo.min(lo), active_hi.max(hi));
            for point in candidate.corners.axis_points(axis) {
                let position = axis.coord(point);
                if !active_positions.iter().any(|p| (p - position).abs() <= epsilon) {
                    continue;
                }
                match buckets.iter_mut().find(|(p, _)| (p - position).abs() <= epsilon) {
                    Some((_, spans)) => spans.push(span),
                    None => buckets.push((position, vec![span])),
                }
            }
        }

        buckets
            .into_iter()
            .flat_map(|(position, spans)| {
                merge(&spans, other).into_iter().map(move |iv| GuideSegment {
                    axis,
                    position,
                    range_start: iv.start,
                    range_end: iv.end,
                })
            })
            .collect()
    }
}

fn collect_candidates(
    object: &SceneObject,
    active: &HashSet<ObjectId>,
    containing: &HashSet<ObjectId>,
    out: &mut Vec<ObjectId>,
) {
    if !object.visible || active.contains(&object.id()) {
        return;
    }
    if !object.is_group() || !containing.contains(&object.id()) {
        out.push(object.id());
    }
    for child in object.children() {
        collect_candidates(child, active, containing, out);
    }
}
