//! One-dimensional interval merging for ruler highlight bands.

use crate::geometry::Axis;
use crate::scene::{ObjectId, SceneGraph};
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// A closed range on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightInterval {
    pub start: f64,
    pub end: f64,
    /// Axis this interval must not be highlighted on.
    #[serde(default)]
    pub skip_axis: Option<Axis>,
}

impl HighlightInterval {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            skip_axis: None,
        }
    }

    pub fn with_skip_axis(mut self, axis: Option<Axis>) -> Self {
        self.skip_axis = axis;
        self
    }

    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.start && value <= self.end
    }
}

/// Merge overlapping or touching intervals into the minimal set of disjoint
/// runs, sorted by start.
///
/// Intervals flagged to skip `axis` and intervals with non-finite endpoints
/// are dropped. Reversed endpoints are normalized first. Touching intervals
/// (`next.start == current.end`) are merged. A run keeps the `skip_axis`
/// flag its members share and drops it when they disagree.
pub fn merge(intervals: &[HighlightInterval], axis: Axis) -> Vec<HighlightInterval> {
    let mut sorted: Vec<HighlightInterval> = intervals
        .iter()
        .filter(|iv| iv.skip_axis != Some(axis))
        .filter(|iv| iv.start.is_finite() && iv.end.is_finite())
        .map(|iv| HighlightInterval {
            start: iv.start.min(iv.end),
            end: iv.start.max(iv.end),
            skip_axis: iv.skip_axis,
        })
        .collect();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<HighlightInterval> = Vec::with_capacity(sorted.len());
    for iv in sorted {
        match merged.last_mut() {
            Some(current) if iv.start <= current.end => {
                current.end = current.end.max(iv.end);
                if current.skip_axis != iv.skip_axis {
                    current.skip_axis = None;
                }
            }
            _ => merged.push(iv),
        }
    }
    merged
}

/// Projection of `rect` onto `axis`.
pub fn project(rect: Rect, axis: Axis, skip_axis: Option<Axis>) -> HighlightInterval {
    let (start, end) = match axis {
        Axis::X => (rect.x0, rect.x1),
        Axis::Y => (rect.y0, rect.y1),
    };
    HighlightInterval::new(start, end).with_skip_axis(skip_axis)
}

/// Per-axis projections of the bounds of every resolvable object in `ids`.
///
/// Objects that are missing or have no geometry are ignored.
pub fn selection_intervals(
    scene: &dyn SceneGraph,
    ids: &[ObjectId],
    axis: Axis,
) -> Vec<HighlightInterval> {
    ids.iter()
        .filter_map(|id| scene.find(*id))
        .filter_map(|object| {
            object
                .bounds()
                .map(|bounds| project(bounds, axis, object.skip_axis()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Scene, SceneObject};

    /// Simple xorshift generator for reproducible inputs.
    struct SimpleRng(u64);

    impl SimpleRng {
        fn next_f64(&mut self) -> f64 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 7;
            self.0 ^= self.0 << 17;
            (self.0 >> 11) as f64 / (1u64 << 53) as f64
        }

        fn intervals(&mut self, count: usize) -> Vec<HighlightInterval> {
            (0..count)
                .map(|_| {
                    let start = self.next_f64() * 1000.0 - 500.0;
                    let len = self.next_f64() * 80.0;
                    HighlightInterval::new(start, start + len)
                })
                .collect()
        }
    }

    fn spans(intervals: &[HighlightInterval]) -> Vec<(f64, f64)> {
        intervals.iter().map(|iv| (iv.start, iv.end)).collect()
    }

    #[test]
    fn test_empty_and_single() {
        assert!(merge(&[], Axis::X).is_empty());
        let one = [HighlightInterval::new(3.0, 7.0)];
        assert_eq!(spans(&merge(&one, Axis::X)), vec![(3.0, 7.0)]);
    }

    #[test]
    fn test_overlapping_merge() {
        let input = [
            HighlightInterval::new(0.0, 50.0),
            HighlightInterval::new(40.0, 90.0),
        ];
        assert_eq!(spans(&merge(&input, Axis::X)), vec![(0.0, 90.0)]);
    }

    #[test]
    fn test_disjoint_stay_separate() {
        let input = [
            HighlightInterval::new(20.0, 30.0),
            HighlightInterval::new(0.0, 10.0),
        ];
        assert_eq!(
            spans(&merge(&input, Axis::Y)),
            vec![(0.0, 10.0), (20.0, 30.0)]
        );
    }

    #[test]
    fn test_touching_merge() {
        let input = [
            HighlightInterval::new(0.0, 10.0),
            HighlightInterval::new(10.0, 20.0),
        ];
        assert_eq!(spans(&merge(&input, Axis::X)), vec![(0.0, 20.0)]);
    }

    #[test]
    fn test_nested_collapses_to_outer() {
        let input = [
            HighlightInterval::new(0.0, 100.0),
            HighlightInterval::new(10.0, 20.0),
            HighlightInterval::new(30.0, 40.0),
        ];
        assert_eq!(spans(&merge(&input, Axis::X)), vec![(0.0, 100.0)]);
    }

    #[test]
    fn test_reversed_and_invalid() {
        let input = [
            HighlightInterval::new(10.0, 0.0),
            HighlightInterval::new(f64::NAN, 5.0),
            HighlightInterval::new(0.0, f64::INFINITY),
        ];
        assert_eq!(spans(&merge(&input, Axis::X)), vec![(0.0, 10.0)]);
    }

    #[test]
    fn test_skip_axis_filters() {
        let input = [
            HighlightInterval::new(0.0, 10.0).with_skip_axis(Some(Axis::X)),
            HighlightInterval::new(20.0, 30.0),
        ];
        assert_eq!(spans(&merge(&input, Axis::X)), vec![(20.0, 30.0)]);
        assert_eq!(merge(&input, Axis::Y).len(), 2);
    }

    #[test]
    fn test_single_flagged_interval_is_unchanged() {
        let one = [HighlightInterval::new(3.0, 7.0).with_skip_axis(Some(Axis::Y))];
        assert_eq!(merge(&one, Axis::X), one.to_vec());
    }

    #[test]
    fn test_run_keeps_shared_flag_only() {
        let shared = [
            HighlightInterval::new(0.0, 10.0).with_skip_axis(Some(Axis::Y)),
            HighlightInterval::new(5.0, 20.0).with_skip_axis(Some(Axis::Y)),
        ];
        let merged = merge(&shared, Axis::X);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].skip_axis, Some(Axis::Y));
        // Re-merging on the skipped axis still filters the run.
        assert!(merge(&merged, Axis::Y).is_empty());

        let mixed = [
            HighlightInterval::new(0.0, 10.0).with_skip_axis(Some(Axis::Y)),
            HighlightInterval::new(5.0, 20.0),
        ];
        let merged = merge(&mixed, Axis::X);
        assert_eq!(merged, vec![HighlightInterval::new(0.0, 20.0)]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut rng = SimpleRng(0x2545_f491_4f6c_dd1d);
        for _ in 0..50 {
            let input = rng.intervals(40);
            let once = merge(&input, Axis::X);
            let twice = merge(&once, Axis::X);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_merge_covers_exactly_the_input() {
        let mut rng = SimpleRng(42);
        for _ in 0..50 {
            let input = rng.intervals(25);
            let merged = merge(&input, Axis::Y);

            for pair in merged.windows(2) {
                assert!(pair[0].end < pair[1].start, "not disjoint: {pair:?}");
            }
            for iv in &input {
                assert!(
                    merged.iter().any(|m| m.start <= iv.start && iv.end <= m.end),
                    "{iv:?} not covered"
                );
            }
            // Every merged endpoint comes from some input interval.
            for m in &merged {
                assert!(input.iter().any(|iv| iv.start == m.start));
                assert!(input.iter().any(|iv| iv.end == m.end));
            }
        }
    }

    #[test]
    fn test_selection_intervals() {
        let mut scene = Scene::new();
        let a = scene.add(SceneObject::new(0.0, 0.0, 50.0, 10.0));
        let b = scene.add(SceneObject::new(40.0, 100.0, 50.0, 10.0));
        let g = scene.add(SceneObject::guide(Axis::Y, 300.0, 1000.0));
        let ids = [a, b, g, uuid::Uuid::new_v4()];

        let xs = merge(&selection_intervals(&scene, &ids, Axis::X), Axis::X);
        assert_eq!(spans(&xs), vec![(0.0, 90.0)]);

        let ys = merge(&selection_intervals(&scene, &ids, Axis::Y), Axis::Y);
        assert_eq!(spans(&ys), vec![(0.0, 10.0), (100.0, 110.0), (300.0, 300.0)]);
    }
}
