//! Offset bookkeeping for the strip.
//!
//! The tracker turns host-reported pixel offsets into item indices, decides
//! how close the viewport is to either end of the window and holds the
//! pending correction that hides a backward extension from the user.

use std::ops::Range;

use crate::{px::Px, task::Generation};

/// Offset correction waiting for the host to commit a grown content size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCorrection {
    /// Pixels to add to the offset once the new content is laid out.
    pub delta: Px,
    /// Operation that produced the correction.
    pub generation: Generation,
}

/// Last known scroll position plus any correction still to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollAnchor {
    pub last_known_offset: Px,
    pub pending_correction: Option<PendingCorrection>,
}

/// Which ends of the window the viewport is currently close to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeProximity {
    pub near_start: bool,
    pub near_end: bool,
}

/// Converts between pixel offsets and window indices.
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    stride: Px,
    spacing: Px,
    anchor: ScrollAnchor,
}

impl ScrollTracker {
    /// Creates a tracker for cells `item_width` wide with `item_spacing`
    /// between neighbours.
    pub fn new(item_width: Px, item_spacing: Px) -> Self {
        Self {
            stride: item_width.saturating_add(item_spacing),
            spacing: item_spacing,
            anchor: ScrollAnchor::default(),
        }
    }

    pub fn stride(&self) -> Px {
        self.stride
    }

    pub fn anchor(&self) -> ScrollAnchor {
        self.anchor
    }

    /// Last offset reported by the host or requested by the selector.
    pub fn offset(&self) -> Px {
        self.anchor.last_known_offset
    }

    pub fn record_offset(&mut self, offset: Px) {
        self.anchor.last_known_offset = offset;
    }

    /// Drops the anchor entirely. Used on reset.
    pub fn reset(&mut self, offset: Px) {
        self.anchor = ScrollAnchor {
            last_known_offset: offset,
            pending_correction: None,
        };
    }

    /// Index of the cell under the leading edge of the viewport.
    pub fn current_index(&self, len: usize) -> usize {
        self.offset()
            .whole_strides(self.stride)
            .min(len.saturating_sub(1))
    }

    /// Offset that puts `index` at the leading edge of the viewport.
    pub fn offset_for_index(&self, index: usize) -> Px {
        self.stride.saturating_mul_count(index)
    }

    /// Total content extent of a window of `len` cells. There is no gap
    /// after the last cell, matching how a lazy row sums its children.
    pub fn content_extent(&self, len: usize) -> Px {
        if len == 0 {
            return Px::ZERO;
        }
        self.stride
            .saturating_mul_count(len)
            .saturating_sub(self.spacing)
    }

    /// Evaluates both edges independently against `threshold` items.
    pub fn edge_proximity(&self, len: usize, threshold: usize) -> EdgeProximity {
        let current = self.current_index(len);
        let distance_from_start = current;
        let distance_from_end = len.saturating_sub(1) - current;
        EdgeProximity {
            near_start: distance_from_start <= threshold,
            near_end: distance_from_end <= threshold,
        }
    }

    /// Indices worth rendering for a viewport `viewport` pixels wide,
    /// widened by `overscan` on both sides.
    pub fn visible_range(&self, len: usize, viewport: Px, overscan: usize) -> Range<usize> {
        if len == 0 {
            return 0..0;
        }
        let offset = self.offset();
        let mut start = offset.whole_strides(self.stride);
        let mut end = offset
            .saturating_add(viewport)
            .whole_strides(self.stride)
            .saturating_add(1);

        start = start.saturating_sub(overscan).min(len);
        end = end.saturating_add(overscan).min(len);
        if start >= end {
            end = (start + 1).min(len);
            start = end.saturating_sub(1);
        }
        start..end
    }

    /// Stores the shift a backward extension of `days` cells needs.
    pub fn defer_correction(&mut self, days: usize, generation: Generation) -> Px {
        let delta = self.stride.saturating_mul_count(days);
        self.anchor.pending_correction = Some(PendingCorrection { delta, generation });
        delta
    }

    /// Applies the pending correction once `reported_extent` covers a window
    /// of `len` cells. Returns the corrected offset and the generation that
    /// requested it.
    pub fn commit_correction(
        &mut self,
        reported_extent: Px,
        len: usize,
    ) -> Option<(Px, Generation)> {
        let pending = self.anchor.pending_correction?;
        if reported_extent < self.content_extent(len) {
            return None;
        }
        self.anchor.pending_correction = None;
        let target = self.offset().saturating_add(pending.delta);
        self.anchor.last_known_offset = target;
        Some((target, pending.generation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_and_offset_round_trip_at_cell_edges() {
        let mut tracker = ScrollTracker::new(Px(48), Px(8));
        assert_eq!(tracker.offset_for_index(182), Px(10_192));

        tracker.record_offset(Px(10_192));
        assert_eq!(tracker.current_index(365), 182);

        tracker.record_offset(Px(10_247));
        assert_eq!(tracker.current_index(365), 182);

        tracker.record_offset(Px(-40));
        assert_eq!(tracker.current_index(365), 0);

        tracker.record_offset(Px(1_000_000));
        assert_eq!(tracker.current_index(365), 364);
    }

    #[test]
    fn edges_are_evaluated_independently() {
        let mut tracker = ScrollTracker::new(Px(10), Px::ZERO);

        tracker.record_offset(Px(200));
        assert_eq!(
            tracker.edge_proximity(365, 20),
            EdgeProximity {
                near_start: true,
                near_end: false
            }
        );

        tracker.record_offset(Px(210));
        assert!(!tracker.edge_proximity(365, 20).near_start);

        tracker.record_offset(Px(3_440));
        assert!(tracker.edge_proximity(365, 20).near_end);

        tracker.record_offset(Px(0));
        let tiny = tracker.edge_proximity(5, 20);
        assert!(tiny.near_start && tiny.near_end);
    }

    #[test]
    fn visible_range_includes_overscan() {
        let mut tracker = ScrollTracker::new(Px(40), Px(10));
        tracker.record_offset(Px(1_000));
        assert_eq!(tracker.visible_range(365, Px(300), 2), 18..29);

        tracker.record_offset(Px(0));
        assert_eq!(tracker.visible_range(365, Px(300), 2), 0..9);

        tracker.record_offset(Px(50 * 364));
        assert_eq!(tracker.visible_range(365, Px(300), 2), 362..365);
        assert_eq!(tracker.visible_range(0, Px(300), 2), 0..0);
    }

    #[test]
    fn correction_waits_for_committed_extent() {
        let mut tracker = ScrollTracker::new(Px(48), Px(8));
        tracker.record_offset(Px(560));
        let generation = Generation::default().next();

        let delta = tracker.defer_correction(366, generation);
        assert_eq!(delta, Px(20_496));

        // Layout still reports the old window.
        assert_eq!(tracker.commit_correction(Px(48 * 365 + 8 * 364), 731), None);
        assert!(tracker.anchor().pending_correction.is_some());

        // A lazy row reports no spacing after its last child.
        let committed = tracker.commit_correction(Px(48 * 731 + 8 * 730), 731);
        assert_eq!(committed, Some((Px(560 + 20_496), generation)));
        assert_eq!(tracker.offset(), Px(21_056));
        assert_eq!(tracker.anchor().pending_correction, None);
        assert_eq!(tracker.commit_correction(Px(56 * 731), 731), None);
    }

    #[test]
    fn content_extent_has_no_trailing_gap() {
        let tracker = ScrollTracker::new(Px(48), Px(8));
        assert_eq!(tracker.content_extent(0), Px::ZERO);
        assert_eq!(tracker.content_extent(1), Px(48));
        assert_eq!(tracker.content_extent(365), Px(48 * 365 + 8 * 364));
    }

    #[test]
    fn reset_clears_pending_correction() {
        let mut tracker = ScrollTracker::new(Px(48), Px(8));
        tracker.defer_correction(366, Generation::default());
        tracker.reset(Px(10_192));
        assert_eq!(
            tracker.anchor(),
            ScrollAnchor {
                last_known_offset: Px(10_192),
                pending_correction: None
            }
        );
    }
}
