// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A flat index of block bounds for nearby-block queries.

use core::fmt::{Debug, Formatter, Result as FmtResult};

use kurbo::{Point, Rect};
use smallvec::SmallVec;
use typeblock_host::{BlockId, Workspace};

/// Bounds of live blocks, scanned linearly.
///
/// Slots are keyed by [`BlockId::slot`]; a slot holding a stale generation is
/// treated as empty.
#[derive(Clone, Default)]
pub struct SpatialIndex {
    entries: Vec<Option<(BlockId, Rect)>>,
}

impl Debug for SpatialIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let alive = self.entries.iter().filter(|e| e.is_some()).count();
        f.debug_struct("SpatialIndex")
            .field("total_slots", &self.entries.len())
            .field("alive", &alive)
            .finish_non_exhaustive()
    }
}

impl SpatialIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every block on `ws` that reports bounds and passes `keep`.
    pub fn from_workspace(ws: &dyn Workspace, mut keep: impl FnMut(BlockId) -> bool) -> Self {
        let mut index = Self::new();
        for block in ws.blocks() {
            if keep(block)
                && let Some(rect) = ws.bounds(block)
            {
                index.insert(block, rect);
            }
        }
        index
    }

    /// Inserts or replaces the bounds of `block`.
    pub fn insert(&mut self, block: BlockId, rect: Rect) {
        let slot = block.slot() as usize;
        if self.entries.len() <= slot {
            self.entries.resize_with(slot + 1, || None);
        }
        self.entries[slot] = Some((block, rect));
    }

    /// Removes `block`, returning its bounds if it was indexed.
    pub fn remove(&mut self, block: BlockId) -> Option<Rect> {
        let entry = self.entries.get_mut(block.slot() as usize)?;
        if matches!(entry, Some((id, _)) if *id == block) {
            entry.take().map(|(_, rect)| rect)
        } else {
            None
        }
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of indexed blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// Returns `true` if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    /// Visits every block whose bounds overlap `rect`.
    pub fn visit_rect(&self, rect: Rect, mut f: impl FnMut(BlockId, Rect)) {
        for (id, bounds) in self.entries.iter().flatten() {
            if !bounds.intersect(rect).is_zero_area() || rect.contains(bounds.origin()) {
                f(*id, *bounds);
            }
        }
    }

    /// Blocks whose bounds lie within `radius` of `point`, nearest first, at most
    /// `limit` of them.
    ///
    /// Distance is measured to the closest point of each block's bounds, so a
    /// block containing `point` is at distance zero. Ties keep slot order.
    #[must_use]
    pub fn nearest(&self, point: Point, radius: f64, limit: usize) -> Vec<BlockId> {
        let window = Rect::from_center_size(point, (radius * 2.0, radius * 2.0));
        let mut hits: SmallVec<[(f64, BlockId); 16]> = SmallVec::new();
        self.visit_rect(window, |id, bounds| {
            let d = distance_to_rect(point, bounds);
            if d <= radius {
                hits.push((d, id));
            }
        });
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().take(limit).map(|(_, id)| id).collect()
    }
}

fn distance_to_rect(p: Point, r: Rect) -> f64 {
    let dx = (r.x0 - p.x).max(0.0).max(p.x - r.x1);
    let dy = (r.y0 - p.y).max(0.0).max(p.y - r.y1);
    dx.hypot(dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(slot: u32) -> BlockId {
        BlockId::from_raw(slot, 1)
    }

    #[test]
    fn nearest_orders_by_edge_distance() {
        let mut index = SpatialIndex::new();
        index.insert(id(0), Rect::new(100.0, 0.0, 150.0, 20.0));
        index.insert(id(3), Rect::new(0.0, 30.0, 50.0, 50.0));
        index.insert(id(5), Rect::new(-10.0, -10.0, 10.0, 10.0));
        index.insert(id(7), Rect::new(900.0, 900.0, 950.0, 950.0));

        let hits = index.nearest(Point::ZERO, 200.0, 10);
        assert_eq!(hits, vec![id(5), id(3), id(0)]);
        assert_eq!(index.nearest(Point::ZERO, 200.0, 2), vec![id(5), id(3)]);
    }

    #[test]
    fn stale_ids_do_not_remove_live_entries() {
        let mut index = SpatialIndex::new();
        index.insert(id(2), Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(index.remove(BlockId::from_raw(2, 9)), None);
        assert_eq!(index.len(), 1);
        assert!(index.remove(id(2)).is_some());
        assert!(index.is_empty());
    }

    #[test]
    fn visit_includes_degenerate_bounds_inside_the_window() {
        let mut index = SpatialIndex::new();
        index.insert(id(1), Rect::new(5.0, 5.0, 5.0, 5.0));
        let mut seen = Vec::new();
        index.visit_rect(Rect::new(0.0, 0.0, 10.0, 10.0), |id, _| seen.push(id));
        assert_eq!(seen, vec![id(1)]);
    }

    #[test]
    fn distance_is_zero_inside() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(distance_to_rect(Point::new(5.0, 5.0), r), 0.0);
        assert_eq!(distance_to_rect(Point::new(13.0, 14.0), r), 5.0);
    }
}
