//! Bidirectional best-first `PathSearch`.
//!
//! Starting from both `source` and `target` simultaneously, the search
//! expands each frame over its parent frames (the only direction edges can
//! be walked, since an edge is stored on its child keyed by parent), with
//! edge cost `time_to_nearest(t)`. Path cost is the *max* over edges on the
//! path (minimax, not sum) — still correctly handled by a Dijkstra-shaped
//! best-first search because max is monotonic non-decreasing along any
//! walk, so the standard "first pop is optimal" argument still holds.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use log::debug;

use crate::error::TfError;
use crate::ids::FrameId;
use crate::registry::{FrameHandle, FrameRegistry};
use crate::time::Timestamp;
use crate::transform_storage::TransformStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Source,
    Target,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    cost: u64,
    /// The neighbouring frame this slot was reached from (its child, one
    /// step closer to the search's origin). `None` at the origin itself.
    pred: Option<FrameHandle>,
}

#[derive(Debug, Clone, Copy, Default)]
struct NodeState {
    back_step: Option<Slot>,
    fwd_step: Option<Slot>,
}

/// The two edge lists a successful search produces.
pub struct SearchPath {
    /// Edges from `source` up to the meeting frame, source-first.
    pub inverse: Vec<TransformStorage>,
    /// Edges from `target` up to the meeting frame, target-first.
    pub forward: Vec<TransformStorage>,
    pub meet: FrameHandle,
}

pub struct PathSearch;

impl PathSearch {
    pub fn search(
        registry: &FrameRegistry,
        source: FrameHandle,
        target: FrameHandle,
        source_id: &FrameId,
        target_id: &FrameId,
        t: Timestamp,
    ) -> Result<SearchPath, TfError> {
        let mut state: HashMap<FrameHandle, NodeState> = HashMap::new();
        let mut heap: BinaryHeap<Reverse<(u64, u64, FrameHandle, Direction)>> = BinaryHeap::new();
        let mut seq: u64 = 0;

        state.entry(source).or_default().back_step = Some(Slot { cost: 0, pred: None });
        heap.push(Reverse((0, seq, source, Direction::Source)));
        seq += 1;

        state.entry(target).or_default().fwd_step = Some(Slot { cost: 0, pred: None });
        heap.push(Reverse((0, seq, target, Direction::Target)));
        seq += 1;

        while let Some(Reverse((cost, _, frame, dir))) = heap.pop() {
            let current_slot = match dir {
                Direction::Source => state.get(&frame).and_then(|s| s.back_step),
                Direction::Target => state.get(&frame).and_then(|s| s.fwd_step),
            };
            // Stale entry: a better path to `frame` from this direction was
            // already recorded.
            match current_slot {
                Some(slot) if slot.cost == cost => {}
                _ => continue,
            }

            let both = state.get(&frame).map(|s| s.back_step.is_some() && s.fwd_step.is_some()).unwrap_or(false);
            if both {
                debug!("path search meet at `{}` cost {}ns", registry.frame_id_str(frame), cost);
                return Self::reconstruct(registry, &state, frame, t);
            }

            for parent in registry.frame(frame).parent_frames() {
                let edge_cost = match registry.frame(frame).time_to_nearest(parent, t) {
                    Some(c) => c,
                    None => continue,
                };
                let new_cost = cost.max(edge_cost);

                let entry = state.entry(parent).or_default();
                let existing = match dir {
                    Direction::Source => entry.back_step,
                    Direction::Target => entry.fwd_step,
                };

                let should_push = match existing {
                    None => true,
                    Some(slot) => new_cost < slot.cost,
                };

                if should_push {
                    let new_slot = Slot { cost: new_cost, pred: Some(frame) };
                    match dir {
                        Direction::Source => entry.back_step = Some(new_slot),
                        Direction::Target => entry.fwd_step = Some(new_slot),
                    }
                    heap.push(Reverse((new_cost, seq, parent, dir)));
                    seq += 1;
                }
            }
        }

        Err(TfError::not_connected(source_id, target_id))
    }

    fn reconstruct(
        registry: &FrameRegistry,
        state: &HashMap<FrameHandle, NodeState>,
        meet: FrameHandle,
        t: Timestamp,
    ) -> Result<SearchPath, TfError> {
        let inverse = Self::walk_and_reverse(registry, state, meet, true, t)?;
        let forward = Self::walk_and_reverse(registry, state, meet, false, t)?;
        Ok(SearchPath { inverse, forward, meet })
    }

    /// Walk the `back_step` (if `towards_source`) or `fwd_step` chain from
    /// `meet` down to the origin, collecting edges, then reverse so the
    /// result is ordered origin-first (matching
    /// [`crate::accumulator::TransformAccumulator::accum`]'s expected
    /// order).
    ///
    /// The cost pass above and this reconstruction pass both read the same
    /// per-edge buffers but aren't atomic with each other: a concurrent
    /// insert can evict the very sample that made an edge look traversable
    /// during costing. Rather than silently omitting that edge from the
    /// composed path, a failed re-fetch here fails the whole search.
    fn walk_and_reverse(
        registry: &FrameRegistry,
        state: &HashMap<FrameHandle, NodeState>,
        meet: FrameHandle,
        towards_source: bool,
        t: Timestamp,
    ) -> Result<Vec<TransformStorage>, TfError> {
        let mut edges = Vec::new();
        let mut current = meet;

        loop {
            let slot = state.get(&current).and_then(|s| if towards_source { s.back_step } else { s.fwd_step });
            let slot = match slot {
                Some(s) => s,
                None => break,
            };
            let child = match slot.pred {
                Some(child) => child,
                None => break, // reached the origin itself
            };
            // Edge is stored on `child`, keyed by its parent `current`.
            let sample = registry.frame(child).get_data(current, t)?;
            edges.push(sample);
            current = child;
        }

        edges.reverse();
        Ok(edges)
    }
}
