//! `Frame`: a named node in the graph, owning one `TimeCache` per parent it
//! has ever been observed under.
//!
//! Logged data can show a frame with more than one parent over its
//! history, unlike the tree assumption of the original `tf`. A `Frame` is
//! therefore a map from parent handle to `TimeCache`, not a single edge.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::cache::TimeCache;
use crate::error::TfError;
use crate::registry::FrameHandle;
use crate::transform_storage::TransformStorage;

pub struct Frame {
    id: String,
    default_cache_duration_nanos: i64,
    parents: RwLock<HashMap<FrameHandle, TimeCache>>,
}

impl Frame {
    pub fn new(id: String, default_cache_duration_nanos: i64) -> Self {
        Self { id, default_cache_duration_nanos, parents: RwLock::new(HashMap::new()) }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// All parent frames this frame has ever recorded data against.
    pub fn parent_frames(&self) -> Vec<FrameHandle> {
        self.parents.read().keys().copied().collect()
    }

    pub fn insert(&self, sample: TransformStorage) -> bool {
        let mut parents = self.parents.write();
        let cache = parents
            .entry(sample.frame_id)
            .or_insert_with(|| TimeCache::new(self.default_cache_duration_nanos));
        cache.insert(sample)
    }

    pub fn get_data(&self, parent: FrameHandle, t: crate::time::Timestamp) -> Result<TransformStorage, TfError> {
        let parents = self.parents.read();
        match parents.get(&parent) {
            Some(cache) => cache.get_data(t),
            None => Err(TfError::NoData(self.id.clone())),
        }
    }

    pub fn time_in_buffer_range(&self, parent: FrameHandle, t: crate::time::Timestamp) -> bool {
        self.parents.read().get(&parent).map(|c| c.time_in_buffer_range(t)).unwrap_or(false)
    }

    /// `true` if *any* parent edge covers `t`. Used by Backfill's "is this
    /// frame already covered" check, which doesn't care which parent.
    pub fn any_parent_covers(&self, t: crate::time::Timestamp) -> bool {
        self.parents.read().values().any(|c| c.time_in_buffer_range(t))
    }

    pub fn time_to_nearest(&self, parent: FrameHandle, t: crate::time::Timestamp) -> Option<u64> {
        self.parents.read().get(&parent).and_then(|c| c.time_to_nearest(t))
    }

    pub fn has_any_data(&self) -> bool {
        self.parents.read().values().any(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{UnitQuaternion, Vector3};

    use super::*;
    use crate::time::Timestamp;

    fn sample(parent: usize, child: usize, nanos: i64) -> TransformStorage {
        TransformStorage::new(
            UnitQuaternion::identity(),
            Vector3::zeros(),
            Timestamp::from_nanos(nanos),
            FrameHandle(parent),
            FrameHandle(child),
        )
    }

    #[test]
    fn multiple_parents_are_tracked_independently() {
        let frame = Frame::new("/child".to_string(), 10_000_000_000);
        frame.insert(sample(1, 2, 0));
        frame.insert(sample(3, 2, 0));

        assert_eq!(frame.parent_frames().len(), 2);
        assert!(frame.get_data(FrameHandle(1), Timestamp::ZERO).is_ok());
        assert!(frame.get_data(FrameHandle(3), Timestamp::ZERO).is_ok());
        assert!(frame.get_data(FrameHandle(9), Timestamp::ZERO).is_err());
    }

    #[test]
    fn any_parent_covers_checks_all_edges() {
        let frame = Frame::new("/child".to_string(), 10_000_000_000);
        frame.insert(sample(1, 2, 0));
        frame.insert(sample(1, 2, 2_000_000_000));
        assert!(frame.any_parent_covers(Timestamp::from_nanos(1_000_000_000)));
        assert!(!frame.any_parent_covers(Timestamp::from_nanos(5_000_000_000)));
    }
}
