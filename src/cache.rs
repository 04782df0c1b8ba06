//! `TimeCache`: the bounded, time-ordered buffer for one directed edge.

use derive_builder::Builder;

use crate::config::DEFAULT_CACHE_DURATION_NANOS;
use crate::error::TfError;
use crate::time::Timestamp;
use crate::transform_storage::TransformStorage;

/// Per-edge sample buffer. Samples are kept sorted ascending by timestamp;
/// `insert` rejects anything older than `newest - max_storage_duration` and
/// evicts anything that falls outside that window on acceptance.
#[derive(Debug, Clone, Builder)]
#[builder(pattern = "owned")]
pub struct TimeCache {
    #[builder(default = "Vec::new()")]
    storage: Vec<TransformStorage>,
    #[builder(default = "DEFAULT_CACHE_DURATION_NANOS")]
    max_storage_duration_nanos: i64,
}

impl TimeCache {
    pub fn new(max_storage_duration_nanos: i64) -> Self {
        Self { storage: Vec::new(), max_storage_duration_nanos }
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn newest_timestamp(&self) -> Option<Timestamp> {
        self.storage.last().map(|s| s.stamp)
    }

    pub fn oldest_timestamp(&self) -> Option<Timestamp> {
        self.storage.first().map(|s| s.stamp)
    }

    /// `true` iff a sample exists with timestamp `<= t` and another with
    /// timestamp `>= t`.
    pub fn time_in_buffer_range(&self, t: Timestamp) -> bool {
        match (self.oldest_timestamp(), self.newest_timestamp()) {
            (Some(oldest), Some(newest)) => oldest <= t && t <= newest,
            _ => false,
        }
    }

    /// Absolute distance, in nanoseconds, from `t` to the nearest sample.
    /// Used as the PathSearch edge cost. `None` if the cache is empty.
    pub fn time_to_nearest(&self, t: Timestamp) -> Option<u64> {
        match self.storage.binary_search_by_key(&t, |s| s.stamp) {
            Ok(_) => Some(0),
            Err(idx) => {
                let before = idx.checked_sub(1).map(|i| self.storage[i].stamp);
                let after = self.storage.get(idx).map(|s| s.stamp);
                match (before, after) {
                    (Some(b), Some(a)) => Some(t.abs_diff_nanos(&b).min(t.abs_diff_nanos(&a))),
                    (Some(b), None) => Some(t.abs_diff_nanos(&b)),
                    (None, Some(a)) => Some(t.abs_diff_nanos(&a)),
                    (None, None) => None,
                }
            }
        }
    }

    /// Insert a sample, evicting stale entries. Returns `false` (rejected,
    /// cache unchanged) when `sample.stamp < newest - Δ` for a non-empty
    /// cache.
    pub fn insert(&mut self, sample: TransformStorage) -> bool {
        if let Some(newest) = self.newest_timestamp() {
            let cutoff = newest.checked_sub_nanos(self.max_storage_duration_nanos);
            if sample.stamp < cutoff {
                return false;
            }
        }

        let idx = match self.storage.binary_search_by_key(&sample.stamp, |s| s.stamp) {
            Ok(idx) | Err(idx) => idx,
        };
        self.storage.insert(idx, sample);

        let newest = self.newest_timestamp().expect("just inserted a sample");
        let cutoff = newest.checked_sub_nanos(self.max_storage_duration_nanos);
        let evict_before = self.storage.partition_point(|s| s.stamp < cutoff);
        if evict_before > 0 {
            self.storage.drain(..evict_before);
        }

        true
    }

    pub fn clear(&mut self) {
        self.storage.clear();
    }

    /// Best sample at `t`: exact/single-sample hit, interpolation between
    /// bracketing samples, or boundary clamp with no extrapolation.
    pub fn get_data(&self, t: Timestamp) -> Result<TransformStorage, TfError> {
        if self.storage.is_empty() {
            return Err(TfError::NoData(String::new()));
        }

        if self.storage.len() == 1 {
            return Ok(self.storage[0]);
        }

        let oldest = self.storage.first().unwrap().stamp;
        let newest = self.storage.last().unwrap().stamp;

        if t <= oldest {
            return Ok(self.storage[0]);
        }
        if t >= newest {
            return Ok(*self.storage.last().unwrap());
        }

        match self.storage.binary_search_by_key(&t, |s| s.stamp) {
            Ok(idx) => Ok(self.storage[idx]),
            Err(idx) => {
                let before = self.storage[idx - 1];
                let after = self.storage[idx];
                Ok(TransformStorage::interpolate(&before, &after, t))
            }
        }
    }
}
