//! Backfill: ensure a frame's TimeCache covers a requested time by pulling
//! the newest batch of straddling records from the document store.

use log::{debug, warn};
use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use crate::config::TfConfig;
use crate::error::IngestError;
use crate::registry::{FrameHandle, FrameRegistry};
use crate::store::{DocumentStore, TfDocument, TfQuery, TfRecord};
use crate::time::Timestamp;
use crate::transform_storage::TransformStorage;

/// Pulls the window `[t - window, t + 1s)` for `frame_id`, decodes the
/// newest batch, and inserts every well-formed record through `registry`.
/// Malformed records are skipped with a `warn!` diagnostic; the batch
/// itself never fails because of them.
pub struct Backfill<'a> {
    registry: &'a FrameRegistry,
    store: &'a dyn DocumentStore,
    config: &'a TfConfig,
}

impl<'a> Backfill<'a> {
    pub fn new(registry: &'a FrameRegistry, store: &'a dyn DocumentStore, config: &'a TfConfig) -> Self {
        Self { registry, store, config }
    }

    /// `true` if at least one TimeCache on `frame` already covers `t`;
    /// Backfill is then a no-op.
    pub fn already_covered(&self, frame: FrameHandle, t: Timestamp) -> bool {
        self.registry.frame(frame).any_parent_covers(t)
    }

    /// Run Backfill for `frame_id` at time `t`. Returns the number of
    /// samples actually inserted (0 if the store has nothing usable, or if
    /// the frame was already covered).
    pub fn run(&self, frame_id: &str, t: Timestamp) -> Result<usize, crate::store::StoreError> {
        let start = t.checked_sub_nanos(self.config.backfill_window_nanos).to_chrono();
        let end = t.checked_add_nanos(1_000_000_000).to_chrono();
        let query = TfQuery { child_frame_id: frame_id.to_string(), start, end };

        let mut cursor = self.store.find_tf(&query)?;
        let newest_batch = match cursor.next_doc() {
            Some(doc) => doc,
            None => {
                cursor.close();
                return Ok(0);
            }
        };
        cursor.close();

        let inserted = self.ingest_document(&newest_batch);
        debug!("backfill for `{frame_id}` at {t} inserted {inserted} sample(s)");
        Ok(inserted)
    }

    fn ingest_document(&self, doc: &TfDocument) -> usize {
        let mut inserted = 0;
        for record in &doc.transforms {
            match self.decode_record(record) {
                Ok(sample) => {
                    let child = sample.child_frame_id;
                    if self.registry.frame(child).insert(sample) {
                        inserted += 1;
                    }
                }
                Err(e) => warn!("skipping malformed backfill record: {e}"),
            }
        }
        inserted
    }

    fn decode_record(&self, record: &TfRecord) -> Result<TransformStorage, IngestError> {
        if record.frame_id.trim().is_empty() {
            return Err(IngestError::EmptyFrameID { authority: "backfill".to_string(), field: "frame_id" });
        }
        if record.child_frame_id.trim().is_empty() {
            return Err(IngestError::EmptyFrameID { authority: "backfill".to_string(), field: "child_frame_id" });
        }

        let parent_id = self.registry.canonicalize(&record.frame_id);
        let child_id = self.registry.canonicalize(&record.child_frame_id);

        if parent_id == child_id {
            return Err(IngestError::SelfTransform {
                authority: "backfill".to_string(),
                frame_id: child_id.as_str().to_string(),
            });
        }

        let [x, y, z, w] = record.rotation;
        let raw = Quaternion::new(w, x, y, z);
        if raw.norm() < 1e-9 {
            return Err(IngestError::InvalidQuaternion {
                parent: parent_id.as_str().to_string(),
                child: child_id.as_str().to_string(),
            });
        }
        let rotation = UnitQuaternion::from_quaternion(raw);

        let parent_handle = self.registry.resolve_or_insert(&parent_id);
        let child_handle = self.registry.resolve_or_insert(&child_id);
        let [tx, ty, tz] = record.translation;

        Ok(TransformStorage::new(
            rotation,
            Vector3::new(tx, ty, tz),
            Timestamp::from_nanos(record.stamp_nanos),
            parent_handle,
            child_handle,
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::store::{InMemoryStore, UnavailableStore};

    fn good_record() -> TfRecord {
        TfRecord {
            frame_id: "map".to_string(),
            stamp_nanos: 1_000_000_000,
            child_frame_id: "base".to_string(),
            translation: [1.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
    }

    #[test]
    fn backfill_inserts_well_formed_records() {
        let registry = FrameRegistry::new(10_000_000_000, None);
        let config = TfConfig::default();
        let doc = TfDocument { recorded: Utc::now(), transforms: vec![good_record()] };
        let store = InMemoryStore::new(vec![doc]);

        let backfill = Backfill::new(&registry, &store, &config);
        let inserted = backfill.run("base", Timestamp::from_nanos(1_000_000_000)).unwrap();
        assert_eq!(inserted, 1);

        let base_id = registry.canonicalize("base");
        let base = registry.resolve_or_insert(&base_id);
        assert!(registry.frame(base).has_any_data());
    }

    #[test]
    fn malformed_records_are_skipped_without_failing_the_batch() {
        let registry = FrameRegistry::new(10_000_000_000, None);
        let config = TfConfig::default();
        let mut self_loop = good_record();
        self_loop.frame_id = "base".to_string();
        let doc = TfDocument { recorded: Utc::now(), transforms: vec![self_loop, good_record()] };
        let store = InMemoryStore::new(vec![doc]);

        let backfill = Backfill::new(&registry, &store, &config);
        let inserted = backfill.run("base", Timestamp::from_nanos(1_000_000_000)).unwrap();
        assert_eq!(inserted, 1);
    }

    #[test]
    fn store_unavailable_surfaces_as_store_error() {
        let registry = FrameRegistry::new(10_000_000_000, None);
        let config = TfConfig::default();
        let store = UnavailableStore;
        let backfill = Backfill::new(&registry, &store, &config);
        assert!(backfill.run("base", Timestamp::ZERO).is_err());
    }

    #[test]
    fn already_covered_skips_the_query_entirely() {
        let registry = FrameRegistry::new(10_000_000_000, None);
        let map_id = registry.canonicalize("map");
        let base_id = registry.canonicalize("base");
        let map = registry.resolve_or_insert(&map_id);
        let base = registry.resolve_or_insert(&base_id);
        registry.frame(base).insert(TransformStorage::identity(Timestamp::from_nanos(1_000_000_000), map, base));

        let config = TfConfig::default();
        let store = UnavailableStore;
        let backfill = Backfill::new(&registry, &store, &config);
        assert!(backfill.already_covered(base, Timestamp::from_nanos(1_000_000_000)));
    }
}
