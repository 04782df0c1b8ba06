//! `TransformCore`: the façade tying canonicalization, Backfill, PathSearch
//! and composition together behind `lookup_transform` / `transform_point` /
//! `transform_pose`.

use std::time::Instant;

use log::{debug, warn};
use nalgebra::{UnitQuaternion, Vector3};

use crate::accumulator::TransformAccumulator;
use crate::backfill::Backfill;
use crate::config::TfConfig;
use crate::error::{IngestError, TfError};
use crate::geometry::{apply_to_point, apply_to_pose, Point, Pose, Stamped};
use crate::ids::FrameId;
use crate::registry::{FrameHandle, FrameRegistry};
use crate::search::PathSearch;
use crate::store::DocumentStore;
use crate::time::Timestamp;
use crate::transform_storage::TransformStorage;

/// A composed transform result: `target_T_source` at the queried time,
/// tagged with both endpoint frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StampedTransform {
    pub rotation: UnitQuaternion<f64>,
    pub translation: Vector3<f64>,
    pub stamp: Timestamp,
    pub target: FrameHandle,
    pub source: FrameHandle,
}

/// A no-op store used when the crate is configured without a backing
/// document store: every Backfill attempt fails immediately, but that only
/// surfaces to a caller as `StoreUnavailable` once a lookup genuinely needed
/// the refresh and found nothing else to fall back on. Callers relying only
/// on explicitly-inserted data are otherwise unaffected.
struct NoStore;

impl DocumentStore for NoStore {
    fn find_tf(&self, _query: &crate::store::TfQuery) -> Result<Box<dyn crate::store::TfCursor>, crate::store::StoreError> {
        Err(crate::store::StoreError::Unavailable("no document store configured".to_string()))
    }
}

pub struct TransformCore {
    registry: FrameRegistry,
    config: TfConfig,
    store: Box<dyn DocumentStore>,
}

impl TransformCore {
    pub fn new(config: TfConfig) -> Self {
        let registry = FrameRegistry::new(config.default_cache_duration_nanos, config.frame_prefix.clone());
        Self { registry, config, store: Box::new(NoStore) }
    }

    pub fn with_store(config: TfConfig, store: Box<dyn DocumentStore>) -> Self {
        let registry = FrameRegistry::new(config.default_cache_duration_nanos, config.frame_prefix.clone());
        Self { registry, config, store }
    }

    pub fn registry(&self) -> &FrameRegistry {
        &self.registry
    }

    /// Ingest one observed transform, sharing its validation rules with
    /// Backfill's own record decoding. `authority` names the caller for
    /// diagnostics, matching the `set_transform` authority-tagging convention.
    pub fn insert_transform(
        &self,
        frame_id: &str,
        child_frame_id: &str,
        rotation: UnitQuaternion<f64>,
        translation: Vector3<f64>,
        stamp: Timestamp,
        authority: &str,
    ) -> Result<(), IngestError> {
        if frame_id.trim().is_empty() {
            return Err(IngestError::EmptyFrameID { authority: authority.to_string(), field: "frame_id" });
        }
        if child_frame_id.trim().is_empty() {
            return Err(IngestError::EmptyFrameID { authority: authority.to_string(), field: "child_frame_id" });
        }

        let parent_id = self.registry.canonicalize(frame_id);
        let child_id = self.registry.canonicalize(child_frame_id);
        if parent_id == child_id {
            return Err(IngestError::SelfTransform {
                authority: authority.to_string(),
                frame_id: child_id.as_str().to_string(),
            });
        }

        let parent_handle = self.registry.resolve_or_insert(&parent_id);
        let child_handle = self.registry.resolve_or_insert(&child_id);
        self.registry
            .frame(child_handle)
            .insert(TransformStorage::new(rotation, translation, stamp, parent_handle, child_handle));
        Ok(())
    }

    /// Canonicalize and resolve-or-create `raw` — a frame is created at
    /// first resolve. The only rejection at this stage is a genuinely
    /// malformed id (empty after canonicalization); a well-formed id that
    /// simply has no data yet is a later `NoData`, not an `UnknownFrameID`.
    fn resolve_for_lookup(&self, raw: &str) -> Result<(FrameId, FrameHandle), TfError> {
        let id = self.registry.canonicalize(raw);
        if id.is_empty_segment() {
            return Err(TfError::UnknownFrameID(id.as_str().to_string()));
        }
        Ok((id.clone(), self.registry.resolve_or_insert(&id)))
    }

    /// Run Backfill at most once per endpoint, honoring `deadline`: fail
    /// with `Timeout` if the remainder is exhausted before starting.
    ///
    /// This is always best-effort: a store failure never hard-fails the
    /// lookup here, only `Timeout` does. `TimeCache::get_data` can still
    /// serve a correct boundary-clamped answer from whatever data is
    /// already cached, and a frame that structurally has no parent data of
    /// its own (the fixed root of the tree) must never be punished for a
    /// store outage it was never going to resolve. The caller gets back
    /// whether a *needed* refresh failed, so it can decide afterward — once
    /// `PathSearch` has had a chance to use what's cached — whether the
    /// failure actually mattered.
    fn ensure_available(
        &self,
        handle: FrameHandle,
        id: &FrameId,
        t: Timestamp,
        deadline: Option<Instant>,
        other: &FrameId,
    ) -> Result<Option<crate::store::StoreError>, TfError> {
        if self.registry.frame(handle).any_parent_covers(t) {
            return Ok(None);
        }

        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(TfError::timeout(id, other));
            }
        }

        let backfill = Backfill::new(&self.registry, self.store.as_ref(), &self.config);
        match backfill.run(id.as_str(), t) {
            Ok(inserted) => {
                debug!("backfill for `{id}` inserted {inserted} sample(s)");
                Ok(None)
            }
            Err(e) => {
                warn!("backfill for `{id}` failed, falling back to cached data: {e}");
                Ok(Some(e))
            }
        }
    }

    fn deadline_from(&self) -> Option<Instant> {
        self.config.default_deadline.map(|d| Instant::now() + d)
    }

    /// Single-time lookup: `target_T_source` at `t`.
    pub fn lookup_transform(&self, target: &str, source: &str, t: Timestamp) -> Result<StampedTransform, TfError> {
        self.lookup_with_deadline(target, source, t, self.deadline_from())
    }

    fn lookup_with_deadline(
        &self,
        target: &str,
        source: &str,
        t: Timestamp,
        deadline: Option<Instant>,
    ) -> Result<StampedTransform, TfError> {
        let (target_id, target_handle) = self.resolve_for_lookup(target)?;
        let (source_id, source_handle) = self.resolve_for_lookup(source)?;

        if target_id == source_id {
            return Ok(StampedTransform {
                rotation: UnitQuaternion::identity(),
                translation: Vector3::zeros(),
                stamp: t,
                target: target_handle,
                source: source_handle,
            });
        }

        let source_backfill_failure = self.ensure_available(source_handle, &source_id, t, deadline, &target_id)?;
        let target_backfill_failure = self.ensure_available(target_handle, &target_id, t, deadline, &source_id)?;

        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(TfError::timeout(&source_id, &target_id));
            }
        }

        let path = match PathSearch::search(&self.registry, source_handle, target_handle, &source_id, &target_id, t) {
            Ok(path) => path,
            Err(TfError::NotConnected { source, target }) => {
                // A genuinely-needed refresh failed for one of the two
                // endpoints: we can't tell whether fresher data would have
                // connected them, so report the store outage rather than a
                // confirmed topological disconnect.
                if let Some(e) = source_backfill_failure.or(target_backfill_failure) {
                    return Err(TfError::StoreUnavailable(e));
                }
                return Err(TfError::NotConnected { source, target });
            }
            Err(e) => return Err(e),
        };
        let (translation, rotation) = TransformAccumulator::compose_path(&path.inverse, &path.forward);

        Ok(StampedTransform { rotation, translation, stamp: t, target: target_handle, source: source_handle })
    }

    /// Dual-time lookup through a `fixed` frame whose history bridges
    /// `t_source` and `t_target`.
    pub fn lookup_transform_dual_time(
        &self,
        target: &str,
        t_target: Timestamp,
        source: &str,
        t_source: Timestamp,
        fixed: &str,
    ) -> Result<StampedTransform, TfError> {
        let deadline = self.deadline_from();
        let source_to_fixed = self.lookup_with_deadline(fixed, source, t_source, deadline)?;
        let fixed_to_target = self.lookup_with_deadline(target, fixed, t_target, deadline)?;

        let source_to_fixed_storage = TransformStorage::new(
            source_to_fixed.rotation,
            source_to_fixed.translation,
            t_source,
            source_to_fixed.target,
            source_to_fixed.source,
        );
        let fixed_to_target_storage = TransformStorage::new(
            fixed_to_target.rotation,
            fixed_to_target.translation,
            t_target,
            fixed_to_target.target,
            fixed_to_target.source,
        );
        let composed = fixed_to_target_storage.compose(&source_to_fixed_storage);

        Ok(StampedTransform {
            rotation: composed.rotation,
            translation: composed.translation,
            stamp: t_target,
            target: fixed_to_target.target,
            source: source_to_fixed.source,
        })
    }

    pub fn transform_point(&self, target: &str, stamped: Stamped<Point>) -> Result<Stamped<Point>, TfError> {
        let source = self.registry.frame_id_str(stamped.frame_id);
        let transform = self.lookup_transform(target, &source, stamped.stamp)?;
        let storage = TransformStorage::new(
            transform.rotation,
            transform.translation,
            transform.stamp,
            transform.target,
            transform.source,
        );
        Ok(Stamped::new(apply_to_point(&storage, &stamped.value), transform.target, stamped.stamp))
    }

    pub fn transform_pose(&self, target: &str, stamped: Stamped<Pose>) -> Result<Stamped<Pose>, TfError> {
        let source = self.registry.frame_id_str(stamped.frame_id);
        let transform = self.lookup_transform(target, &source, stamped.stamp)?;
        let storage = TransformStorage::new(
            transform.rotation,
            transform.translation,
            transform.stamp,
            transform.target,
            transform.source,
        );
        Ok(Stamped::new(apply_to_pose(&storage, &stamped.value), transform.target, stamped.stamp))
    }

    pub fn transform_point_dual_time(
        &self,
        target: &str,
        t_target: Timestamp,
        stamped: Stamped<Point>,
        t_source: Timestamp,
        fixed: &str,
    ) -> Result<Stamped<Point>, TfError> {
        let source = self.registry.frame_id_str(stamped.frame_id);
        let transform = self.lookup_transform_dual_time(target, t_target, &source, t_source, fixed)?;
        let storage = TransformStorage::new(
            transform.rotation,
            transform.translation,
            transform.stamp,
            transform.target,
            transform.source,
        );
        Ok(Stamped::new(apply_to_point(&storage, &stamped.value), transform.target, t_target))
    }

    pub fn transform_pose_dual_time(
        &self,
        target: &str,
        t_target: Timestamp,
        stamped: Stamped<Pose>,
        t_source: Timestamp,
        fixed: &str,
    ) -> Result<Stamped<Pose>, TfError> {
        let source = self.registry.frame_id_str(stamped.frame_id);
        let transform = self.lookup_transform_dual_time(target, t_target, &source, t_source, fixed)?;
        let storage = TransformStorage::new(
            transform.rotation,
            transform.translation,
            transform.stamp,
            transform.target,
            transform.source,
        );
        Ok(Stamped::new(apply_to_pose(&storage, &stamped.value), transform.target, t_target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core() -> TransformCore {
        TransformCore::new(TfConfig::default())
    }

    fn identity_at(core: &TransformCore, parent: &str, child: &str, nanos: i64) {
        core.insert_transform(
            parent,
            child,
            UnitQuaternion::identity(),
            Vector3::new(1.0, 0.0, 0.0),
            Timestamp::from_nanos(nanos),
            "test",
        )
        .unwrap();
    }

    #[test]
    fn identity_lookup_for_same_frame() {
        let core = core();
        identity_at(&core, "map", "base", 0);
        let t = core.lookup_transform("base", "base", Timestamp::from_nanos(5)).unwrap();
        assert_eq!(t.translation, Vector3::zeros());
    }

    #[test]
    fn malformed_empty_frame_id_is_reported() {
        let core = core();
        let err = core.lookup_transform("", "base", Timestamp::ZERO).unwrap_err();
        assert!(matches!(err, TfError::UnknownFrameID(_)));
    }

    #[test]
    fn two_never_seen_frames_with_no_store_report_store_unavailable() {
        let core = core();
        // Neither frame has ever carried data, so both need Backfill; with
        // no store configured both attempts fail, and `PathSearch` finds
        // nothing either — the failed refresh is the attributable cause.
        let err = core.lookup_transform("nope", "nowhere", Timestamp::ZERO).unwrap_err();
        assert!(matches!(err, TfError::StoreUnavailable(_)));
    }

    #[test]
    fn stale_data_still_succeeds_via_boundary_clamp_despite_failed_backfill() {
        let core = core();
        identity_at(&core, "map", "base", 0);
        // `base` has prior data but not at this time; with no store
        // configured the opportunistic refresh fails, but the cached sample
        // still answers the lookup via boundary clamp.
        let t = core.lookup_transform("map", "base", Timestamp::from_nanos(999_000_000_000)).unwrap();
        assert!((t.translation.x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn chained_lookup_composes_across_one_hop() {
        let core = core();
        identity_at(&core, "map", "odom", 0);
        identity_at(&core, "odom", "base", 0);

        let t = core.lookup_transform("map", "base", Timestamp::from_nanos(0)).unwrap();
        assert!((t.translation.x - 2.0).abs() < 1e-9);
    }

    #[test]
    fn self_transform_is_rejected_on_insert() {
        let core = core();
        let err = core
            .insert_transform("a", "a", UnitQuaternion::identity(), Vector3::zeros(), Timestamp::ZERO, "test")
            .unwrap_err();
        assert!(matches!(err, IngestError::SelfTransform { .. }));
    }

    #[test]
    fn disconnected_frames_report_not_connected() {
        let core = core();
        identity_at(&core, "map", "a", 0);
        identity_at(&core, "island", "b", 0);
        let err = core.lookup_transform("a", "b", Timestamp::ZERO).unwrap_err();
        assert!(matches!(err, TfError::NotConnected { .. }));
    }

    #[test]
    fn point_is_transformed_through_chain() {
        let core = core();
        identity_at(&core, "map", "base", 0);
        let stamped = Stamped::new(Point::new(0.0, 0.0, 0.0), core.registry.resolve_or_insert(&core.registry.canonicalize("base")), Timestamp::ZERO);
        let out = core.transform_point("map", stamped).unwrap();
        assert!((out.value.x - 1.0).abs() < 1e-9);
    }
}
