//! Folds the two edge lists from [`crate::search::PathSearch`] into a
//! single composed transform.
//!
//! Each edge accumulated is `parent_T_child`: applying its rotation then
//! its translation converts a vector expressed in the child frame into the
//! parent frame. Walking `source -> ... -> meet` and `target -> ... ->
//! meet` independently, then combining at the end, avoids ever materializing
//! an intermediate "meet frame" transform explicitly.

use nalgebra::{UnitQuaternion, Vector3};

use crate::transform_storage::TransformStorage;

#[derive(Debug, Clone, Copy)]
pub(crate) enum WalkEnding {
    Identity,
    TargetParentOfSource,
    SourceParentOfTarget,
    FullPath,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TransformAccumulator {
    pub(crate) source_to_top_quat: UnitQuaternion<f64>,
    pub(crate) source_to_top_vec: Vector3<f64>,
    pub(crate) target_to_top_quat: UnitQuaternion<f64>,
    pub(crate) target_to_top_vec: Vector3<f64>,
}

impl TransformAccumulator {
    pub(crate) fn new() -> TransformAccumulator {
        TransformAccumulator {
            source_to_top_quat: UnitQuaternion::identity(),
            source_to_top_vec: Vector3::zeros(),
            target_to_top_quat: UnitQuaternion::identity(),
            target_to_top_vec: Vector3::zeros(),
        }
    }

    pub(crate) fn accum(&mut self, source: bool, st: TransformStorage) {
        if source {
            self.source_to_top_vec = st.rotate_vec(&self.source_to_top_vec) + st.translation;
            self.source_to_top_quat = st.rotation * self.source_to_top_quat;
        } else {
            self.target_to_top_vec = st.rotate_vec(&self.target_to_top_vec) + st.translation;
            self.target_to_top_quat = st.rotation * self.target_to_top_quat;
        }
    }

    pub(crate) fn finalize(&self, end: WalkEnding) -> (Vector3<f64>, UnitQuaternion<f64>) {
        match end {
            WalkEnding::Identity => (Vector3::zeros(), UnitQuaternion::identity()),
            WalkEnding::TargetParentOfSource => (self.source_to_top_vec, self.source_to_top_quat),
            WalkEnding::SourceParentOfTarget => {
                let inv_target_quat = self.target_to_top_quat.inverse();
                let inv_target_vec = inv_target_quat.transform_vector(&-self.target_to_top_vec);
                (inv_target_vec, inv_target_quat)
            }
            WalkEnding::FullPath => {
                let inv_target_quat = self.target_to_top_quat.inverse();
                let inv_target_vec = inv_target_quat.transform_vector(&-self.target_to_top_vec);

                let result_vec = inv_target_quat.transform_vector(&self.source_to_top_vec) + inv_target_vec;
                let result_quat = inv_target_quat * self.source_to_top_quat;

                (result_vec, result_quat)
            }
        }
    }

    /// Fold a [`crate::search::SearchPath`] into one `source_T_target`
    /// composed transform, picking the cheapest [`WalkEnding`] for the
    /// degenerate cases (empty source/target walk) and falling back to
    /// `FullPath` otherwise.
    pub(crate) fn compose_path(inverse: &[TransformStorage], forward: &[TransformStorage]) -> (Vector3<f64>, UnitQuaternion<f64>) {
        let mut acc = TransformAccumulator::new();
        for edge in inverse {
            acc.accum(true, *edge);
        }
        for edge in forward {
            acc.accum(false, *edge);
        }

        let end = match (inverse.is_empty(), forward.is_empty()) {
            (true, true) => WalkEnding::Identity,
            (true, false) => WalkEnding::SourceParentOfTarget,
            (false, true) => WalkEnding::TargetParentOfSource,
            (false, false) => WalkEnding::FullPath,
        };
        acc.finalize(end)
    }
}
