//! `TransformStorage`: one sample on one directed edge.

use nalgebra::{UnitQuaternion, Vector3};

use crate::registry::FrameHandle;
use crate::time::Timestamp;

/// A single rigid-transform sample: translation + unit quaternion rotation,
/// stamped, with handles to its parent and child frames.
///
/// `frame_id`/`child_frame_id` are non-owning [`FrameHandle`]s into the
/// `FrameRegistry` arena: the registry owns the frames, samples just refer
/// to them by stable index, avoiding a reference cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformStorage {
    pub rotation: UnitQuaternion<f64>,
    pub translation: Vector3<f64>,
    pub stamp: Timestamp,
    pub frame_id: FrameHandle,
    pub child_frame_id: FrameHandle,
}

impl TransformStorage {
    pub fn new(
        rotation: UnitQuaternion<f64>,
        translation: Vector3<f64>,
        stamp: Timestamp,
        frame_id: FrameHandle,
        child_frame_id: FrameHandle,
    ) -> Self {
        Self { rotation, translation, stamp, frame_id, child_frame_id }
    }

    pub fn identity(stamp: Timestamp, frame_id: FrameHandle, child_frame_id: FrameHandle) -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
            translation: Vector3::zeros(),
            stamp,
            frame_id,
            child_frame_id,
        }
    }

    /// Linear-interpolate translation, slerp the rotation — lerp+normalize
    /// is not an acceptable substitute here. `time` must lie within
    /// `[first.stamp, second.stamp]`.
    pub fn interpolate(first: &Self, second: &Self, time: Timestamp) -> TransformStorage {
        if first.stamp == second.stamp {
            return *first;
        }

        let span = (second.stamp - first.stamp) as f64;
        let second_ratio = (time - first.stamp) as f64 / span;
        let first_ratio = 1.0 - second_ratio;

        let translation = first.translation * first_ratio + second.translation * second_ratio;
        let rotation = first.rotation.slerp(&second.rotation, second_ratio);

        TransformStorage {
            rotation,
            translation,
            stamp: time,
            frame_id: first.frame_id,
            child_frame_id: second.child_frame_id,
        }
    }

    /// The inverse rigid transform: `(-q^-1 . t, q^-1)`.
    pub fn inverse(&self) -> TransformStorage {
        let inv_rotation = self.rotation.inverse();
        let inv_translation = inv_rotation * (-self.translation);
        TransformStorage {
            rotation: inv_rotation,
            translation: inv_translation,
            stamp: self.stamp,
            frame_id: self.child_frame_id,
            child_frame_id: self.frame_id,
        }
    }

    /// Rotate `v` by this transform's rotation component only.
    pub fn rotate_vec(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * v
    }

    /// Compose `self` after `other`: apply `other` then `self`, i.e. treat
    /// `self` as "new parent in terms of old parent" and `other` as "old
    /// parent in terms of grandparent". Matches the `R := R ∘ entry`
    /// accumulation rule.
    pub fn compose(&self, other: &Self) -> TransformStorage {
        TransformStorage {
            rotation: self.rotation * other.rotation,
            translation: self.rotate_vec(&other.translation) + self.translation,
            stamp: other.stamp,
            frame_id: self.frame_id,
            child_frame_id: other.child_frame_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn handle(i: usize) -> FrameHandle {
        FrameHandle(i)
    }

    #[test]
    fn interpolate_midpoint_translation() {
        let first = TransformStorage::new(
            UnitQuaternion::identity(),
            Vector3::new(0.0, 0.0, 0.0),
            Timestamp::from_nanos(0),
            handle(0),
            handle(1),
        );
        let second = TransformStorage::new(
            UnitQuaternion::identity(),
            Vector3::new(2.0, 0.0, 0.0),
            Timestamp::from_nanos(2_000_000_000),
            handle(0),
            handle(1),
        );

        let mid = TransformStorage::interpolate(&first, &second, Timestamp::from_nanos(1_000_000_000));
        assert_relative_eq!(mid.translation.x, 1.0, epsilon = 1e-9);
        assert_eq!(mid.stamp, Timestamp::from_nanos(1_000_000_000));
    }

    #[test]
    fn interpolate_uses_slerp_for_rotation() {
        let q0 = UnitQuaternion::identity();
        let q1 = UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_2);
        let first = TransformStorage::new(q0, Vector3::zeros(), Timestamp::from_nanos(0), handle(0), handle(1));
        let second =
            TransformStorage::new(q1, Vector3::zeros(), Timestamp::from_nanos(1_000_000_000), handle(0), handle(1));

        let mid = TransformStorage::interpolate(&first, &second, Timestamp::from_nanos(500_000_000));
        let expected = q0.slerp(&q1, 0.5);
        assert_relative_eq!(mid.rotation.angle_to(&expected), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn inverse_of_identity_is_identity() {
        let id = TransformStorage::identity(Timestamp::ZERO, handle(0), handle(1));
        let inv = id.inverse();
        assert_relative_eq!(inv.translation.norm(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(inv.rotation.angle_to(&UnitQuaternion::identity()), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn compose_then_inverse_is_identity() {
        let a = TransformStorage::new(
            UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3),
            Vector3::new(1.0, 2.0, 3.0),
            Timestamp::ZERO,
            handle(0),
            handle(1),
        );
        let composed = a.compose(&a.inverse());
        assert_relative_eq!(composed.translation.norm(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(composed.rotation.angle_to(&UnitQuaternion::identity()), 0.0, epsilon = 1e-9);
    }
}
