//! Geometric operands a composed transform can be applied to.

use nalgebra::{UnitQuaternion, Vector3};

use crate::time::Timestamp;
use crate::transform_storage::TransformStorage;

/// A bare 3D point, no orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    fn from_vector(v: Vector3<f64>) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

/// A full rigid pose: position + orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl Pose {
    pub fn new(translation: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self { translation, rotation }
    }
}

/// A value tagged with the frame it's expressed in and the time it was
/// captured. `transform_point`/`transform_pose` take one of these in and
/// hand one back out in the target frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stamped<T> {
    pub value: T,
    pub frame_id: crate::registry::FrameHandle,
    pub stamp: Timestamp,
}

impl<T> Stamped<T> {
    pub fn new(value: T, frame_id: crate::registry::FrameHandle, stamp: Timestamp) -> Self {
        Self { value, frame_id, stamp }
    }
}

/// Apply a composed `source_T_target`-shaped [`TransformStorage`] to a
/// [`Point`]: rotate then translate, no effect on orientation.
pub fn apply_to_point(transform: &TransformStorage, point: &Point) -> Point {
    let rotated = transform.rotate_vec(&point.as_vector());
    Point::from_vector(rotated + transform.translation)
}

/// Apply a composed transform to a [`Pose`]: rotate+translate the position,
/// and premultiply the orientation by the transform's rotation.
pub fn apply_to_pose(transform: &TransformStorage, pose: &Pose) -> Pose {
    let translation = transform.rotate_vec(&pose.translation) + transform.translation;
    let rotation = transform.rotation * pose.rotation;
    Pose { translation, rotation }
}
