//! Object poses as stored by backends

use nalgebra::{Isometry3, Matrix4, Point3, Quaternion, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::orientation::{Quat, IDENTITY};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Position plus orientation of a visual object.
///
/// `orientation` is kept in backend order (`[x, y, z, w]`) and exactly as
/// it was handed in; normalization only happens when a renderer asks for
/// [`Pose::rotation`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point3f,
    pub orientation: Quat,
}

impl Pose {
    /// Create a pose from a position and a backend-order orientation
    pub fn new(position: Point3f, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// A pose at `position` with the identity orientation
    pub fn at(position: Point3f) -> Self {
        Self::new(position, IDENTITY)
    }

    /// Same position, new orientation
    pub fn with_orientation(self, orientation: Quat) -> Self {
        Self {
            orientation,
            ..self
        }
    }

    /// Orientation as a unit quaternion.
    ///
    /// Degenerate (zero or non-finite) input renders as the identity.
    pub fn rotation(&self) -> UnitQuaternion<f32> {
        let [x, y, z, w] = self.orientation;
        if !self.orientation.iter().all(|c| c.is_finite()) {
            return UnitQuaternion::identity();
        }
        UnitQuaternion::try_new(Quaternion::new(w, x, y, z), f32::EPSILON)
            .unwrap_or_else(UnitQuaternion::identity)
    }

    /// Model matrix for rendering
    pub fn to_homogeneous(&self) -> Matrix4<f32> {
        let translation = Translation3::from(self.position.coords);
        Isometry3::from_parts(translation, self.rotation()).to_homogeneous()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(Point3f::origin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn with_orientation_keeps_position() {
        let pose = Pose::at(Point3f::new(1.2, 0.0, -3.0));
        let turned = pose.with_orientation([0.0, 1.0, 0.0, 0.0]);
        assert_eq!(turned.position, pose.position);
        assert_eq!(turned.orientation, [0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn rotation_normalizes_without_touching_stored_components() {
        let pose = Pose::new(Point3f::origin(), [0.0, 0.0, 0.0, 2.0]);
        assert_eq!(pose.orientation, [0.0, 0.0, 0.0, 2.0]);
        assert_relative_eq!(pose.rotation().angle(), 0.0);
    }

    #[test]
    fn degenerate_orientation_renders_as_identity() {
        let zero = Pose::new(Point3f::origin(), [0.0; 4]);
        assert_eq!(zero.rotation(), UnitQuaternion::identity());
        let nan = Pose::new(Point3f::origin(), [f32::NAN, 0.0, 0.0, 1.0]);
        assert_eq!(nan.rotation(), UnitQuaternion::identity());
    }

    #[test]
    fn homogeneous_matrix_carries_translation_and_rotation() {
        // Half turn about x
        let pose = Pose::new(Point3f::new(1.0, 2.0, 3.0), [1.0, 0.0, 0.0, 0.0]);
        let m = pose.to_homogeneous();
        let p = m.transform_point(&Point3f::new(0.0, 1.0, 0.0));
        assert_relative_eq!(p, Point3f::new(1.0, 1.0, 3.0), epsilon = 1e-6);
    }
}
