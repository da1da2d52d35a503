//! Camera utilities for 3D visualization

use nalgebra::{Matrix4, Perspective3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Which world axis points up on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpAxis {
    #[default]
    Y,
    Z,
}

impl UpAxis {
    /// Unit vector along the up axis
    pub fn vector(&self) -> Vector3<f32> {
        match self {
            UpAxis::Y => Vector3::y(),
            UpAxis::Z => Vector3::z(),
        }
    }
}

/// Orbit-style camera placement: distance, yaw and pitch around a target.
///
/// Angles are in degrees. Negative pitch looks down at the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebugCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub target: [f32; 3],
}

impl DebugCamera {
    /// Eye position for the given up axis
    pub fn eye(&self, up: UpAxis) -> Point3<f32> {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        let (d, cp, sp) = (self.distance, pitch.cos(), pitch.sin());
        let offset = match up {
            UpAxis::Z => Vector3::new(d * cp * yaw.sin(), -d * cp * yaw.cos(), -d * sp),
            UpAxis::Y => Vector3::new(d * cp * yaw.sin(), -d * sp, d * cp * yaw.cos()),
        };
        Point3::from(self.target) + offset
    }
}

impl Default for DebugCamera {
    fn default() -> Self {
        Self {
            distance: 5.0,
            yaw: 0.0,
            pitch: -30.0,
            target: [0.0, 0.0, 0.0],
        }
    }
}

/// Maps nalgebra's OpenGL clip depth (-1..1) to wgpu's (0..1)
#[rustfmt::skip]
const OPENGL_TO_WGPU: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// A 3D perspective camera
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Create a new camera
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
        }
    }

    /// Build a perspective camera from an orbit placement
    pub fn from_debug(debug: &DebugCamera, up: UpAxis, aspect_ratio: f32) -> Self {
        Self {
            position: debug.eye(up),
            target: Point3::from(debug.target),
            up: up.vector(),
            aspect_ratio,
            ..Self::default()
        }
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix in wgpu clip space
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        OPENGL_TO_WGPU * perspective.into_inner()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            std::f32::consts::FRAC_PI_4,
            16.0 / 9.0,
            0.1,
            100.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_debug_camera_sits_above_and_in_front() {
        let eye = DebugCamera::default().eye(UpAxis::Y);
        assert_relative_eq!(eye.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(eye.y, 2.5, epsilon = 1e-5);
        assert_relative_eq!(eye.z, 5.0 * 30f32.to_radians().cos(), epsilon = 1e-5);
    }

    #[test]
    fn z_up_camera_elevates_along_z() {
        let eye = DebugCamera::default().eye(UpAxis::Z);
        assert_relative_eq!(eye.z, 2.5, epsilon = 1e-5);
        assert!(eye.y < 0.0);
    }

    #[test]
    fn eye_keeps_requested_distance_from_target() {
        let camera = DebugCamera {
            distance: 3.0,
            yaw: 40.0,
            pitch: -10.0,
            target: [1.0, 2.0, 3.0],
        };
        for up in [UpAxis::Y, UpAxis::Z] {
            let d = (camera.eye(up) - Point3::from(camera.target)).norm();
            assert_relative_eq!(d, 3.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn target_projects_to_screen_center_at_valid_depth() {
        let camera = Camera::from_debug(&DebugCamera::default(), UpAxis::Y, 4.0 / 3.0);
        let clip = camera.projection_matrix() * camera.view_matrix() * Point3::origin().to_homogeneous();
        let ndc = clip.xyz() / clip.w;
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
