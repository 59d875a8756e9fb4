//! 3D transformation utilities

use nalgebra::{Rotation3, Vector3};

/// Rotation matrix for angles (radians) about X, Y and Z, composed as `Rx * Ry * Rz`
pub fn rotation_from_xyz(x: f32, y: f32, z: f32) -> Rotation3<f32> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), x)
        * Rotation3::from_axis_angle(&Vector3::y_axis(), y)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), z)
}
