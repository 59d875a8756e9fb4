//! Point and vector aliases

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Component-wise minimum of two points
pub fn point_min(a: &Point3f, b: &Point3f) -> Point3f {
    Point3f::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z))
}

/// Component-wise maximum of two points
pub fn point_max(a: &Point3f, b: &Point3f) -> Point3f {
    Point3f::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z))
}
