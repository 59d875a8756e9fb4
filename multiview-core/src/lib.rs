//! Core data structures and traits for multiview
//! 
//! This crate provides the geometric types the rendering pipeline works on:
//! triangle meshes, axis-aligned bounding boxes, rotations and the shared
//! error type.

pub mod point;
pub mod mesh;
pub mod bounds;
pub mod traits;
pub mod transform;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use bounds::*;
pub use traits::*;
pub use transform::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix3, Matrix4, Rotation3};
