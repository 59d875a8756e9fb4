//! Core traits for multiview

use crate::{bounds::BoundingBox, mesh::*, point::*};

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Get the axis-aligned bounding box of the object
    fn bounding_box(&self) -> BoundingBox;
    
    /// Get the center point of the object
    fn center(&self) -> Point3f {
        self.bounding_box().center()
    }
}

impl Drawable for TriangleMesh {
    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mesh_bounding_box() {
        let mut mesh = TriangleMesh::cube(2.0);
        for vertex in &mut mesh.vertices {
            vertex.x += 1.0;
        }

        let bbox = mesh.bounding_box();
        assert_relative_eq!(bbox.min, Point3f::new(0.0, -1.0, -1.0));
        assert_relative_eq!(bbox.max, Point3f::new(2.0, 1.0, 1.0));
        assert_relative_eq!(mesh.center(), Point3f::new(1.0, 0.0, 0.0));
    }
}
