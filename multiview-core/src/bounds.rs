//! Axis-aligned bounding boxes

use crate::point::*;
use serde::{Deserialize, Serialize};

/// Axis-aligned box enclosing a set of points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3f,
    pub max: Point3f,
}

impl BoundingBox {
    /// Create a bounding box from its two corners
    pub fn new(min: Point3f, max: Point3f) -> Self {
        Self { min, max }
    }

    /// Degenerate box collapsed onto the origin
    pub fn empty() -> Self {
        Self::new(Point3f::origin(), Point3f::origin())
    }

    /// Smallest box enclosing every point; an empty iterator yields [`BoundingBox::empty`]
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point3f>,
    {
        let mut points = points.into_iter();
        let first = match points.next() {
            Some(p) => *p,
            None => return Self::empty(),
        };

        points.fold(Self::new(first, first), |bbox, p| {
            Self::new(point_min(&bbox.min, p), point_max(&bbox.max, p))
        })
    }

    /// Midpoint of the two corners
    pub fn center(&self) -> Point3f {
        nalgebra::center(&self.min, &self.max)
    }

    /// Per-axis size of the box
    pub fn extent(&self) -> Vector3f {
        self.max - self.min
    }

    /// Largest of the three per-axis extents
    pub fn max_extent(&self) -> f32 {
        self.extent().max()
    }

    /// True when every extent is zero
    pub fn is_degenerate(&self) -> bool {
        self.max_extent() <= 0.0
    }

    pub fn contains(&self, point: &Point3f) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}
