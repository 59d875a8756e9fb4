//! Mesh data structures and functionality

use crate::point::*;
use crate::{Error, Result};
use nalgebra::Rotation3;
use serde::{Deserialize, Serialize};

/// A triangle mesh with vertices and faces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3f>>,
    pub colors: Option<Vec<[u8; 3]>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
            colors: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
            colors: None,
        }
    }

    /// Axis-aligned cube with the given edge length, centered on the origin
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let vertices = vec![
            Point3f::new(-h, -h, -h),
            Point3f::new(h, -h, -h),
            Point3f::new(h, h, -h),
            Point3f::new(-h, h, -h),
            Point3f::new(-h, -h, h),
            Point3f::new(h, -h, h),
            Point3f::new(h, h, h),
            Point3f::new(-h, h, h),
        ];
        // Counter-clockwise when seen from outside
        let faces = vec![
            [0, 2, 1], [0, 3, 2], // -z
            [4, 5, 6], [4, 6, 7], // +z
            [0, 1, 5], [0, 5, 4], // -y
            [3, 7, 6], [3, 6, 2], // +y
            [0, 4, 7], [0, 7, 3], // -x
            [1, 2, 6], [1, 6, 5], // +x
        ];
        Self::from_vertices_and_faces(vertices, faces)
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3f) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face to the mesh
    pub fn add_face(&mut self, face: [usize; 3]) {
        self.faces.push(face);
    }

    /// Check that every face references an existing vertex
    pub fn validate(&self) -> Result<()> {
        let count = self.vertices.len();
        for (i, face) in self.faces.iter().enumerate() {
            if let Some(bad) = face.iter().find(|&&idx| idx >= count) {
                return Err(Error::InvalidData(format!(
                    "face {} references vertex {} but the mesh has {} vertices",
                    i, bad, count
                )));
            }
        }
        Ok(())
    }

    /// Unnormalized face normal; its length is twice the triangle area
    fn face_cross(&self, face: &[usize; 3]) -> Vector3f {
        let v0 = self.vertices[face[0]];
        let v1 = self.vertices[face[1]];
        let v2 = self.vertices[face[2]];

        (v1 - v0).cross(&(v2 - v0))
    }

    /// Calculate face normals
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        self.faces
            .iter()
            .map(|face| {
                self.face_cross(face)
                    .try_normalize(f32::EPSILON)
                    .unwrap_or_else(Vector3f::zeros)
            })
            .collect()
    }

    /// Compute per-vertex normals as the area-weighted average of adjacent faces.
    ///
    /// Vertices not touched by any non-degenerate face get a zero normal.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vector3f::zeros(); self.vertices.len()];

        for face in &self.faces {
            let weighted = self.face_cross(face);
            for &idx in face {
                normals[idx] += weighted;
            }
        }

        for normal in &mut normals {
            *normal = normal
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vector3f::zeros);
        }

        self.normals = Some(normals);
    }

    /// Rotate the mesh in place about `center`.
    ///
    /// Applied on top of whatever orientation the mesh already has, so
    /// successive calls compose.
    pub fn rotate(&mut self, rotation: &Rotation3<f32>, center: &Point3f) {
        for vertex in &mut self.vertices {
            *vertex = center + rotation * (*vertex - center);
        }

        if let Some(normals) = &mut self.normals {
            for normal in normals.iter_mut() {
                *normal = rotation * *normal;
            }
        }
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}
