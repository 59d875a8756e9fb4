//! PLY format support

use crate::{IoError, MeshReader};
use multiview_core::{Point3f, Result, TriangleMesh, Vector3f};
use ply_rs::{
    parser::Parser,
    ply::{DefaultElement, Ply, Property},
};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub struct PlyReader;

impl MeshReader for PlyReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Ok(parse_ply(&mut reader)?)
    }
}

/// Read a PLY mesh from any buffered source
pub fn parse_ply<R: BufRead>(reader: &mut R) -> std::result::Result<TriangleMesh, IoError> {
    let parser = Parser::<DefaultElement>::new();
    let ply: Ply<DefaultElement> = parser.read_ply(reader)?;

    let vertex_elements = ply.payload.get("vertex").map(Vec::as_slice).unwrap_or(&[]);

    let vertices = vertex_elements
        .iter()
        .map(|vertex| {
            Ok(Point3f::new(
                scalar(vertex, "x")?,
                scalar(vertex, "y")?,
                scalar(vertex, "z")?,
            ))
        })
        .collect::<std::result::Result<Vec<_>, IoError>>()?;

    // Normals are optional; a single vertex without them discards the set
    let normals: Option<Vec<Vector3f>> = vertex_elements
        .iter()
        .map(|vertex| {
            Some(Vector3f::new(
                scalar(vertex, "nx").ok()?,
                scalar(vertex, "ny").ok()?,
                scalar(vertex, "nz").ok()?,
            ))
        })
        .collect();

    let mut faces = Vec::new();
    if let Some(face_elements) = ply.payload.get("face") {
        for face in face_elements {
            let indices = face_indices(face)?;
            if indices.len() < 3 {
                return Err(IoError::parse(format!("face with {} vertices", indices.len())));
            }
            for i in 1..indices.len() - 1 {
                faces.push([indices[0], indices[i], indices[i + 1]]);
            }
        }
    }

    let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
    if let Some(normals) = normals.filter(|n| !n.is_empty()) {
        mesh.set_normals(normals);
    }
    Ok(mesh)
}

/// Extract a property value as f32 from a PLY element
fn scalar(element: &DefaultElement, name: &str) -> std::result::Result<f32, IoError> {
    match element.get(name) {
        Some(Property::Float(val)) => Ok(*val),
        Some(Property::Double(val)) => Ok(*val as f32),
        Some(Property::Int(val)) => Ok(*val as f32),
        Some(Property::UInt(val)) => Ok(*val as f32),
        Some(Property::Short(val)) => Ok(*val as f32),
        Some(Property::UShort(val)) => Ok(*val as f32),
        _ => Err(IoError::parse(format!(
            "Property '{}' not found or invalid type",
            name
        ))),
    }
}

/// Extract face indices from a PLY face element
fn face_indices(element: &DefaultElement) -> std::result::Result<Vec<usize>, IoError> {
    match element.get("vertex_indices").or_else(|| element.get("vertex_index")) {
        Some(Property::ListInt(indices)) => indices
            .iter()
            .map(|&idx| usize::try_from(idx).map_err(|_| IoError::parse(format!("negative vertex index {}", idx))))
            .collect(),
        Some(Property::ListUInt(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        Some(Property::ListUChar(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        _ => Err(IoError::parse("Face indices not found")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_mesh_with_normals() {
        let text = "ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
property float nx
property float ny
property float nz
element face 1
property list uchar int vertex_indices
end_header
0 0 0 0 0 1
1 0 0 0 0 1
1 1 0 0 0 1
0 1 0 0 0 1
4 0 1 2 3
";
        let mesh = parse_ply(&mut text.as_bytes()).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(mesh.normals.unwrap()[3], Vector3f::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_missing_normals() {
        let text = "ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
0 1 0
3 0 1 2
";
        let mesh = parse_ply(&mut text.as_bytes()).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert!(mesh.normals.is_none());
    }
}
