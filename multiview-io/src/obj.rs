//! OBJ format support

use crate::{IoError, MeshReader};
use multiview_core::{Point3f, Result, TriangleMesh, Vector3f};
use obj::{IndexTuple, Obj, ObjData};
use std::path::Path;

pub struct ObjReader;

impl MeshReader for ObjReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let obj = Obj::load(path.as_ref())
            .map_err(|e| IoError::parse(format!("failed to load OBJ: {}", e)))?;
        Ok(obj_data_to_mesh(&obj.data)?)
    }
}

/// Convert parsed OBJ data into a triangle mesh, fan-triangulating polygons.
///
/// Per-corner normals are kept only when every corner of every polygon has
/// one; otherwise the mesh is returned without normals.
pub fn obj_data_to_mesh(data: &ObjData) -> std::result::Result<TriangleMesh, IoError> {
    let vertices: Vec<Point3f> = data
        .position
        .iter()
        .map(|p| Point3f::new(p[0], p[1], p[2]))
        .collect();

    let mut normals = vec![Vector3f::zeros(); vertices.len()];
    let mut all_normals = !data.normal.is_empty();
    let mut faces = Vec::new();

    let polygons = data
        .objects
        .iter()
        .flat_map(|object| &object.groups)
        .flat_map(|group| &group.polys);

    for polygon in polygons {
        let corners = &polygon.0;
        if corners.len() < 3 {
            return Err(IoError::parse(format!(
                "polygon with {} vertices",
                corners.len()
            )));
        }

        for &IndexTuple(position, _, normal) in corners {
            if position >= vertices.len() {
                return Err(IoError::parse(format!(
                    "vertex index {} out of range",
                    position + 1
                )));
            }
            match normal.and_then(|n| data.normal.get(n)) {
                Some(n) => normals[position] = Vector3f::new(n[0], n[1], n[2]),
                None => all_normals = false,
            }
        }

        for i in 1..corners.len() - 1 {
            faces.push([corners[0].0, corners[i].0, corners[i + 1].0]);
        }
    }

    let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
    if all_normals {
        mesh.set_normals(normals);
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    fn parse(text: &str) -> ObjData {
        ObjData::load_buf(BufReader::new(text.as_bytes())).unwrap()
    }

    #[test]
    fn test_quad_is_fan_triangulated() {
        let data = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n");
        let mesh = obj_data_to_mesh(&data).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert!(mesh.normals.is_none());
    }

    #[test]
    fn test_normals_are_kept() {
        let data = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n");
        let mesh = obj_data_to_mesh(&data).unwrap();

        let normals = mesh.normals.unwrap();
        assert_eq!(normals[1], Vector3f::new(0.0, 0.0, 1.0));
    }
}
