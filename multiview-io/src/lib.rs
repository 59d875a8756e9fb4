//! I/O operations for meshes
//!
//! This crate provides the mesh-loading collaborator of the rendering
//! pipeline (STL, OBJ and PLY readers behind a single [`read_mesh`] entry
//! point) and a wrapper around the OpenSCAD command line for turning `.scad`
//! models into STL files.

pub mod stl;
pub mod obj;
pub mod ply;
pub mod scad;
pub mod error;

pub use error::*;
pub use scad::{ScadConverter, ScadOptions};

use multiview_core::{Error, Result, TriangleMesh};
use std::path::Path;

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh>;
}

/// Mesh file extensions understood by [`read_mesh`]
pub const SUPPORTED_MESH_EXTENSIONS: &[&str] = &["stl", "obj", "ply"];

/// Fail unless `path` names an existing regular file
pub fn ensure_mesh_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::Precondition(format!(
            "mesh file {} does not exist",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(Error::Precondition(format!(
            "mesh path {} is not a regular file",
            path.display()
        )));
    }
    Ok(())
}

/// Auto-detect format from the extension and read a mesh
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    ensure_mesh_file(path)?;

    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());

    let mesh = match extension.as_deref() {
        Some("stl") => stl::StlReader::read_mesh(path)?,
        Some("obj") => obj::ObjReader::read_mesh(path)?,
        Some("ply") => ply::PlyReader::read_mesh(path)?,
        _ => {
            return Err(Error::UnsupportedFormat(format!(
                "Unsupported mesh format: {:?}",
                path.extension()
            )))
        }
    };

    mesh.validate()?;
    log::debug!(
        "loaded {} ({} vertices, {} faces)",
        path.display(),
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file_is_precondition_error() {
        let err = read_mesh("definitely/not/here.stl").unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn test_directory_is_precondition_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_mesh(dir.path()).unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn test_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.fbx");
        fs::write(&path, b"not a mesh").unwrap();

        assert!(matches!(read_mesh(&path), Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("TRIANGLE.STL");
        fs::write(
            &path,
            "solid t\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nvertex 0 1 0\nendloop\nendfacet\nendsolid t\n",
        )
        .unwrap();

        let mesh = read_mesh(&path).unwrap();
        assert_eq!(mesh.face_count(), 1);
    }
}
