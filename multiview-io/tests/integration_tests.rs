//! Integration tests for multiview-io
//!
//! The same tetrahedron is written in every supported format and read back
//! through the extension-dispatching entry point.

use approx::assert_relative_eq;
use multiview_core::{Drawable, Error, Point3f, TriangleMesh};
use multiview_io::{read_mesh, ScadConverter, ScadOptions};
use std::fs;
use std::path::Path;

const CORNERS: [[f32; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [2.0, 0.0, 0.0],
    [0.0, 3.0, 0.0],
    [0.0, 0.0, 4.0],
];
const FACES: [[usize; 3]; 4] = [[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];

fn binary_stl() -> Vec<u8> {
    let mut data = vec![0u8; 80];
    data.extend_from_slice(&(FACES.len() as u32).to_le_bytes());
    for face in FACES {
        data.extend_from_slice(&[0u8; 12]);
        for corner in face {
            for c in CORNERS[corner] {
                data.extend_from_slice(&c.to_le_bytes());
            }
        }
        data.extend_from_slice(&[0u8; 2]);
    }
    data
}

fn ascii_stl() -> String {
    let mut text = String::from("solid tetra\n");
    for face in FACES {
        text.push_str("facet normal 0 0 0\nouter loop\n");
        for corner in face {
            let [x, y, z] = CORNERS[corner];
            text.push_str(&format!("vertex {} {} {}\n", x, y, z));
        }
        text.push_str("endloop\nendfacet\n");
    }
    text.push_str("endsolid tetra\n");
    text
}

fn obj() -> String {
    let mut text = String::new();
    for [x, y, z] in CORNERS {
        text.push_str(&format!("v {} {} {}\n", x, y, z));
    }
    for [a, b, c] in FACES {
        text.push_str(&format!("f {} {} {}\n", a + 1, b + 1, c + 1));
    }
    text
}

fn ply() -> String {
    let mut text = format!(
        "ply\nformat ascii 1.0\nelement vertex {}\nproperty float x\nproperty float y\nproperty float z\n\
         element face {}\nproperty list uchar int vertex_indices\nend_header\n",
        CORNERS.len(),
        FACES.len()
    );
    for [x, y, z] in CORNERS {
        text.push_str(&format!("{} {} {}\n", x, y, z));
    }
    for [a, b, c] in FACES {
        text.push_str(&format!("3 {} {} {}\n", a, b, c));
    }
    text
}

fn assert_tetrahedron(mesh: &TriangleMesh) {
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.face_count(), 4);

    let bounds = mesh.bounding_box();
    assert_relative_eq!(bounds.min, Point3f::new(0.0, 0.0, 0.0));
    assert_relative_eq!(bounds.max, Point3f::new(2.0, 3.0, 4.0));
}

fn write(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_every_format_reads_the_same_mesh() {
    let dir = tempfile::tempdir().unwrap();

    let files = [
        write(dir.path(), "binary.stl", binary_stl()),
        write(dir.path(), "ascii.stl", ascii_stl()),
        write(dir.path(), "tetra.obj", obj()),
        write(dir.path(), "tetra.ply", ply()),
    ];

    for path in &files {
        let mesh = read_mesh(path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
        assert_tetrahedron(&mesh);
    }
}

#[test]
fn test_corrupt_files_are_invalid_data() {
    let dir = tempfile::tempdir().unwrap();

    let stl = write(dir.path(), "broken.stl", "solid x\nfacet normal 0 0 1\nouter loop\nvertex 0 zero 0\n");
    assert!(matches!(read_mesh(&stl), Err(Error::InvalidData(_))));

    let ply = write(
        dir.path(),
        "broken.ply",
        "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nend_header\nabc\n",
    );
    assert!(read_mesh(&ply).is_err());
}

#[test]
fn test_out_of_range_face_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "bad.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nf 1 2 9\n");

    assert!(read_mesh(&path).is_err());
}

#[test]
fn test_missing_openscad_binary_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let scad = write(dir.path(), "model.scad", "cube(size);");
    let converter = ScadConverter::with_binary(dir.path().join("no-such-openscad"));

    let options = ScadOptions::new().variable("size", "10");
    let result = converter.convert(&scad, &dir.path().join("model.stl"), &options);

    assert!(matches!(result, Err(multiview_io::IoError::Io(_))));
}
