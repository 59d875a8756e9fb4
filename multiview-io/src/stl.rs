//! STL format support (binary and ASCII)

use crate::{IoError, MeshReader};
use bytemuck::{Pod, Zeroable};
use multiview_core::{Point3f, Result, TriangleMesh};
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    combinator::all_consuming,
    multi::many0,
    number::complete::float,
    sequence::preceded,
    IResult,
};
use std::collections::HashMap;
use std::path::Path;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// One binary facet record: normal, three vertices, attribute byte count
#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct RawFacet {
    words: [u32; 12],
    attribute: u16,
}

impl RawFacet {
    fn vertex(&self, i: usize) -> Point3f {
        let words = self.words;
        let f = |k: usize| f32::from_bits(u32::from_le(words[3 + i * 3 + k]));
        Point3f::new(f(0), f(1), f(2))
    }
}

pub struct StlReader;

impl MeshReader for StlReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let data = std::fs::read(path)?;
        Ok(parse_stl(&data)?)
    }
}

/// Parse STL bytes, detecting the binary or ASCII variant from the content
pub fn parse_stl(data: &[u8]) -> std::result::Result<TriangleMesh, IoError> {
    if is_binary(data) {
        return parse_binary(data);
    }

    match std::str::from_utf8(data) {
        Ok(text) if text.trim_start().starts_with("solid") => parse_ascii(text),
        _ => parse_binary(data),
    }
}

/// Binary files declare their facet count; trust it only when the length agrees.
///
/// Some exporters write binary files whose header begins with "solid", so the
/// size check takes precedence over the keyword.
fn is_binary(data: &[u8]) -> bool {
    match declared_facets(data) {
        Some(count) => HEADER_LEN + 4 + count * FACET_LEN == data.len(),
        None => false,
    }
}

fn declared_facets(data: &[u8]) -> Option<usize> {
    let bytes: [u8; 4] = data.get(HEADER_LEN..HEADER_LEN + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes) as usize)
}

fn parse_binary(data: &[u8]) -> std::result::Result<TriangleMesh, IoError> {
    let count = declared_facets(data)
        .ok_or_else(|| IoError::parse("File too small to be a valid STL"))?;

    let body = &data[HEADER_LEN + 4..];
    if body.len() < count * FACET_LEN {
        return Err(IoError::parse(format!(
            "STL declares {} facets but only {} bytes of facet data follow",
            count,
            body.len()
        )));
    }

    let mut builder = WeldingBuilder::with_capacity(count);
    for chunk in body.chunks_exact(FACET_LEN).take(count) {
        let facet: RawFacet = bytemuck::pod_read_unaligned(chunk);
        builder.push_triangle([facet.vertex(0), facet.vertex(1), facet.vertex(2)]);
    }

    Ok(builder.finish())
}

fn parse_ascii(text: &str) -> std::result::Result<TriangleMesh, IoError> {
    let facets = match all_consuming(ascii_solid)(text) {
        Ok((_, facets)) => facets,
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => {
            let offset = text.len() - e.input.len();
            let line = text[..offset].matches('\n').count() + 1;
            return Err(IoError::parse(format!(
                "invalid ASCII STL near line {} ({:?})",
                line, e.code
            )));
        }
        Err(nom::Err::Incomplete(_)) => return Err(IoError::parse("truncated ASCII STL")),
    };

    let mut builder = WeldingBuilder::with_capacity(facets.len());
    for corners in facets {
        builder.push_triangle(corners);
    }
    Ok(builder.finish())
}

fn ascii_solid(input: &str) -> IResult<&str, Vec<[Point3f; 3]>> {
    // Solid names run to the end of their line
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _) = not_line_ending(input)?;
    let (input, facets) = many0(facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _) = not_line_ending(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, facets))
}

fn facet(input: &str) -> IResult<&str, [Point3f; 3]> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    // Normals are recomputed from the welded mesh
    let (input, _) = vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, a) = vertex(input)?;
    let (input, b) = vertex(input)?;
    let (input, c) = vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;
    Ok((input, [a, b, c]))
}

fn vertex(input: &str) -> IResult<&str, Point3f> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    vector3(input)
}

fn vector3(input: &str) -> IResult<&str, Point3f> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, Point3f::new(x, y, z)))
}

/// Collects triangle soup and merges vertices with identical positions
struct WeldingBuilder {
    mesh: TriangleMesh,
    index: HashMap<[u32; 3], usize>,
}

impl WeldingBuilder {
    fn with_capacity(triangles: usize) -> Self {
        Self {
            mesh: TriangleMesh::new(),
            index: HashMap::with_capacity(triangles / 2),
        }
    }

    fn vertex_index(&mut self, p: Point3f) -> usize {
        // Adding 0.0 folds -0.0 into 0.0 so both hash alike
        let key = [(p.x + 0.0).to_bits(), (p.y + 0.0).to_bits(), (p.z + 0.0).to_bits()];
        let mesh = &mut self.mesh;
        *self.index.entry(key).or_insert_with(|| mesh.add_vertex(p))
    }

    fn push_triangle(&mut self, corners: [Point3f; 3]) {
        let face = corners.map(|p| self.vertex_index(p));
        self.mesh.add_face(face);
    }

    fn finish(self) -> TriangleMesh {
        self.mesh
    }
}
