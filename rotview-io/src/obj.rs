//! OBJ format support

use crate::error::{AssetError, AssetResult};
use crate::MeshReader;
use rotview_core::{Point3f, TriangleMesh};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub struct ObjReader;

impl ObjReader {
    /// Parse OBJ text from any buffered reader.
    ///
    /// Polygons are fan-triangulated. Texture coordinates and file normals
    /// are dropped; smooth vertex normals are recomputed from the faces.
    pub fn parse<R: BufRead>(input: R, origin: &Path) -> AssetResult<TriangleMesh> {
        let data = ::obj::ObjData::load_buf(input).map_err(|e| AssetError::ParseError {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;

        let vertices: Vec<Point3f> = data
            .position
            .iter()
            .map(|&[x, y, z]| Point3f::new(x, y, z))
            .collect();

        let polygons = data
            .objects
            .iter()
            .flat_map(|object| &object.groups)
            .flat_map(|group| &group.polys);

        let mut faces = Vec::new();
        for polygon in polygons {
            let corners: Vec<usize> = polygon.0.iter().map(|tuple| tuple.0).collect();
            // obj leaves index validation to the caller
            if let Some(&bad) = corners.iter().find(|&&i| i >= vertices.len()) {
                return Err(AssetError::ParseError {
                    path: origin.to_path_buf(),
                    message: format!(
                        "face references vertex {} but only {} vertices exist",
                        bad.wrapping_add(1),
                        vertices.len()
                    ),
                });
            }
            for i in 1..corners.len().saturating_sub(1) {
                faces.push([corners[0], corners[i], corners[i + 1]]);
            }
        }

        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        let normals = mesh.calculate_vertex_normals();
        mesh.set_normals(normals);
        Ok(mesh)
    }
}

impl MeshReader for ObjReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> AssetResult<TriangleMesh> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mesh = Self::parse(BufReader::new(file), path)?;
        tracing::debug!(
            "Read {} vertices and {} faces from {:?}",
            mesh.vertex_count(),
            mesh.face_count(),
            path
        );
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const QUAD: &str = "\
# unit quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1 4//1
";

    #[test]
    fn quads_are_fan_triangulated() {
        let mesh = ObjReader::parse(Cursor::new(QUAD), Path::new("quad.obj")).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(mesh.normals.as_ref().map(Vec::len), Some(4));
    }

    #[test]
    fn out_of_range_face_is_a_parse_error() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nf 1 2 9\n";
        let err = ObjReader::parse(Cursor::new(text), Path::new("broken.obj"));
        assert!(matches!(err, Err(AssetError::ParseError { .. })));
    }

    #[test]
    fn negative_indices_past_the_start_are_rejected() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -1 -2 -5\n";
        let err = ObjReader::parse(Cursor::new(text), Path::new("broken.obj"));
        assert!(matches!(err, Err(AssetError::ParseError { .. })));
    }

    #[test]
    fn faces_in_every_object_and_group_are_read() {
        let text = "\
o first
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
o second
g lid
v 0 0 1
f 1 2 4
g side
f 2 3 4
";
        let mesh = ObjReader::parse(Cursor::new(text), Path::new("multi.obj")).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 1, 3], [1, 2, 3]]);
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let mesh = ObjReader::read_mesh(&path).unwrap();
        assert_eq!(mesh.face_count(), 1);
    }
}
