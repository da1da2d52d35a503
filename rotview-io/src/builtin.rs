//! Procedurally generated assets
//!
//! These need no file on the search path, which makes them handy for demos
//! and for machines without the usual demo asset pack.

use rotview_core::{Point3f, TriangleMesh, Vector3f};

/// Prefix marking a built-in asset name
pub const BUILTIN_PREFIX: &str = "builtin:";

/// Name of the built-in box asset
pub const BUILTIN_BOX: &str = "builtin:box";

/// Half extents of the built-in box before scaling
const BOX_HALF_EXTENTS: [f32; 3] = [0.04, 0.025, 0.015];

/// Face colors: +x, -x, +y, -y, +z, -z
const BOX_FACE_COLORS: [[u8; 3]; 6] = [
    [220, 60, 60],
    [110, 30, 30],
    [60, 200, 80],
    [30, 100, 40],
    [70, 110, 230],
    [35, 55, 115],
];

/// Whether `name` refers to a built-in asset
pub fn is_builtin(name: &str) -> bool {
    name.starts_with(BUILTIN_PREFIX)
}

/// Build the named built-in mesh, if it exists
pub fn builtin_mesh(name: &str) -> Option<TriangleMesh> {
    match name {
        BUILTIN_BOX => Some(colored_box(BOX_HALF_EXTENTS)),
        _ => None,
    }
}

/// An axis-aligned box with one flat color per face
fn colored_box(half: [f32; 3]) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    let mut normals = Vec::with_capacity(24);
    let mut colors = Vec::with_capacity(24);

    for (face, color) in BOX_FACE_COLORS.iter().enumerate() {
        let axis = face / 2;
        let sign = if face % 2 == 0 { 1.0 } else { -1.0 };
        let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);

        let mut normal = Vector3f::zeros();
        normal[axis] = sign;

        let base = mesh.vertex_count();
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let mut corner = [0.0f32; 3];
            corner[axis] = sign * half[axis];
            corner[u] = su * half[u];
            corner[v] = sv * half[v];
            mesh.add_vertex(Point3f::new(corner[0], corner[1], corner[2]));
            normals.push(normal);
            colors.push(*color);
        }

        // Keep counter-clockwise winding when seen from outside
        if sign > 0.0 {
            mesh.add_face([base, base + 1, base + 2]);
            mesh.add_face([base, base + 2, base + 3]);
        } else {
            mesh.add_face([base, base + 2, base + 1]);
            mesh.add_face([base, base + 3, base + 2]);
        }
    }

    mesh.set_normals(normals);
    mesh.set_colors(colors);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_has_six_colored_faces() {
        let mesh = builtin_mesh(BUILTIN_BOX).unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.face_count(), 12);
        assert_eq!(mesh.colors.as_ref().map(Vec::len), Some(24));
    }

    #[test]
    fn box_winding_matches_outward_normals() {
        let mesh = builtin_mesh(BUILTIN_BOX).unwrap();
        let stored = mesh.normals.as_ref().unwrap();
        for (face, computed) in mesh.faces.iter().zip(mesh.calculate_face_normals()) {
            assert!(computed.dot(&stored[face[0]]) > 0.99);
        }
    }

    #[test]
    fn unknown_builtin_is_none() {
        assert!(is_builtin("builtin:teapot"));
        assert!(builtin_mesh("builtin:teapot").is_none());
        assert!(!is_builtin("duck.obj"));
    }
}
