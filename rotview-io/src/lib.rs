//! Asset I/O for rotview
//!
//! This crate turns an asset name into a triangle mesh: it searches the
//! configured directories, reads OBJ files, and provides a few procedurally
//! generated assets under the `builtin:` prefix.

pub mod builtin;
pub mod error;
pub mod locator;
pub mod obj;

pub use builtin::{builtin_mesh, is_builtin, BUILTIN_BOX};
pub use error::*;
pub use locator::AssetLocator;

use rotview_core::TriangleMesh;
use std::path::Path;

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> AssetResult<TriangleMesh>;
}

/// Auto-detect format and read mesh
pub fn read_mesh<P: AsRef<Path>>(path: P) -> AssetResult<TriangleMesh> {
    let path = path.as_ref();
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("obj") => obj::ObjReader::read_mesh(path),
        other => Err(AssetError::InvalidFormat {
            format: other.unwrap_or("<none>").to_string(),
        }),
    }
}

/// Load an asset by name, scaled uniformly by `scale`
pub fn load_asset(locator: &AssetLocator, name: &str, scale: f32) -> AssetResult<TriangleMesh> {
    let mut mesh = if is_builtin(name) {
        builtin_mesh(name).ok_or_else(|| AssetError::NotFound {
            name: name.to_string(),
            searched: Vec::new(),
        })?
    } else {
        read_mesh(locator.resolve(name)?)?
    };
    mesh.scale_uniform(scale);
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn builtin_assets_bypass_the_search_path() {
        let locator = AssetLocator::new();
        let unit = load_asset(&locator, BUILTIN_BOX, 1.0).unwrap();
        let scaled = load_asset(&locator, BUILTIN_BOX, 10.0).unwrap();
        assert_relative_eq!(scaled.bounding_radius(), unit.bounding_radius() * 10.0, epsilon = 1e-5);
    }

    #[test]
    fn unknown_builtin_is_not_found() {
        let err = load_asset(&AssetLocator::new(), "builtin:duck", 1.0).unwrap_err();
        assert!(matches!(err, AssetError::NotFound { .. }));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("duck.urdf"), "<robot/>").unwrap();
        let locator = AssetLocator::with_paths([dir.path()]);
        let err = load_asset(&locator, "duck.urdf", 1.0).unwrap_err();
        assert!(matches!(err, AssetError::InvalidFormat { ref format } if format == "urdf"));
    }

    #[test]
    fn obj_assets_load_through_the_locator() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tri.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let locator = AssetLocator::with_paths([dir.path()]);
        let mesh = load_asset(&locator, "tri.obj", 2.0).unwrap();
        assert_relative_eq!(mesh.vertices[1].x, 2.0);
    }
}
