//! Asset search path resolution
//!
//! Asset names are looked up in an ordered list of directories, the first
//! hit wins. Absolute paths that exist are used as-is.

use std::path::{Path, PathBuf};

use crate::error::{AssetError, AssetResult};

/// Ordered list of directories searched for asset files
#[derive(Debug, Clone, Default)]
pub struct AssetLocator {
    search_paths: Vec<PathBuf>,
}

impl AssetLocator {
    /// Create a locator with no search directories
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a locator from a list of directories
    pub fn with_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a directory to the end of the search order
    pub fn add_search_path<P: Into<PathBuf>>(&mut self, path: P) {
        let path = path.into();
        if !self.search_paths.contains(&path) {
            self.search_paths.push(path);
        }
    }

    /// Replace all search directories
    pub fn set_search_paths(&mut self, paths: &[PathBuf]) {
        self.search_paths.clear();
        for path in paths {
            self.add_search_path(path.clone());
        }
    }

    /// Directories in search order
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Find the file for `name`
    pub fn resolve(&self, name: &str) -> AssetResult<PathBuf> {
        let direct = Path::new(name);
        if direct.is_absolute() {
            if direct.is_file() {
                return Ok(direct.to_path_buf());
            }
            return Err(AssetError::NotFound {
                name: name.to_string(),
                searched: vec![direct.to_path_buf()],
            });
        }

        let mut searched = Vec::with_capacity(self.search_paths.len() + 1);
        for dir in &self.search_paths {
            let candidate = dir.join(direct);
            if candidate.is_file() {
                tracing::debug!("Resolved asset '{}' to {:?}", name, candidate);
                return Ok(candidate);
            }
            searched.push(candidate);
        }

        // Relative to the working directory as a last resort
        if direct.is_file() {
            return Ok(direct.to_path_buf());
        }
        searched.push(direct.to_path_buf());

        Err(AssetError::NotFound {
            name: name.to_string(),
            searched,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn first_matching_directory_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("duck.obj"), "v 0 0 0\n").unwrap();
        fs::write(second.path().join("duck.obj"), "v 1 1 1\n").unwrap();

        let locator = AssetLocator::with_paths([first.path(), second.path()]);
        let resolved = locator.resolve("duck.obj").unwrap();
        assert_eq!(resolved, first.path().join("duck.obj"));
    }

    #[test]
    fn later_directory_is_used_when_earlier_misses() {
        let empty = tempfile::tempdir().unwrap();
        let assets = tempfile::tempdir().unwrap();
        fs::write(assets.path().join("box.obj"), "v 0 0 0\n").unwrap();

        let mut locator = AssetLocator::new();
        locator.add_search_path(empty.path());
        locator.add_search_path(assets.path());
        assert_eq!(locator.resolve("box.obj").unwrap(), assets.path().join("box.obj"));
    }

    #[test]
    fn missing_asset_lists_every_searched_location() {
        let dir = tempfile::tempdir().unwrap();
        let locator = AssetLocator::with_paths([dir.path()]);
        match locator.resolve("no_such_asset.obj") {
            Err(AssetError::NotFound { name, searched }) => {
                assert_eq!(name, "no_such_asset.obj");
                assert_eq!(searched.len(), 2);
                assert_eq!(searched[0], dir.path().join("no_such_asset.obj"));
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_search_paths_are_ignored() {
        let mut locator = AssetLocator::new();
        locator.add_search_path("/tmp/assets");
        locator.add_search_path("/tmp/assets");
        assert_eq!(locator.search_paths().len(), 1);
    }

    #[test]
    fn absolute_paths_resolve_directly() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("abs.obj");
        fs::write(&file, "v 0 0 0\n").unwrap();
        let locator = AssetLocator::new();
        assert_eq!(locator.resolve(file.to_str().unwrap()).unwrap(), file);
    }
}
