//! Viewer configuration

use crate::camera::{DebugCamera, UpAxis};
use rotview_core::{AxisOrder, Error, Point3f, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything a [`crate::RotationViewer`] needs to know before connecting.
///
/// Missing TOML keys fall back to the defaults; unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Number of objects shown side by side
    pub slot_count: usize,
    /// Place every slot at the origin
    pub overlap: bool,
    /// Component order of incoming quaternions
    pub axis_order: AxisOrder,
    pub up_axis: UpAxis,
    /// Asset loaded for every slot.
    ///
    /// Relative names are looked up in `asset_paths`; no mesh ships for the
    /// default `duck.obj`, so a windowed viewer fails with `AssetNotFound`
    /// until a directory holding it is listed there. `builtin:box` needs no
    /// files.
    pub asset: String,
    pub asset_scale: f32,
    /// Extra asset directories, searched in order
    pub asset_paths: Vec<PathBuf>,
    /// Distance between neighbouring slots along x
    pub slot_spacing: f32,
    pub camera: DebugCamera,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            slot_count: 1,
            overlap: false,
            axis_order: AxisOrder::Xyzw,
            up_axis: UpAxis::Y,
            asset: "duck.obj".to_string(),
            asset_scale: 10.0,
            asset_paths: Vec::new(),
            slot_spacing: 1.2,
            camera: DebugCamera::default(),
        }
    }
}

impl ViewerConfig {
    /// Default configuration with the given slot layout
    pub fn new(slot_count: usize, overlap: bool, axis_order: AxisOrder) -> Self {
        Self {
            slot_count,
            overlap,
            axis_order,
            ..Self::default()
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| Error::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::InvalidConfiguration(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.slot_count == 0 {
            return Err(Error::InvalidConfiguration(
                "slot_count must be at least 1".to_string(),
            ));
        }
        if !self.slot_spacing.is_finite() || self.slot_spacing < 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "slot_spacing must be finite and non-negative, got {}",
                self.slot_spacing
            )));
        }
        if !self.asset_scale.is_finite() || self.asset_scale <= 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "asset_scale must be finite and positive, got {}",
                self.asset_scale
            )));
        }
        if !self.camera.distance.is_finite() || self.camera.distance <= 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "camera distance must be finite and positive, got {}",
                self.camera.distance
            )));
        }
        if self.asset.trim().is_empty() {
            return Err(Error::InvalidConfiguration("asset name is empty".to_string()));
        }
        Ok(())
    }

    /// Effective spacing between slots
    pub fn spacing(&self) -> f32 {
        if self.overlap {
            0.0
        } else {
            self.slot_spacing
        }
    }

    /// Slot positions, centred on the origin and laid out along -x
    pub fn slot_positions(&self) -> Vec<Point3f> {
        let spacing = self.spacing();
        let offset = self.slot_count.saturating_sub(1) as f32 * spacing / 2.0;
        (0..self.slot_count)
            .map(|i| Point3f::new(-(i as f32) * spacing + offset, 0.0, 0.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rotview_io::{AssetError, AssetLocator};

    #[test]
    fn default_asset_resolves_only_through_asset_paths() {
        let config = ViewerConfig::default();
        let bare = rotview_io::load_asset(&AssetLocator::new(), &config.asset, config.asset_scale);
        assert!(matches!(
            bare,
            Err(AssetError::NotFound { ref name, .. }) if *name == config.asset
        ));

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("duck.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let config = ViewerConfig {
            asset_paths: vec![dir.path().to_path_buf()],
            ..ViewerConfig::default()
        };
        let locator = AssetLocator::with_paths(config.asset_paths.iter().cloned());
        let mesh = rotview_io::load_asset(&locator, &config.asset, config.asset_scale).unwrap();
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn defaults_match_construction_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.slot_count, 1);
        assert!(!config.overlap);
        assert_eq!(config.axis_order, AxisOrder::Xyzw);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn three_slots_are_centred() {
        let positions = ViewerConfig::new(3, false, AxisOrder::Xyzw).slot_positions();
        let xs: Vec<f32> = positions.iter().map(|p| p.x).collect();
        assert_relative_eq!(xs[0], 1.2, epsilon = 1e-6);
        assert_relative_eq!(xs[1], 0.0, epsilon = 1e-6);
        assert_relative_eq!(xs[2], -1.2, epsilon = 1e-6);
        assert!(positions.iter().all(|p| p.y == 0.0 && p.z == 0.0));
    }

    #[test]
    fn overlap_puts_every_slot_at_origin() {
        let positions = ViewerConfig::new(4, true, AxisOrder::Xyzw).slot_positions();
        assert_eq!(positions.len(), 4);
        assert!(positions.iter().all(|p| *p == Point3f::origin()));
    }

    #[test]
    fn zero_slots_is_rejected() {
        let config = ViewerConfig::new(0, false, AxisOrder::Xyzw);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn bad_spacing_and_scale_are_rejected() {
        let mut config = ViewerConfig::default();
        config.slot_spacing = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.asset_scale = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_partial_toml() {
        let config = ViewerConfig::from_toml_str(
            r#"
            slot_count = 2
            axis_order = "wxyz"
            up_axis = "z"
            asset = "builtin:box"

            [camera]
            distance = 3.0
            "#,
        )
        .unwrap();

        assert_eq!(config.slot_count, 2);
        assert_eq!(config.axis_order, AxisOrder::Wxyz);
        assert_eq!(config.up_axis, UpAxis::Z);
        assert_eq!(config.camera.distance, 3.0);
        assert_eq!(config.camera.pitch, -30.0);
        assert_eq!(config.slot_spacing, 1.2);
    }

    #[test]
    fn toml_with_unknown_order_fails() {
        let result = ViewerConfig::from_toml_str(r#"axis_order = "zyxw""#);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn toml_with_unknown_key_fails() {
        let result = ViewerConfig::from_toml_str("slots = 3");
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));

        let result = ViewerConfig::from_toml_str("[camera]\nroll = 10.0");
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn toml_round_trip_keeps_values() {
        let mut config = ViewerConfig::new(3, true, AxisOrder::Wxyz);
        config.asset_paths.push(PathBuf::from("assets"));
        let text = config.to_toml_string().unwrap();
        assert_eq!(ViewerConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.toml");
        std::fs::write(&path, "slot_count = 5\noverlap = true\n").unwrap();

        let config = ViewerConfig::load(&path).unwrap();
        assert_eq!(config.slot_count, 5);
        assert!(config.overlap);

        let missing = ViewerConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(Error::Io(_))));
    }
}
