//! Quaternion visualization for rotview
//!
//! This crate shows rotations as the orientation of objects in a 3D scene:
//! - [`RotationViewer`] for live updates and paced offline replay
//! - [`VisualBackend`], the seam to a scene service
//! - [`HeadlessBackend`] (in-memory) and [`WindowBackend`] (winit + wgpu)
//! - TOML-loadable [`ViewerConfig`] and orbit camera settings
//!
//! ```rust
//! use rotview_visualization::{HeadlessBackend, RotationViewer, ViewerConfig};
//!
//! # fn main() -> rotview_core::Result<()> {
//! let mut viewer = RotationViewer::new(HeadlessBackend::new(), ViewerConfig::default())?;
//! viewer.with_session(|v| v.update_all(&[[0.0, 0.0, 0.7071, 0.7071]]))?;
//! assert!(!viewer.is_connected());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod camera;
pub mod config;
pub mod headless;
pub mod scene;
pub mod viewer;
pub mod window;

pub use backend::*;
pub use camera::*;
pub use config::*;
pub use headless::HeadlessBackend;
pub use scene::{Scene, SceneObject, SceneText};
pub use viewer::*;
pub use window::{WindowBackend, WindowSettings};
