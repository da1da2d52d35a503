//! # rotview
//!
//! Show quaternions as the orientation of 3D objects, live or replayed from
//! recorded sequences.
//!
//! This is the umbrella crate that provides convenient access to all rotview
//! functionality. Use the individual crates for more granular control over
//! dependencies.
//!
//! ## Features
//!
//! - **Core**: errors, quaternion ordering, poses and meshes
//! - **I/O**: asset lookup, OBJ reading and built-in meshes
//! - **GPU**: wgpu scene renderer with a text overlay
//! - **Visualization**: the rotation viewer and its backends
//!
//! ## Quick Start
//!
//! ```rust
//! use rotview::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ViewerConfig::new(2, false, AxisOrder::Wxyz);
//! let mut viewer = RotationViewer::new(HeadlessBackend::new(), config)?;
//!
//! let sequences = vec![vec![[1.0, 0.0, 0.0, 0.0]; 3], vec![[0.0, 0.0, 0.0, 1.0]; 3]];
//! let report = viewer.replay_offline(&sequences, 120.0)?;
//! assert_eq!(report.frames, 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables io and visualization
//! - `io`: Asset lookup and mesh reading
//! - `gpu`: Direct access to the wgpu renderer
//! - `visualization`: Rotation viewer, headless and window backends
//! - `all`: Enables all features

// Re-export core functionality
pub use rotview_core::*;

// Re-export sub-crates
#[cfg(feature = "io")]
pub use rotview_io as io;

#[cfg(feature = "gpu")]
pub use rotview_gpu as gpu;

#[cfg(feature = "visualization")]
pub use rotview_visualization as visualization;

/// Convenient imports for common use cases
pub mod prelude {
    pub use rotview_core::{
        AxisOrder, BackendError, Error, Pose, Quat, Result, TriangleMesh, IDENTITY,
    };

    #[cfg(feature = "io")]
    pub use rotview_io::{load_asset, AssetLocator, BUILTIN_BOX};

    #[cfg(feature = "visualization")]
    pub use rotview_visualization::{
        DebugCamera, DebugText, HeadlessBackend, ReplayReport, RotationViewer, UpAxis,
        ViewerConfig, ViewerSession, VisualBackend, WindowBackend, WindowSettings,
    };
}
