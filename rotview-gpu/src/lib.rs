//! # rotview GPU
//!
//! wgpu rendering for rotview windows: a scene renderer that draws each
//! loaded asset at its current pose, and an egui overlay for debug text.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use rotview_gpu::{RenderConfig, SceneRenderer};
//! use std::sync::Arc;
//!
//! fn example(window: Arc<winit::window::Window>) -> rotview_core::BackendResult<()> {
//!     let mut renderer = pollster::block_on(SceneRenderer::new(window, RenderConfig::default()))?;
//!     renderer.render(&[])?;
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod overlay;
pub mod renderer;

// Re-export commonly used items
pub use device::GpuContext;
pub use overlay::{ScreenLabel, TextOverlay};
pub use renderer::{
    mesh_to_vertices, project_to_screen, CameraUniform, LightingParams, MeshVertex, RenderConfig,
    SceneRenderer, WorldLabel,
};
