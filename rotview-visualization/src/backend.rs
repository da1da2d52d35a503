//! The rendering backend seam
//!
//! A [`VisualBackend`] owns the actual scene: connections, loaded assets,
//! camera and debug text. The viewer only drives it through this trait, so
//! the same viewer logic runs against a real window or a headless scene.

use crate::camera::{DebugCamera, UpAxis};
use rotview_core::{BackendResult, ClientId, DebugItemId, ObjectId, Point3f, Pose};
use std::path::PathBuf;
use std::time::Duration;

/// How a client talks to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Visible window
    Gui,
    /// No window, scene state only
    Direct,
}

/// A text label placed in world space
#[derive(Debug, Clone, PartialEq)]
pub struct DebugText {
    pub text: String,
    pub position: Point3f,
    pub color: [f32; 3],
    pub size: f32,
    /// Zero keeps the text until it is removed
    pub lifetime: Duration,
}

impl DebugText {
    /// White, size 1.2 text one unit above the origin, kept until removed
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position: Point3f::new(0.0, 0.0, 1.0),
            color: [1.0, 1.0, 1.0],
            size: 1.2,
            lifetime: Duration::ZERO,
        }
    }

    pub fn at(mut self, position: Point3f) -> Self {
        self.position = position;
        self
    }

    pub fn color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Whether the text should still be shown after `age`
    pub fn is_alive(&self, age: Duration) -> bool {
        self.lifetime.is_zero() || age < self.lifetime
    }
}

/// A 3D scene service the viewer can connect to and drive.
///
/// Every scene call names the client it acts for; calls for a client that
/// is not connected fail with [`rotview_core::BackendError::NotConnected`].
pub trait VisualBackend {
    /// Open a new connection
    fn connect(&mut self, mode: ConnectionMode) -> BackendResult<ClientId>;

    /// Close a connection and release its scene.
    ///
    /// Also succeeds once for a client the backend closed by itself, such as
    /// a window the user shut; `NotConnected` otherwise.
    fn disconnect(&mut self, client: ClientId) -> BackendResult<()>;

    fn is_connected(&self, client: ClientId) -> bool;

    fn set_up_axis(&mut self, client: ClientId, up: UpAxis) -> BackendResult<()>;

    fn reset_camera(&mut self, client: ClientId, camera: &DebugCamera) -> BackendResult<()>;

    /// Directories searched, in order, when an asset name is relative
    fn set_asset_search_paths(&mut self, client: ClientId, paths: &[PathBuf]) -> BackendResult<()>;

    /// Load an asset with identity orientation at `position`
    fn load_asset(
        &mut self,
        client: ClientId,
        name: &str,
        position: Point3f,
        scale: f32,
    ) -> BackendResult<ObjectId>;

    fn pose(&self, client: ClientId, object: ObjectId) -> BackendResult<Pose>;

    fn reset_pose(&mut self, client: ClientId, object: ObjectId, pose: Pose) -> BackendResult<()>;

    fn remove_all_debug_items(&mut self, client: ClientId) -> BackendResult<()>;

    fn add_debug_text(&mut self, client: ClientId, text: &DebugText) -> BackendResult<DebugItemId>;

    /// Make pending scene changes visible
    fn present(&mut self, client: ClientId) -> BackendResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_text_defaults() {
        let text = DebugText::new("hello");
        assert_eq!(text.position, Point3f::new(0.0, 0.0, 1.0));
        assert_eq!(text.color, [1.0, 1.0, 1.0]);
        assert_eq!(text.size, 1.2);
        assert!(text.lifetime.is_zero());
    }

    #[test]
    fn zero_lifetime_never_expires() {
        let text = DebugText::new("persistent");
        assert!(text.is_alive(Duration::from_secs(3600)));

        let short = text.lifetime(Duration::from_millis(50));
        assert!(short.is_alive(Duration::from_millis(10)));
        assert!(!short.is_alive(Duration::from_millis(50)));
    }
}
