//! In-memory backend without a window
//!
//! Keeps the full scene state a windowed backend would render, which makes
//! it the backend of choice for tests and batch runs. Assets are recorded by
//! name only; nothing is read from disk.

use crate::backend::{ConnectionMode, DebugText, VisualBackend};
use crate::camera::{DebugCamera, UpAxis};
use crate::scene::{Scene, SceneObject};
use instant::Instant;
use rotview_core::{
    BackendError, BackendResult, ClientId, DebugItemId, ObjectId, Point3f, Pose,
};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// A backend that only keeps scene state
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    scenes: BTreeMap<ClientId, Scene>,
    /// Clients closed from the outside and not yet disconnected
    closed: BTreeSet<ClientId>,
    next_client: u32,
    refusal: Option<String>,
    connections_opened: usize,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every following `connect` with `reason`
    pub fn refuse_connections(&mut self, reason: impl Into<String>) {
        self.refusal = Some(reason.into());
    }

    pub fn accept_connections(&mut self) {
        self.refusal = None;
    }

    /// Scene of a connected client
    pub fn scene(&self, client: ClientId) -> Option<&Scene> {
        self.scenes.get(&client)
    }

    /// Number of clients currently connected
    pub fn live_connections(&self) -> usize {
        self.scenes.len()
    }

    /// Number of successful connects over the backend's lifetime
    pub fn connections_opened(&self) -> usize {
        self.connections_opened
    }

    /// Drop a client's scene as if the user closed its window.
    ///
    /// The client reports as disconnected at once; a later `disconnect` for
    /// it still succeeds and clears the record.
    pub fn close_window(&mut self, client: ClientId) -> BackendResult<()> {
        self.scenes
            .remove(&client)
            .ok_or(BackendError::NotConnected(client))?;
        self.closed.insert(client);
        Ok(())
    }

    /// Clients closed by [`HeadlessBackend::close_window`] that nobody
    /// disconnected yet
    pub fn unacknowledged_closes(&self) -> usize {
        self.closed.len()
    }

    /// Remove an object from a client's scene, as if deleted from elsewhere
    pub fn remove_object(&mut self, client: ClientId, object: ObjectId) -> BackendResult<()> {
        self.scene_mut(client)?.remove_object(object).map(|_| ())
    }

    fn scene_ref(&self, client: ClientId) -> BackendResult<&Scene> {
        self.scenes
            .get(&client)
            .ok_or(BackendError::NotConnected(client))
    }

    fn scene_mut(&mut self, client: ClientId) -> BackendResult<&mut Scene> {
        self.scenes
            .get_mut(&client)
            .ok_or(BackendError::NotConnected(client))
    }
}

impl VisualBackend for HeadlessBackend {
    fn connect(&mut self, mode: ConnectionMode) -> BackendResult<ClientId> {
        if let Some(reason) = &self.refusal {
            return Err(BackendError::ConnectionRefused(reason.clone()));
        }
        let client = ClientId(self.next_client);
        self.next_client += 1;
        self.connections_opened += 1;
        self.scenes.insert(client, Scene::new(mode));
        Ok(client)
    }

    fn disconnect(&mut self, client: ClientId) -> BackendResult<()> {
        if self.scenes.remove(&client).is_some() || self.closed.remove(&client) {
            Ok(())
        } else {
            Err(BackendError::NotConnected(client))
        }
    }

    fn is_connected(&self, client: ClientId) -> bool {
        self.scenes.contains_key(&client)
    }

    fn set_up_axis(&mut self, client: ClientId, up: UpAxis) -> BackendResult<()> {
        self.scene_mut(client)?.up_axis = up;
        Ok(())
    }

    fn reset_camera(&mut self, client: ClientId, camera: &DebugCamera) -> BackendResult<()> {
        self.scene_mut(client)?.camera = *camera;
        Ok(())
    }

    fn set_asset_search_paths(&mut self, client: ClientId, paths: &[PathBuf]) -> BackendResult<()> {
        self.scene_mut(client)?.search_paths = paths.to_vec();
        Ok(())
    }

    fn load_asset(
        &mut self,
        client: ClientId,
        name: &str,
        position: Point3f,
        scale: f32,
    ) -> BackendResult<ObjectId> {
        let scene = self.scene_mut(client)?;
        Ok(scene.add_object(SceneObject {
            asset: name.to_string(),
            scale,
            pose: Pose::at(position),
        }))
    }

    fn pose(&self, client: ClientId, object: ObjectId) -> BackendResult<Pose> {
        Ok(self.scene_ref(client)?.object(object)?.pose)
    }

    fn reset_pose(&mut self, client: ClientId, object: ObjectId, pose: Pose) -> BackendResult<()> {
        self.scene_mut(client)?.object_mut(object)?.pose = pose;
        Ok(())
    }

    fn remove_all_debug_items(&mut self, client: ClientId) -> BackendResult<()> {
        self.scene_mut(client)?.clear_texts();
        Ok(())
    }

    fn add_debug_text(&mut self, client: ClientId, text: &DebugText) -> BackendResult<DebugItemId> {
        let scene = self.scene_mut(client)?;
        Ok(scene.add_text(text.clone(), Instant::now()))
    }

    fn present(&mut self, client: ClientId) -> BackendResult<()> {
        let scene = self.scene_mut(client)?;
        scene.prune_texts(Instant::now());
        scene.frames += 1;
        Ok(())
    }
}
