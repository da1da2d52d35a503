//! Windowed backend rendering with wgpu
//!
//! One GUI connection at a time. The winit event loop lives as long as the
//! backend, so the process can open a new window after the previous one
//! was disconnected. Events are only pumped inside [`VisualBackend::present`].

use crate::backend::{ConnectionMode, DebugText, VisualBackend};
use crate::camera::{Camera, DebugCamera, UpAxis};
use crate::scene::{Scene, SceneObject};
use instant::Instant;
use rotview_core::{
    BackendError, BackendResult, ClientId, DebugItemId, ObjectId, Point3f, Pose,
};
use rotview_gpu::{LightingParams, RenderConfig, SceneRenderer, WorldLabel};
use rotview_io::AssetLocator;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowBuilder},
};

/// Window appearance
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSettings {
    pub title: String,
    /// Inner size in logical pixels
    pub width: f64,
    pub height: f64,
    pub background_color: [f64; 4],
    pub vsync: bool,
    /// Fixed for the lifetime of a window
    pub lighting: LightingParams,
    /// Pixels per unit of debug text size
    pub text_scale: f32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "rotview".to_string(),
            width: 1200.0,
            height: 800.0,
            background_color: RenderConfig::default().background_color,
            vsync: true,
            lighting: LightingParams::default(),
            text_scale: 16.0,
        }
    }
}

impl WindowSettings {
    fn render_config(&self) -> RenderConfig {
        RenderConfig {
            background_color: self.background_color,
            vsync: self.vsync,
            lighting: self.lighting,
            ..RenderConfig::default()
        }
    }
}

struct WindowSession {
    client: ClientId,
    window: Arc<Window>,
    renderer: SceneRenderer,
    scene: Scene,
    locator: AssetLocator,
}

impl WindowSession {
    fn sync_camera(&mut self) {
        let camera = Camera::from_debug(
            &self.scene.camera,
            self.scene.up_axis,
            self.renderer.aspect_ratio(),
        );
        self.renderer.update_camera(
            camera.view_matrix(),
            camera.projection_matrix(),
            camera.position.coords,
        );
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.renderer.resize(size.width, size.height);
        self.sync_camera();
    }
}

/// A backend that shows the scene in a desktop window
pub struct WindowBackend {
    settings: WindowSettings,
    event_loop: Option<EventLoop<()>>,
    session: Option<WindowSession>,
    /// Client whose window the user closed, until it is disconnected
    closed: Option<ClientId>,
    next_client: u32,
}

impl WindowBackend {
    pub fn new() -> Self {
        Self::with_settings(WindowSettings::default())
    }

    pub fn with_settings(settings: WindowSettings) -> Self {
        Self {
            settings,
            event_loop: None,
            session: None,
            closed: None,
            next_client: 0,
        }
    }

    pub fn settings(&self) -> &WindowSettings {
        &self.settings
    }

    fn session(&self, client: ClientId) -> BackendResult<&WindowSession> {
        self.session
            .as_ref()
            .filter(|s| s.client == client)
            .ok_or(BackendError::NotConnected(client))
    }

    fn session_mut(&mut self, client: ClientId) -> BackendResult<&mut WindowSession> {
        self.session
            .as_mut()
            .filter(|s| s.client == client)
            .ok_or(BackendError::NotConnected(client))
    }

    fn event_loop(&mut self) -> BackendResult<&EventLoop<()>> {
        if self.event_loop.is_none() {
            let event_loop = EventLoop::new().map_err(|e| {
                BackendError::Window(format!("Failed to create event loop: {}", e))
            })?;
            self.event_loop = Some(event_loop);
        }
        self.event_loop
            .as_ref()
            .ok_or_else(|| BackendError::Window("Event loop unavailable".to_string()))
    }

    /// Handle pending window events without blocking
    fn pump(&mut self) {
        let (Some(event_loop), Some(session)) = (self.event_loop.as_mut(), self.session.as_mut())
        else {
            return;
        };
        let client = session.client;
        let window_id = session.window.id();
        let mut resized = None;
        let mut close_requested = false;

        let status = event_loop.pump_events(Some(Duration::ZERO), |event, _| {
            if let Event::WindowEvent { window_id: id, event } = event {
                if id != window_id {
                    return;
                }
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => close_requested = true,
                    WindowEvent::Resized(size) => resized = Some(size),
                    _ => {}
                }
            }
        });

        if let PumpStatus::Exit(code) = status {
            tracing::debug!("Event loop exited with code {}", code);
            close_requested = true;
        }
        if let Some(size) = resized {
            session.resize(size);
        }
        if close_requested {
            tracing::info!("Window for {} was closed", client);
            // Dropping the session closes the window and frees its surface.
            self.session = None;
            self.closed = Some(client);
        }
    }
}

impl Default for WindowBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualBackend for WindowBackend {
    fn connect(&mut self, mode: ConnectionMode) -> BackendResult<ClientId> {
        if mode != ConnectionMode::Gui {
            return Err(BackendError::ConnectionRefused(
                "window backend only supports GUI connections".to_string(),
            ));
        }
        if self.session.is_some() {
            return Err(BackendError::ConnectionRefused(
                "only one GUI connection is allowed".to_string(),
            ));
        }

        let settings = self.settings.clone();
        let window = {
            let event_loop = self.event_loop()?;
            Arc::new(
                WindowBuilder::new()
                    .with_title(settings.title.as_str())
                    .with_inner_size(LogicalSize::new(settings.width, settings.height))
                    .build(event_loop)
                    .map_err(|e| BackendError::Window(format!("Failed to create window: {}", e)))?,
            )
        };
        let renderer = pollster::block_on(SceneRenderer::new(window.clone(), settings.render_config()))?;

        let client = ClientId(self.next_client);
        self.next_client += 1;
        let mut session = WindowSession {
            client,
            window,
            renderer,
            scene: Scene::new(mode),
            locator: AssetLocator::new(),
        };
        session.sync_camera();
        self.session = Some(session);
        self.pump();
        Ok(client)
    }

    fn disconnect(&mut self, client: ClientId) -> BackendResult<()> {
        if self.session.as_ref().is_some_and(|s| s.client == client) {
            self.session = None;
            return Ok(());
        }
        if self.closed == Some(client) {
            self.closed = None;
            return Ok(());
        }
        Err(BackendError::NotConnected(client))
    }

    fn is_connected(&self, client: ClientId) -> bool {
        self.session(client).is_ok()
    }

    fn set_up_axis(&mut self, client: ClientId, up: UpAxis) -> BackendResult<()> {
        let session = self.session_mut(client)?;
        session.scene.up_axis = up;
        session.sync_camera();
        Ok(())
    }

    fn reset_camera(&mut self, client: ClientId, camera: &DebugCamera) -> BackendResult<()> {
        let session = self.session_mut(client)?;
        session.scene.camera = *camera;
        session.sync_camera();
        Ok(())
    }

    fn set_asset_search_paths(&mut self, client: ClientId, paths: &[PathBuf]) -> BackendResult<()> {
        let session = self.session_mut(client)?;
        session.locator.set_search_paths(paths);
        session.scene.search_paths = paths.to_vec();
        Ok(())
    }

    fn load_asset(
        &mut self,
        client: ClientId,
        name: &str,
        position: Point3f,
        scale: f32,
    ) -> BackendResult<ObjectId> {
        let session = self.session_mut(client)?;
        let mesh = rotview_io::load_asset(&session.locator, name, scale)?;
        let pose = Pose::at(position);
        let id = session.scene.add_object(SceneObject {
            asset: name.to_string(),
            scale,
            pose,
        });
        session.renderer.upload(id, &mesh, pose.to_homogeneous());
        tracing::debug!(
            "Uploaded {} for {} ({} vertices, {} faces)",
            name,
            id,
            mesh.vertex_count(),
            mesh.face_count()
        );
        Ok(id)
    }

    fn pose(&self, client: ClientId, object: ObjectId) -> BackendResult<Pose> {
        Ok(self.session(client)?.scene.object(object)?.pose)
    }

    fn reset_pose(&mut self, client: ClientId, object: ObjectId, pose: Pose) -> BackendResult<()> {
        let session = self.session_mut(client)?;
        session.scene.object_mut(object)?.pose = pose;
        session.renderer.set_model(object, pose.to_homogeneous())
    }

    fn remove_all_debug_items(&mut self, client: ClientId) -> BackendResult<()> {
        self.session_mut(client)?.scene.clear_texts();
        Ok(())
    }

    fn add_debug_text(&mut self, client: ClientId, text: &DebugText) -> BackendResult<DebugItemId> {
        let session = self.session_mut(client)?;
        Ok(session.scene.add_text(text.clone(), Instant::now()))
    }

    fn present(&mut self, client: ClientId) -> BackendResult<()> {
        self.session(client)?;
        self.pump();

        let text_scale = self.settings.text_scale;
        let session = self.session_mut(client)?;
        session.scene.prune_texts(Instant::now());
        let labels: Vec<WorldLabel> = session
            .scene
            .texts()
            .iter()
            .map(|t| WorldLabel {
                text: t.text.text.clone(),
                position: t.text.position,
                color: t.text.color,
                size: t.text.size * text_scale,
            })
            .collect();

        session.renderer.render(&labels)?;
        session.scene.frames += 1;
        Ok(())
    }
}
