//! Rotation viewer implementation
//!
//! A [`RotationViewer`] places `slot_count` copies of an asset side by side
//! and turns quaternions into their orientations, either live through
//! [`RotationViewer::update_all`] or paced from recorded sequences through
//! [`RotationViewer::replay_offline`].

use crate::backend::{ConnectionMode, DebugText, VisualBackend};
use crate::config::ViewerConfig;
use instant::Instant;
use rotview_core::{BackendError, ClientId, DebugItemId, Error, ObjectId, Point3f, Quat, Reorder, Result};
use std::ops::{Deref, DerefMut};
use std::time::Duration;

/// Outcome of an offline replay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayReport {
    /// Frames presented
    pub frames: usize,
    /// Frames whose update took longer than the frame budget
    pub overruns: usize,
    /// Wall time from the first update to the end of the last frame
    pub elapsed: Duration,
}

struct Connection {
    client: ClientId,
    slots: Vec<ObjectId>,
}

/// Shows quaternions as orientations of objects in a visual backend
pub struct RotationViewer<B: VisualBackend> {
    backend: B,
    config: ViewerConfig,
    reorder: Reorder,
    connection: Option<Connection>,
}

impl<B: VisualBackend> RotationViewer<B> {
    /// Create a disconnected viewer
    pub fn new(backend: B, config: ViewerConfig) -> Result<Self> {
        config.validate()?;
        let reorder = config.axis_order.reorder_fn();
        Ok(Self {
            backend,
            config,
            reorder,
            connection: None,
        })
    }

    /// Create a viewer from a slot layout, parsing the axis order by name
    pub fn with_layout(backend: B, slot_count: usize, overlap: bool, axis_order: &str) -> Result<Self> {
        let config = ViewerConfig::new(slot_count, overlap, axis_order.parse()?);
        Self::new(backend, config)
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn slot_count(&self) -> usize {
        self.config.slot_count
    }

    /// Where each slot is placed on connect
    pub fn slot_positions(&self) -> Vec<Point3f> {
        self.config.slot_positions()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Client id of the live connection, if any
    pub fn client(&self) -> Option<ClientId> {
        self.live_client().ok()
    }

    /// Whether a connection exists and the backend still reports it alive
    pub fn is_connected(&self) -> bool {
        self.live_client().is_ok()
    }

    /// Open a GUI connection and place the slots
    pub fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }
        // Release a connection the backend already dropped.
        self.disconnect()?;

        let client = self.backend.connect(ConnectionMode::Gui)?;
        match self.build_scene(client) {
            Ok(slots) => {
                tracing::info!(
                    "Connected as {} with {} slot(s)",
                    client,
                    slots.len()
                );
                self.connection = Some(Connection { client, slots });
                Ok(())
            }
            Err(e) => {
                if let Err(close) = self.backend.disconnect(client) {
                    tracing::warn!("Failed to close half-built connection {}: {}", client, close);
                }
                Err(e)
            }
        }
    }

    fn build_scene(&mut self, client: ClientId) -> Result<Vec<ObjectId>> {
        self.backend.set_up_axis(client, self.config.up_axis)?;
        self.backend.reset_camera(client, &self.config.camera)?;
        self.backend
            .set_asset_search_paths(client, &self.config.asset_paths)?;

        let mut slots = Vec::with_capacity(self.config.slot_count);
        for (index, position) in self.config.slot_positions().into_iter().enumerate() {
            let object = self.backend.load_asset(
                client,
                &self.config.asset,
                position,
                self.config.asset_scale,
            )?;
            tracing::debug!("Slot {} is {} at {:?}", index, object, position);
            slots.push(object);
        }
        Ok(slots)
    }

    /// Close the connection if one is open.
    ///
    /// The backend is told even when it already reports the client gone, so
    /// it can release whatever it still holds for it.
    pub fn disconnect(&mut self) -> Result<()> {
        let Some(connection) = self.connection.take() else {
            return Ok(());
        };
        match self.backend.disconnect(connection.client) {
            Ok(()) => tracing::info!("Disconnected {}", connection.client),
            Err(BackendError::NotConnected(_)) => {
                tracing::debug!("{} was already closed by the backend", connection.client)
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Connect and return a guard that disconnects when dropped
    pub fn session(&mut self) -> Result<ViewerSession<'_, B>> {
        self.connect()?;
        Ok(ViewerSession { viewer: self })
    }

    /// Run `f` inside a session; the viewer is disconnected afterwards
    /// whether `f` succeeds or not
    pub fn with_session<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let mut session = self.session()?;
        let result = f(&mut *session);
        let closed = session.close();
        let value = result?;
        closed?;
        Ok(value)
    }

    /// Set the orientation of one slot and present a frame
    pub fn update_one(&mut self, quaternion: Quat, index: usize) -> Result<()> {
        let client = self.live_client()?;
        let object = self.slot(index)?;
        self.apply(client, object, quaternion)?;
        self.backend.present(client)?;
        Ok(())
    }

    /// Set every slot's orientation, in slot order, and present one frame.
    ///
    /// Not atomic: if the backend fails on slot `k`, slots before `k` keep
    /// their new orientation.
    pub fn update_all(&mut self, quaternions: &[Quat]) -> Result<()> {
        if quaternions.len() != self.config.slot_count {
            return Err(Error::ArityMismatch {
                expected: self.config.slot_count,
                found: quaternions.len(),
            });
        }
        let client = self.live_client()?;
        for (index, quaternion) in quaternions.iter().enumerate() {
            let object = self.slot(index)?;
            self.apply(client, object, *quaternion)?;
        }
        self.backend.present(client)?;
        Ok(())
    }

    /// Play one sequence per slot at `fps` frames per second.
    ///
    /// Connects for the duration of the replay when disconnected and leaves
    /// an existing connection open. Pacing is best effort: a slow frame
    /// delays every later frame, nothing is skipped.
    pub fn replay_offline<S: AsRef<[Quat]>>(&mut self, sequences: &[S], fps: f32) -> Result<ReplayReport> {
        if sequences.len() != self.config.slot_count {
            return Err(Error::ArityMismatch {
                expected: self.config.slot_count,
                found: sequences.len(),
            });
        }
        let steps = sequences.first().map_or(0, |s| s.as_ref().len());
        for (slot, sequence) in sequences.iter().enumerate() {
            let found = sequence.as_ref().len();
            if found != steps {
                return Err(Error::LengthMismatch {
                    slot,
                    expected: steps,
                    found,
                });
            }
        }
        let budget = frame_budget(fps)?;

        let temporary = !self.is_connected();
        if temporary {
            self.connect()?;
        }
        let played = self.play(sequences, steps, budget);
        if !temporary {
            return played;
        }
        let closed = self.disconnect();
        let report = played?;
        closed?;
        Ok(report)
    }

    fn play<S: AsRef<[Quat]>>(&mut self, sequences: &[S], steps: usize, budget: Duration) -> Result<ReplayReport> {
        let started = Instant::now();
        let mut frame = Vec::with_capacity(sequences.len());
        let mut overruns = 0;

        for step in 0..steps {
            let frame_start = Instant::now();
            frame.clear();
            frame.extend(sequences.iter().map(|s| s.as_ref()[step]));
            self.update_all(&frame)?;

            let spent = frame_start.elapsed();
            match budget.checked_sub(spent) {
                Some(rest) => std::thread::sleep(rest),
                None => {
                    overruns += 1;
                    tracing::debug!(
                        "Frame {} took {:?}, over the {:?} budget",
                        step,
                        spent,
                        budget
                    );
                }
            }
        }

        let report = ReplayReport {
            frames: steps,
            overruns,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            "Replayed {} frame(s) in {:?} ({} overrun)",
            report.frames,
            report.elapsed,
            report.overruns
        );
        Ok(report)
    }

    /// Replace all debug items with a single text
    pub fn show_text(&mut self, text: DebugText) -> Result<DebugItemId> {
        let client = self.live_client()?;
        self.backend.remove_all_debug_items(client)?;
        let id = self.backend.add_debug_text(client, &text)?;
        self.backend.present(client)?;
        Ok(id)
    }

    fn live_client(&self) -> Result<ClientId> {
        match &self.connection {
            Some(c) if self.backend.is_connected(c.client) => Ok(c.client),
            _ => Err(Error::NotConnected),
        }
    }

    fn slot(&self, index: usize) -> Result<ObjectId> {
        self.connection
            .as_ref()
            .and_then(|c| c.slots.get(index).copied())
            .ok_or(Error::IndexOutOfRange {
                index,
                slot_count: self.config.slot_count,
            })
    }

    fn apply(&mut self, client: ClientId, object: ObjectId, quaternion: Quat) -> Result<()> {
        let orientation = (self.reorder)(quaternion);
        let pose = self.backend.pose(client, object)?;
        self.backend
            .reset_pose(client, object, pose.with_orientation(orientation))?;
        Ok(())
    }
}

impl<B: VisualBackend> Drop for RotationViewer<B> {
    fn drop(&mut self) {
        if let Err(e) = self.disconnect() {
            tracing::warn!("Failed to disconnect viewer on drop: {}", e);
        }
    }
}

fn frame_budget(fps: f32) -> Result<Duration> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(Error::InvalidConfiguration(format!(
            "fps must be finite and positive, got {}",
            fps
        )));
    }
    Duration::try_from_secs_f64(1.0 / f64::from(fps))
        .map_err(|e| Error::InvalidConfiguration(format!("fps {} is out of range: {}", fps, e)))
}

/// A connected viewer that disconnects when dropped
pub struct ViewerSession<'a, B: VisualBackend> {
    viewer: &'a mut RotationViewer<B>,
}

impl<B: VisualBackend> ViewerSession<'_, B> {
    /// Disconnect now and report failures instead of logging them
    pub fn close(self) -> Result<()> {
        self.viewer.disconnect()
    }
}

impl<B: VisualBackend> Deref for ViewerSession<'_, B> {
    type Target = RotationViewer<B>;

    fn deref(&self) -> &Self::Target {
        self.viewer
    }
}

impl<B: VisualBackend> DerefMut for ViewerSession<'_, B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.viewer
    }
}

impl<B: VisualBackend> Drop for ViewerSession<'_, B> {
    fn drop(&mut self) {
        if let Err(e) = self.viewer.disconnect() {
            tracing::warn!("Failed to disconnect viewer session: {}", e);
        }
    }
}
