//! Backend-side scene state

use crate::backend::{ConnectionMode, DebugText};
use crate::camera::{DebugCamera, UpAxis};
use instant::Instant;
use rotview_core::{BackendError, BackendResult, DebugItemId, ObjectId, Pose};
use std::path::PathBuf;

/// An asset placed in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub asset: String,
    pub scale: f32,
    pub pose: Pose,
}

/// Debug text together with the moment it was added
#[derive(Debug, Clone)]
pub struct SceneText {
    pub id: DebugItemId,
    pub text: DebugText,
    pub created: Instant,
}

impl SceneText {
    pub fn is_alive(&self, now: Instant) -> bool {
        self.text.is_alive(now.saturating_duration_since(self.created))
    }
}

/// What one client has built up: camera, objects and debug text
#[derive(Debug, Clone)]
pub struct Scene {
    pub mode: ConnectionMode,
    pub up_axis: UpAxis,
    pub camera: DebugCamera,
    pub search_paths: Vec<PathBuf>,
    /// Frames presented so far
    pub frames: u64,
    objects: Vec<Option<SceneObject>>,
    texts: Vec<SceneText>,
    next_text: u32,
}

impl Scene {
    pub fn new(mode: ConnectionMode) -> Self {
        Self {
            mode,
            up_axis: UpAxis::default(),
            camera: DebugCamera::default(),
            search_paths: Vec::new(),
            frames: 0,
            objects: Vec::new(),
            texts: Vec::new(),
            next_text: 0,
        }
    }

    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(Some(object));
        id
    }

    pub fn object(&self, id: ObjectId) -> BackendResult<&SceneObject> {
        self.objects
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(BackendError::UnknownObject(id))
    }

    pub fn object_mut(&mut self, id: ObjectId) -> BackendResult<&mut SceneObject> {
        self.objects
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(BackendError::UnknownObject(id))
    }

    /// Remove an object; its id is never reused
    pub fn remove_object(&mut self, id: ObjectId) -> BackendResult<SceneObject> {
        self.objects
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .ok_or(BackendError::UnknownObject(id))
    }

    /// Live objects in load order
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.as_ref().map(|o| (ObjectId(i as u32), o)))
    }

    pub fn object_count(&self) -> usize {
        self.objects().count()
    }

    pub fn add_text(&mut self, text: DebugText, now: Instant) -> DebugItemId {
        let id = DebugItemId(self.next_text);
        self.next_text += 1;
        self.texts.push(SceneText {
            id,
            text,
            created: now,
        });
        id
    }

    pub fn clear_texts(&mut self) {
        self.texts.clear();
    }

    /// Drop texts whose lifetime has run out
    pub fn prune_texts(&mut self, now: Instant) {
        self.texts.retain(|t| t.is_alive(now));
    }

    pub fn texts(&self) -> &[SceneText] {
        &self.texts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotview_core::Point3f;
    use std::time::Duration;

    fn object(x: f32) -> SceneObject {
        SceneObject {
            asset: "builtin:box".to_string(),
            scale: 1.0,
            pose: Pose::at(Point3f::new(x, 0.0, 0.0)),
        }
    }

    #[test]
    fn removed_objects_keep_other_ids_valid() {
        let mut scene = Scene::new(ConnectionMode::Direct);
        let a = scene.add_object(object(1.0));
        let b = scene.add_object(object(2.0));

        scene.remove_object(a).unwrap();
        assert!(matches!(scene.object(a), Err(BackendError::UnknownObject(id)) if id == a));
        assert_eq!(scene.object(b).unwrap().pose.position.x, 2.0);
        assert_eq!(scene.object_count(), 1);

        let c = scene.add_object(object(3.0));
        assert_ne!(c, a);
    }

    #[test]
    fn pruning_keeps_persistent_text() {
        let mut scene = Scene::new(ConnectionMode::Direct);
        let start = Instant::now();
        scene.add_text(DebugText::new("keep"), start);
        scene.add_text(
            DebugText::new("fade").lifetime(Duration::from_millis(100)),
            start,
        );

        scene.prune_texts(start + Duration::from_millis(50));
        assert_eq!(scene.texts().len(), 2);

        scene.prune_texts(start + Duration::from_millis(150));
        let remaining: Vec<&str> = scene.texts().iter().map(|t| t.text.text.as_str()).collect();
        assert_eq!(remaining, vec!["keep"]);
    }

    #[test]
    fn text_ids_increase() {
        let mut scene = Scene::new(ConnectionMode::Gui);
        let now = Instant::now();
        let first = scene.add_text(DebugText::new("a"), now);
        scene.clear_texts();
        let second = scene.add_text(DebugText::new("b"), now);
        assert!(second.0 > first.0);
        assert_eq!(scene.texts().len(), 1);
    }
}
