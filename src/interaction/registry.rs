//! Authoritative mapping from engine object ids to manipulation metadata.
//!
//! The engine is the source of truth for which objects *exist*; the registry
//! tracks what the interaction layer knows about them: the template handle an
//! object was instantiated from and the episode metadata that came with it.
//! Every other interaction component consumes this map.

use crate::engine::{Engine, ObjectId};
use serde_json::Value;
use tracing::warn;

/// Per-object manipulation metadata.
#[derive(Debug, Clone)]
pub struct RegisteredObject {
    pub id: ObjectId,
    /// Template/asset handle the object was instantiated from. Also names the
    /// object's contact-test proxy.
    pub origin_handle: String,
    /// Arbitrary key/value payload carried by the episode description.
    pub metadata: Value,
}

/// Ordered registry of manipulable scene objects.
///
/// Insertion order is preserved; `all()` walks ids in registration order.
#[derive(Debug, Default)]
pub struct SceneObjectRegistry {
    objects: Vec<RegisteredObject>,
}

impl SceneObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly instantiated object. Registering the sentinel id or an
    /// already-known id is a no-op; the engine decides existence, not us.
    pub fn register(&mut self, id: ObjectId, origin_handle: &str, metadata: Value) {
        if id.is_none() {
            warn!("refusing to register sentinel object id");
            return;
        }
        if self.find(id).is_some() {
            return;
        }
        self.objects.push(RegisteredObject {
            id,
            origin_handle: origin_handle.to_string(),
            metadata,
        });
    }

    /// Drop an object's registry entry and instruct the engine to drop its
    /// contact-test proxy. Leaving the proxy behind would poison every later
    /// placement query, so the two removals are one operation. Unknown ids
    /// are a no-op.
    pub fn unregister<E: Engine>(&mut self, engine: &mut E, id: ObjectId) {
        let Some(index) = self.objects.iter().position(|o| o.id == id) else {
            return;
        };
        let entry = self.objects.remove(index);
        engine.remove_contact_proxy(&entry.origin_handle);
    }

    pub fn find(&self, id: ObjectId) -> Option<&RegisteredObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Registered ids in registration order.
    pub fn all(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.iter().map(|o| o.id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Re-key an entry after a destroy-and-respawn cycle. The old identity is
    /// dead after this; holders of `old` must come back through the registry.
    /// Returns false when `old` was not registered.
    pub fn remap(&mut self, old: ObjectId, new: ObjectId) -> bool {
        if new.is_none() {
            warn!("refusing to remap {old} onto the sentinel id");
            return false;
        }
        match self.objects.iter_mut().find(|o| o.id == old) {
            Some(entry) => {
                entry.id = new;
                true
            }
            None => false,
        }
    }
}
