//! Scene population from an episode description.
//!
//! `load` is atomic from the caller's perspective: whatever the prior state,
//! it leaves the engine, the registry and the grip bookkeeping describing
//! exactly the requested episode (or an empty scene), with one navmesh
//! recomputation at the end of a populated load. A failed object spawn rolls
//! the scene back to empty before the error propagates, so no partial episode
//! ever survives.

use super::grip::GrabReleaseController;
use super::registry::SceneObjectRegistry;
use super::{InteractionError, InteractionResult};
use crate::engine::{Engine, MotionType, NavMeshSettings};
use crate::episode::Episode;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct EpisodeSceneBuilder {
    /// Contact-proxy handle of the agent body, re-registered on every load.
    agent_handle: String,
    pub navmesh_settings: NavMeshSettings,
}

impl EpisodeSceneBuilder {
    pub fn new(agent_handle: impl Into<String>, navmesh_settings: NavMeshSettings) -> Self {
        Self {
            agent_handle: agent_handle.into(),
            navmesh_settings,
        }
    }

    /// Remove every registered object (and its contact proxy) and clear the
    /// grip. The registry and the engine's object set leave this together.
    pub fn clear_scene<E: Engine>(
        &self,
        engine: &mut E,
        registry: &mut SceneObjectRegistry,
        grip: &mut GrabReleaseController,
    ) {
        let ids: Vec<_> = registry.all().collect();
        for id in ids {
            engine.remove_object(id);
            registry.unregister(engine, id);
        }
        if let Some(held) = grip.force_free() {
            debug!(object = %held, "grip cleared by scene teardown");
        }
    }

    /// Tear down the current scene and populate it from `episode`.
    ///
    /// `None` degenerates to "clear scene": no repopulation, no navmesh
    /// recompute.
    pub fn load<E: Engine>(
        &self,
        engine: &mut E,
        registry: &mut SceneObjectRegistry,
        grip: &mut GrabReleaseController,
        episode: Option<&Episode>,
    ) -> InteractionResult<()> {
        self.clear_scene(engine, registry, grip);

        let Some(episode) = episode else {
            return Ok(());
        };

        engine.set_agent_state(&episode.start_state.to_agent_state());
        engine.add_contact_proxy(&self.agent_handle);

        for spec in &episode.objects {
            let id = engine.add_object(&spec.origin_handle);
            if id.is_none() {
                // No partial episode: put the scene back to empty.
                self.clear_scene(engine, registry, grip);
                return Err(InteractionError::SpawnFailed {
                    handle: spec.origin_handle.clone(),
                });
            }
            engine.set_translation(id, spec.position_vec());
            engine.set_motion_type(id, MotionType::Dynamic);
            registry.register(
                id,
                &spec.origin_handle,
                serde_json::Value::Object(spec.metadata.clone()),
            );
            engine.add_contact_proxy(&spec.origin_handle);
        }

        engine.recompute_navmesh(&self.navmesh_settings);
        info!(objects = episode.objects.len(), "episode scene loaded");
        Ok(())
    }
}
