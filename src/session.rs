//! The interaction session: one explicit context object owning the engine
//! handle, the scene registry, the grip and motion controllers, the loaded
//! episode and the event sink. One discrete action (or none) is processed per
//! logical tick; every transition fully commits or fully aborts before the
//! next tick.

use crate::config::SimConfig;
use crate::engine::{Engine, MotionType, MoveAction, ObjectId};
use crate::episode::Episode;
use crate::events::{EventRecord, EventSink};
use crate::interaction::{
    AgentMotionController, CrosshairTargeting, EpisodeSceneBuilder, GrabOutcome,
    GrabReleaseController, InteractionResult, InventoryReleaseOutcome, PolarDisplacement,
    ReleaseOutcome, SceneObjectRegistry, StepOutcome,
};
use crate::interaction::{spatial, InteractionError};
use glam::Vec3;
use rand::seq::IndexedRandom;
use serde::Serialize;
use serde_json::json;

/// Default physics step, matching a 60 Hz frame.
pub const DEFAULT_SIM_DT: f32 = 1.0 / 60.0;

/// Spawn point for template objects, relative to the agent.
const TEMPLATE_SPAWN_OFFSET: Vec3 = Vec3::new(0.1, 1.5, -1.5);

const EVENT_CATEGORY: &str = "session";

/// What a pin-style grab/release toggle did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractOutcome {
    Grab(GrabOutcome),
    Release(ReleaseOutcome),
}

/// What an inventory-style grab/place toggle did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InventoryOutcome {
    Grab(GrabOutcome),
    Place(InventoryReleaseOutcome),
}

/// Serializable snapshot of one registered object.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStateRecord {
    pub object_id: ObjectId,
    pub origin_handle: String,
    pub translation: [f32; 3],
    /// Quaternion coefficients `[x, y, z, w]`.
    pub rotation: [f32; 4],
    pub motion_type: MotionType,
}

pub struct Session<E: Engine> {
    engine: E,
    config: SimConfig,
    registry: SceneObjectRegistry,
    targeting: CrosshairTargeting,
    grip: GrabReleaseController,
    motion: AgentMotionController,
    builder: EpisodeSceneBuilder,
    events: Box<dyn EventSink>,
    episode: Option<Episode>,
    /// Nearest-object highlight bookkeeping; sentinel when nothing glows.
    highlighted: ObjectId,
    viewport: [u32; 2],
}

impl<E: Engine> Session<E> {
    pub fn new(mut engine: E, config: SimConfig, events: Box<dyn EventSink>) -> Self {
        let viewport = config.viewport();
        let targeting = CrosshairTargeting::new(config.max_target_distance);
        let grip = GrabReleaseController::new(config.navigable_drop_radius);
        let motion = AgentMotionController::new(config.agent_proxy_handle.clone());
        let builder = EpisodeSceneBuilder::new(config.agent_proxy_handle.clone(), config.navmesh);

        engine.add_contact_proxy(&config.agent_proxy_handle);
        if config.recompute_navmesh_on_start {
            engine.recompute_navmesh(&config.navmesh);
        }

        Self {
            engine,
            config,
            registry: SceneObjectRegistry::new(),
            targeting,
            grip,
            motion,
            builder,
            events,
            episode: None,
            highlighted: ObjectId::NONE,
            viewport,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn episode(&self) -> Option<&Episode> {
        self.episode.as_ref()
    }

    pub fn held_object(&self) -> Option<ObjectId> {
        self.grip.held_object()
    }

    pub fn highlighted(&self) -> ObjectId {
        self.highlighted
    }

    pub fn registry(&self) -> &SceneObjectRegistry {
        &self.registry
    }

    // --- Episode lifecycle ---

    /// Replace the scene with `episode` (or clear it with `None`).
    pub fn set_episode(&mut self, episode: Option<Episode>) -> InteractionResult<()> {
        self.highlighted = ObjectId::NONE;
        self.builder
            .load(&mut self.engine, &mut self.registry, &mut self.grip, episode.as_ref())?;
        let payload = json!({
            "objects": episode.as_ref().map_or(0, |e| e.objects.len()),
            "hasGoal": episode.as_ref().is_some_and(|e| e.goal.is_some()),
        });
        self.episode = episode;
        self.refresh_highlight();
        self.events
            .record(EventRecord::new(EVENT_CATEGORY, "setEpisode", payload));
        Ok(())
    }

    /// Reset the engine and put the agent back at the episode start pose.
    /// Grip bookkeeping is dropped; scene objects stay where they are.
    pub fn reset(&mut self) {
        self.engine.reset();
        if let Some(episode) = &self.episode {
            self.engine
                .set_agent_state(&episode.start_state.to_agent_state());
        }
        let _ = self.grip.force_free();
        self.refresh_highlight();
        self.events
            .record(EventRecord::new(EVENT_CATEGORY, "simReset", json!({})));
    }

    // --- Per-tick actions ---

    /// Validate and (if clear) actuate one discrete agent action.
    pub fn step(&mut self, action: MoveAction) -> StepOutcome {
        let outcome = self.motion.step(&mut self.engine, action);
        if outcome == StepOutcome::Committed {
            self.refresh_highlight();
        }
        outcome
    }

    /// Pin-style grab/release toggle on the object under the crosshair.
    pub fn grab_release(&mut self) -> InteractOutcome {
        if self.grip.is_holding() {
            let outcome = self.grip.release(&mut self.engine);
            match outcome {
                ReleaseOutcome::Released { object, position } => {
                    // The object is static scene content now.
                    self.engine.recompute_navmesh(&self.config.navmesh);
                    self.refresh_highlight();
                    self.events.record(EventRecord::new(
                        EVENT_CATEGORY,
                        "release",
                        json!({ "objectId": object, "position": position.to_array() }),
                    ));
                }
                ReleaseOutcome::NotNavigable { position } => {
                    self.events.record(EventRecord::new(
                        EVENT_CATEGORY,
                        "releaseBlocked",
                        json!({ "position": position.to_array() }),
                    ));
                }
                ReleaseOutcome::NothingHeld => {}
            }
            InteractOutcome::Release(outcome)
        } else {
            let target = self.targeting.locate(&self.engine, self.viewport).nearest;
            let outcome = self.grab(target);
            InteractOutcome::Grab(outcome)
        }
    }

    /// Inventory-style toggle: grab the object under the crosshair, or place
    /// the held one at a collision-free spot above the floor hit.
    pub fn inventory_grab_release(&mut self) -> InteractionResult<InventoryOutcome> {
        if self.grip.is_holding() {
            let outcome = self.grip.inventory_release(
                &mut self.engine,
                &mut self.registry,
                &self.targeting,
                self.viewport,
            )?;
            if let InventoryReleaseOutcome::Placed { old, new, position } = outcome {
                self.refresh_highlight();
                self.events.record(EventRecord::new(
                    EVENT_CATEGORY,
                    "inventoryPlace",
                    json!({
                        "oldObjectId": old,
                        "newObjectId": new,
                        "position": position.to_array(),
                    }),
                ));
            }
            Ok(InventoryOutcome::Place(outcome))
        } else {
            let target = self.targeting.locate(&self.engine, self.viewport).nearest;
            Ok(InventoryOutcome::Grab(self.grab(target)))
        }
    }

    fn grab(&mut self, target: ObjectId) -> GrabOutcome {
        let outcome = self.grip.grab(&mut self.engine, target);
        if let GrabOutcome::Grabbed(object) = outcome {
            // The held object must not keep a highlight.
            if self.highlighted.is_some() {
                self.engine.set_object_highlight(self.highlighted, false);
                self.highlighted = ObjectId::NONE;
            }
            self.engine.recompute_navmesh(&self.config.navmesh);
            self.events.record(EventRecord::new(
                EVENT_CATEGORY,
                "grab",
                json!({ "objectId": object }),
            ));
        }
        outcome
    }

    /// Re-resolve the object under the crosshair and move the single
    /// highlight to it. The held object never glows.
    pub fn refresh_highlight(&mut self) {
        let nearest = self.targeting.locate(&self.engine, self.viewport).nearest;
        let held = self.grip.held_object();
        let nearest = if Some(nearest) == held {
            ObjectId::NONE
        } else {
            nearest
        };
        if nearest == self.highlighted {
            return;
        }
        if self.highlighted.is_some() && Some(self.highlighted) != held {
            self.engine.set_object_highlight(self.highlighted, false);
        }
        if nearest.is_some() {
            self.engine.set_object_highlight(nearest, true);
        }
        self.highlighted = nearest;
    }

    // --- Object spawning ---

    /// Instantiate a template object just in front of the agent, register it
    /// and add its contact proxy.
    pub fn spawn_template_object(&mut self, handle: &str) -> InteractionResult<ObjectId> {
        let id = self.engine.add_object(handle);
        if id.is_none() {
            return Err(InteractionError::SpawnFailed {
                handle: handle.to_string(),
            });
        }
        let position = self
            .engine
            .agent_transform()
            .transform_point3(TEMPLATE_SPAWN_OFFSET);
        self.engine.set_translation(id, position);
        self.registry.register(id, handle, serde_json::Value::Null);
        self.engine.add_contact_proxy(handle);
        Ok(id)
    }

    /// Spawn a uniformly random pick from `handles`.
    pub fn spawn_random_template(&mut self, handles: &[&str]) -> InteractionResult<ObjectId> {
        let handle = handles
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or_default();
        self.spawn_template_object(handle)
    }

    // --- Queries ---

    /// Snapshot of every registered object, in registration order.
    pub fn object_states(&self) -> Vec<ObjectStateRecord> {
        self.registry
            .all()
            .filter_map(|id| {
                let entry = self.registry.find(id)?;
                let translation = self.engine.translation(id)?;
                let rotation = self.engine.rotation(id)?;
                let motion_type = self.engine.motion_type(id)?;
                Some(ObjectStateRecord {
                    object_id: id,
                    origin_handle: entry.origin_handle.clone(),
                    translation: translation.to_array(),
                    rotation: rotation.to_array(),
                    motion_type,
                })
            })
            .collect()
    }

    pub fn geodesic_distance(&self, from: Vec3, to: Vec3) -> f32 {
        spatial::geodesic_distance(&self.engine, from, to)
    }

    /// Geodesic distance between two registered objects.
    pub fn distance_between_objects(
        &self,
        from: ObjectId,
        to: ObjectId,
    ) -> InteractionResult<f32> {
        let source = self
            .engine
            .translation(from)
            .ok_or(InteractionError::Unregistered(from))?;
        let destination = self
            .engine
            .translation(to)
            .ok_or(InteractionError::Unregistered(to))?;
        Ok(self.geodesic_distance(source, destination))
    }

    pub fn distance_to_goal(&self) -> PolarDisplacement {
        spatial::distance_to_goal(&self.engine, self.episode.as_ref())
    }

    // --- Simulation and observations ---

    pub fn step_world(&mut self, dt: f32) -> f64 {
        self.engine.step_world(dt)
    }

    pub fn world_time(&self) -> f64 {
        self.engine.world_time()
    }

    /// Fill `out` with one sensor's observation buffer. Opaque to this layer.
    pub fn read_observation(&self, sensor: usize, out: &mut Vec<u8>) {
        self.engine.read_observation(sensor, out);
    }
}
