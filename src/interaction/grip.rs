//! Grab/release state machine.
//!
//! An object is either free or held, never anything in between across a tick
//! boundary. Grabbing pins the object to the agent through a fixed grip
//! offset and flips it to kinematic; releasing validates the candidate drop
//! pose *before* any engine write, so a rejected release leaves both the grip
//! and the object exactly as they were.
//!
//! The inventory-style release is the destroy-and-respawn variant: the held
//! instance is replaced by a freshly minted one at a collision-free point
//! above the floor hit, and the registry re-keys the old identity onto the
//! new id. Holders of the old id must come back through the registry.

use super::registry::SceneObjectRegistry;
use super::targeting::CrosshairTargeting;
use super::{InteractionError, InteractionResult};
use crate::engine::{Engine, MotionType, ObjectId};
use glam::{Affine3A, Vec3};
use tracing::{debug, info};

/// Height increment between placement probes.
pub const PLACEMENT_PROBE_STEP: f32 = 0.25;
/// Cap on placement probes; exceeding it is a reported failure, never a spin.
pub const MAX_PLACEMENT_PROBES: u32 = 16;
/// Default radius for the release navigability check.
pub const NAVIGABLE_DROP_RADIUS: f32 = 0.5;

/// Whether an object is currently held, and the bookkeeping that only exists
/// while it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GripState {
    Free,
    Held {
        object: ObjectId,
        /// Held object's pose relative to the agent, fixed at grab time.
        offset: Affine3A,
        /// World pose of the object at the instant of grab; feeds the
        /// drop-height heuristic of the inventory release.
        pose_at_grab: Affine3A,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabOutcome {
    Grabbed(ObjectId),
    /// Already holding something; the call is ignored.
    AlreadyHolding,
    /// No eligible target under the crosshair.
    NoTarget,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseOutcome {
    Released { object: ObjectId, position: Vec3 },
    /// Candidate drop point failed the navigability check; still holding,
    /// nothing mutated.
    NotNavigable { position: Vec3 },
    NothingHeld,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InventoryReleaseOutcome {
    Placed {
        old: ObjectId,
        new: ObjectId,
        position: Vec3,
    },
    /// Crosshair ray never hit the floor.
    NoFloorHit,
    /// No collision-free pose within [`MAX_PLACEMENT_PROBES`] height steps.
    PlacementExhausted,
    NothingHeld,
}

#[derive(Debug)]
pub struct GrabReleaseController {
    state: GripState,
    pub navigable_radius: f32,
    pub max_placement_probes: u32,
}

impl GrabReleaseController {
    pub fn new(navigable_radius: f32) -> Self {
        Self {
            state: GripState::Free,
            navigable_radius,
            max_placement_probes: MAX_PLACEMENT_PROBES,
        }
    }

    pub fn state(&self) -> GripState {
        self.state
    }

    pub fn held_object(&self) -> Option<ObjectId> {
        match self.state {
            GripState::Held { object, .. } => Some(object),
            GripState::Free => None,
        }
    }

    pub fn is_holding(&self) -> bool {
        self.held_object().is_some()
    }

    /// Drop the grip bookkeeping without touching the engine. Used when the
    /// scene underneath is being torn down (episode reload, sim reset).
    pub fn force_free(&mut self) -> Option<ObjectId> {
        let held = self.held_object();
        self.state = GripState::Free;
        held
    }

    /// `Free --grab(target)--> Held`.
    ///
    /// Computes the grip offset from the current agent transform and flips
    /// the target to kinematic so it rides with the agent instead of being
    /// simulated. Ignored while already holding; no target is a no-op.
    pub fn grab<E: Engine>(&mut self, engine: &mut E, target: ObjectId) -> GrabOutcome {
        if self.is_holding() {
            return GrabOutcome::AlreadyHolding;
        }
        if target.is_none() {
            return GrabOutcome::NoTarget;
        }
        let Some(pose) = engine.transform(target) else {
            // Target vanished between the crosshair query and the grab.
            return GrabOutcome::NoTarget;
        };
        let offset = engine.agent_transform().inverse() * pose;
        engine.set_motion_type(target, MotionType::Kinematic);
        self.state = GripState::Held {
            object: target,
            offset,
            pose_at_grab: pose,
        };
        info!(object = %target, "grabbed object");
        GrabOutcome::Grabbed(target)
    }

    /// `Held --release()--> Free`, pin-style.
    ///
    /// The candidate pose is `agent_transform * grip_offset`. Its position is
    /// validated against the navmesh first; the transform write and the
    /// static motion-type write only happen once the check passes, as one
    /// gated step.
    pub fn release<E: Engine>(&mut self, engine: &mut E) -> ReleaseOutcome {
        let GripState::Held { object, offset, .. } = self.state else {
            return ReleaseOutcome::NothingHeld;
        };
        let candidate = engine.agent_transform() * offset;
        let position: Vec3 = candidate.translation.into();
        if !engine.is_navigable(position, self.navigable_radius) {
            debug!(object = %object, ?position, "release blocked: drop point not navigable");
            return ReleaseOutcome::NotNavigable { position };
        }
        engine.set_transform(object, candidate);
        engine.set_motion_type(object, MotionType::Static);
        self.state = GripState::Free;
        info!(object = %object, ?position, "released object");
        ReleaseOutcome::Released { object, position }
    }

    /// Inventory-style release: place a *new* instance of the held object's
    /// template at a collision-free point above the floor under the
    /// crosshair, then retire the held instance and remap its registry entry.
    pub fn inventory_release<E: Engine>(
        &mut self,
        engine: &mut E,
        registry: &mut SceneObjectRegistry,
        targeting: &CrosshairTargeting,
        viewport: [u32; 2],
    ) -> InteractionResult<InventoryReleaseOutcome> {
        let GripState::Held {
            object,
            pose_at_grab,
            ..
        } = self.state
        else {
            return Ok(InventoryReleaseOutcome::NothingHeld);
        };

        let crosshair = CrosshairTargeting::crosshair_position(viewport);
        let ray = engine.unproject(crosshair);
        let Some(floor) = engine.floor_under_ray(&ray, targeting.max_distance) else {
            return Ok(InventoryReleaseOutcome::NoFloorHit);
        };

        let handle = registry
            .find(object)
            .ok_or(InteractionError::Unregistered(object))?
            .origin_handle
            .clone();

        // Keep the object at least as high as it was when grabbed, so a
        // crosshair pointed at the ground does not bury it.
        let grab_height = pose_at_grab.translation.y;
        let mut candidate = Vec3::new(floor.x, floor.y.max(grab_height), floor.z);

        let mut probes = 0;
        while engine.pre_contact_test(&handle, candidate) {
            probes += 1;
            if probes > self.max_placement_probes {
                debug!(
                    object = %object,
                    probes,
                    "placement search exhausted, keeping hold"
                );
                return Ok(InventoryReleaseOutcome::PlacementExhausted);
            }
            candidate.y += PLACEMENT_PROBE_STEP;
        }

        let new = engine.add_object(&handle);
        if new.is_none() {
            return Err(InteractionError::SpawnFailed { handle });
        }
        engine.set_translation(new, candidate);
        engine.set_motion_type(new, MotionType::Dynamic);
        engine.remove_object(object);
        registry.remap(object, new);
        self.state = GripState::Free;
        info!(old = %object, new = %new, ?candidate, "placed held object");
        Ok(InventoryReleaseOutcome::Placed {
            old: object,
            new,
            position: candidate,
        })
    }
}

impl Default for GrabReleaseController {
    fn default() -> Self {
        Self::new(NAVIGABLE_DROP_RADIUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::StubEngine;
    use crate::engine::MoveAction;
    use glam::Vec2;
    use serde_json::Value;

    fn engine_with_cube() -> (StubEngine, ObjectId) {
        let mut engine = StubEngine::new();
        let id = engine.add_object("cube");
        engine.set_translation(id, Vec3::new(0.0, 1.5, -1.0));
        (engine, id)
    }

    #[test]
    fn grab_fixes_the_grip_offset_and_pins_kinematic() {
        let (mut engine, id) = engine_with_cube();
        let mut grip = GrabReleaseController::default();

        assert_eq!(grip.grab(&mut engine, id), GrabOutcome::Grabbed(id));
        assert_eq!(engine.motion_type(id), Some(MotionType::Kinematic));
        let GripState::Held { offset, .. } = grip.state() else {
            panic!("should be held");
        };
        let expected = engine.agent_transform().inverse() * engine.transform(id).unwrap();
        assert!(offset
            .translation
            .abs_diff_eq(expected.translation, 1e-6));
    }

    #[test]
    fn grab_while_holding_and_grab_nothing_are_no_ops() {
        let (mut engine, id) = engine_with_cube();
        let mut grip = GrabReleaseController::default();

        assert_eq!(grip.grab(&mut engine, ObjectId::NONE), GrabOutcome::NoTarget);
        grip.grab(&mut engine, id);
        assert_eq!(grip.grab(&mut engine, id), GrabOutcome::AlreadyHolding);
        assert_eq!(grip.held_object(), Some(id));
    }

    #[test]
    fn release_commits_agent_times_offset_and_goes_static() {
        let (mut engine, id) = engine_with_cube();
        let mut grip = GrabReleaseController::default();
        grip.grab(&mut engine, id);

        // Carry the object somewhere else before letting go.
        engine.act(MoveAction::MoveForward);
        engine.act(MoveAction::MoveForward);
        let expected = engine.agent_transform()
            * match grip.state() {
                GripState::Held { offset, .. } => offset,
                GripState::Free => panic!("should be held"),
            };

        let outcome = grip.release(&mut engine);
        let ReleaseOutcome::Released { object, position } = outcome else {
            panic!("expected release, got {outcome:?}");
        };
        assert_eq!(object, id);
        assert!(Vec3::from(expected.translation).abs_diff_eq(position, 1e-6));
        assert!(engine
            .transform(id)
            .unwrap()
            .translation
            .abs_diff_eq(expected.translation, 1e-6));
        assert_eq!(engine.motion_type(id), Some(MotionType::Static));
        assert_eq!(grip.state(), GripState::Free);
    }

    #[test]
    fn blocked_release_mutates_nothing() {
        let (mut engine, id) = engine_with_cube();
        let mut grip = GrabReleaseController::default();
        grip.grab(&mut engine, id);
        let pose_before = engine.transform(id).unwrap();

        // Nothing is navigable anymore.
        engine.set_walkable_bounds(Vec2::splat(50.0), Vec2::splat(51.0));
        let outcome = grip.release(&mut engine);
        assert!(matches!(outcome, ReleaseOutcome::NotNavigable { .. }));
        assert_eq!(grip.held_object(), Some(id));
        assert_eq!(engine.motion_type(id), Some(MotionType::Kinematic));
        assert!(engine
            .transform(id)
            .unwrap()
            .translation
            .abs_diff_eq(pose_before.translation, 1e-6));
    }

    #[test]
    fn release_with_nothing_held_is_a_no_op() {
        let mut engine = StubEngine::new();
        let mut grip = GrabReleaseController::default();
        assert_eq!(grip.release(&mut engine), ReleaseOutcome::NothingHeld);
    }

    fn held_setup() -> (StubEngine, SceneObjectRegistry, GrabReleaseController, ObjectId) {
        let (mut engine, id) = engine_with_cube();
        let mut registry = SceneObjectRegistry::new();
        engine.add_contact_proxy("cube");
        registry.register(id, "cube", Value::Null);
        let mut grip = GrabReleaseController::default();
        grip.grab(&mut engine, id);
        // Aim the crosshair at the floor.
        for _ in 0..4 {
            engine.act(MoveAction::LookDown);
        }
        (engine, registry, grip, id)
    }

    #[test]
    fn inventory_release_mints_a_new_identity() {
        let (mut engine, mut registry, mut grip, old) = held_setup();
        let targeting = CrosshairTargeting::new(1.5);

        let outcome = grip
            .inventory_release(&mut engine, &mut registry, &targeting, [640, 480])
            .unwrap();
        let InventoryReleaseOutcome::Placed { old: reported, new, position } = outcome else {
            panic!("expected placement, got {outcome:?}");
        };
        assert_eq!(reported, old);
        assert_ne!(new, old);
        // Old instance retired, replacement live and dynamic.
        assert!(engine.transform(old).is_none());
        assert_eq!(engine.motion_type(new), Some(MotionType::Dynamic));
        assert!(engine.translation(new).unwrap().abs_diff_eq(position, 1e-6));
        // Drop-height heuristic: never below the pose at grab time.
        assert!(position.y >= 1.5 - 1e-6);
        // Registry went through the remap.
        assert!(registry.find(old).is_none());
        assert_eq!(registry.find(new).unwrap().origin_handle, "cube");
        assert_eq!(grip.state(), GripState::Free);
    }

    #[test]
    fn placement_search_is_bounded() {
        let (mut engine, mut registry, mut grip, old) = held_setup();
        let targeting = CrosshairTargeting::new(1.5);
        // A blocker tall enough to defeat every probe.
        engine.block_sphere(Vec3::new(0.0, 0.0, -2.6), 1000.0);

        let objects_before = engine.existing_objects();
        let outcome = grip
            .inventory_release(&mut engine, &mut registry, &targeting, [640, 480])
            .unwrap();
        assert_eq!(outcome, InventoryReleaseOutcome::PlacementExhausted);
        assert_eq!(grip.held_object(), Some(old));
        assert_eq!(engine.existing_objects(), objects_before);
    }

    #[test]
    fn inventory_release_without_floor_hit_keeps_holding() {
        let (mut engine, id) = engine_with_cube();
        let mut registry = SceneObjectRegistry::new();
        registry.register(id, "cube", Value::Null);
        let mut grip = GrabReleaseController::default();
        grip.grab(&mut engine, id);
        // Crosshair level with the horizon: no floor intersection.
        let targeting = CrosshairTargeting::new(1.5);
        let outcome = grip
            .inventory_release(&mut engine, &mut registry, &targeting, [640, 480])
            .unwrap();
        assert_eq!(outcome, InventoryReleaseOutcome::NoFloorHit);
        assert_eq!(grip.held_object(), Some(id));
    }

    #[test]
    fn spawn_failure_is_a_distinguished_error() {
        let (mut engine, mut registry, mut grip, old) = held_setup();
        let targeting = CrosshairTargeting::new(1.5);
        engine.fail_next_spawn();

        let err = grip
            .inventory_release(&mut engine, &mut registry, &targeting, [640, 480])
            .unwrap_err();
        assert!(matches!(err, InteractionError::SpawnFailed { .. }));
        // Still holding; the original instance is untouched.
        assert_eq!(grip.held_object(), Some(old));
        assert!(engine.transform(old).is_some());
        assert!(registry.find(old).is_some());
    }
}
