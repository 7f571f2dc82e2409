//! Navmesh- and collision-validated agent stepping.
//!
//! Two-phase protocol: resolve the discrete action into a candidate
//! displacement, validate it against the navmesh filter and a contact probe,
//! and only then let the engine actuate. The engine never executes an action
//! whose destination already failed validation.

use crate::engine::{Engine, MoveAction};
use glam::Vec3;
use tracing::debug;

/// Translation magnitude of one discrete step, in world units.
pub const STEP_SIZE: f32 = 0.25;
/// Vertical lift applied to the probe point; compensates for seam artifacts
/// where the navmesh sits fractionally below the floor geometry.
pub const NAV_SEAM_LIFT: Vec3 = Vec3::new(0.0, 0.05, 0.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Validation passed (or was not needed) and the engine actuated.
    Committed,
    /// The candidate destination collided; agent pose unchanged.
    Rejected,
}

#[derive(Debug, Clone)]
pub struct AgentMotionController {
    /// Contact-proxy handle of the agent body.
    agent_handle: String,
    pub step_size: f32,
}

impl AgentMotionController {
    pub fn new(agent_handle: impl Into<String>) -> Self {
        Self {
            agent_handle: agent_handle.into(),
            step_size: STEP_SIZE,
        }
    }

    pub fn agent_handle(&self) -> &str {
        &self.agent_handle
    }

    /// Resolve and, if valid, commit one discrete action.
    ///
    /// Rotation-only actions cannot collide in this model and pass straight
    /// through. Translational actions walk the validate-then-commit path.
    pub fn step<E: Engine>(&self, engine: &mut E, action: MoveAction) -> StepOutcome {
        if !action.is_translation() {
            engine.act(action);
            return StepOutcome::Committed;
        }

        let transform = engine.agent_transform();
        let position: Vec3 = transform.translation.into();
        // The agent faces -Z in its local frame.
        let backward = transform.transform_vector3(Vec3::Z);
        let sign = match action {
            MoveAction::MoveForward => -1.0,
            _ => 1.0,
        };
        let raw_candidate = position + backward * (sign * self.step_size);

        // Let the navmesh clip the straight-line step, then fold the clip
        // back in as a correction on the raw candidate.
        let filtered = engine.try_step(position, raw_candidate);
        let correction = filtered - raw_candidate;
        let final_candidate = raw_candidate + correction + NAV_SEAM_LIFT;

        if engine.pre_contact_test(&self.agent_handle, final_candidate) {
            debug!(%action, ?final_candidate, "step rejected: destination collides");
            return StepOutcome::Rejected;
        }
        engine.act(action);
        StepOutcome::Committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::StubEngine;

    #[test]
    fn two_forward_steps_cover_half_a_unit() {
        let mut engine = StubEngine::new();
        let motion = AgentMotionController::new("agent_body");
        let start = engine.agent_state().position;
        assert_eq!(motion.step(&mut engine, MoveAction::MoveForward), StepOutcome::Committed);
        assert_eq!(motion.step(&mut engine, MoveAction::MoveForward), StepOutcome::Committed);
        let moved = engine.agent_state().position - start;
        assert!((moved.length() - 0.5).abs() < 1e-5);
        assert!(moved.abs_diff_eq(Vec3::new(0.0, 0.0, -0.5), 1e-5));
    }

    #[test]
    fn backward_step_inverts_the_direction() {
        let mut engine = StubEngine::new();
        let motion = AgentMotionController::new("agent_body");
        motion.step(&mut engine, MoveAction::MoveBackward);
        assert!(engine
            .agent_state()
            .position
            .abs_diff_eq(Vec3::new(0.0, 0.0, 0.25), 1e-5));
    }

    #[test]
    fn colliding_destination_rejects_without_actuating() {
        let mut engine = StubEngine::new();
        let motion = AgentMotionController::new("agent_body");
        // Blocker straddling the one-step-forward point (plus seam lift).
        engine.block_sphere(Vec3::new(0.0, 0.05, -0.25), 0.1);
        let before = engine.agent_state().position;
        assert_eq!(motion.step(&mut engine, MoveAction::MoveForward), StepOutcome::Rejected);
        assert_eq!(engine.agent_state().position, before);
    }

    #[test]
    fn rotations_always_pass_through() {
        let mut engine = StubEngine::new();
        let motion = AgentMotionController::new("agent_body");
        // Even with everything blocked, turning is fine.
        engine.block_sphere(Vec3::ZERO, 1000.0);
        assert_eq!(motion.step(&mut engine, MoveAction::TurnLeft), StepOutcome::Committed);
        assert_eq!(motion.step(&mut engine, MoveAction::LookUp), StepOutcome::Committed);
    }

    #[test]
    fn navmesh_clip_is_folded_into_the_probe() {
        let mut engine = StubEngine::new();
        use glam::Vec2;
        // Walkable area ends right at the agent; the filtered point clamps
        // back to z >= -0.1, so the probe lands there, where a blocker sits.
        engine.set_walkable_bounds(Vec2::new(-10.0, -0.1), Vec2::new(10.0, 10.0));
        engine.block_sphere(Vec3::new(0.0, 0.05, -0.1), 0.05);
        let motion = AgentMotionController::new("agent_body");
        assert_eq!(motion.step(&mut engine, MoveAction::MoveForward), StepOutcome::Rejected);
    }
}
