//! Thin wrappers around the engine's geodesic and goal-direction queries.

use crate::engine::Engine;
use crate::episode::Episode;
use crate::utils::math::{cartesian_to_polar, rotate_by_inverse};
use glam::Vec3;

/// Goal-relative displacement in polar form: geodesic-free straight-line
/// magnitude plus signed heading angle in the agent's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarDisplacement {
    pub distance: f32,
    /// Signed angle in radians, `atan2` convention, 0 straight ahead.
    pub angle: f32,
}

impl PolarDisplacement {
    pub const ZERO: PolarDisplacement = PolarDisplacement {
        distance: 0.0,
        angle: 0.0,
    };
}

/// Shortest-path distance over the navmesh. `f32::INFINITY` when the engine
/// reports the points as mutually unreachable; never silently 0.
pub fn geodesic_distance<E: Engine>(engine: &E, from: Vec3, to: Vec3) -> f32 {
    engine.shortest_path_length(from, to)
}

/// Displacement to the episode goal in the agent's local frame, polar form.
///
/// With no goal configured this is the neutral zero displacement. The world
/// displacement is rotated by the conjugate of the agent's orientation using
/// the expanded `r = (q⁻¹ ⊗ v) ⊗ q` formula, then projected to
/// `(magnitude, signed angle)` with the forward axis at angle 0.
pub fn distance_to_goal<E: Engine>(engine: &E, episode: Option<&Episode>) -> PolarDisplacement {
    let Some(goal) = episode.and_then(|e| e.goal) else {
        return PolarDisplacement::ZERO;
    };
    let state = engine.agent_state();
    let world = Vec3::from_array(goal.position) - state.position;
    let local = rotate_by_inverse(world, state.rotation);
    // Forward is -Z in the agent frame; right is +X.
    let (distance, angle) = cartesian_to_polar(-local.z, local.x);
    PolarDisplacement { distance, angle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::StubEngine;
    use crate::engine::{AgentState, Engine};
    use crate::episode::{Episode, Goal, StartState};
    use glam::{Quat, Vec2};

    fn episode_with_goal(position: [f32; 3]) -> Episode {
        Episode {
            start_state: StartState::default(),
            goal: Some(Goal { position }),
            objects: Vec::new(),
        }
    }

    #[test]
    fn geodesic_distance_to_self_is_zero() {
        let engine = StubEngine::new();
        let p = Vec3::new(2.0, 0.0, -3.0);
        assert_eq!(geodesic_distance(&engine, p, p), 0.0);
    }

    #[test]
    fn unreachable_points_report_infinity() {
        let mut engine = StubEngine::new();
        engine.set_walkable_bounds(Vec2::splat(-1.0), Vec2::splat(1.0));
        let d = geodesic_distance(&engine, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        assert!(d.is_infinite());
    }

    #[test]
    fn no_goal_means_neutral_zero() {
        let engine = StubEngine::new();
        assert_eq!(distance_to_goal(&engine, None), PolarDisplacement::ZERO);
        let episode = Episode {
            start_state: StartState::default(),
            goal: None,
            objects: Vec::new(),
        };
        assert_eq!(
            distance_to_goal(&engine, Some(&episode)),
            PolarDisplacement::ZERO
        );
    }

    #[test]
    fn goal_straight_ahead_has_zero_angle() {
        let engine = StubEngine::new();
        let episode = episode_with_goal([0.0, 0.0, -4.0]);
        let polar = distance_to_goal(&engine, Some(&episode));
        assert!((polar.distance - 4.0).abs() < 1e-5);
        assert!(polar.angle.abs() < 1e-5);
    }

    #[test]
    fn goal_to_the_right_has_positive_quarter_turn() {
        let engine = StubEngine::new();
        let episode = episode_with_goal([3.0, 0.0, 0.0]);
        let polar = distance_to_goal(&engine, Some(&episode));
        assert!((polar.distance - 3.0).abs() < 1e-5);
        assert!((polar.angle - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn agent_rotation_is_folded_into_the_heading() {
        let mut engine = StubEngine::new();
        // Agent faces +X after a -90 degree yaw; a goal at +X is dead ahead.
        engine.set_agent_state(&AgentState::new(
            Vec3::ZERO,
            Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2),
        ));
        let episode = episode_with_goal([5.0, 0.0, 0.0]);
        let polar = distance_to_goal(&engine, Some(&episode));
        assert!((polar.distance - 5.0).abs() < 1e-5);
        assert!(polar.angle.abs() < 1e-4);
    }
}
