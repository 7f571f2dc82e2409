//! Crosshair-based object targeting.
//!
//! Turns the viewport center into a world ray via the agent's *current* view
//! transform and asks the engine for the nearest manipulable object along it.
//! Pure query; using a cached agent transform here is how "ghost target"
//! bugs happen, so the transform is re-read on every call.

use crate::engine::{Engine, ObjectId, Ray};
use glam::Vec2;

/// Result of one crosshair query. Ephemeral; recomputed per query.
#[derive(Debug, Clone, Copy)]
pub struct CrosshairHit {
    /// Nearest object along the crosshair ray, or the sentinel.
    pub nearest: ObjectId,
    /// The unprojected world ray.
    pub ray: Ray,
    /// Viewport center the ray was unprojected from.
    pub crosshair: Vec2,
}

#[derive(Debug, Clone, Copy)]
pub struct CrosshairTargeting {
    /// Reach budget for targeting, in world units.
    pub max_distance: f32,
}

impl CrosshairTargeting {
    pub fn new(max_distance: f32) -> Self {
        Self { max_distance }
    }

    /// Viewport center in pixels.
    pub fn crosshair_position(viewport: [u32; 2]) -> Vec2 {
        Vec2::new(viewport[0] as f32 * 0.5, viewport[1] as f32 * 0.5)
    }

    /// Resolve the object under the crosshair. Tolerates an empty scene by
    /// returning a hit with the sentinel id.
    pub fn locate<E: Engine>(&self, engine: &E, viewport: [u32; 2]) -> CrosshairHit {
        let crosshair = Self::crosshair_position(viewport);
        let ray = engine.unproject(crosshair);
        let origin = engine.agent_state().position;
        let nearest = engine.nearest_under_ray(&ray, origin, viewport, self.max_distance);
        CrosshairHit {
            nearest,
            ray,
            crosshair,
        }
    }
}
