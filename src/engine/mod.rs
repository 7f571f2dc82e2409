//! Narrow interface to the physics/navmesh engine.
//!
//! The interaction layer never talks to a concrete engine binding. It depends
//! on the [`Engine`] trait, which captures exactly the capability set the
//! controller needs: object lifecycle, motion types, transforms, contact-test
//! proxies, navmesh queries, ray targeting and agent actuation. Anything that
//! implements this trait (a real rigid-body backend or the in-memory
//! [`testing::StubEngine`]) can sit behind the controller.

pub mod testing;
pub mod types;

pub use types::{AgentState, MotionType, MoveAction, NavMeshSettings, ObjectId, Ray};

use glam::{Affine3A, Quat, Vec2, Vec3};

/// Capability set consumed from the physics/navmesh engine.
///
/// All calls are synchronous and are issued from the single thread that owns
/// the controller state. Queries taking an [`ObjectId`] return `None` when the
/// object does not exist; mutations on missing ids are engine no-ops.
pub trait Engine {
    // --- Object lifecycle ---

    /// Instantiate an object from a template handle. Returns
    /// [`ObjectId::NONE`] when the engine could not create the object.
    fn add_object(&mut self, handle: &str) -> ObjectId;

    fn remove_object(&mut self, id: ObjectId);

    /// Ids of every instanced object, in creation order.
    fn existing_objects(&self) -> Vec<ObjectId>;

    // --- Motion types and transforms ---

    fn motion_type(&self, id: ObjectId) -> Option<MotionType>;

    fn set_motion_type(&mut self, id: ObjectId, motion: MotionType);

    fn transform(&self, id: ObjectId) -> Option<Affine3A>;

    fn set_transform(&mut self, id: ObjectId, transform: Affine3A);

    fn translation(&self, id: ObjectId) -> Option<Vec3>;

    fn set_translation(&mut self, id: ObjectId, translation: Vec3);

    fn rotation(&self, id: ObjectId) -> Option<Quat>;

    // --- Simulation ---

    /// Step the physical world forward, returning the world time afterwards.
    fn step_world(&mut self, dt: f32) -> f64;

    fn world_time(&self) -> f64;

    /// Engine-side reset (world time, internal caches). Does not touch the
    /// controller's registry or grip bookkeeping.
    fn reset(&mut self);

    // --- Agent ---

    fn agent_state(&self) -> AgentState;

    fn set_agent_state(&mut self, state: &AgentState);

    fn agent_transform(&self) -> Affine3A {
        self.agent_state().transform()
    }

    /// Actuate a discrete action using the engine's own move/turn logic.
    /// Callers validate translational actions first; the engine applies the
    /// action unconditionally.
    fn act(&mut self, action: MoveAction);

    // --- Contact-test proxies ---

    /// Register a lightweight collision shape for `handle`, used purely for
    /// discrete contact queries.
    fn add_contact_proxy(&mut self, handle: &str);

    fn remove_contact_proxy(&mut self, handle: &str);

    /// Would `handle`'s proxy shape collide if placed at `point`?
    fn pre_contact_test(&self, handle: &str, point: Vec3) -> bool;

    // --- Navmesh ---

    /// Clip a straight-line step so the destination stays in walkable area.
    fn try_step(&self, from: Vec3, to: Vec3) -> Vec3;

    fn is_navigable(&self, point: Vec3, radius: f32) -> bool;

    /// Geodesic path length between two points, `f32::INFINITY` when no path
    /// exists.
    fn shortest_path_length(&self, from: Vec3, to: Vec3) -> f32;

    /// Rebuild the navmesh from current static scene content. Potentially
    /// expensive; callers batch it after bulk scene mutation.
    fn recompute_navmesh(&mut self, settings: &NavMeshSettings);

    // --- Ray targeting ---

    /// Unproject a viewport point into a world-space ray using the current
    /// agent view transform.
    fn unproject(&self, viewport_point: Vec2) -> Ray;

    /// Nearest manipulable object intersecting `ray` within `max_distance`,
    /// or [`ObjectId::NONE`]. `origin` is the agent's absolute translation,
    /// the reference point for the engine's reach accounting.
    fn nearest_under_ray(
        &self,
        ray: &Ray,
        origin: Vec3,
        viewport: [u32; 2],
        max_distance: f32,
    ) -> ObjectId;

    /// Nearest floor/static-geometry intersection along `ray`, if any within
    /// `max_distance`.
    fn floor_under_ray(&self, ray: &Ray, max_distance: f32) -> Option<Vec3>;

    // --- Presentation and observations ---

    /// Toggle the highlight (bounding-box draw) on an object.
    fn set_object_highlight(&mut self, id: ObjectId, enabled: bool);

    /// Fill `out` with the raw observation buffer of a sensor. The buffer is
    /// opaque to the interaction layer.
    fn read_observation(&self, sensor: usize, out: &mut Vec<u8>);
}
