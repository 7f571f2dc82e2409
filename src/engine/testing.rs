//! In-memory [`Engine`](super::Engine) double.
//!
//! Flat-floor world with an axis-aligned walkable rectangle, sphere-shaped
//! contact blockers and straight-line pathfinding. Deterministic and cheap,
//! which is what the unit/integration tests and the demo binary need; it is
//! not a physics simulation.

use super::types::{AgentState, MotionType, MoveAction, NavMeshSettings, ObjectId, Ray};
use super::Engine;
use glam::{Affine3A, Quat, Vec2, Vec3};
use std::collections::BTreeMap;
use std::collections::HashMap;

const STUB_STEP_SIZE: f32 = 0.25;
const STUB_TURN_DEG: f32 = 10.0;
const STUB_LOOK_DEG: f32 = 10.0;
const STUB_HIT_RADIUS: f32 = 0.5;

#[derive(Debug, Clone)]
struct StubObject {
    handle: String,
    transform: Affine3A,
    motion: MotionType,
    highlighted: bool,
}

/// Deterministic engine double backed by plain maps.
#[derive(Debug)]
pub struct StubEngine {
    objects: BTreeMap<i32, StubObject>,
    next_id: i32,
    proxies: HashMap<String, usize>,
    blocked: Vec<(Vec3, f32)>,
    walkable_min: Vec2,
    walkable_max: Vec2,
    floor_y: f32,
    agent: AgentState,
    pitch: f32,
    world_time: f64,
    navmesh_recomputes: usize,
    fail_next_spawn: bool,
}

impl StubEngine {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            next_id: 0,
            proxies: HashMap::new(),
            blocked: Vec::new(),
            walkable_min: Vec2::splat(-100.0),
            walkable_max: Vec2::splat(100.0),
            floor_y: 0.0,
            agent: AgentState::default(),
            pitch: 0.0,
            world_time: 0.0,
            navmesh_recomputes: 0,
            fail_next_spawn: false,
        }
    }

    /// Restrict the walkable area to an XZ rectangle.
    pub fn set_walkable_bounds(&mut self, min: Vec2, max: Vec2) {
        self.walkable_min = min;
        self.walkable_max = max;
    }

    /// Add a sphere that every contact test collides with.
    pub fn block_sphere(&mut self, center: Vec3, radius: f32) {
        self.blocked.push((center, radius));
    }

    pub fn clear_blocked(&mut self) {
        self.blocked.clear();
    }

    /// Make the next `add_object` report instantiation failure.
    pub fn fail_next_spawn(&mut self) {
        self.fail_next_spawn = true;
    }

    pub fn navmesh_recomputes(&self) -> usize {
        self.navmesh_recomputes
    }

    /// Reference count of a contact-test proxy, 0 when absent.
    pub fn proxy_refs(&self, handle: &str) -> usize {
        self.proxies.get(handle).copied().unwrap_or(0)
    }

    pub fn is_highlighted(&self, id: ObjectId) -> bool {
        self.objects.get(&id.0).is_some_and(|o| o.highlighted)
    }

    fn in_walkable(&self, x: f32, z: f32) -> bool {
        x >= self.walkable_min.x
            && x <= self.walkable_max.x
            && z >= self.walkable_min.y
            && z <= self.walkable_max.y
    }

    fn forward(&self) -> Vec3 {
        self.agent.rotation * Vec3::NEG_Z
    }
}

impl Default for StubEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for StubEngine {
    fn add_object(&mut self, handle: &str) -> ObjectId {
        if self.fail_next_spawn {
            self.fail_next_spawn = false;
            return ObjectId::NONE;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.objects.insert(
            id,
            StubObject {
                handle: handle.to_string(),
                transform: Affine3A::IDENTITY,
                motion: MotionType::Dynamic,
                highlighted: false,
            },
        );
        ObjectId(id)
    }

    fn remove_object(&mut self, id: ObjectId) {
        self.objects.remove(&id.0);
    }

    fn existing_objects(&self) -> Vec<ObjectId> {
        self.objects.keys().map(|&id| ObjectId(id)).collect()
    }

    fn motion_type(&self, id: ObjectId) -> Option<MotionType> {
        self.objects.get(&id.0).map(|o| o.motion)
    }

    fn set_motion_type(&mut self, id: ObjectId, motion: MotionType) {
        if let Some(object) = self.objects.get_mut(&id.0) {
            object.motion = motion;
        }
    }

    fn transform(&self, id: ObjectId) -> Option<Affine3A> {
        self.objects.get(&id.0).map(|o| o.transform)
    }

    fn set_transform(&mut self, id: ObjectId, transform: Affine3A) {
        if let Some(object) = self.objects.get_mut(&id.0) {
            object.transform = transform;
        }
    }

    fn translation(&self, id: ObjectId) -> Option<Vec3> {
        self.objects.get(&id.0).map(|o| o.transform.translation.into())
    }

    fn set_translation(&mut self, id: ObjectId, translation: Vec3) {
        if let Some(object) = self.objects.get_mut(&id.0) {
            object.transform.translation = translation.into();
        }
    }

    fn rotation(&self, id: ObjectId) -> Option<Quat> {
        self.objects
            .get(&id.0)
            .map(|o| o.transform.to_scale_rotation_translation().1)
    }

    fn step_world(&mut self, dt: f32) -> f64 {
        self.world_time += f64::from(dt);
        self.world_time
    }

    fn world_time(&self) -> f64 {
        self.world_time
    }

    fn reset(&mut self) {
        self.world_time = 0.0;
        self.pitch = 0.0;
    }

    fn agent_state(&self) -> AgentState {
        self.agent
    }

    fn set_agent_state(&mut self, state: &AgentState) {
        self.agent = *state;
    }

    fn act(&mut self, action: MoveAction) {
        match action {
            MoveAction::MoveForward => {
                self.agent.position += self.forward() * STUB_STEP_SIZE;
            }
            MoveAction::MoveBackward => {
                self.agent.position -= self.forward() * STUB_STEP_SIZE;
            }
            MoveAction::TurnLeft => {
                self.agent.rotation =
                    Quat::from_rotation_y(STUB_TURN_DEG.to_radians()) * self.agent.rotation;
            }
            MoveAction::TurnRight => {
                self.agent.rotation =
                    Quat::from_rotation_y(-STUB_TURN_DEG.to_radians()) * self.agent.rotation;
            }
            MoveAction::LookUp => self.pitch += STUB_LOOK_DEG.to_radians(),
            MoveAction::LookDown => self.pitch -= STUB_LOOK_DEG.to_radians(),
        }
    }

    fn add_contact_proxy(&mut self, handle: &str) {
        *self.proxies.entry(handle.to_string()).or_insert(0) += 1;
    }

    fn remove_contact_proxy(&mut self, handle: &str) {
        if let Some(refs) = self.proxies.get_mut(handle) {
            *refs -= 1;
            if *refs == 0 {
                self.proxies.remove(handle);
            }
        }
    }

    fn pre_contact_test(&self, _handle: &str, point: Vec3) -> bool {
        self.blocked
            .iter()
            .any(|(center, radius)| point.distance(*center) <= *radius)
    }

    fn try_step(&self, _from: Vec3, to: Vec3) -> Vec3 {
        Vec3::new(
            to.x.clamp(self.walkable_min.x, self.walkable_max.x),
            self.floor_y,
            to.z.clamp(self.walkable_min.y, self.walkable_max.y),
        )
    }

    fn is_navigable(&self, point: Vec3, _radius: f32) -> bool {
        self.in_walkable(point.x, point.z)
    }

    fn shortest_path_length(&self, from: Vec3, to: Vec3) -> f32 {
        if self.in_walkable(from.x, from.z) && self.in_walkable(to.x, to.z) {
            from.distance(to)
        } else {
            f32::INFINITY
        }
    }

    fn recompute_navmesh(&mut self, _settings: &NavMeshSettings) {
        self.navmesh_recomputes += 1;
    }

    fn unproject(&self, _viewport_point: Vec2) -> Ray {
        let eye = self.agent.position + Vec3::new(0.0, 1.5, 0.0);
        let direction = self.agent.rotation * (Quat::from_rotation_x(self.pitch) * Vec3::NEG_Z);
        Ray {
            origin: eye,
            direction,
        }
    }

    fn nearest_under_ray(
        &self,
        ray: &Ray,
        _origin: Vec3,
        _viewport: [u32; 2],
        max_distance: f32,
    ) -> ObjectId {
        // Reach is measured along the ray here; a real backend would measure
        // from the agent reference point.
        let dir = ray.direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return ObjectId::NONE;
        }
        let mut best = ObjectId::NONE;
        let mut best_distance = f32::INFINITY;
        for (&id, object) in &self.objects {
            let center: Vec3 = object.transform.translation.into();
            let along = (center - ray.origin).dot(dir);
            if along <= 0.0 || along > max_distance {
                continue;
            }
            let perpendicular = center - (ray.origin + dir * along);
            if perpendicular.length() > STUB_HIT_RADIUS {
                continue;
            }
            if along < best_distance {
                best_distance = along;
                best = ObjectId(id);
            }
        }
        best
    }

    fn floor_under_ray(&self, ray: &Ray, _max_distance: f32) -> Option<Vec3> {
        let dir = ray.direction.normalize_or_zero();
        if dir.y >= 0.0 {
            return None;
        }
        let t = (self.floor_y - ray.origin.y) / dir.y;
        Some(ray.origin + dir * t)
    }

    fn set_object_highlight(&mut self, id: ObjectId, enabled: bool) {
        if let Some(object) = self.objects.get_mut(&id.0) {
            object.highlighted = enabled;
        }
    }

    fn read_observation(&self, sensor: usize, out: &mut Vec<u8>) {
        out.clear();
        out.extend_from_slice(&(sensor as u32).to_le_bytes());
        out.extend_from_slice(&(self.world_time as f32).to_le_bytes());
    }
}
