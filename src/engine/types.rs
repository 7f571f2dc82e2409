use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine-assigned identifier for an instanced object.
///
/// Opaque and unique while the object exists. The engine reports failed
/// instantiation with the reserved [`ObjectId::NONE`] sentinel; that value
/// must never be registered or gripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub i32);

impl ObjectId {
    /// Sentinel for "no object": failed instantiation, empty crosshair hit.
    pub const NONE: ObjectId = ObjectId(-1);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        self != Self::NONE
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "none")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Rigid-body classification of an instanced object.
///
/// Owned exclusively by the engine; the controller requests transitions and
/// re-queries when correctness matters rather than caching a stale copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionType {
    /// Immovable scene content; contributes to the navmesh.
    Static,
    /// Driven by the controller, no physics response.
    Kinematic,
    /// Freely simulated.
    Dynamic,
}

impl fmt::Display for MotionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionType::Static => write!(f, "static"),
            MotionType::Kinematic => write!(f, "kinematic"),
            MotionType::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Discrete per-tick agent actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveAction {
    MoveForward,
    MoveBackward,
    TurnLeft,
    TurnRight,
    LookUp,
    LookDown,
}

impl MoveAction {
    /// Translational actions need navmesh/collision validation before the
    /// engine is allowed to actuate them; rotations cannot collide.
    pub fn is_translation(self) -> bool {
        matches!(self, MoveAction::MoveForward | MoveAction::MoveBackward)
    }
}

impl fmt::Display for MoveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoveAction::MoveForward => "moveForward",
            MoveAction::MoveBackward => "moveBackward",
            MoveAction::TurnLeft => "turnLeft",
            MoveAction::TurnRight => "turnRight",
            MoveAction::LookUp => "lookUp",
            MoveAction::LookDown => "lookDown",
        };
        write!(f, "{name}")
    }
}

/// Agent pose as the engine reports it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentState {
    pub position: Vec3,
    pub rotation: Quat,
}

impl AgentState {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// World transform of the agent body.
    pub fn transform(&self) -> Affine3A {
        Affine3A::from_rotation_translation(self.rotation, self.position)
    }
}

impl Default for AgentState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// World-space ray produced by unprojecting a viewport point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Parameters handed to the engine when the navmesh is recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct NavMeshSettings {
    pub cell_size: f32,
    pub cell_height: f32,
    pub agent_height: f32,
    pub agent_radius: f32,
    pub agent_max_climb: f32,
    pub agent_max_slope_deg: f32,
}

impl Default for NavMeshSettings {
    fn default() -> Self {
        Self {
            cell_size: 0.05,
            cell_height: 0.2,
            agent_height: 1.5,
            agent_radius: 0.1,
            agent_max_climb: 0.2,
            agent_max_slope_deg: 45.0,
        }
    }
}
