//! The interaction/manipulation core.
//!
//! Everything in here is policy: deciding when to call into the engine and
//! how to interpret its answers. Validation failures (blocked steps,
//! non-navigable drop points, missing targets) are ordinary outcome values;
//! only engine-reported faults (failed instantiation, dangling ids) surface
//! as [`InteractionError`].

pub mod builder;
pub mod grip;
pub mod motion;
pub mod registry;
pub mod spatial;
pub mod targeting;

pub use builder::EpisodeSceneBuilder;
pub use grip::{GrabOutcome, GrabReleaseController, GripState, InventoryReleaseOutcome, ReleaseOutcome};
pub use motion::{AgentMotionController, StepOutcome};
pub use registry::{RegisteredObject, SceneObjectRegistry};
pub use spatial::{distance_to_goal, geodesic_distance, PolarDisplacement};
pub use targeting::{CrosshairHit, CrosshairTargeting};

use crate::engine::ObjectId;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum InteractionError {
    /// The engine returned the "no object" sentinel from an instantiation
    /// request. The sentinel is never registered.
    #[error("engine failed to instantiate object from template '{handle}'")]
    SpawnFailed { handle: String },

    /// An operation needed registry metadata for an id the registry does not
    /// know. Indicates the registry and the engine drifted apart.
    #[error("object {0} is not registered")]
    Unregistered(ObjectId),
}

pub type InteractionResult<T> = Result<T, InteractionError>;
