// simgrip: interaction controller for an embodied agent in a 3D
// physics/navmesh engine — crosshair targeting, grab/release, validated
// stepping, episode scene management.

pub mod config;
pub mod engine;
pub mod episode;
pub mod events;
pub mod interaction;
pub mod session;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{AgentConfig, SensorSpec, SimConfig};
pub use engine::{AgentState, Engine, MotionType, MoveAction, NavMeshSettings, ObjectId};
pub use episode::Episode;
pub use interaction::{InteractionError, InteractionResult};
pub use session::Session;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
