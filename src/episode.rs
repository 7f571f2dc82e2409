//! Episode descriptions: the agent start pose, an optional goal and the list
//! of objects to populate the scene with. Immutable once loaded; replacing an
//! episode tears the scene down and rebuilds it.

use crate::engine::AgentState;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EpisodeError {
    #[error("failed to read episode file: {reason}")]
    Io { reason: String },

    #[error("failed to parse episode: {reason}")]
    Parse { reason: String },
}

pub type EpisodeResult<T> = Result<T, EpisodeError>;

/// Agent pose at episode start, wire format `{position, rotation}` with the
/// quaternion as `[x, y, z, w]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartState {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
}

impl StartState {
    pub fn to_agent_state(&self) -> AgentState {
        AgentState::new(
            Vec3::from_array(self.position),
            Quat::from_xyzw(
                self.rotation[0],
                self.rotation[1],
                self.rotation[2],
                self.rotation[3],
            ),
        )
    }
}

impl Default for StartState {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub position: [f32; 3],
}

/// One object to instantiate. Extra keys beyond the handle and position are
/// preserved verbatim as per-object metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSpec {
    pub origin_handle: String,
    pub position: [f32; 3],
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ObjectSpec {
    pub fn position_vec(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub start_state: StartState,
    #[serde(default)]
    pub goal: Option<Goal>,
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
}

impl Episode {
    pub fn from_json(data: &str) -> EpisodeResult<Self> {
        serde_json::from_str(data).map_err(|e| EpisodeError::Parse {
            reason: e.to_string(),
        })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> EpisodeResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| EpisodeError::Io {
            reason: e.to_string(),
        })?;
        Self::from_json(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_wire_format() {
        let episode = Episode::from_json(
            r#"{
                "startState": {
                    "position": [-4.94, -2.63, -7.57],
                    "rotation": [0.0, 0.980792, 0.0, 0.195056]
                },
                "goal": { "position": [2.29, 0.12, 16.98] },
                "objects": [
                    { "originHandle": "cube", "position": [1.0, 2.0, 3.0], "label": "target" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(episode.objects.len(), 1);
        let object = &episode.objects[0];
        assert_eq!(object.origin_handle, "cube");
        assert_eq!(object.position_vec(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(object.metadata["label"], "target");
        assert!(episode.goal.is_some());

        let agent = episode.start_state.to_agent_state();
        assert!((agent.rotation.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn goal_and_objects_are_optional() {
        let episode = Episode::from_json(
            r#"{ "startState": { "position": [0,0,0], "rotation": [0,0,0,1] } }"#,
        )
        .unwrap();
        assert!(episode.goal.is_none());
        assert!(episode.objects.is_empty());
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        assert!(matches!(
            Episode::from_json("{}"),
            Err(EpisodeError::Parse { .. })
        ));
    }
}
