//! Statically-typed session configuration.
//!
//! Every recognized field is enumerated here; unknown fields in a config file
//! are a [`ConfigError`], never silently accepted. TOML on disk, resolved
//! through the platform config directory.

use crate::engine::NavMeshSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use thiserror::Error;

const CONFIG_FILE: &str = "simgrip.toml";

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("failed to read config: {reason}")]
    Io { reason: String },

    #[error("invalid config: {reason}")]
    Parse { reason: String },

    #[error("failed to serialize config: {reason}")]
    Serialize { reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Color,
    Depth,
    Semantic,
}

/// One sensor the engine should service observation requests for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorSpec {
    pub name: String,
    pub kind: SensorKind,
    /// Width and height in pixels.
    pub resolution: [u32; 2],
    /// Mount position relative to the agent body.
    pub position: [f32; 3],
}

impl Default for SensorSpec {
    fn default() -> Self {
        Self {
            name: "rgb".into(),
            kind: SensorKind::Color,
            resolution: [640, 480],
            position: [0.0, 1.5, 0.0],
        }
    }
}

/// Physical parameters of the agent body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AgentConfig {
    pub height: f32,
    pub radius: f32,
    pub mass: f32,
    pub linear_acceleration: f32,
    pub angular_acceleration: f32,
    pub linear_friction: f32,
    pub angular_friction: f32,
    pub coefficient_of_restitution: f32,
    pub sensors: Vec<SensorSpec>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            height: 1.5,
            radius: 0.1,
            mass: 32.0,
            linear_acceleration: 20.0,
            angular_acceleration: 4.0 * std::f32::consts::PI,
            linear_friction: 0.5,
            angular_friction: 1.0,
            coefficient_of_restitution: 0.0,
            sensors: vec![SensorSpec::default()],
        }
    }
}

/// Top-level session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SimConfig {
    /// Scene asset the engine loads.
    pub scene: String,
    /// Contact-proxy handle used for the agent body.
    pub agent_proxy_handle: String,
    /// Reach budget for crosshair targeting, world units.
    pub max_target_distance: f32,
    /// Radius for the release navigability check.
    pub navigable_drop_radius: f32,
    /// Recompute the navmesh right after construction instead of loading a
    /// precomputed one.
    pub recompute_navmesh_on_start: bool,
    pub agent: AgentConfig,
    pub navmesh: NavMeshSettings,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            scene: String::new(),
            agent_proxy_handle: "agent_cylinder".into(),
            max_target_distance: 1.5,
            navigable_drop_radius: 0.5,
            recompute_navmesh_on_start: false,
            agent: AgentConfig::default(),
            navmesh: NavMeshSettings::default(),
        }
    }
}

impl SimConfig {
    /// Resolution of the primary sensor, used as the targeting viewport.
    pub fn viewport(&self) -> [u32; 2] {
        self.agent
            .sensors
            .first()
            .map(|s| s.resolution)
            .unwrap_or([640, 480])
    }

    pub fn from_toml(data: &str) -> ConfigResult<Self> {
        toml::from_str(data).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let data = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            reason: e.to_string(),
        })?;
        Self::from_toml(&data)
    }
}

fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "simgrip", "simgrip").map(|proj| proj.config_dir().join(CONFIG_FILE))
}

pub fn save_config(config: &SimConfig) -> ConfigResult<()> {
    if let Some(path) = config_path() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                reason: e.to_string(),
            })?;
        }
        let toml = toml::to_string_pretty(config).map_err(|e| ConfigError::Serialize {
            reason: e.to_string(),
        })?;
        fs::write(path, toml).map_err(|e| ConfigError::Io {
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

/// Load the saved config, if one exists and parses.
pub fn load_config() -> Option<SimConfig> {
    let path = config_path()?;
    let data = fs::read_to_string(path).ok()?;
    SimConfig::from_toml(&data).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_the_stock_agent() {
        let config = SimConfig::default();
        assert_eq!(config.agent.height, 1.5);
        assert_eq!(config.agent.radius, 0.1);
        assert_eq!(config.max_target_distance, 1.5);
        assert_eq!(config.viewport(), [640, 480]);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = SimConfig::default();
        let encoded = toml::to_string_pretty(&config).unwrap();
        let decoded = SimConfig::from_toml(&encoded).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn unknown_fields_are_a_config_error() {
        let err = SimConfig::from_toml("max_target_distance = 1.5\nwarp_speed = 9\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let err = SimConfig::from_toml("[agent]\nheight = 1.5\njetpack = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let config = SimConfig::from_toml("max_target_distance = 2.0\n").unwrap();
        assert_eq!(config.max_target_distance, 2.0);
        assert_eq!(config.agent, AgentConfig::default());
    }
}
