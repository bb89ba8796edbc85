//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tunables for entity and polygon construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Prototype used for waypoints created from point descriptors.
    pub waypoint_prototype: String,
    /// Create a default waypoint when a point name is not in the simulation.
    /// When false an unknown name is an error.
    pub create_missing_waypoints: bool,
    /// Speed given to segment entries that do not set one.
    pub default_segment_speed: f64,
    /// Construction tag used when a prototype chain sets no factory tag.
    pub default_factory: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            waypoint_prototype: "waypoint".to_string(),
            create_missing_waypoints: true,
            default_segment_speed: 10.0,
            default_factory: "entity".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}
