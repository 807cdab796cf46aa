use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agent::DEFAULT_MAXIMUM_WALKING_SPEED;
use crate::controller::JointDriveSettings;
use crate::error::Result;
use crate::reset_params::EnvironmentParameters;

/// Settings for a headless walker run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkerConfig {
    pub maximum_walking_speed: f32,
    /// Physics ticks between policy decisions
    pub decision_period: usize,
    /// Physics ticks per episode
    pub max_steps: usize,
    pub walk_target: [f32; 3],
    /// Distance from the target at which a body part counts as touching it
    pub target_radius: f32,
    pub joint_drive: JointDriveSettings,
    pub reset_parameters: EnvironmentParameters,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            maximum_walking_speed: DEFAULT_MAXIMUM_WALKING_SPEED,
            decision_period: 5,
            max_steps: 1000,
            walk_target: [0.0, 0.0, 100.0],
            target_radius: 1.0,
            joint_drive: JointDriveSettings::default(),
            reset_parameters: EnvironmentParameters::default(),
        }
    }
}

impl WalkerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
