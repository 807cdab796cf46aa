use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WalkerError};

pub const CHEST_MASS: &str = "chest_mass";
pub const SPINE_MASS: &str = "spine_mass";
pub const HIP_MASS: &str = "hip_mass";
pub const DEFAULT_SEGMENT_MASS: f32 = 8.0;

/// Named scalar configuration supplied by the training side, typically
/// randomized between episodes.
pub trait ResetParameters {
    fn get_with_default(&self, key: &str, default: f32) -> f32;
}

/// In-memory reset parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentParameters {
    values: HashMap<String, f32>,
}

impl EnvironmentParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: f32) {
        self.values.insert(key.into(), value);
    }

    pub fn with(mut self, key: impl Into<String>, value: f32) -> Self {
        self.set(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Apply a `key=value` override.
    pub fn apply_override(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| WalkerError::InvalidOverride(assignment.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(WalkerError::InvalidOverride(assignment.to_string()));
        }
        let value: f32 = value
            .trim()
            .parse()
            .map_err(|_| WalkerError::InvalidOverride(assignment.to_string()))?;
        self.set(key, value);
        Ok(())
    }
}

impl ResetParameters for EnvironmentParameters {
    fn get_with_default(&self, key: &str, default: f32) -> f32 {
        self.values.get(key).copied().unwrap_or(default)
    }
}

impl<P: ResetParameters + ?Sized> ResetParameters for &P {
    fn get_with_default(&self, key: &str, default: f32) -> f32 {
        (**self).get_with_default(key, default)
    }
}
