//! Error types for the walker agent.

use rapier3d::na::Vector3;
use thiserror::Error;

use crate::body_part::BodyPartName;

/// Errors raised while driving the walker.
///
/// Variants fall into three groups: divergent physics (a reward term became
/// non-finite), bad input from the caller, and configuration loading.
#[derive(Debug, Error)]
pub enum WalkerError {
    /// Velocity alignment term is not finite.
    #[error(
        "non-finite move-towards-target reward: cube_forward={cube_forward:?}, \
         hips_velocity={hips_velocity:?}, maximum_walking_speed={maximum_walking_speed}"
    )]
    NonFiniteMoveReward {
        cube_forward: Vector3<f32>,
        hips_velocity: Vector3<f32>,
        maximum_walking_speed: f32,
    },

    /// Head direction alignment term is not finite.
    #[error("non-finite look-at-target reward: cube_forward={cube_forward:?}, head_forward={head_forward:?}")]
    NonFiniteLookReward {
        cube_forward: Vector3<f32>,
        head_forward: Vector3<f32>,
    },

    /// Feet-over-head height term is not finite.
    #[error(
        "non-finite feet-height-over-head reward: head_position={head_position:?}, \
         foot_l_position={foot_l_position:?}, foot_r_position={foot_r_position:?}"
    )]
    NonFiniteHeightReward {
        head_position: Vector3<f32>,
        foot_l_position: Vector3<f32>,
        foot_r_position: Vector3<f32>,
    },

    /// Flat action vector does not match the joint schema.
    #[error("action size mismatch: expected {expected}, got {actual}")]
    ActionSize { expected: usize, actual: usize },

    /// A body part was used before being registered with the controller.
    #[error("body part not registered: {0}")]
    UnregisteredBodyPart(BodyPartName),

    /// The body part has no joint to drive.
    #[error("body part has no joint: {0}")]
    NotActuated(BodyPartName),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid reset parameter override: {0}")]
    InvalidOverride(String),
}

impl WalkerError {
    /// The physics state diverged. The episode cannot continue meaningfully.
    pub fn is_divergent_physics(&self) -> bool {
        matches!(
            self,
            Self::NonFiniteMoveReward { .. }
                | Self::NonFiniteLookReward { .. }
                | Self::NonFiniteHeightReward { .. }
        )
    }

    /// The caller passed something inconsistent with the walker schema.
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            Self::ActionSize { .. }
                | Self::UnregisteredBodyPart(_)
                | Self::NotActuated(_)
                | Self::InvalidOverride(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WalkerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        let divergent = WalkerError::NonFiniteLookReward {
            cube_forward: Vector3::z(),
            head_forward: Vector3::new(f32::NAN, 0.0, 0.0),
        };
        assert!(divergent.is_divergent_physics());
        assert!(!divergent.is_bad_input());

        let bad = WalkerError::ActionSize { expected: 39, actual: 3 };
        assert!(bad.is_bad_input());
        assert!(!bad.is_divergent_physics());
        assert_eq!(bad.to_string(), "action size mismatch: expected 39, got 3");
    }

    #[test]
    fn test_divergence_message_carries_operands() {
        let err = WalkerError::NonFiniteMoveReward {
            cube_forward: Vector3::z(),
            hips_velocity: Vector3::new(f32::NAN, 1.0, 2.0),
            maximum_walking_speed: 999.0,
        };
        let message = err.to_string();
        assert!(message.contains("NaN"));
        assert!(message.contains("maximum_walking_speed=999"));
    }
}
