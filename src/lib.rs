mod physics;
mod body_part;
mod error;
mod controller;
mod orientation;
mod reset_params;
mod rl_interface;
mod reward;
mod agent;
mod walker;
mod world;
mod config;
mod host;

#[cfg(test)]
mod testing;

// Re-export public items
pub use physics::{
    clamp_magnitude, from_to_rotation, RigidBodySnapshot, FIXED_TIME_STEP, FLOOR_HALF_EXTENTS,
    FLOOR_HEIGHT,
};
pub use body_part::BodyPartName;
pub use error::{Result, WalkerError};
pub use controller::{
    joint_strength_force, joint_target_angles, JointDriveController, JointDriveSettings,
    JointLimits,
};
pub use orientation::{OrientationCube, OrientationReference};
pub use reset_params::{
    EnvironmentParameters, ResetParameters, CHEST_MASS, DEFAULT_SEGMENT_MASS, HIP_MASS,
    SPINE_MASS,
};
pub use rl_interface::{
    BodyPartSense, JointSense, JointStrengths, WalkerAction, WalkerIO, WalkerObservation,
    ACTION_SIZE, OBSERVATION_SIZE, STRENGTH_ORDER, TARGET_ORDER,
};
pub use reward::RewardTerms;
pub use agent::{WalkerAgent, DEFAULT_MAXIMUM_WALKING_SPEED};
pub use walker::{segment_specs, SegmentSpec, Walker, WalkerPart, WalkerPartShape};
pub use world::SimulationWorld;
pub use config::WalkerConfig;
pub use host::{run_episode, run_random_episodes, EpisodeSummary, Policy, RandomPolicy};

/// Re-exported math types used throughout the public API
pub use rapier3d::na::{UnitQuaternion, Vector3};
