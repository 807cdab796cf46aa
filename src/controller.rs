//! Joint-drive controller interface and the shared drive mapping.

use rapier3d::na::UnitQuaternion;
use serde::{Deserialize, Serialize};

use crate::body_part::BodyPartName;
use crate::error::Result;
use crate::physics::RigidBodySnapshot;

/// Owner of the per-part records and joint actuation.
///
/// The agent never holds one. It borrows it for each lifecycle call, and the
/// host guarantees those calls do not overlap.
pub trait JointDriveController {
    /// Add a part to the registry. Registering twice is a no-op.
    fn setup_body_part(&mut self, part: BodyPartName) -> Result<()>;

    /// Registered parts, in registration order.
    fn body_parts(&self) -> &[BodyPartName];

    /// Restore the part's starting pose, zero its velocities and clear its
    /// ground contact.
    fn reset_body_part(&mut self, part: BodyPartName) -> Result<()>;

    /// Orient the whole skeleton about the agent root.
    fn set_root_rotation(&mut self, rotation: UnitQuaternion<f32>);

    fn body_state(&self, part: BodyPartName) -> Result<RigidBodySnapshot>;

    fn touching_ground(&self, part: BodyPartName) -> Result<bool>;

    /// Motor force currently applied to the part's joint.
    fn current_strength(&self, part: BodyPartName) -> Result<f32>;

    fn max_joint_force_limit(&self) -> f32;

    /// Drive the part's joint toward a target given as three values in [-1, 1].
    fn set_joint_target_rotation(&mut self, part: BodyPartName, x: f32, y: f32, z: f32) -> Result<()>;

    /// Set the part's joint strength from a value in [-1, 1].
    fn set_joint_strength(&mut self, part: BodyPartName, strength: f32) -> Result<()>;

    fn set_mass(&mut self, part: BodyPartName, mass: f32) -> Result<()>;
}

/// Spring settings shared by every joint motor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointDriveSettings {
    pub max_joint_spring: f32,
    pub joint_dampen: f32,
    pub max_joint_force_limit: f32,
}

impl Default for JointDriveSettings {
    fn default() -> Self {
        Self {
            max_joint_spring: 40_000.0,
            joint_dampen: 5_000.0,
            max_joint_force_limit: 20_000.0,
        }
    }
}

/// Angular limits of a joint, in degrees. X is asymmetric, Y and Z are
/// symmetric about zero. A zero limit locks the axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimits {
    pub low_x: f32,
    pub high_x: f32,
    pub y: f32,
    pub z: f32,
}

impl JointLimits {
    pub const LOCKED: JointLimits = JointLimits {
        low_x: 0.0,
        high_x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(low_x: f32, high_x: f32, y: f32, z: f32) -> Self {
        Self { low_x, high_x, y, z }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Euler target angles in degrees for action values in [-1, 1].
pub fn joint_target_angles(limits: &JointLimits, x: f32, y: f32, z: f32) -> [f32; 3] {
    let x = (x + 1.0) * 0.5;
    let y = (y + 1.0) * 0.5;
    let z = (z + 1.0) * 0.5;
    [
        lerp(limits.low_x, limits.high_x, x),
        lerp(-limits.y, limits.y, y),
        lerp(-limits.z, limits.z, z),
    ]
}

/// Motor force for a strength action in [-1, 1].
pub fn joint_strength_force(strength: f32, max_joint_force_limit: f32) -> f32 {
    (strength + 1.0) * 0.5 * max_joint_force_limit
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_target_angles_span_limits() {
        let limits = JointLimits::new(-60.0, 30.0, 20.0, 10.0);
        assert_eq!(joint_target_angles(&limits, -1.0, -1.0, -1.0), [-60.0, -20.0, -10.0]);
        assert_eq!(joint_target_angles(&limits, 1.0, 1.0, 1.0), [30.0, 20.0, 10.0]);
        let mid = joint_target_angles(&limits, 0.0, 0.0, 0.0);
        assert_relative_eq!(mid[0], -15.0);
        assert_relative_eq!(mid[1], 0.0);
        assert_relative_eq!(mid[2], 0.0);
    }

    #[test]
    fn test_target_angles_clamp_out_of_range_actions() {
        let limits = JointLimits::new(-60.0, 30.0, 20.0, 10.0);
        assert_eq!(joint_target_angles(&limits, 3.0, -5.0, 0.0)[..2], [30.0, -20.0]);
    }

    #[test]
    fn test_locked_axes_stay_at_zero() {
        let angles = joint_target_angles(&JointLimits::LOCKED, 0.7, -0.2, 1.0);
        assert_eq!(angles, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_strength_force() {
        assert_relative_eq!(joint_strength_force(-1.0, 20_000.0), 0.0);
        assert_relative_eq!(joint_strength_force(0.0, 20_000.0), 10_000.0);
        assert_relative_eq!(joint_strength_force(1.0, 20_000.0), 20_000.0);
    }
}
