use crate::body_part::BodyPartName;
use crate::controller::JointDriveController;
use crate::error::{Result, WalkerError};
use crate::orientation::OrientationReference;
use crate::physics::clamp_magnitude;

pub const GROUND_CONTACT_WEIGHT: f32 = 0.005;
pub const HEIGHT_WEIGHT: f32 = 0.005;
pub const TOUCHED_TARGET_BONUS: f32 = 1.0;

/// Per-tick reward terms.
///
/// `move_towards_target` and `look_at_target` are computed and checked for
/// divergence but do not contribute to [`RewardTerms::total`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardTerms {
    pub move_towards_target: f32,
    pub look_at_target: f32,
    pub feet_height_over_head: f32,
    pub ground_contact_left: f32,
    pub ground_contact_right: f32,
}

impl RewardTerms {
    pub fn total(&self) -> f32 {
        GROUND_CONTACT_WEIGHT * self.ground_contact_left
            + GROUND_CONTACT_WEIGHT * self.ground_contact_right
            + HEIGHT_WEIGHT * self.feet_height_over_head
    }
}

fn contact_term(touching: bool) -> f32 {
    if touching {
        1.0
    } else {
        -1.0
    }
}

/// Evaluate the reward terms for the current physics state.
pub fn evaluate<C, R>(controller: &C, reference: &R, maximum_walking_speed: f32) -> Result<RewardTerms>
where
    C: JointDriveController + ?Sized,
    R: OrientationReference + ?Sized,
{
    let cube_forward = reference.forward();

    let hips_velocity = controller.body_state(BodyPartName::Hips)?.velocity;
    let move_towards_target = cube_forward.dot(&clamp_magnitude(&hips_velocity, maximum_walking_speed));
    if !move_towards_target.is_finite() {
        return Err(WalkerError::NonFiniteMoveReward {
            cube_forward,
            hips_velocity,
            maximum_walking_speed,
        });
    }

    let head = controller.body_state(BodyPartName::Head)?;
    let head_forward = head.forward();
    let look_at_target = cube_forward.dot(&head_forward);
    if !look_at_target.is_finite() {
        return Err(WalkerError::NonFiniteLookReward {
            cube_forward,
            head_forward,
        });
    }

    // Only the right foot term is scaled down.
    let foot_l = controller.body_state(BodyPartName::FootL)?.position;
    let foot_r = controller.body_state(BodyPartName::FootR)?.position;
    let feet_height_over_head = (foot_l.y - head.position.y) + (foot_r.y - head.position.y) / 50.0;
    if !feet_height_over_head.is_finite() {
        return Err(WalkerError::NonFiniteHeightReward {
            head_position: head.position,
            foot_l_position: foot_l,
            foot_r_position: foot_r,
        });
    }

    Ok(RewardTerms {
        move_towards_target,
        look_at_target,
        feet_height_over_head,
        ground_contact_left: contact_term(controller.touching_ground(BodyPartName::HandL)?),
        ground_contact_right: contact_term(controller.touching_ground(BodyPartName::HandR)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::OrientationCube;
    use crate::testing::MockJointDrive;
    use approx::assert_relative_eq;
    use rapier3d::na::Vector3;

    /// Head and feet at the same height so only the hand terms remain.
    fn level_walker() -> MockJointDrive {
        let mut controller = MockJointDrive::registered();
        for part in [BodyPartName::Head, BodyPartName::FootL, BodyPartName::FootR] {
            controller.state_mut(part).position.y = 1.0;
        }
        controller
    }

    #[test]
    fn test_hand_contact_combinations() {
        let cube = OrientationCube::default();
        for (left, right, expected) in [
            (true, true, 0.01),
            (true, false, 0.0),
            (false, true, 0.0),
            (false, false, -0.01),
        ] {
            let mut controller = level_walker();
            controller.set_touching(BodyPartName::HandL, left);
            controller.set_touching(BodyPartName::HandR, right);
            let terms = evaluate(&controller, &cube, 999.0).unwrap();
            assert_relative_eq!(terms.total(), expected, epsilon = 1.0e-7);
        }
    }

    #[test]
    fn test_feet_height_is_asymmetric() {
        let mut controller = level_walker();
        controller.state_mut(BodyPartName::Head).position.y = 2.0;
        controller.state_mut(BodyPartName::FootL).position.y = 0.0;
        controller.state_mut(BodyPartName::FootR).position.y = 0.0;
        let terms = evaluate(&controller, &OrientationCube::default(), 999.0).unwrap();
        assert_relative_eq!(terms.feet_height_over_head, -2.0 - 2.0 / 50.0);
        assert_relative_eq!(terms.total(), -0.01 + 0.005 * (-2.04), epsilon = 1.0e-6);
    }

    #[test]
    fn test_move_and_look_terms_do_not_contribute() {
        let cube = OrientationCube::default();
        let still = evaluate(&level_walker(), &cube, 999.0).unwrap();

        let mut moving = level_walker();
        moving.state_mut(BodyPartName::Hips).velocity = Vector3::new(0.0, 0.0, 5.0);
        let terms = evaluate(&moving, &cube, 999.0).unwrap();

        assert_relative_eq!(terms.move_towards_target, 5.0);
        assert_relative_eq!(terms.look_at_target, 1.0);
        assert_eq!(terms.total(), still.total());
    }

    #[test]
    fn test_walking_speed_is_clamped() {
        let mut controller = level_walker();
        controller.state_mut(BodyPartName::Hips).velocity = Vector3::new(0.0, 0.0, 5.0);
        let terms = evaluate(&controller, &OrientationCube::default(), 2.0).unwrap();
        assert_relative_eq!(terms.move_towards_target, 2.0, epsilon = 1.0e-6);
    }

    #[test]
    fn test_finite_state_gives_finite_reward() {
        let terms = evaluate(&MockJointDrive::registered(), &OrientationCube::default(), 999.0).unwrap();
        assert!(terms.total().is_finite());
    }

    #[test]
    fn test_nan_velocity_reports_operands() {
        let mut controller = level_walker();
        let velocity = Vector3::new(f32::NAN, 0.0, 1.0);
        controller.state_mut(BodyPartName::Hips).velocity = velocity;

        let err = evaluate(&controller, &OrientationCube::default(), 999.0).unwrap_err();
        assert!(err.is_divergent_physics());
        match err {
            WalkerError::NonFiniteMoveReward {
                cube_forward,
                hips_velocity,
                maximum_walking_speed,
            } => {
                assert_eq!(cube_forward, Vector3::z());
                assert!(hips_velocity.x.is_nan());
                assert_eq!(hips_velocity.z, 1.0);
                assert_eq!(maximum_walking_speed, 999.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nan_head_position_reports_height_operands() {
        let mut controller = level_walker();
        controller.state_mut(BodyPartName::Head).position.y = f32::NAN;
        let err = evaluate(&controller, &OrientationCube::default(), 999.0).unwrap_err();
        match err {
            WalkerError::NonFiniteHeightReward {
                head_position,
                foot_l_position,
                ..
            } => {
                assert!(head_position.y.is_nan());
                assert_eq!(foot_l_position.y, 1.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
