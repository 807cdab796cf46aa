use rapier3d::na::{UnitQuaternion, Vector3};

use crate::body_part::BodyPartName;
use crate::controller::JointDriveController;
use crate::error::{Result, WalkerError};
use crate::orientation::OrientationReference;
use crate::physics::{from_to_rotation, quaternion_components};

/// Joint state reported for actuated parts only
#[derive(Debug, Clone, PartialEq)]
pub struct JointSense {
    pub local_rotation: UnitQuaternion<f32>,
    /// Current strength divided by the controller's force limit
    pub normalized_strength: f32,
}

/// Sense data for a single body part, expressed in the orientation reference frame
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPartSense {
    pub part: BodyPartName,
    pub touching_ground: bool,
    pub velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
    /// Position relative to the hips
    pub relative_position: Vector3<f32>,
    pub joint: Option<JointSense>,
}

/// Complete hierarchical observation for the walker
#[derive(Debug, Clone, PartialEq)]
pub struct WalkerObservation {
    /// Rotation from the hips' forward to the reference forward
    pub hips_alignment: UnitQuaternion<f32>,
    /// Rotation from the head's forward to the reference forward
    pub head_alignment: UnitQuaternion<f32>,
    /// One entry per registered part, in registration order
    pub parts: Vec<BodyPartSense>,
}

impl WalkerObservation {
    pub fn len(&self) -> usize {
        8 + self
            .parts
            .iter()
            .map(|p| if p.joint.is_some() { 15 } else { 10 })
            .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn part(&self, name: BodyPartName) -> Option<&BodyPartSense> {
        self.parts.iter().find(|p| p.part == name)
    }

    /// Flatten to the vector layout consumed by the policy
    pub fn to_vec(&self) -> Vec<f32> {
        let mut flat = Vec::with_capacity(self.len());

        flat.extend(quaternion_components(&self.hips_alignment));
        flat.extend(quaternion_components(&self.head_alignment));

        for sense in &self.parts {
            flat.push(if sense.touching_ground { 1.0 } else { 0.0 });
            flat.extend(sense.velocity.iter());
            flat.extend(sense.angular_velocity.iter());
            flat.extend(sense.relative_position.iter());
            if let Some(joint) = &sense.joint {
                flat.extend(quaternion_components(&joint.local_rotation));
                flat.push(joint.normalized_strength);
            }
        }

        flat
    }
}

/// Order in which joint targets are laid out in the flat action and sent to the controller
pub const TARGET_ORDER: [BodyPartName; 13] = [
    BodyPartName::Chest,
    BodyPartName::Spine,
    BodyPartName::ThighL,
    BodyPartName::ThighR,
    BodyPartName::ShinL,
    BodyPartName::ShinR,
    BodyPartName::FootR,
    BodyPartName::FootL,
    BodyPartName::ArmL,
    BodyPartName::ArmR,
    BodyPartName::ForearmL,
    BodyPartName::ForearmR,
    BodyPartName::Head,
];

/// Order in which joint strengths follow the targets in the flat action
pub const STRENGTH_ORDER: [BodyPartName; 13] = [
    BodyPartName::Chest,
    BodyPartName::Spine,
    BodyPartName::Head,
    BodyPartName::ThighL,
    BodyPartName::ShinL,
    BodyPartName::FootL,
    BodyPartName::ThighR,
    BodyPartName::ShinR,
    BodyPartName::FootR,
    BodyPartName::ArmL,
    BodyPartName::ForearmL,
    BodyPartName::ArmR,
    BodyPartName::ForearmR,
];

pub const ACTION_SIZE: usize = 26 + 13;
pub const OBSERVATION_SIZE: usize = 8 + 16 * 10 + 13 * 5;

/// Strength action per actuated joint, each in [-1, 1]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointStrengths {
    pub chest: f32,
    pub spine: f32,
    pub head: f32,
    pub thigh_l: f32,
    pub shin_l: f32,
    pub foot_l: f32,
    pub thigh_r: f32,
    pub shin_r: f32,
    pub foot_r: f32,
    pub arm_l: f32,
    pub forearm_l: f32,
    pub arm_r: f32,
    pub forearm_r: f32,
}

/// Hierarchical action for the walker. Each joint carries exactly as many
/// rotation components as it has degrees of freedom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkerAction {
    pub chest: [f32; 3],
    pub spine: [f32; 3],
    pub thigh_l: [f32; 2],
    pub thigh_r: [f32; 2],
    pub shin_l: f32,
    pub shin_r: f32,
    pub foot_r: [f32; 3],
    pub foot_l: [f32; 3],
    pub arm_l: [f32; 2],
    pub arm_r: [f32; 2],
    pub forearm_l: f32,
    pub forearm_r: f32,
    pub head: [f32; 2],
    pub strength: JointStrengths,
}

fn pad2([x, y]: [f32; 2]) -> [f32; 3] {
    [x, y, 0.0]
}

fn pad1(x: f32) -> [f32; 3] {
    [x, 0.0, 0.0]
}

struct ActionCursor<'a> {
    values: &'a [f32],
    pos: usize,
}

impl<'a> ActionCursor<'a> {
    fn next(&mut self) -> f32 {
        let value = self.values[self.pos];
        self.pos += 1;
        value
    }

    fn take<const N: usize>(&mut self) -> [f32; N] {
        let mut out = [0.0; N];
        out.copy_from_slice(&self.values[self.pos..self.pos + N]);
        self.pos += N;
        out
    }
}

impl WalkerAction {
    /// Three-axis targets in [`TARGET_ORDER`], unused axes zeroed
    pub fn joint_targets(&self) -> [(BodyPartName, [f32; 3]); 13] {
        [
            (BodyPartName::Chest, self.chest),
            (BodyPartName::Spine, self.spine),
            (BodyPartName::ThighL, pad2(self.thigh_l)),
            (BodyPartName::ThighR, pad2(self.thigh_r)),
            (BodyPartName::ShinL, pad1(self.shin_l)),
            (BodyPartName::ShinR, pad1(self.shin_r)),
            (BodyPartName::FootR, self.foot_r),
            (BodyPartName::FootL, self.foot_l),
            (BodyPartName::ArmL, pad2(self.arm_l)),
            (BodyPartName::ArmR, pad2(self.arm_r)),
            (BodyPartName::ForearmL, pad1(self.forearm_l)),
            (BodyPartName::ForearmR, pad1(self.forearm_r)),
            (BodyPartName::Head, pad2(self.head)),
        ]
    }

    /// Strength per joint in [`STRENGTH_ORDER`]
    pub fn joint_strengths(&self) -> [(BodyPartName, f32); 13] {
        let s = &self.strength;
        [
            (BodyPartName::Chest, s.chest),
            (BodyPartName::Spine, s.spine),
            (BodyPartName::Head, s.head),
            (BodyPartName::ThighL, s.thigh_l),
            (BodyPartName::ShinL, s.shin_l),
            (BodyPartName::FootL, s.foot_l),
            (BodyPartName::ThighR, s.thigh_r),
            (BodyPartName::ShinR, s.shin_r),
            (BodyPartName::FootR, s.foot_r),
            (BodyPartName::ArmL, s.arm_l),
            (BodyPartName::ForearmL, s.forearm_l),
            (BodyPartName::ArmR, s.arm_r),
            (BodyPartName::ForearmR, s.forearm_r),
        ]
    }

    /// Decode the flat positional layout: 26 rotation components followed by 13 strengths
    pub fn from_flat(flat: &[f32]) -> Result<Self> {
        if flat.len() != ACTION_SIZE {
            return Err(WalkerError::ActionSize {
                expected: ACTION_SIZE,
                actual: flat.len(),
            });
        }
        let mut c = ActionCursor { values: flat, pos: 0 };

        Ok(Self {
            chest: c.take(),
            spine: c.take(),
            thigh_l: c.take(),
            thigh_r: c.take(),
            shin_l: c.next(),
            shin_r: c.next(),
            foot_r: c.take(),
            foot_l: c.take(),
            arm_l: c.take(),
            arm_r: c.take(),
            forearm_l: c.next(),
            forearm_r: c.next(),
            head: c.take(),
            strength: JointStrengths {
                chest: c.next(),
                spine: c.next(),
                head: c.next(),
                thigh_l: c.next(),
                shin_l: c.next(),
                foot_l: c.next(),
                thigh_r: c.next(),
                shin_r: c.next(),
                foot_r: c.next(),
                arm_l: c.next(),
                forearm_l: c.next(),
                arm_r: c.next(),
                forearm_r: c.next(),
            },
        })
    }

    pub fn to_flat(&self) -> Vec<f32> {
        let mut flat = Vec::with_capacity(ACTION_SIZE);
        for (part, target) in self.joint_targets() {
            flat.extend_from_slice(&target[..part.degrees_of_freedom()]);
        }
        flat.extend(self.joint_strengths().iter().map(|(_, s)| *s));
        flat
    }
}

/// IO interface between the joint-drive controller and the policy
pub struct WalkerIO;

impl WalkerIO {
    /// Sense the walker's current state. Pure read of controller and reference state.
    pub fn sense<C, R>(controller: &C, reference: &R) -> Result<WalkerObservation>
    where
        C: JointDriveController + ?Sized,
        R: OrientationReference + ?Sized,
    {
        let reference_forward = reference.forward();
        let hips = controller.body_state(BodyPartName::Hips)?;
        let head = controller.body_state(BodyPartName::Head)?;
        let max_force = controller.max_joint_force_limit();

        let parts = controller
            .body_parts()
            .iter()
            .map(|&part| {
                let state = controller.body_state(part)?;
                let joint = if part.is_actuated() {
                    Some(JointSense {
                        local_rotation: state.local_rotation,
                        normalized_strength: controller.current_strength(part)? / max_force,
                    })
                } else {
                    None
                };
                Ok(BodyPartSense {
                    part,
                    touching_ground: controller.touching_ground(part)?,
                    velocity: reference.inverse_transform_direction(&state.velocity),
                    angular_velocity: reference.inverse_transform_direction(&state.angular_velocity),
                    relative_position: reference
                        .inverse_transform_direction(&(state.position - hips.position)),
                    joint,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(WalkerObservation {
            hips_alignment: from_to_rotation(&hips.forward(), &reference_forward),
            head_alignment: from_to_rotation(&head.forward(), &reference_forward),
            parts,
        })
    }

    /// Send every joint target, then every joint strength, to the controller
    pub fn apply_action<C>(action: &WalkerAction, controller: &mut C) -> Result<()>
    where
        C: JointDriveController + ?Sized,
    {
        for (part, [x, y, z]) in action.joint_targets() {
            controller.set_joint_target_rotation(part, x, y, z)?;
        }
        for (part, strength) in action.joint_strengths() {
            controller.set_joint_strength(part, strength)?;
        }
        Ok(())
    }

    pub fn observation_size() -> usize {
        OBSERVATION_SIZE
    }

    pub fn action_size() -> usize {
        ACTION_SIZE
    }
}
