use std::collections::HashMap;

use rapier3d::na::{Isometry3, Translation3, UnitQuaternion};
use rapier3d::prelude::*;

use crate::body_part::BodyPartName;
use crate::controller::{JointDriveSettings, JointLimits};

// Walker dimensions (half extents for boxes), y up, z forward, left is -x
pub const HIPS_HALF: [Real; 3] = [0.15, 0.1, 0.1];
pub const SPINE_HALF: [Real; 3] = [0.15, 0.1, 0.1];
pub const CHEST_HALF: [Real; 3] = [0.17, 0.12, 0.1];
pub const HEAD_RADIUS: Real = 0.12;
pub const THIGH_HALF: [Real; 3] = [0.07, 0.2, 0.07];
pub const SHIN_HALF: [Real; 3] = [0.06, 0.2, 0.06];
pub const FOOT_HALF: [Real; 3] = [0.06, 0.04, 0.12];
pub const ARM_HALF: [Real; 3] = [0.05, 0.14, 0.05];
pub const FOREARM_HALF: [Real; 3] = [0.045, 0.13, 0.045];
pub const HAND_RADIUS: Real = 0.05;

pub const HIP_WIDTH: Real = 0.1;
pub const SHOULDER_WIDTH: Real = 0.25;

// Walker physics properties
pub const WALKER_LINEAR_DAMPING: Real = 0.05;
pub const WALKER_ANGULAR_DAMPING: Real = 0.05;
pub const LIMB_FRICTION: Real = 0.9;

#[derive(Debug, Clone)]
pub enum WalkerPartShape {
    Ball { radius: Real },
    Cuboid { half_extents: [Real; 3] },
}

/// Static description of one segment: where it spawns and how it attaches.
#[derive(Debug, Clone)]
pub struct SegmentSpec {
    pub part: BodyPartName,
    /// Center offset from the walker origin
    pub center: Vector<Real>,
    pub shape: WalkerPartShape,
    pub mass: Real,
    /// Joint anchor in walker space, for segments with a parent
    pub anchor: Vector<Real>,
    pub limits: JointLimits,
}

#[derive(Debug, Clone)]
pub struct WalkerPart {
    pub name: BodyPartName,
    pub handle: RigidBodyHandle,
    pub collider: ColliderHandle,
    pub joint: Option<ImpulseJointHandle>,
    pub limits: JointLimits,
    pub mass: Real,
}

/// The spawned walker skeleton.
#[derive(Debug)]
pub struct Walker {
    origin: Vector<Real>,
    parts: HashMap<BodyPartName, WalkerPart>,
}

fn v(x: Real, y: Real, z: Real) -> Vector<Real> {
    vector![x, y, z]
}

fn segment(
    part: BodyPartName,
    center: Vector<Real>,
    shape: WalkerPartShape,
    mass: Real,
    anchor: Vector<Real>,
    limits: JointLimits,
) -> SegmentSpec {
    SegmentSpec {
        part,
        center,
        shape,
        mass,
        anchor,
        limits,
    }
}

/// Skeleton layout relative to the walker origin, which sits on the floor.
pub fn segment_specs() -> Vec<SegmentSpec> {
    use BodyPartName::*;
    use WalkerPartShape::{Ball, Cuboid};

    let mut specs = vec![
        segment(Hips, v(0.0, 1.0, 0.0), Cuboid { half_extents: HIPS_HALF }, 8.0, v(0.0, 1.0, 0.0), JointLimits::LOCKED),
        segment(Spine, v(0.0, 1.22, 0.0), Cuboid { half_extents: SPINE_HALF }, 8.0, v(0.0, 1.11, 0.0), JointLimits::new(-20.0, 20.0, 20.0, 15.0)),
        segment(Chest, v(0.0, 1.46, 0.0), Cuboid { half_extents: CHEST_HALF }, 8.0, v(0.0, 1.33, 0.0), JointLimits::new(-20.0, 20.0, 20.0, 15.0)),
        segment(Head, v(0.0, 1.72, 0.0), Ball { radius: HEAD_RADIUS }, 4.0, v(0.0, 1.59, 0.0), JointLimits::new(-30.0, 30.0, 30.0, 0.0)),
    ];

    for (thigh, shin, foot, side) in [(ThighL, ShinL, FootL, -1.0), (ThighR, ShinR, FootR, 1.0)] {
        let x = side * HIP_WIDTH;
        specs.push(segment(thigh, v(x, 0.7, 0.0), Cuboid { half_extents: THIGH_HALF }, 4.0, v(x, 0.9, 0.0), JointLimits::new(-90.0, 45.0, 30.0, 0.0)));
        specs.push(segment(shin, v(x, 0.3, 0.0), Cuboid { half_extents: SHIN_HALF }, 3.0, v(x, 0.5, 0.0), JointLimits::new(0.0, 120.0, 0.0, 0.0)));
        specs.push(segment(foot, v(x, 0.05, 0.04), Cuboid { half_extents: FOOT_HALF }, 1.5, v(x, 0.1, 0.0), JointLimits::new(-30.0, 30.0, 20.0, 20.0)));
    }

    for (arm, forearm, hand, side) in [(ArmL, ForearmL, HandL, -1.0), (ArmR, ForearmR, HandR, 1.0)] {
        let x = side * SHOULDER_WIDTH;
        specs.push(segment(arm, v(x, 1.36, 0.0), Cuboid { half_extents: ARM_HALF }, 2.0, v(x, 1.5, 0.0), JointLimits::new(-90.0, 90.0, 45.0, 0.0)));
        specs.push(segment(forearm, v(x, 1.07, 0.0), Cuboid { half_extents: FOREARM_HALF }, 1.5, v(x, 1.21, 0.0), JointLimits::new(-120.0, 0.0, 0.0, 0.0)));
        specs.push(segment(hand, v(x, 0.88, 0.0), Ball { radius: HAND_RADIUS }, 0.5, v(x, 0.94, 0.0), JointLimits::LOCKED));
    }

    specs
}

impl Walker {
    pub fn spawn(
        origin: Vector<Real>,
        drive: &JointDriveSettings,
        rigid_body_set: &mut RigidBodySet,
        collider_set: &mut ColliderSet,
        impulse_joint_set: &mut ImpulseJointSet,
    ) -> Self {
        let specs = segment_specs();
        let centers: HashMap<BodyPartName, Vector<Real>> =
            specs.iter().map(|s| (s.part, s.center)).collect();
        let mut parts: HashMap<BodyPartName, WalkerPart> = HashMap::new();

        // Parents precede children in the segment list.
        for spec in specs {
            let (handle, collider) = Self::insert_part(origin, &spec, rigid_body_set, collider_set);
            let joint = spec.part.parent().and_then(|parent| parts.get(&parent)).map(|parent| {
                Self::motor_joint(
                    impulse_joint_set,
                    parent.handle,
                    handle,
                    Point::from(spec.anchor - centers[&parent.name]),
                    Point::from(spec.anchor - spec.center),
                    &spec.limits,
                    drive,
                )
            });
            parts.insert(
                spec.part,
                WalkerPart {
                    name: spec.part,
                    handle,
                    collider,
                    joint,
                    limits: spec.limits,
                    mass: spec.mass,
                },
            );
        }

        Self { origin, parts }
    }

    pub fn origin(&self) -> Vector<Real> {
        self.origin
    }

    pub fn part(&self, name: BodyPartName) -> Option<&WalkerPart> {
        self.parts.get(&name)
    }

    fn insert_part(
        origin: Vector<Real>,
        spec: &SegmentSpec,
        rigid_body_set: &mut RigidBodySet,
        collider_set: &mut ColliderSet,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let body = RigidBodyBuilder::dynamic()
            .translation(origin + spec.center)
            .linear_damping(WALKER_LINEAR_DAMPING)
            .angular_damping(WALKER_ANGULAR_DAMPING)
            .build();
        let handle = rigid_body_set.insert(body);
        let builder = match spec.shape {
            WalkerPartShape::Ball { radius } => ColliderBuilder::ball(radius).restitution(0.1),
            WalkerPartShape::Cuboid { half_extents: [hx, hy, hz] } => ColliderBuilder::cuboid(hx, hy, hz),
        };
        let collider = builder.mass(spec.mass).friction(LIMB_FRICTION).build();
        let collider = collider_set.insert_with_parent(collider, handle, rigid_body_set);
        (handle, collider)
    }

    fn motor_joint(
        impulse_joint_set: &mut ImpulseJointSet,
        parent: RigidBodyHandle,
        child: RigidBodyHandle,
        anchor_parent: Point<Real>,
        anchor_child: Point<Real>,
        limits: &JointLimits,
        drive: &JointDriveSettings,
    ) -> ImpulseJointHandle {
        let frame = |anchor: Point<Real>| {
            Isometry3::from_parts(Translation3::from(anchor.coords), UnitQuaternion::identity())
        };
        let joint = SphericalJointBuilder::new()
            .local_frame1(frame(anchor_parent))
            .local_frame2(frame(anchor_child))
            .contacts_enabled(false)
            .limits(JointAxis::AngX, [limits.low_x.to_radians(), limits.high_x.to_radians()])
            .limits(JointAxis::AngY, [-limits.y.to_radians(), limits.y.to_radians()])
            .limits(JointAxis::AngZ, [-limits.z.to_radians(), limits.z.to_radians()]);
        let handle = impulse_joint_set.insert(parent, child, joint, true);
        if let Some(joint) = impulse_joint_set.get_mut(handle, false) {
            for axis in [JointAxis::AngX, JointAxis::AngY, JointAxis::AngZ] {
                joint.data.set_motor_model(axis, MotorModel::ForceBased);
                joint
                    .data
                    .set_motor_position(axis, 0.0, drive.max_joint_spring, drive.joint_dampen);
                joint.data.set_motor_max_force(axis, drive.max_joint_force_limit);
            }
        }
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specs_cover_every_part_once() {
        let specs = segment_specs();
        assert_eq!(specs.len(), 16);
        for part in BodyPartName::ALL {
            assert_eq!(specs.iter().filter(|s| s.part == part).count(), 1, "{part}");
        }
    }

    #[test]
    fn test_parents_spawn_before_children() {
        let specs = segment_specs();
        for (i, spec) in specs.iter().enumerate() {
            if let Some(parent) = spec.part.parent() {
                let parent_index = specs.iter().position(|s| s.part == parent).unwrap();
                assert!(parent_index < i, "{} spawns before {}", spec.part, parent);
            }
        }
    }

    #[test]
    fn test_limits_follow_degrees_of_freedom() {
        for spec in segment_specs() {
            let l = spec.limits;
            let free_axes = [l.low_x != 0.0 || l.high_x != 0.0, l.y != 0.0, l.z != 0.0]
                .iter()
                .filter(|free| **free)
                .count();
            assert_eq!(free_axes, spec.part.degrees_of_freedom(), "{}", spec.part);
        }
    }

    #[test]
    fn test_spawn_creates_joint_per_child() {
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let mut joints = ImpulseJointSet::new();
        let walker = Walker::spawn(
            Vector::zeros(),
            &JointDriveSettings::default(),
            &mut bodies,
            &mut colliders,
            &mut joints,
        );
        assert_eq!(bodies.len(), 16);
        assert_eq!(colliders.len(), 16);
        assert_eq!(joints.len(), 15);
        assert!(walker.part(BodyPartName::Hips).unwrap().joint.is_none());
        assert!(walker.part(BodyPartName::HandL).unwrap().joint.is_some());
    }
}
