use std::collections::HashMap;

use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::*;
use tracing::debug;

use crate::body_part::BodyPartName;
use crate::controller::{joint_strength_force, joint_target_angles, JointDriveController, JointDriveSettings};
use crate::error::{Result, WalkerError};
use crate::physics::{RigidBodySnapshot, FIXED_TIME_STEP, FLOOR_HALF_EXTENTS, FLOOR_HEIGHT, GRAVITY, WALKER_SPAWN_HEIGHT};
use crate::walker::Walker;

/// Controller-side state of a registered body part.
#[derive(Debug, Clone)]
struct BodyPartRecord {
    handle: RigidBodyHandle,
    collider: ColliderHandle,
    current_strength: f32,
    touching_ground: bool,
    mass: f32,
    starting_position: Vector<Real>,
    starting_rotation: UnitQuaternion<Real>,
}

/// Rapier world hosting one walker. Acts as the walker's joint-drive controller.
pub struct SimulationWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    floor_collider: ColliderHandle,
    walker: Walker,
    drive: JointDriveSettings,
    root_rotation: UnitQuaternion<Real>,
    registry: Vec<BodyPartName>,
    records: HashMap<BodyPartName, BodyPartRecord>,
    time: Real,
}

impl SimulationWorld {
    pub fn new(drive: JointDriveSettings) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = FIXED_TIME_STEP;

        let gravity = vector![0.0, GRAVITY, 0.0];

        let mut rigid_body_set = RigidBodySet::new();
        let mut collider_set = ColliderSet::new();
        let mut impulse_joint_set = ImpulseJointSet::new();

        // Static floor.
        let floor_body = RigidBodyBuilder::fixed()
            .translation(vector![0.0, FLOOR_HEIGHT, 0.0])
            .build();
        let floor_handle = rigid_body_set.insert(floor_body);
        let floor_collider = ColliderBuilder::cuboid(
            FLOOR_HALF_EXTENTS[0],
            FLOOR_HALF_EXTENTS[1],
            FLOOR_HALF_EXTENTS[2],
        )
        .restitution(0.0)
        .friction(0.9)
        .build();
        let floor_collider = collider_set.insert_with_parent(floor_collider, floor_handle, &mut rigid_body_set);

        // Walker rig.
        let walker = Walker::spawn(
            vector![0.0, WALKER_SPAWN_HEIGHT, 0.0],
            &drive,
            &mut rigid_body_set,
            &mut collider_set,
            &mut impulse_joint_set,
        );

        Self {
            pipeline: PhysicsPipeline::new(),
            gravity,
            integration_parameters,
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set,
            collider_set,
            impulse_joint_set,
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            floor_collider,
            walker,
            drive,
            root_rotation: UnitQuaternion::identity(),
            registry: Vec::with_capacity(BodyPartName::ALL.len()),
            records: HashMap::new(),
            time: 0.0,
        }
    }

    /// Advance one physics tick and refresh ground contact.
    pub fn step(&mut self) {
        let physics_hooks = ();
        let event_handler = ();
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &physics_hooks,
            &event_handler,
        );
        self.time += self.integration_parameters.dt;

        for record in self.records.values_mut() {
            record.touching_ground = self
                .narrow_phase
                .contact_pair(record.collider, self.floor_collider)
                .is_some_and(|pair| pair.has_any_active_contact);
        }
    }

    pub fn time(&self) -> Real {
        self.time
    }

    fn record_for(&self, part: BodyPartName) -> Result<&BodyPartRecord> {
        self.records.get(&part).ok_or(WalkerError::UnregisteredBodyPart(part))
    }

    fn rotation_of(&self, part: BodyPartName) -> Option<UnitQuaternion<Real>> {
        let record = self.records.get(&part)?;
        self.rigid_body_set.get(record.handle).map(|body| *body.rotation())
    }

    // Hands hang from locked joints that the agent never drives.
    fn joint_for(&mut self, part: BodyPartName) -> Result<&mut ImpulseJoint> {
        if !part.is_actuated() {
            return Err(WalkerError::NotActuated(part));
        }
        let joint = self
            .walker
            .part(part)
            .and_then(|p| p.joint)
            .ok_or(WalkerError::NotActuated(part))?;
        self.impulse_joint_set
            .get_mut(joint, true)
            .ok_or(WalkerError::UnregisteredBodyPart(part))
    }
}

impl JointDriveController for SimulationWorld {
    fn setup_body_part(&mut self, part: BodyPartName) -> Result<()> {
        if self.records.contains_key(&part) {
            return Ok(());
        }
        let spawned = self
            .walker
            .part(part)
            .ok_or(WalkerError::UnregisteredBodyPart(part))?;
        let body = self
            .rigid_body_set
            .get(spawned.handle)
            .ok_or(WalkerError::UnregisteredBodyPart(part))?;

        let record = BodyPartRecord {
            handle: spawned.handle,
            collider: spawned.collider,
            current_strength: self.drive.max_joint_force_limit,
            touching_ground: false,
            mass: spawned.mass,
            starting_position: *body.translation(),
            starting_rotation: *body.rotation(),
        };
        debug!(%part, mass = record.mass, "registered body part");
        self.records.insert(part, record);
        self.registry.push(part);
        Ok(())
    }

    fn body_parts(&self) -> &[BodyPartName] {
        &self.registry
    }

    fn reset_body_part(&mut self, part: BodyPartName) -> Result<()> {
        let record = self
            .records
            .get_mut(&part)
            .ok_or(WalkerError::UnregisteredBodyPart(part))?;
        record.touching_ground = false;
        if let Some(body) = self.rigid_body_set.get_mut(record.handle) {
            body.set_translation(record.starting_position, true);
            body.set_rotation(record.starting_rotation, true);
            body.set_linvel(Vector::zeros(), true);
            body.set_angvel(Vector::zeros(), true);
        }
        Ok(())
    }

    // Rotates the starting pose, so it is only meaningful right after a reset.
    fn set_root_rotation(&mut self, rotation: UnitQuaternion<f32>) {
        let origin = self.walker.origin();
        for part in &self.registry {
            let Some(record) = self.records.get(part) else {
                continue;
            };
            if let Some(body) = self.rigid_body_set.get_mut(record.handle) {
                let offset = record.starting_position - origin;
                body.set_translation(origin + rotation * offset, true);
                body.set_rotation(rotation * record.starting_rotation, true);
            }
        }
        self.root_rotation = rotation;
    }

    fn body_state(&self, part: BodyPartName) -> Result<RigidBodySnapshot> {
        let record = self.record_for(part)?;
        let body = self
            .rigid_body_set
            .get(record.handle)
            .ok_or(WalkerError::UnregisteredBodyPart(part))?;

        let rotation = *body.rotation();
        let parent_rotation = match part.parent() {
            Some(parent) => self.rotation_of(parent).unwrap_or(self.root_rotation),
            None => self.root_rotation,
        };

        Ok(RigidBodySnapshot {
            position: *body.translation(),
            rotation,
            local_rotation: parent_rotation.inverse() * rotation,
            velocity: *body.linvel(),
            angular_velocity: *body.angvel(),
            mass: record.mass,
        })
    }

    fn touching_ground(&self, part: BodyPartName) -> Result<bool> {
        Ok(self.record_for(part)?.touching_ground)
    }

    fn current_strength(&self, part: BodyPartName) -> Result<f32> {
        Ok(self.record_for(part)?.current_strength)
    }

    fn max_joint_force_limit(&self) -> f32 {
        self.drive.max_joint_force_limit
    }

    fn set_joint_target_rotation(&mut self, part: BodyPartName, x: f32, y: f32, z: f32) -> Result<()> {
        self.record_for(part)?;
        let limits = self
            .walker
            .part(part)
            .map(|p| p.limits)
            .ok_or(WalkerError::UnregisteredBodyPart(part))?;
        let [ax, ay, az] = joint_target_angles(&limits, x, y, z);
        let drive = self.drive;

        let joint = self.joint_for(part)?;
        for (axis, degrees) in [(JointAxis::AngX, ax), (JointAxis::AngY, ay), (JointAxis::AngZ, az)] {
            joint
                .data
                .set_motor_position(axis, degrees.to_radians(), drive.max_joint_spring, drive.joint_dampen);
        }
        Ok(())
    }

    fn set_joint_strength(&mut self, part: BodyPartName, strength: f32) -> Result<()> {
        self.record_for(part)?;
        let force = joint_strength_force(strength, self.drive.max_joint_force_limit);

        let joint = self.joint_for(part)?;
        for axis in [JointAxis::AngX, JointAxis::AngY, JointAxis::AngZ] {
            joint.data.set_motor_max_force(axis, force);
        }
        if let Some(record) = self.records.get_mut(&part) {
            record.current_strength = force;
        }
        Ok(())
    }

    fn set_mass(&mut self, part: BodyPartName, mass: f32) -> Result<()> {
        let record = self
            .records
            .get_mut(&part)
            .ok_or(WalkerError::UnregisteredBodyPart(part))?;
        if let Some(collider) = self.collider_set.get_mut(record.collider) {
            collider.set_mass(mass);
        }
        record.mass = mass;
        Ok(())
    }
}
