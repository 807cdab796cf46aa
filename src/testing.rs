//! In-memory joint-drive controller that records what the agent does to it.

use std::collections::HashMap;

use rapier3d::na::{UnitQuaternion, Vector3};

use crate::body_part::BodyPartName;
use crate::controller::{joint_strength_force, JointDriveController};
use crate::error::{Result, WalkerError};
use crate::physics::RigidBodySnapshot;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Target(BodyPartName, [f32; 3]),
    Strength(BodyPartName, f32),
}

#[derive(Debug, Clone)]
struct MockRecord {
    state: RigidBodySnapshot,
    start: RigidBodySnapshot,
    strength: f32,
    touching_ground: bool,
    resets: usize,
}

#[derive(Debug, Clone)]
pub struct MockJointDrive {
    order: Vec<BodyPartName>,
    records: HashMap<BodyPartName, MockRecord>,
    root_rotation: UnitQuaternion<f32>,
    max_force: f32,
    calls: Vec<Call>,
}

impl Default for MockJointDrive {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            records: HashMap::new(),
            root_rotation: UnitQuaternion::identity(),
            max_force: 20_000.0,
            calls: Vec::new(),
        }
    }
}

impl MockJointDrive {
    /// A controller with every part registered, stacked one unit apart.
    pub fn registered() -> Self {
        let mut controller = Self::default();
        for part in BodyPartName::ALL {
            controller.setup_body_part(part).unwrap();
        }
        controller
    }

    fn record_mut(&mut self, part: BodyPartName) -> Result<&mut MockRecord> {
        self.records
            .get_mut(&part)
            .ok_or(WalkerError::UnregisteredBodyPart(part))
    }

    fn record(&self, part: BodyPartName) -> Result<&MockRecord> {
        self.records.get(&part).ok_or(WalkerError::UnregisteredBodyPart(part))
    }

    pub fn set_state(&mut self, part: BodyPartName, state: RigidBodySnapshot) {
        self.record_mut(part).unwrap().state = state;
    }

    pub fn state_mut(&mut self, part: BodyPartName) -> &mut RigidBodySnapshot {
        &mut self.record_mut(part).unwrap().state
    }

    pub fn set_touching(&mut self, part: BodyPartName, touching: bool) {
        self.record_mut(part).unwrap().touching_ground = touching;
    }

    pub fn set_strength(&mut self, part: BodyPartName, strength: f32) {
        self.record_mut(part).unwrap().strength = strength;
    }

    pub fn mass(&self, part: BodyPartName) -> f32 {
        self.record(part).unwrap().state.mass
    }

    pub fn resets(&self, part: BodyPartName) -> usize {
        self.record(part).unwrap().resets
    }

    pub fn root_rotation(&self) -> UnitQuaternion<f32> {
        self.root_rotation
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }
}

impl JointDriveController for MockJointDrive {
    fn setup_body_part(&mut self, part: BodyPartName) -> Result<()> {
        if self.records.contains_key(&part) {
            return Ok(());
        }
        let height = self.order.len() as f32;
        let state = RigidBodySnapshot::at_rest(Vector3::new(0.0, height, 0.0));
        self.records.insert(
            part,
            MockRecord {
                start: state.clone(),
                state,
                strength: 0.0,
                touching_ground: false,
                resets: 0,
            },
        );
        self.order.push(part);
        Ok(())
    }

    fn body_parts(&self) -> &[BodyPartName] {
        &self.order
    }

    fn reset_body_part(&mut self, part: BodyPartName) -> Result<()> {
        let record = self.record_mut(part)?;
        let mass = record.state.mass;
        record.state = RigidBodySnapshot {
            mass,
            ..record.start.clone()
        };
        record.touching_ground = false;
        record.resets += 1;
        Ok(())
    }

    fn set_root_rotation(&mut self, rotation: UnitQuaternion<f32>) {
        self.root_rotation = rotation;
    }

    fn body_state(&self, part: BodyPartName) -> Result<RigidBodySnapshot> {
        Ok(self.record(part)?.state.clone())
    }

    fn touching_ground(&self, part: BodyPartName) -> Result<bool> {
        Ok(self.record(part)?.touching_ground)
    }

    fn current_strength(&self, part: BodyPartName) -> Result<f32> {
        Ok(self.record(part)?.strength)
    }

    fn max_joint_force_limit(&self) -> f32 {
        self.max_force
    }

    fn set_joint_target_rotation(&mut self, part: BodyPartName, x: f32, y: f32, z: f32) -> Result<()> {
        self.record(part)?;
        self.calls.push(Call::Target(part, [x, y, z]));
        Ok(())
    }

    fn set_joint_strength(&mut self, part: BodyPartName, strength: f32) -> Result<()> {
        let force = joint_strength_force(strength, self.max_force);
        self.record_mut(part)?.strength = force;
        self.calls.push(Call::Strength(part, strength));
        Ok(())
    }

    fn set_mass(&mut self, part: BodyPartName, mass: f32) -> Result<()> {
        self.record_mut(part)?.state.mass = mass;
        Ok(())
    }
}
