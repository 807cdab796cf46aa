use rapier3d::na::{Unit, UnitQuaternion, Vector3};
use rapier3d::prelude::Real;

// Simulation constants
pub const FIXED_TIME_STEP: Real = 1.0 / 60.0;
pub const GRAVITY: Real = -9.81;

// World constants
pub const FLOOR_HALF_EXTENTS: [Real; 3] = [50.0, 0.1, 50.0];
pub const FLOOR_HEIGHT: Real = -0.1;

// Walker spawn
pub const WALKER_SPAWN_HEIGHT: Real = 0.0;

/// Point-in-time view of one body part, in world space unless noted.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBodySnapshot {
    pub position: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    /// Rotation relative to the parent segment (the agent root for the hips).
    pub local_rotation: UnitQuaternion<f32>,
    pub velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
    pub mass: f32,
}

impl RigidBodySnapshot {
    /// A body at rest at `position` with identity orientation.
    pub fn at_rest(position: Vector3<f32>) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::identity(),
            local_rotation: UnitQuaternion::identity(),
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            mass: 1.0,
        }
    }

    /// Local +Z axis expressed in world space.
    pub fn forward(&self) -> Vector3<f32> {
        self.rotation * Vector3::z()
    }
}

/// Rotation that takes direction `from` onto direction `to`.
///
/// Antiparallel inputs produce a half turn about an axis perpendicular to `from`.
pub fn from_to_rotation(from: &Vector3<f32>, to: &Vector3<f32>) -> UnitQuaternion<f32> {
    if let Some(rotation) = UnitQuaternion::rotation_between(from, to) {
        return rotation;
    }
    if from.norm_squared() == 0.0 || to.norm_squared() == 0.0 {
        return UnitQuaternion::identity();
    }
    let mut axis = from.cross(&Vector3::x());
    if axis.norm_squared() < 1.0e-6 {
        axis = from.cross(&Vector3::y());
    }
    UnitQuaternion::from_axis_angle(&Unit::new_normalize(axis), std::f32::consts::PI)
}

/// Scales `v` down so its length does not exceed `max_length`.
pub fn clamp_magnitude(v: &Vector3<f32>, max_length: f32) -> Vector3<f32> {
    let length = v.norm();
    if length > max_length {
        v * (max_length / length)
    } else {
        *v
    }
}

/// Quaternion components in (x, y, z, w) order.
pub fn quaternion_components(q: &UnitQuaternion<f32>) -> [f32; 4] {
    [q.i, q.j, q.k, q.w]
}
