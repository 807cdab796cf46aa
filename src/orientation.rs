use rapier3d::na::{UnitQuaternion, Vector3};

/// Stabilized frame used to express observations independently of the
/// ragdoll's own, erratic, orientation.
pub trait OrientationReference {
    fn forward(&self) -> Vector3<f32>;

    /// Express a world-space direction in this frame's local coordinates.
    fn inverse_transform_direction(&self, direction: &Vector3<f32>) -> Vector3<f32>;
}

/// Frame that sits at the walker's root and looks horizontally toward the
/// walk target.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationCube {
    position: Vector3<f32>,
    rotation: UnitQuaternion<f32>,
}

impl Default for OrientationCube {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }
}

impl OrientationCube {
    pub fn new(position: Vector3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self { position, rotation }
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    /// Move to `root_position` and turn toward `target_position`, ignoring
    /// height. Keeps the current heading when the target is straight above
    /// or below.
    pub fn update_orientation(&mut self, root_position: Vector3<f32>, target_position: Vector3<f32>) {
        let mut direction = target_position - self.position;
        direction.y = 0.0;
        if direction.norm_squared() > f32::EPSILON {
            self.rotation = UnitQuaternion::face_towards(&direction, &Vector3::y());
        }
        self.position = root_position;
    }
}

impl OrientationReference for OrientationCube {
    fn forward(&self) -> Vector3<f32> {
        self.rotation * Vector3::z()
    }

    fn inverse_transform_direction(&self, direction: &Vector3<f32>) -> Vector3<f32> {
        self.rotation.inverse_transform_vector(direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_faces_positive_z() {
        let cube = OrientationCube::default();
        assert_relative_eq!(cube.forward(), Vector3::z());
    }

    #[test]
    fn test_update_orientation_looks_at_target_horizontally() {
        let mut cube = OrientationCube::default();
        cube.update_orientation(Vector3::new(0.0, 1.0, 0.0), Vector3::new(10.0, 5.0, 0.0));
        assert_relative_eq!(cube.forward(), Vector3::x(), epsilon = 1.0e-6);
        assert_relative_eq!(cube.position(), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_update_orientation_keeps_heading_for_target_overhead() {
        let mut cube = OrientationCube::default();
        cube.update_orientation(Vector3::zeros(), Vector3::new(0.0, 0.0, -4.0));
        let heading = cube.forward();
        cube.update_orientation(Vector3::zeros(), Vector3::new(0.0, 9.0, 0.0));
        assert_relative_eq!(cube.forward(), heading, epsilon = 1.0e-6);
    }

    #[test]
    fn test_inverse_transform_direction() {
        let cube = OrientationCube::new(
            Vector3::zeros(),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f32::consts::FRAC_PI_2),
        );
        // Cube forward is world +X, so world +X is local +Z.
        let local = cube.inverse_transform_direction(&Vector3::x());
        assert_relative_eq!(local, Vector3::z(), epsilon = 1.0e-6);
    }
}
