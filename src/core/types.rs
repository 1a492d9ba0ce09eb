use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Rigid pose: position and orientation of a frame expressed in a parent frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation,
        }
    }

    /// Maps a point from this frame into the parent frame.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }

    /// Rotates a direction from this frame into the parent frame.
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * vector
    }

    pub fn inverse(&self) -> Transform {
        let rotation = self.rotation.inverse();
        Transform {
            position: -(rotation * self.position),
            rotation,
        }
    }

    /// Composition `self ∘ other`: `other` is expressed in this frame.
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * other.position,
            rotation: (self.rotation * other.rotation).normalize(),
        }
    }

    pub fn rotation_matrix(&self) -> Mat3 {
        Mat3::from_quat(self.rotation)
    }
}

/// Linear and angular velocity of a rigid body.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl Velocity {
    pub fn new(linear: Vec3, angular: Vec3) -> Self {
        Self { linear, angular }
    }

    /// Velocity of a point rigidly attached to the body, `arm` measured from the CG.
    pub fn at_point(&self, arm: Vec3) -> Vec3 {
        self.linear + self.angular.cross(arm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn inverse_round_trips_points() {
        let t = Transform::from_position_rotation(
            Vec3::new(1.0, -2.0, 0.5),
            Quat::from_rotation_y(0.7) * Quat::from_rotation_x(-0.3),
        );
        let p = Vec3::new(0.3, 0.2, -1.1);
        let back = t.inverse().transform_point(t.transform_point(p));
        assert_relative_eq!(back.x, p.x, epsilon = 1e-5);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-5);
        assert_relative_eq!(back.z, p.z, epsilon = 1e-5);
    }

    #[test]
    fn combine_applies_child_in_parent_frame() {
        let parent = Transform::from_position_rotation(
            Vec3::new(0.0, 1.0, 0.0),
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
        );
        let child = Transform::from_position(Vec3::X);
        let world = parent.combine(&child);
        assert_relative_eq!(world.position.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(world.position.y, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn point_velocity_includes_rotation() {
        let v = Velocity::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        let at = v.at_point(Vec3::X);
        assert_relative_eq!(at.z, -1.0, epsilon = 1e-6);
    }
}
