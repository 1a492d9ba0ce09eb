use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::{SPIN_DAMPING_FACTOR, STRIBECK_SHARPNESS};
use crate::core::material::{MaterialId, MaterialTable};

/// One side of a contact as seen by the friction model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactBody {
    pub material: MaterialId,
    /// Velocity of the body at the contact point.
    pub point_velocity: Vec3,
    pub angular_velocity: Vec3,
}

/// Coefficients the solver uses for one contact point.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ContactCoefficients {
    pub static_friction: f32,
    pub dynamic_friction: f32,
    /// Friction after blending static and dynamic by slip speed.
    pub combined_friction: f32,
    pub rolling_friction: f32,
    pub restitution: f32,
    /// Tangential relative velocity `b - a`; `None` when a side is missing.
    pub slip: Option<Vec3>,
}

/// Velocity-dependent Coulomb friction with a smooth static/dynamic transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactFrictionModel {
    /// How quickly friction drops from static to dynamic as slip grows.
    pub sharpness: f32,
    pub spin_damping: f32,
}

impl Default for ContactFrictionModel {
    fn default() -> Self {
        Self {
            sharpness: STRIBECK_SHARPNESS,
            spin_damping: SPIN_DAMPING_FACTOR,
        }
    }
}

impl ContactFrictionModel {
    /// Coefficients for a contact with unit `normal` (pointing from `a` to `b`).
    pub fn evaluate(
        &self,
        materials: &MaterialTable,
        a: Option<&ContactBody>,
        b: Option<&ContactBody>,
        normal: Vec3,
    ) -> ContactCoefficients {
        let (Some(a), Some(b)) = (a, b) else {
            return ContactCoefficients::default();
        };

        let pair = materials.friction(a.material, b.material);
        let slip = project_onto_tangent(b.point_velocity - a.point_velocity, normal);
        ContactCoefficients {
            static_friction: pair.static_friction,
            dynamic_friction: pair.dynamic_friction,
            combined_friction: self.blend(
                pair.static_friction,
                pair.dynamic_friction,
                slip.length(),
            ),
            rolling_friction: 0.0,
            restitution: materials.restitution(a.material, b.material),
            slip: Some(slip),
        }
    }

    /// `(fs - fd) / (σ·|slip|² + 1) + fd`: static at rest, tending to dynamic.
    pub fn blend(&self, static_friction: f32, dynamic_friction: f32, slip_speed: f32) -> f32 {
        (static_friction - dynamic_friction) / (self.sharpness * slip_speed * slip_speed + 1.0)
            + dynamic_friction
    }

    /// Torque resisting spin about the contact normal.
    ///
    /// Magnitude is `combined · normal_impulse · steps_per_second · spin_damping`, directed
    /// against the component of `angular_velocity` along `normal`.
    pub fn spin_damping_torque(
        &self,
        combined_friction: f32,
        normal_impulse: f32,
        steps_per_second: f32,
        angular_velocity: Vec3,
        normal: Vec3,
    ) -> Vec3 {
        let twist = angular_velocity.dot(normal);
        if twist.abs() <= f32::EPSILON {
            return Vec3::ZERO;
        }
        let magnitude =
            combined_friction * normal_impulse.max(0.0) * steps_per_second * self.spin_damping;
        -normal * (magnitude * twist.signum())
    }
}

pub(crate) fn project_onto_tangent(vector: Vec3, normal: Vec3) -> Vec3 {
    vector - normal * vector.dot(normal)
}

pub(crate) fn orthogonal_to_normal(normal: Vec3) -> Vec3 {
    let mut tangent = normal.cross(Vec3::X);
    if tangent.length_squared() <= 1e-6 {
        tangent = normal.cross(Vec3::Y);
    }
    tangent.normalize_or_zero()
}
