use glam::{Mat3, Vec3};

use crate::dynamics::engine::RigidBodyDesc;

use super::material::MaterialId;
use super::mesh::Aabb;
use super::types::{Transform, Velocity};

/// Rigid body state owned by the reference engine. The transform is the CG frame.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub transform: Transform,
    pub velocity: Velocity,
    pub force: Vec3,
    pub torque: Vec3,
    pub material: MaterialId,
    pub contact_points: Vec<Vec3>,
    pub local_bounds: Aabb,
    pub is_static: bool,
    mass: f32,
    inverse_mass: f32,
    inverse_inertia_local: Vec3,
}

impl RigidBody {
    pub fn from_desc(desc: RigidBodyDesc) -> Self {
        let mut body = Self {
            transform: desc.transform,
            velocity: desc.velocity,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            material: desc.material,
            contact_points: desc.contact_points,
            local_bounds: desc.local_bounds,
            is_static: desc.is_static,
            mass: desc.mass,
            inverse_mass: 0.0,
            inverse_inertia_local: Vec3::ZERO,
        };
        body.set_mass_properties(desc.mass, desc.inertia);
        body
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    /// Inverse inertia tensor in world axes.
    pub fn inverse_inertia_world(&self) -> Mat3 {
        let rotation = self.transform.rotation_matrix();
        rotation * Mat3::from_diagonal(self.inverse_inertia_local) * rotation.transpose()
    }

    pub fn set_mass_properties(&mut self, mass: f32, inertia: Vec3) {
        self.mass = mass;
        if self.is_static || mass.abs() < f32::EPSILON {
            self.inverse_mass = 0.0;
            self.inverse_inertia_local = Vec3::ZERO;
            return;
        }
        self.inverse_mass = 1.0 / mass;
        self.inverse_inertia_local = Vec3::select(
            inertia.cmpgt(Vec3::splat(f32::EPSILON)),
            Vec3::ONE / inertia,
            Vec3::ZERO,
        );
    }

    pub fn world_bounds(&self) -> Aabb {
        self.local_bounds.transformed(&self.transform)
    }

    /// Applies `impulse` at `arm` from the CG.
    pub fn apply_impulse(&mut self, impulse: Vec3, arm: Vec3) {
        if self.is_static {
            return;
        }
        self.velocity.linear += impulse * self.inverse_mass;
        self.velocity.angular += self.inverse_inertia_world() * arm.cross(impulse);
    }

    pub fn apply_angular_impulse(&mut self, impulse: Vec3) {
        if self.is_static {
            return;
        }
        self.velocity.angular += self.inverse_inertia_world() * impulse;
    }

    /// Inverse effective mass of a unit impulse along `direction` at `arm`.
    pub fn inverse_effective_mass(&self, arm: Vec3, direction: Vec3) -> f32 {
        let angular = self.inverse_inertia_world() * arm.cross(direction);
        self.inverse_mass + angular.cross(arm).dot(direction)
    }

    pub fn clear_forces(&mut self) {
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }
}
