//! The rigid-body engine seen from the simulation: a handle-based capability.

use glam::Vec3;

use crate::core::material::{MaterialId, MaterialTable};
use crate::core::mesh::Aabb;
use crate::core::types::{Transform, Velocity};
use crate::fluid::FluidField;
use crate::utils::allocator::BodyHandle;

/// Everything an engine needs to create a body. Poses refer to the CG frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBodyDesc {
    pub transform: Transform,
    pub velocity: Velocity,
    pub mass: f32,
    /// Principal moments about the CG axes.
    pub inertia: Vec3,
    pub material: MaterialId,
    /// Hull points in the CG frame, used for contact generation.
    pub contact_points: Vec<Vec3>,
    /// Hull bounds in the CG frame.
    pub local_bounds: Aabb,
    pub is_static: bool,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            transform: Transform::IDENTITY,
            velocity: Velocity::default(),
            mass: 1.0,
            inertia: Vec3::ONE,
            material: MaterialId(0),
            contact_points: Vec::new(),
            local_bounds: Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5)),
            is_static: false,
        }
    }
}

/// Diagnostics of one engine step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    /// Constraints the solver had to skip or approximate.
    pub solver_fallbacks: u32,
    pub contacts: usize,
}

/// Rigid-body dynamics driven by the simulation tick.
///
/// Forces applied between `clear_forces` and `step` act for exactly one step.
pub trait DynamicsEngine: Send {
    fn add_body(&mut self, desc: RigidBodyDesc) -> BodyHandle;
    /// Drops a body; its handle never resolves again. Returns `false` for stale handles.
    fn remove_body(&mut self, body: BodyHandle) -> bool;

    fn world_transform(&self, body: BodyHandle) -> Option<Transform>;
    fn set_world_transform(&mut self, body: BodyHandle, transform: Transform) -> Option<()>;

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3>;
    fn angular_velocity(&self, body: BodyHandle) -> Option<Vec3>;
    fn set_velocity(&mut self, body: BodyHandle, velocity: Velocity) -> Option<()>;

    fn apply_central_force(&mut self, body: BodyHandle, force: Vec3);
    fn apply_torque(&mut self, body: BodyHandle, torque: Vec3);
    fn clear_forces(&mut self);

    /// World bounds of a body.
    fn aabb(&self, body: BodyHandle) -> Option<Aabb>;

    fn step(&mut self, dt: f32) -> StepReport;

    /// Copies engine state into whatever motion-state mirrors the engine keeps.
    fn synchronize_motion_states(&mut self) {}

    /// Material table consulted by the engine's contact callback.
    fn set_material_table(&mut self, _materials: &MaterialTable) {}

    fn set_solver_iterations(&mut self, _iterations: u32) {}

    fn velocity(&self, body: BodyHandle) -> Option<Velocity> {
        Some(Velocity::new(
            self.linear_velocity(body)?,
            self.angular_velocity(body)?,
        ))
    }

    /// Pairs `(body, volume index)` whose bounds overlap.
    fn fluid_overlaps(
        &self,
        bodies: &[BodyHandle],
        volumes: &[Box<dyn FluidField>],
    ) -> Vec<(BodyHandle, usize)> {
        let mut pairs = Vec::new();
        for &body in bodies {
            let Some(bounds) = self.aabb(body) else {
                continue;
            };
            for (index, volume) in volumes.iter().enumerate() {
                if bounds.overlaps(&volume.bounds()) {
                    pairs.push((body, index));
                }
            }
        }
        pairs
    }
}
