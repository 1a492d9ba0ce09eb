use glam::Vec3;
use log::{debug, trace};

use crate::config::{DEFAULT_ANGULAR_DAMPING, DEFAULT_LINEAR_DAMPING, DEFAULT_SOLVER_ITERATIONS};
use crate::core::material::MaterialTable;
use crate::core::mesh::Aabb;
use crate::core::rigidbody::RigidBody;
use crate::core::types::{Transform, Velocity};
use crate::utils::allocator::{Arena, BodyHandle};
use crate::utils::logging::ScopedTimer;

use super::contact::{correct_positions, generate_contacts, Contact, StaticPlane};
use super::engine::{DynamicsEngine, RigidBodyDesc, StepReport};
use super::friction::ContactFrictionModel;
use super::integrator::Integrator;

/// Small reference engine: free rigid bodies resting on static planes.
///
/// Gravity is not applied here; callers apply it as a force every step.
pub struct RigidWorld {
    bodies: Arena<RigidBody>,
    planes: Vec<StaticPlane>,
    materials: MaterialTable,
    friction: ContactFrictionModel,
    integrator: Integrator,
    solver_iterations: u32,
    contacts: Vec<Contact>,
}

impl Default for RigidWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl RigidWorld {
    pub fn new() -> Self {
        Self {
            bodies: Arena::new(),
            planes: Vec::new(),
            materials: MaterialTable::new(),
            friction: ContactFrictionModel::default(),
            integrator: Integrator::new(DEFAULT_LINEAR_DAMPING, DEFAULT_ANGULAR_DAMPING),
            solver_iterations: DEFAULT_SOLVER_ITERATIONS,
            contacts: Vec::new(),
        }
    }

    pub fn add_plane(&mut self, plane: StaticPlane) -> usize {
        self.planes.push(plane);
        self.planes.len() - 1
    }

    pub fn planes(&self) -> &[StaticPlane] {
        &self.planes
    }

    pub fn set_friction_model(&mut self, model: ContactFrictionModel) {
        self.friction = model;
    }

    pub fn set_integrator(&mut self, integrator: Integrator) {
        self.integrator = integrator;
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Contacts resolved during the last step.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    fn generate_all_contacts(&mut self) -> u32 {
        self.contacts.clear();
        let mut rejected = 0;
        for (handle, body) in self.bodies.iter() {
            let (contacts, skipped) = generate_contacts(handle, body, &self.planes);
            self.contacts.extend(contacts);
            rejected += skipped;
        }
        rejected
    }

    fn solve_contacts(&mut self, dt: f32) {
        for contact in &mut self.contacts {
            if let (Some(body), Some(plane)) =
                (self.bodies.get(contact.body), self.planes.get(contact.plane))
            {
                contact.prepare(body, plane, &self.materials, &self.friction);
            }
        }

        for _ in 0..self.solver_iterations {
            for contact in &mut self.contacts {
                if let Some(body) = self.bodies.get_mut(contact.body) {
                    contact.solve_normal(body);
                    contact.solve_friction(body);
                }
            }
        }

        let steps_per_second = 1.0 / dt;
        for contact in &self.contacts {
            let Some(body) = self.bodies.get_mut(contact.body) else {
                continue;
            };
            let torque = self.friction.spin_damping_torque(
                contact.coefficients.combined_friction,
                contact.accumulated_normal_impulse,
                steps_per_second,
                body.velocity.angular,
                contact.normal,
            );
            if torque == Vec3::ZERO {
                continue;
            }
            let twist_before = body.velocity.angular.dot(contact.normal);
            body.apply_angular_impulse(torque * dt);
            let twist_after = body.velocity.angular.dot(contact.normal);
            if twist_before * twist_after < 0.0 {
                // damping stops the spin but never reverses it
                body.velocity.angular -= contact.normal * twist_after;
            }
        }
    }
}

impl DynamicsEngine for RigidWorld {
    fn add_body(&mut self, desc: RigidBodyDesc) -> BodyHandle {
        let handle = self.bodies.insert(RigidBody::from_desc(desc));
        debug!("RigidWorld: added body {handle}");
        handle
    }

    fn remove_body(&mut self, body: BodyHandle) -> bool {
        let removed = self.bodies.remove(body).is_some();
        if removed {
            debug!("RigidWorld: removed body {body}");
        }
        removed
    }

    fn world_transform(&self, body: BodyHandle) -> Option<Transform> {
        self.bodies.get(body).map(|b| b.transform)
    }

    fn set_world_transform(&mut self, body: BodyHandle, transform: Transform) -> Option<()> {
        self.bodies.get_mut(body)?.transform = transform;
        Some(())
    }

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        self.bodies.get(body).map(|b| b.velocity.linear)
    }

    fn angular_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        self.bodies.get(body).map(|b| b.velocity.angular)
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Velocity) -> Option<()> {
        self.bodies.get_mut(body)?.velocity = velocity;
        Some(())
    }

    fn apply_central_force(&mut self, body: BodyHandle, force: Vec3) {
        if let Some(body) = self.bodies.get_mut(body) {
            body.force += force;
        }
    }

    fn apply_torque(&mut self, body: BodyHandle, torque: Vec3) {
        if let Some(body) = self.bodies.get_mut(body) {
            body.torque += torque;
        }
    }

    fn clear_forces(&mut self) {
        for (_, body) in self.bodies.iter_mut() {
            body.clear_forces();
        }
    }

    fn aabb(&self, body: BodyHandle) -> Option<Aabb> {
        self.bodies.get(body).map(RigidBody::world_bounds)
    }

    fn step(&mut self, dt: f32) -> StepReport {
        let _timer = ScopedTimer::new("rigid_world::step");

        for (_, body) in self.bodies.iter_mut() {
            self.integrator.integrate_velocity(body, dt);
        }

        let rejected = self.generate_all_contacts();
        self.solve_contacts(dt);

        for (_, body) in self.bodies.iter_mut() {
            self.integrator.integrate_position(body, dt);
            correct_positions(body, &self.planes);
        }

        if rejected > 0 {
            trace!("RigidWorld: skipped {rejected} degenerate contacts");
        }
        StepReport {
            solver_fallbacks: rejected,
            contacts: self.contacts.len(),
        }
    }

    fn set_material_table(&mut self, materials: &MaterialTable) {
        self.materials = materials.clone();
    }

    fn set_solver_iterations(&mut self, iterations: u32) {
        self.solver_iterations = iterations.max(1);
    }
}
