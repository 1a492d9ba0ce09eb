use crate::core::rigidbody::RigidBody;
use crate::utils::math::angular_velocity_to_quat;

/// Semi-implicit Euler: velocities first, then positions with the updated velocities.
#[derive(Debug, Clone, Copy)]
pub struct Integrator {
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Integrator {
    pub fn new(linear_damping: f32, angular_damping: f32) -> Self {
        Self {
            linear_damping,
            angular_damping,
        }
    }

    pub fn integrate_velocity(&self, body: &mut RigidBody, dt: f32) {
        if body.is_static {
            return;
        }

        body.velocity.linear += body.force * (body.inverse_mass() * dt);
        body.velocity.angular += body.inverse_inertia_world() * body.torque * dt;

        body.velocity.linear *= (1.0 - self.linear_damping * dt).max(0.0);
        body.velocity.angular *= (1.0 - self.angular_damping * dt).max(0.0);
    }

    pub fn integrate_position(&self, body: &mut RigidBody, dt: f32) {
        if body.is_static {
            return;
        }

        body.transform.position += body.velocity.linear * dt;

        let delta = angular_velocity_to_quat(body.velocity.angular, dt);
        body.transform.rotation = (delta * body.transform.rotation).normalize();
    }
}

impl Default for Integrator {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}
