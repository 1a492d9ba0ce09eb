//! Hull-point versus half-space contacts and their sequential-impulse solver.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::{BOUNCE_THRESHOLD, PENETRATION_SLOP};
use crate::core::material::{MaterialId, MaterialTable};
use crate::core::rigidbody::RigidBody;
use crate::utils::allocator::BodyHandle;

use super::friction::{
    orthogonal_to_normal, project_onto_tangent, ContactBody, ContactCoefficients,
    ContactFrictionModel,
};

/// Immovable half-space `normal · p >= offset`; points below it penetrate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticPlane {
    pub normal: Vec3,
    pub offset: f32,
    /// Planes without a material contribute no friction.
    pub material: Option<MaterialId>,
}

impl StaticPlane {
    pub fn new(normal: Vec3, offset: f32, material: Option<MaterialId>) -> Self {
        Self {
            normal: normal.normalize_or_zero(),
            offset,
            material,
        }
    }

    /// Horizontal floor at height `y`.
    pub fn floor(y: f32, material: Option<MaterialId>) -> Self {
        Self::new(Vec3::Y, y, material)
    }

    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.offset
    }
}

/// One penetrating hull point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub body: BodyHandle,
    pub plane: usize,
    /// World contact point.
    pub point: Vec3,
    /// From the CG to the contact point.
    pub arm: Vec3,
    /// Points out of the plane, into the body.
    pub normal: Vec3,
    pub depth: f32,
    pub coefficients: ContactCoefficients,
    pub accumulated_normal_impulse: f32,
    pub accumulated_tangent_impulse: Vec3,
    normal_mass: f32,
    target_velocity: f32,
}

impl Contact {
    /// Returns `None` when the constraint has no usable effective mass.
    pub(crate) fn new(
        handle: BodyHandle,
        body: &RigidBody,
        plane_index: usize,
        plane: &StaticPlane,
        point: Vec3,
        depth: f32,
    ) -> Option<Contact> {
        let arm = point - body.transform.position;
        let k = body.inverse_effective_mass(arm, plane.normal);
        if !k.is_finite() || k <= f32::EPSILON || plane.normal == Vec3::ZERO {
            return None;
        }
        Some(Contact {
            body: handle,
            plane: plane_index,
            point,
            arm,
            normal: plane.normal,
            depth,
            coefficients: ContactCoefficients::default(),
            accumulated_normal_impulse: 0.0,
            accumulated_tangent_impulse: Vec3::ZERO,
            normal_mass: 1.0 / k,
            target_velocity: 0.0,
        })
    }

    /// Fills friction coefficients and the restitution target from the pre-solve velocity.
    pub(crate) fn prepare(
        &mut self,
        body: &RigidBody,
        plane: &StaticPlane,
        materials: &MaterialTable,
        model: &ContactFrictionModel,
    ) {
        let point_velocity = body.velocity.at_point(self.arm);
        let plane_side = plane.material.map(|material| ContactBody {
            material,
            point_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        });
        let body_side = ContactBody {
            material: body.material,
            point_velocity,
            angular_velocity: body.velocity.angular,
        };
        self.coefficients =
            model.evaluate(materials, plane_side.as_ref(), Some(&body_side), self.normal);

        let approach = point_velocity.dot(self.normal);
        self.target_velocity = if approach < -BOUNCE_THRESHOLD {
            -self.coefficients.restitution * approach
        } else {
            0.0
        };
    }

    pub(crate) fn solve_normal(&mut self, body: &mut RigidBody) {
        let vn = body.velocity.at_point(self.arm).dot(self.normal);
        let lambda = (self.target_velocity - vn) * self.normal_mass;
        let accumulated = (self.accumulated_normal_impulse + lambda).max(0.0);
        let delta = accumulated - self.accumulated_normal_impulse;
        self.accumulated_normal_impulse = accumulated;
        body.apply_impulse(self.normal * delta, self.arm);
    }

    pub(crate) fn solve_friction(&mut self, body: &mut RigidBody) {
        let limit = self.coefficients.combined_friction * self.accumulated_normal_impulse;
        if limit <= f32::EPSILON {
            self.accumulated_tangent_impulse = Vec3::ZERO;
            return;
        }

        let slip = project_onto_tangent(body.velocity.at_point(self.arm), self.normal);
        let direction = if slip.length_squared() > 1e-12 {
            slip.normalize()
        } else if self.accumulated_tangent_impulse.length_squared() > 1e-12 {
            -self.accumulated_tangent_impulse.normalize()
        } else {
            orthogonal_to_normal(self.normal)
        };
        let k = body.inverse_effective_mass(self.arm, direction);
        if k <= f32::EPSILON {
            return;
        }

        let desired = self.accumulated_tangent_impulse - slip / k;
        let clamped = if desired.length() > limit {
            desired.normalize() * limit
        } else {
            desired
        };
        let delta = clamped - self.accumulated_tangent_impulse;
        self.accumulated_tangent_impulse = clamped;
        if delta.length_squared() > 1e-14 {
            body.apply_impulse(delta, self.arm);
        }
    }
}

/// Penetrating hull points of `body` against every plane.
///
/// Returns the contacts and the number of constraints rejected as degenerate.
pub fn generate_contacts(
    handle: BodyHandle,
    body: &RigidBody,
    planes: &[StaticPlane],
) -> (Vec<Contact>, u32) {
    let mut contacts = Vec::new();
    let mut rejected = 0;
    if body.is_static {
        return (contacts, rejected);
    }

    let bounds = body.world_bounds();
    for (index, plane) in planes.iter().enumerate() {
        let lowest = bounds
            .corners()
            .iter()
            .map(|corner| plane.signed_distance(*corner))
            .fold(f32::INFINITY, f32::min);
        if lowest >= 0.0 {
            continue;
        }
        for local in &body.contact_points {
            let point = body.transform.transform_point(*local);
            let distance = plane.signed_distance(point);
            if distance >= 0.0 {
                continue;
            }
            match Contact::new(handle, body, index, plane, point, -distance) {
                Some(contact) => contacts.push(contact),
                None => rejected += 1,
            }
        }
    }
    (contacts, rejected)
}

/// Pushes `body` out of every plane it penetrates by more than the slop.
pub fn correct_positions(body: &mut RigidBody, planes: &[StaticPlane]) {
    if body.is_static {
        return;
    }
    for plane in planes {
        let deepest = body
            .contact_points
            .iter()
            .map(|local| -plane.signed_distance(body.transform.transform_point(*local)))
            .fold(0.0_f32, f32::max);
        if deepest > PENETRATION_SLOP {
            body.transform.position += plane.normal * (deepest - PENETRATION_SLOP);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Transform;
    use crate::dynamics::engine::RigidBodyDesc;
    use approx::assert_relative_eq;

    fn cube_at(y: f32) -> RigidBody {
        let h = 0.5;
        let mut points = Vec::new();
        for x in [-h, h] {
            for yy in [-h, h] {
                for z in [-h, h] {
                    points.push(Vec3::new(x, yy, z));
                }
            }
        }
        RigidBody::from_desc(RigidBodyDesc {
            transform: Transform::from_position(Vec3::new(0.0, y, 0.0)),
            mass: 1.0,
            inertia: Vec3::splat(1.0 / 6.0),
            contact_points: points,
            ..RigidBodyDesc::default()
        })
    }

    #[test]
    fn only_penetrating_points_make_contacts() {
        let planes = [StaticPlane::floor(0.0, None)];
        let (contacts, rejected) = generate_contacts(BodyHandle::from_index(0), &cube_at(0.49), &planes);
        assert_eq!(contacts.len(), 4);
        assert_eq!(rejected, 0);
        assert_relative_eq!(contacts[0].depth, 0.01, epsilon = 1e-5);

        let (none, _) = generate_contacts(BodyHandle::from_index(0), &cube_at(0.6), &planes);
        assert!(none.is_empty());
    }

    #[test]
    fn normal_impulses_stop_a_falling_cube() {
        let planes = [StaticPlane::floor(0.0, None)];
        let mut body = cube_at(0.499);
        body.velocity.linear = Vec3::new(0.0, -1.0, 0.0);
        let (mut contacts, _) = generate_contacts(BodyHandle::from_index(0), &body, &planes);
        let materials = MaterialTable::new();
        let model = ContactFrictionModel::default();
        for contact in &mut contacts {
            contact.prepare(&body, &planes[0], &materials, &model);
        }
        for _ in 0..30 {
            for contact in &mut contacts {
                contact.solve_normal(&mut body);
            }
        }
        assert_relative_eq!(body.velocity.linear.y, 0.0, epsilon = 1e-4);
        assert!(body.velocity.angular.length() < 1e-3);
        let total: f32 = contacts.iter().map(|c| c.accumulated_normal_impulse).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn correction_leaves_slop() {
        let planes = [StaticPlane::floor(0.0, None)];
        let mut body = cube_at(0.4);
        correct_positions(&mut body, &planes);
        assert_relative_eq!(body.transform.position.y, 0.5 - PENETRATION_SLOP, epsilon = 1e-5);
    }
}
