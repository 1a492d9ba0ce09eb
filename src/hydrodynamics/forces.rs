//! Buoyancy and drag integrated over the wetted part of a hull.
//!
//! Forces are expressed in world axes and torques are taken about the body CG.

use std::ops::{Add, AddAssign};

use glam::Vec3;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{FluidDynamicsSettings, SKIN_BOUNDARY_LAYER};
use crate::core::mesh::Aabb;
use crate::core::solid::{HasMaterial, HasMesh, HasProxy};
use crate::core::types::{Transform, Velocity};
use crate::fluid::FluidField;

use super::classifier::{classify, Immersion};
use super::clipping::{clip_triangle_below, ClippedTriangle, Face};

/// Force and torque pair.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wrench {
    pub force: Vec3,
    pub torque: Vec3,
}

impl Wrench {
    pub const ZERO: Self = Self {
        force: Vec3::ZERO,
        torque: Vec3::ZERO,
    };

    pub fn new(force: Vec3, torque: Vec3) -> Self {
        Self { force, torque }
    }

    /// Adds `force` acting at `arm` from the reference point.
    pub fn add_at(&mut self, force: Vec3, arm: Vec3) {
        self.force += force;
        self.torque += arm.cross(force);
    }
}

impl Add for Wrench {
    type Output = Wrench;

    fn add(self, rhs: Wrench) -> Wrench {
        Wrench::new(self.force + rhs.force, self.torque + rhs.torque)
    }
}

impl AddAssign for Wrench {
    fn add_assign(&mut self, rhs: Wrench) {
        self.force += rhs.force;
        self.torque += rhs.torque;
    }
}

/// Fluid loads on one body, split by origin.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceAccumulator {
    pub buoyancy: Wrench,
    pub skin_drag: Wrench,
    pub pressure_drag: Wrench,
}

impl ForceAccumulator {
    pub fn total(&self) -> Wrench {
        self.buoyancy + self.skin_drag + self.pressure_drag
    }

    pub fn is_zero(&self) -> bool {
        *self == ForceAccumulator::default()
    }
}

impl AddAssign for ForceAccumulator {
    fn add_assign(&mut self, rhs: ForceAccumulator) {
        self.buoyancy += rhs.buoyancy;
        self.skin_drag += rhs.skin_drag;
        self.pressure_drag += rhs.pressure_drag;
    }
}

/// Kinematic state of a body at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    /// World pose of the CG frame.
    pub cg: Transform,
    pub velocity: Velocity,
    pub world_bounds: Aabb,
}

/// Computes the fluid loads `fluid` exerts on `body`.
pub fn compute_fluid_forces<B>(
    body: &B,
    state: &BodyState,
    fluid: &dyn FluidField,
    settings: &FluidDynamicsSettings,
) -> ForceAccumulator
where
    B: HasMesh + HasMaterial + HasProxy + ?Sized,
{
    let mut forces = ForceAccumulator::default();
    if !settings.buoyancy && !settings.damping {
        return forces;
    }

    let immersion = classify(&state.world_bounds, fluid);
    let geometry_to_world = body.geometry_to_world(&state.cg);
    let cg = state.cg.position;
    let buoyant = settings.buoyancy && body.is_buoyant();

    match immersion {
        Immersion::Outside => return forces,
        Immersion::Inside => {
            if buoyant {
                let force = -fluid.gravity() * (body.volume() * fluid.density());
                let center = geometry_to_world.transform_point(body.center_of_buoyancy());
                forces.buoyancy.add_at(force, center - cg);
            }
            if settings.damping {
                for tri in body.mesh().triangles(&geometry_to_world) {
                    if let Some(face) = Face::from_triangle(&tri) {
                        add_damping(&mut forces, &face, state, fluid);
                    }
                }
            }
        }
        Immersion::Crossing => {
            for tri in body.mesh().triangles(&geometry_to_world) {
                let depths = tri.map(|p| fluid.depth_at(p));
                let clipped = clip_triangle_below(&tri, depths);
                if clipped == ClippedTriangle::Empty {
                    continue;
                }
                for piece in clipped.triangles() {
                    let Some(face) = Face::from_triangle(&piece) else {
                        continue;
                    };
                    if buoyant {
                        let force = -face.unit_normal * (face.area * fluid.pressure_at(face.centroid));
                        forces.buoyancy.add_at(force, face.centroid - cg);
                    }
                    if settings.damping {
                        add_damping(&mut forces, &face, state, fluid);
                    }
                }
            }
        }
    }

    if settings.damping && !body.proxy().is_none() {
        let axes = state.cg.rotation * body.proxy().axes();
        let local = axes.inverse() * forces.pressure_drag.force;
        forces.pressure_drag.force = axes * (local * body.proxy().drag_scale());
    }

    forces
}

fn add_damping(
    forces: &mut ForceAccumulator,
    face: &Face,
    state: &BodyState,
    fluid: &dyn FluidField,
) {
    let arm = face.centroid - state.cg.position;
    let relative = fluid.velocity_at(face.centroid) - state.velocity.at_point(arm);
    let n = face.unit_normal;
    let tangential = relative - n * n.dot(relative);
    let normal = relative - tangential;

    let skin = tangential * (fluid.viscosity() * face.area / SKIN_BOUNDARY_LAYER);
    forces.skin_drag.add_at(skin, arm);

    if face.normal.dot(normal) < 0.0 {
        let pressure = normal * (0.5 * fluid.density() * normal.length() * face.area);
        forces.pressure_drag.add_at(pressure, arm);
    }
}

/// One body/fluid pair to evaluate.
pub struct FluidJob<'a, B: ?Sized> {
    pub body: &'a B,
    pub state: BodyState,
    pub fluid: &'a dyn FluidField,
}

/// Evaluates every job, in parallel when the `parallel` feature is on.
///
/// Results keep the order of `jobs`.
pub fn compute_all<B>(
    jobs: &[FluidJob<'_, B>],
    settings: &FluidDynamicsSettings,
) -> Vec<ForceAccumulator>
where
    B: HasMesh + HasMaterial + HasProxy + Sync + ?Sized,
{
    #[cfg(feature = "parallel")]
    {
        jobs.par_iter()
            .map(|job| compute_fluid_forces(job.body, &job.state, job.fluid, settings))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        jobs.iter()
            .map(|job| compute_fluid_forces(job.body, &job.state, job.fluid, settings))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::material::MaterialId;
    use crate::core::mesh::TriangleMesh;
    use crate::core::solid::SolidEntity;
    use crate::fluid::{FluidProperties, Ocean};
    use crate::hydrodynamics::proxy::ProxyKind;
    use approx::assert_relative_eq;

    fn cube() -> SolidEntity {
        SolidEntity::from_mesh(
            "cube",
            TriangleMesh::cuboid(Vec3::splat(0.5), 2),
            MaterialId(0),
            500.0,
        )
    }

    fn state_at(solid: &SolidEntity, position: Vec3, velocity: Velocity) -> BodyState {
        let cg = Transform::from_position(position);
        BodyState {
            cg,
            velocity,
            world_bounds: solid.mesh().bounds.transformed(&solid.geometry_to_world(&cg)),
        }
    }

    fn still_water() -> Ocean {
        Ocean::new(0.0, FluidProperties::water())
    }

    #[test]
    fn dry_body_feels_nothing() {
        let solid = cube();
        let state = state_at(&solid, Vec3::new(0.0, 3.0, 0.0), Velocity::default());
        let forces =
            compute_fluid_forces(&solid, &state, &still_water(), &FluidDynamicsSettings::default());
        assert!(forces.is_zero());
    }

    #[test]
    fn submerged_cube_matches_archimedes() {
        let solid = cube();
        let state = state_at(&solid, Vec3::new(0.0, -3.0, 0.0), Velocity::default());
        let forces =
            compute_fluid_forces(&solid, &state, &still_water(), &FluidDynamicsSettings::default());
        assert_relative_eq!(forces.buoyancy.force.y, 9810.0, max_relative = 1e-4);
        assert_relative_eq!(forces.buoyancy.torque.length(), 0.0, epsilon = 1e-2);
        assert_eq!(forces.skin_drag, Wrench::ZERO);
    }

    #[test]
    fn half_submerged_cube_displaces_half_volume() {
        let solid = cube();
        let state = state_at(&solid, Vec3::ZERO, Velocity::default());
        let forces =
            compute_fluid_forces(&solid, &state, &still_water(), &FluidDynamicsSettings::default());
        assert_relative_eq!(forces.buoyancy.force.y, 4905.0, max_relative = 1e-3);
        assert_relative_eq!(forces.buoyancy.force.x, 0.0, epsilon = 1e-2);
    }

    #[test]
    fn drag_opposes_motion() {
        let solid = cube();
        let state = state_at(
            &solid,
            Vec3::new(0.0, -3.0, 0.0),
            Velocity::new(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO),
        );
        let forces =
            compute_fluid_forces(&solid, &state, &still_water(), &FluidDynamicsSettings::default());
        // one 1 m² face pushes into the water at 1 m/s
        assert_relative_eq!(forces.pressure_drag.force.x, -500.0, max_relative = 1e-3);
        assert!(forces.skin_drag.force.x < 0.0);
    }

    #[test]
    fn current_drags_a_still_body() {
        let solid = cube();
        let state = state_at(&solid, Vec3::new(0.0, -3.0, 0.0), Velocity::default());
        let ocean = still_water().with_current(Vec3::new(0.0, 0.0, 2.0));
        let forces = compute_fluid_forces(&solid, &state, &ocean, &FluidDynamicsSettings::default());
        assert!(forces.pressure_drag.force.z > 0.0);
    }

    #[test]
    fn disabled_buoyancy_keeps_damping() {
        let solid = cube();
        let state = state_at(
            &solid,
            Vec3::new(0.0, -3.0, 0.0),
            Velocity::new(Vec3::Y, Vec3::ZERO),
        );
        let settings = FluidDynamicsSettings {
            buoyancy: false,
            damping: true,
        };
        let forces = compute_fluid_forces(&solid, &state, &still_water(), &settings);
        assert_eq!(forces.buoyancy, Wrench::ZERO);
        assert!(forces.pressure_drag.force.y < 0.0);
    }

    #[test]
    fn cylinder_proxy_halves_radial_drag() {
        let mut solid = cube();
        let state = state_at(
            &solid,
            Vec3::new(0.0, -3.0, 0.0),
            Velocity::new(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO),
        );
        let settings = FluidDynamicsSettings::default();
        let plain = compute_fluid_forces(&solid, &state, &still_water(), &settings);
        assert!(solid.fit_proxy(ProxyKind::Cylinder, 1000.0));
        let axis = solid.cg_frame().rotation * solid.proxy().axes() * Vec3::Z;
        let corrected = compute_fluid_forces(&solid, &state, &still_water(), &settings);
        let expected = if axis.x.abs() > 0.99 { 1.0 } else { 0.5 };
        assert_relative_eq!(
            corrected.pressure_drag.force.x,
            plain.pressure_drag.force.x * expected,
            max_relative = 1e-4
        );
    }

    #[test]
    fn batch_keeps_job_order() {
        let solid = cube();
        let ocean = still_water();
        let jobs: Vec<FluidJob<'_, SolidEntity>> = [3.0, 0.0, -3.0]
            .iter()
            .map(|&y| FluidJob {
                body: &solid,
                state: state_at(&solid, Vec3::new(0.0, y, 0.0), Velocity::default()),
                fluid: &ocean,
            })
            .collect();
        let results = compute_all(&jobs, &FluidDynamicsSettings::default());
        assert!(results[0].is_zero());
        assert!(results[1].buoyancy.force.y < results[2].buoyancy.force.y);
    }
}
