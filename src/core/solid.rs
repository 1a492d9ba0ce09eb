//! Solid bodies: a triangle hull plus the mass, buoyancy and proxy data derived from it.
//!
//! Everything here is computed once from a single mesh snapshot. Changing the mesh after
//! registration is not supported; volume, centre of buoyancy and added mass would go stale.

use glam::{DVec3, Vec3};
use log::{debug, warn};
use nalgebra::SymmetricEigen;

use crate::config::{ACCELERATION_FILTER_ALPHA, PRINCIPAL_AXIS_TOLERANCE};
use crate::dynamics::engine::RigidBodyDesc;
use crate::hydrodynamics::forces::ForceAccumulator;
use crate::hydrodynamics::proxy::{fit_proxy, AddedMass, HydrodynamicProxy, ProxyKind};
use crate::utils::allocator::BodyHandle;
use crate::utils::math::{mat_to_na, rotation_from_axes};

use super::material::MaterialId;
use super::mesh::{Aabb, MeshMassProperties, TriangleMesh};
use super::types::{Transform, Velocity};

/// Access to the hull geometry of a body.
pub trait HasMesh {
    fn mesh(&self) -> &TriangleMesh;
    /// Pose of the CG frame expressed in the geometry frame.
    fn cg_frame(&self) -> &Transform;
    /// Enclosed volume of the hull (m³).
    fn volume(&self) -> f32;
    /// Centre of buoyancy in the geometry frame.
    fn center_of_buoyancy(&self) -> Vec3;

    /// Pose of the geometry frame in the world, given the world pose of the CG frame.
    fn geometry_to_world(&self, world_cg: &Transform) -> Transform {
        world_cg.combine(&self.cg_frame().inverse())
    }
}

pub trait HasMaterial {
    fn material(&self) -> MaterialId;
    fn is_buoyant(&self) -> bool;
}

pub trait HasProxy {
    fn proxy(&self) -> &HydrodynamicProxy;
    fn added_mass(&self) -> &AddedMass;
}

/// Low-pass filtered velocity and the acceleration derived from it.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MotionEstimate {
    pub filtered_linear: Vec3,
    pub filtered_angular: Vec3,
    pub linear_acceleration: Vec3,
    pub angular_acceleration: Vec3,
}

impl MotionEstimate {
    /// Blends `raw` into the filtered velocity and differentiates the filtered signal.
    pub fn update(&mut self, raw: Velocity, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let alpha = ACCELERATION_FILTER_ALPHA;
        let linear = self.filtered_linear + (raw.linear - self.filtered_linear) * alpha;
        let angular = self.filtered_angular + (raw.angular - self.filtered_angular) * alpha;
        self.linear_acceleration = (linear - self.filtered_linear) / dt;
        self.angular_acceleration = (angular - self.filtered_angular) / dt;
        self.filtered_linear = linear;
        self.filtered_angular = angular;
    }

    /// Restarts the filter at `velocity` with zero acceleration.
    pub fn reset(&mut self, velocity: Velocity) {
        *self = MotionEstimate {
            filtered_linear: velocity.linear,
            filtered_angular: velocity.angular,
            ..MotionEstimate::default()
        };
    }
}

/// A rigid hull taking part in the simulation.
#[derive(Debug, Clone)]
pub struct SolidEntity {
    pub name: String,
    mesh: TriangleMesh,
    mass: f32,
    inertia: Vec3,
    cg_frame: Transform,
    material: MaterialId,
    pub buoyant: bool,
    volume: f32,
    center_of_buoyancy: Vec3,
    proxy: HydrodynamicProxy,
    added_mass: AddedMass,
    handle: Option<BodyHandle>,
    motion: MotionEstimate,
    fluid_forces: ForceAccumulator,
}

impl SolidEntity {
    /// Derives mass, principal inertia, CG frame and buoyancy data from a closed hull.
    ///
    /// The CG sits at the volume centroid and its axes are the principal axes of inertia.
    pub fn from_mesh(
        name: impl Into<String>,
        mut mesh: TriangleMesh,
        material: MaterialId,
        density: f32,
    ) -> SolidEntity {
        let name = name.into();
        let mut props = MeshMassProperties::compute(&mesh, density as f64);
        if props.volume < 0.0 {
            warn!("Mesh of '{name}' is wound inward; reversing its faces");
            for face in &mut mesh.indices {
                face.swap(1, 2);
            }
            props = MeshMassProperties::compute(&mesh, density as f64);
        }

        let (inertia, rotation) = principal_axes(&props);
        let centroid = props.centroid.as_vec3();
        let cg_frame = Transform::from_position_rotation(centroid, rotation);
        debug!(
            "Solid '{name}': volume {:.4} m³, mass {:.3} kg, inertia {inertia:?}",
            props.volume, props.mass
        );

        SolidEntity {
            name,
            mesh,
            mass: props.mass as f32,
            inertia,
            cg_frame,
            material,
            buoyant: true,
            volume: props.volume as f32,
            center_of_buoyancy: centroid,
            proxy: HydrodynamicProxy::None,
            added_mass: AddedMass::ZERO,
            handle: None,
            motion: MotionEstimate::default(),
            fluid_forces: ForceAccumulator::default(),
        }
    }

    /// Overrides the mass model. Volume and centre of buoyancy keep describing the hull.
    pub fn set_arbitrary_physical_properties(
        &mut self,
        mass: f32,
        inertia: Vec3,
        cg_frame: Transform,
    ) {
        self.mass = mass.max(0.0);
        self.inertia = inertia.max(Vec3::ZERO);
        self.cg_frame = cg_frame;
    }

    /// Fits a hydrodynamic proxy on the hull vertices.
    ///
    /// On failure the body keeps no proxy and zero added mass; the reason is logged.
    pub fn fit_proxy(&mut self, kind: ProxyKind, fluid_density: f32) -> bool {
        match fit_proxy(kind, &self.mesh.vertices, &self.cg_frame, fluid_density) {
            Ok(fit) => {
                debug!("Solid '{}': fitted {:?} proxy", self.name, fit.proxy);
                self.proxy = fit.proxy;
                self.added_mass = fit.added_mass;
                true
            }
            Err(err) => {
                warn!("Solid '{}': proxy fit failed ({err})", self.name);
                self.proxy = HydrodynamicProxy::None;
                self.added_mass = AddedMass::ZERO;
                false
            }
        }
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Principal moments of inertia about the CG axes.
    pub fn inertia(&self) -> Vec3 {
        self.inertia
    }

    pub fn handle(&self) -> Option<BodyHandle> {
        self.handle
    }

    pub(crate) fn set_handle(&mut self, handle: BodyHandle) {
        self.handle = Some(handle);
    }

    pub(crate) fn clear_handle(&mut self) {
        self.handle = None;
    }

    pub fn motion(&self) -> &MotionEstimate {
        &self.motion
    }

    pub(crate) fn motion_mut(&mut self) -> &mut MotionEstimate {
        &mut self.motion
    }

    /// Fluid forces computed during the most recent tick.
    pub fn fluid_forces(&self) -> &ForceAccumulator {
        &self.fluid_forces
    }

    pub(crate) fn set_fluid_forces(&mut self, forces: ForceAccumulator) {
        self.fluid_forces = forces;
    }

    /// Hull bounds in the CG frame.
    pub fn local_bounds(&self) -> Aabb {
        self.mesh.bounds.transformed(&self.cg_frame.inverse())
    }

    /// Description used to register this solid with a dynamics engine.
    ///
    /// `geometry_pose` places the geometry frame in the world.
    pub fn rigid_body_desc(&self, geometry_pose: Transform) -> RigidBodyDesc {
        let to_cg = self.cg_frame.inverse();
        RigidBodyDesc {
            transform: geometry_pose.combine(&self.cg_frame),
            velocity: Velocity::default(),
            mass: self.mass,
            inertia: self.inertia,
            material: self.material,
            contact_points: self
                .mesh
                .vertices
                .iter()
                .map(|v| to_cg.transform_point(*v))
                .collect(),
            local_bounds: self.local_bounds(),
            is_static: false,
        }
    }
}

impl HasMesh for SolidEntity {
    fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    fn cg_frame(&self) -> &Transform {
        &self.cg_frame
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn center_of_buoyancy(&self) -> Vec3 {
        self.center_of_buoyancy
    }
}

impl HasMaterial for SolidEntity {
    fn material(&self) -> MaterialId {
        self.material
    }

    fn is_buoyant(&self) -> bool {
        self.buoyant
    }
}

impl HasProxy for SolidEntity {
    fn proxy(&self) -> &HydrodynamicProxy {
        &self.proxy
    }

    fn added_mass(&self) -> &AddedMass {
        &self.added_mass
    }
}

/// Principal moments and the rotation from principal axes into the geometry frame.
fn principal_axes(props: &MeshMassProperties) -> (Vec3, glam::Quat) {
    let tensor = props.inertia;
    let diagonal = DVec3::new(tensor.x_axis.x, tensor.y_axis.y, tensor.z_axis.z);
    let off_diagonal = tensor.y_axis.x.abs() + tensor.z_axis.x.abs() + tensor.z_axis.y.abs();
    if off_diagonal <= PRINCIPAL_AXIS_TOLERANCE * diagonal.max_element().max(f64::EPSILON) {
        return (diagonal.as_vec3(), glam::Quat::IDENTITY);
    }

    match SymmetricEigen::try_new(mat_to_na(&tensor), 1e-12, 0) {
        Some(eigen) => {
            let axis = |k: usize| {
                let column = eigen.eigenvectors.column(k);
                Vec3::new(column[0] as f32, column[1] as f32, column[2] as f32)
            };
            let moments = Vec3::new(
                eigen.eigenvalues[0] as f32,
                eigen.eigenvalues[1] as f32,
                eigen.eigenvalues[2] as f32,
            );
            (moments, rotation_from_axes(axis(0), axis(1), axis(2)))
        }
        None => {
            warn!("Inertia eigen-decomposition failed; keeping geometry axes");
            (diagonal.as_vec3(), glam::Quat::IDENTITY)
        }
    }
}
