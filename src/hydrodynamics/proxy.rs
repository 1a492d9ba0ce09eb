//! Proxy shapes fitted to a hull for added-mass estimation and drag correction.
//!
//! All fits happen in the body's CG frame. Every proxy is axis aligned with that frame,
//! so the added-mass matrix is diagonal in CG axes.

use std::f64::consts::PI;

use glam::{DVec3, Quat, Vec3};
use nalgebra::{DMatrix, DVector, Matrix3, Matrix4, SymmetricEigen, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::Transform;
use crate::utils::math::rotation_from_axes;

/// Minimum number of vertices needed by the sphere and cylinder fits.
pub const MIN_VERTICES_SIMPLE: usize = 2;
/// Minimum number of vertices needed by the ellipsoid fit.
pub const MIN_VERTICES_ELLIPSOID: usize = 9;

/// Which proxy shape to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProxyKind {
    Sphere,
    Cylinder,
    Ellipsoid,
}

impl ProxyKind {
    pub fn min_vertices(self) -> usize {
        match self {
            ProxyKind::Sphere | ProxyKind::Cylinder => MIN_VERTICES_SIMPLE,
            ProxyKind::Ellipsoid => MIN_VERTICES_ELLIPSOID,
        }
    }
}

/// Simplified hull approximation. `pose` maps proxy-local axes into the CG frame;
/// the cylinder axis is local +Z.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum HydrodynamicProxy {
    #[default]
    None,
    Sphere {
        radius: f32,
    },
    Cylinder {
        radius: f32,
        height: f32,
        pose: Transform,
    },
    Ellipsoid {
        radii: Vec3,
        pose: Transform,
    },
}

impl HydrodynamicProxy {
    pub fn is_none(&self) -> bool {
        matches!(self, HydrodynamicProxy::None)
    }

    /// Rotation from proxy-local axes into the CG frame.
    pub fn axes(&self) -> Quat {
        match self {
            HydrodynamicProxy::Cylinder { pose, .. } | HydrodynamicProxy::Ellipsoid { pose, .. } => {
                pose.rotation
            }
            _ => Quat::IDENTITY,
        }
    }

    /// Per-axis pressure-drag scaling in proxy-local axes.
    ///
    /// Summing drag over faces over-predicts the resistance of elongated hulls moving
    /// along their long axis; the scale damps the resolved components accordingly.
    pub fn drag_scale(&self) -> Vec3 {
        match self {
            HydrodynamicProxy::None | HydrodynamicProxy::Sphere { .. } => Vec3::ONE,
            HydrodynamicProxy::Cylinder { .. } => Vec3::new(0.5, 0.5, 1.0),
            HydrodynamicProxy::Ellipsoid { radii, .. } => {
                let inverse = Vec3::ONE / radii.max(Vec3::splat(f32::EPSILON));
                inverse / inverse.max_element()
            }
        }
    }
}

/// Diagonal of the 6×6 added-mass matrix in CG axes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AddedMass {
    /// Added mass along x, y, z (kg).
    pub translational: Vec3,
    /// Added inertia about x, y, z (kg·m²).
    pub rotational: Vec3,
}

impl AddedMass {
    pub const ZERO: Self = Self {
        translational: Vec3::ZERO,
        rotational: Vec3::ZERO,
    };

    pub fn diagonal(&self) -> [f32; 6] {
        [
            self.translational.x,
            self.translational.y,
            self.translational.z,
            self.rotational.x,
            self.rotational.y,
            self.rotational.z,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProxyFit {
    pub proxy: HydrodynamicProxy,
    pub added_mass: AddedMass,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProxyFitError {
    #[error("{kind:?} fit needs at least {required} vertices, got {found}")]
    TooFewVertices {
        kind: ProxyKind,
        required: usize,
        found: usize,
    },
    #[error("quadric fit is degenerate: {0}")]
    DegenerateQuadric(String),
}

/// Fits a proxy of the requested kind to `vertices` (geometry frame).
///
/// `cg_frame` is the pose of the CG frame in the geometry frame (`T_G2CG`).
pub fn fit_proxy(
    kind: ProxyKind,
    vertices: &[Vec3],
    cg_frame: &Transform,
    fluid_density: f32,
) -> Result<ProxyFit, ProxyFitError> {
    let required = kind.min_vertices();
    if vertices.len() < required {
        return Err(ProxyFitError::TooFewVertices {
            kind,
            required,
            found: vertices.len(),
        });
    }

    let to_cg = cg_frame.inverse();
    let points: Vec<DVec3> = vertices
        .iter()
        .map(|v| to_cg.transform_point(*v).as_dvec3())
        .collect();
    let rho = fluid_density as f64;

    match kind {
        ProxyKind::Sphere => Ok(fit_sphere(&points, rho)),
        ProxyKind::Cylinder => Ok(fit_cylinder(&points, rho)),
        ProxyKind::Ellipsoid => fit_ellipsoid(&points, rho),
    }
}

fn fit_sphere(points: &[DVec3], rho: f64) -> ProxyFit {
    let radius = points.iter().map(|p| p.length()).fold(0.0, f64::max);
    let added = 2.0 / 3.0 * PI * rho * radius.powi(3);
    ProxyFit {
        proxy: HydrodynamicProxy::Sphere {
            radius: radius as f32,
        },
        added_mass: AddedMass {
            translational: Vec3::splat(added as f32),
            rotational: Vec3::ZERO,
        },
    }
}

fn fit_cylinder(points: &[DVec3], rho: f64) -> ProxyFit {
    let mut radius_sq = [0.0_f64; 3];
    let mut half_length = [0.0_f64; 3];
    for p in points {
        let coords = p.to_array();
        let length_sq = p.length_squared();
        for axis in 0..3 {
            radius_sq[axis] = radius_sq[axis].max(length_sq - coords[axis] * coords[axis]);
            half_length[axis] = half_length[axis].max(coords[axis].abs());
        }
    }

    let volume = |axis: usize| PI * radius_sq[axis] * 2.0 * half_length[axis];
    let axis = (0..3)
        .min_by(|&a, &b| volume(a).total_cmp(&volume(b)))
        .unwrap_or(2);

    let r2 = radius_sq[axis];
    let r = r2.sqrt();
    let h = half_length[axis];
    let length = 2.0 * h;

    let axial_mass = rho * PI * r2;
    let radial_mass = 2.0 * rho * PI * r2 * h;
    let radial_inertia = PI * rho * length * r2 * (3.0 * r2 + length * length) / 12.0;

    let mut translational = Vec3::splat(radial_mass as f32);
    let mut rotational = Vec3::splat(radial_inertia as f32);
    translational[axis] = axial_mass as f32;
    rotational[axis] = 0.0;

    let direction = Vec3::AXES[axis];
    ProxyFit {
        proxy: HydrodynamicProxy::Cylinder {
            radius: r as f32,
            height: length as f32,
            pose: Transform::from_rotation(Quat::from_rotation_arc(Vec3::Z, direction)),
        },
        added_mass: AddedMass {
            translational,
            rotational,
        },
    }
}

fn fit_ellipsoid(points: &[DVec3], rho: f64) -> Result<ProxyFit, ProxyFitError> {
    // a x² + b y² + c z² + 2d x + 2e y + 2f z = 1
    let mut design = DMatrix::<f64>::zeros(points.len(), 6);
    for (row, p) in points.iter().enumerate() {
        design[(row, 0)] = p.x * p.x;
        design[(row, 1)] = p.y * p.y;
        design[(row, 2)] = p.z * p.z;
        design[(row, 3)] = 2.0 * p.x;
        design[(row, 4)] = 2.0 * p.y;
        design[(row, 5)] = 2.0 * p.z;
    }
    let rhs = DVector::<f64>::from_element(points.len(), 1.0);
    let coefficients = design
        .svd(true, true)
        .solve(&rhs, 1e-12)
        .map_err(|err| ProxyFitError::DegenerateQuadric(err.to_string()))?;

    let (a, b, c) = (coefficients[0], coefficients[1], coefficients[2]);
    let (d, e, f) = (coefficients[3], coefficients[4], coefficients[5]);
    #[rustfmt::skip]
    let quadric = Matrix4::new(
        a,   0.0, 0.0, d,
        0.0, b,   0.0, e,
        0.0, 0.0, c,   f,
        d,   e,   f,   -1.0,
    );

    let block: Matrix3<f64> = quadric.fixed_view::<3, 3>(0, 0).into_owned();
    let center = block
        .lu()
        .solve(&Vector3::new(-d, -e, -f))
        .ok_or_else(|| ProxyFitError::DegenerateQuadric("singular quadric block".into()))?;

    let mut translation = Matrix4::<f64>::identity();
    translation[(3, 0)] = center.x;
    translation[(3, 1)] = center.y;
    translation[(3, 2)] = center.z;
    let centred = translation * quadric * translation.transpose();

    let scale = -centred[(3, 3)];
    if !scale.is_finite() || scale.abs() < f64::EPSILON {
        return Err(ProxyFitError::DegenerateQuadric(
            "quadric does not enclose a volume".into(),
        ));
    }
    let shape: Matrix3<f64> = centred.fixed_view::<3, 3>(0, 0).into_owned() / scale;

    let eigen = SymmetricEigen::try_new(shape, 1e-12, 0).ok_or_else(|| {
        ProxyFitError::DegenerateQuadric("eigen-decomposition did not converge".into())
    })?;
    if eigen.eigenvalues.iter().any(|&lambda| !(lambda > 0.0)) {
        return Err(ProxyFitError::DegenerateQuadric(format!(
            "quadric is not positive definite (eigenvalues {:?})",
            eigen.eigenvalues.as_slice()
        )));
    }

    // Order eigenpairs by the CG axis they align with so local axis i is CG axis i.
    let mut radii = DVec3::ZERO;
    let mut axes = [Vec3::X, Vec3::Y, Vec3::Z];
    let mut assigned = [false; 3];
    for k in 0..3 {
        let vector = eigen.eigenvectors.column(k);
        let dominant = (0..3)
            .filter(|i| !assigned[*i])
            .max_by(|&i, &j| vector[i].abs().total_cmp(&vector[j].abs()))
            .unwrap_or(k);
        assigned[dominant] = true;
        let sign = if vector[dominant] < 0.0 { -1.0 } else { 1.0 };
        axes[dominant] = Vec3::new(
            (vector[0] * sign) as f32,
            (vector[1] * sign) as f32,
            (vector[2] * sign) as f32,
        );
        radii[dominant] = 1.0 / eigen.eigenvalues[k].sqrt();
    }

    let added_mass = ellipsoid_added_mass(radii, rho);
    let pose = Transform::from_position_rotation(
        Vec3::new(center.x as f32, center.y as f32, center.z as f32),
        rotation_from_axes(axes[0], axes[1], axes[2]),
    );

    Ok(ProxyFit {
        proxy: HydrodynamicProxy::Ellipsoid {
            radii: radii.as_vec3(),
            pose,
        },
        added_mass,
    })
}

fn ellipsoid_added_mass(radii: DVec3, rho: f64) -> AddedMass {
    let r = radii.to_array();
    let long = (0..3).max_by(|&i, &j| r[i].total_cmp(&r[j])).unwrap_or(0);
    let (j, k) = ((long + 1) % 3, (long + 2) % 3);
    let a = r[long];

    let displaced = rho * 4.0 / 3.0 * PI * r[0] * r[1] * r[2];
    let mean_minor = (r[j] * r[k]).sqrt();

    let mut translational = [0.0_f64; 3];
    let mut rotational = [0.0_f64; 3];
    translational[long] = lamb_k_factor(a, mean_minor) * displaced;
    translational[j] = 4.0 / 3.0 * rho * PI * a * r[k] * r[k];
    translational[k] = 4.0 / 3.0 * rho * PI * a * r[j] * r[j];
    rotational[j] = 4.0 / 15.0 * rho * PI * a.powi(3) * r[j] * r[j];
    rotational[k] = 4.0 / 15.0 * rho * PI * a.powi(3) * r[k] * r[k];

    AddedMass {
        translational: DVec3::from_array(translational).as_vec3(),
        rotational: DVec3::from_array(rotational).as_vec3(),
    }
}

/// Lamb's k-factor for axial motion of a prolate spheroid with semi-axes `a ≥ b`.
///
/// Tends to 1/2 for a sphere and to 0 for a needle.
pub fn lamb_k_factor(a: f64, b: f64) -> f64 {
    if a <= 0.0 || b >= a {
        return 0.5;
    }
    let e = (1.0 - (b / a).powi(2)).sqrt();
    if e < 1e-4 {
        return 0.5;
    }
    let alpha0 = 2.0 * (1.0 - e * e) / (e * e * e) * (0.5 * ((1.0 + e) / (1.0 - e)).ln() - e);
    alpha0 / (2.0 - alpha0)
}
