//! Additional math helpers layered on top of `glam`, plus the bridges into `nalgebra`
//! used wherever dense decompositions are needed.

use glam::{DMat3, Mat3, Quat, Vec3};
use nalgebra::Matrix3;

/// Converts angular velocity vector (radians/sec) into a quaternion delta.
pub fn angular_velocity_to_quat(angular: Vec3, dt: f32) -> Quat {
    let angle = angular.length() * dt;
    if angle.abs() < 1e-9 {
        return Quat::IDENTITY;
    }
    let axis = angular.normalize();
    Quat::from_axis_angle(axis, angle)
}

/// Principal moments of a solid box of the given half extents.
pub fn inertia_box(half_extents: Vec3, mass: f32) -> Vec3 {
    let size = half_extents * 2.0;
    let factor = mass / 12.0;
    Vec3::new(
        factor * (size.y * size.y + size.z * size.z),
        factor * (size.x * size.x + size.z * size.z),
        factor * (size.x * size.x + size.y * size.y),
    )
}

/// Builds a rotation whose columns are the given (orthonormal) axes.
///
/// A reflected basis is flipped on its last axis so the result is always a proper rotation.
pub fn rotation_from_axes(x: Vec3, y: Vec3, z: Vec3) -> Quat {
    let mut basis = Mat3::from_cols(x, y, z);
    if basis.determinant() < 0.0 {
        basis = Mat3::from_cols(x, y, -z);
    }
    Quat::from_mat3(&basis).normalize()
}

pub fn mat_to_na(m: &DMat3) -> Matrix3<f64> {
    let cols = m.to_cols_array_2d();
    Matrix3::new(
        cols[0][0], cols[1][0], cols[2][0], //
        cols[0][1], cols[1][1], cols[2][1], //
        cols[0][2], cols[1][2], cols[2][2],
    )
}
