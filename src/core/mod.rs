//! Core types describing solids, their hulls, and the materials they are made of.

pub mod material;
pub mod mesh;
pub mod rigidbody;
pub mod solid;
pub mod types;

pub use material::{FrictionPair, Material, MaterialId, MaterialTable};
pub use mesh::{Aabb, MeshBuilder, MeshMassProperties, TriangleMesh};
pub use rigidbody::RigidBody;
pub use solid::{HasMaterial, HasMesh, HasProxy, MotionEstimate, SolidEntity};
pub use types::{Transform, Velocity};
