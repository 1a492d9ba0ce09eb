//! Rigid-body dynamics: the engine capability, contact friction, and a small reference
//! engine with semi-implicit integration and plane contacts.

pub mod contact;
pub mod engine;
pub mod friction;
pub mod integrator;
pub mod rigid_world;

pub use contact::{Contact, StaticPlane};
pub use engine::{DynamicsEngine, RigidBodyDesc, StepReport};
pub use friction::{ContactBody, ContactCoefficients, ContactFrictionModel};
pub use integrator::Integrator;
pub use rigid_world::RigidWorld;
