//! hydrosim – physics core for simulating marine robots.
//!
//! Rigid hulls built from triangle meshes float, sink and drag through fluid volumes.
//! Every fixed tick gathers actuator, gravity and fluid loads, hands them to a rigid-body
//! engine, and feeds the result back to sensors and controllers.

pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod fluid;
pub mod hydrodynamics;
pub mod simulation;
pub mod utils;

pub use glam::{Mat3, Quat, Vec3};

pub use config::{FluidDynamicsSettings, IcSettings, SimulationSettings};
pub use core::{
    Aabb, FrictionPair, HasMaterial, HasMesh, HasProxy, Material, MaterialId, MaterialTable,
    MeshBuilder, MeshMassProperties, MotionEstimate, SolidEntity, Transform, TriangleMesh,
    Velocity,
};
pub use dynamics::{
    ContactBody, ContactCoefficients, ContactFrictionModel, DynamicsEngine, RigidBodyDesc,
    RigidWorld, StaticPlane, StepReport,
};
pub use error::{SimulationError, SimulationResult};
pub use fluid::{FluidField, FluidProperties, Ocean, Pool};
pub use hydrodynamics::{
    classify, clip_triangle_above, clip_triangle_below, compute_fluid_forces, fit_proxy,
    AddedMass, BodyState, ClippedTriangle, Face, ForceAccumulator, HydrodynamicProxy, Immersion,
    ProxyFitError, ProxyKind, Wrench,
};
pub use simulation::{
    Actuator, Cable, Controller, IcReport, Joint, Multibody, Sensor, SimulationContext,
    SimulationManager, SimulationMode, SimulationStats, SystemEntity,
};
pub use utils::allocator::{Arena, BodyHandle};
pub use utils::math::inertia_box;
pub use utils::profiling::{TickPhase, TickProfile};
