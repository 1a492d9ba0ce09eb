//! Hydrostatics and hydrodynamics of rigid hulls: immersion classification, surface
//! clipping, force integration, and proxy shapes for added mass.

pub mod classifier;
pub mod clipping;
pub mod forces;
pub mod proxy;

pub use classifier::{classify, Immersion};
pub use clipping::{clip_triangle_above, clip_triangle_below, ClippedTriangle, Face};
pub use forces::{compute_all, compute_fluid_forces, BodyState, FluidJob, ForceAccumulator, Wrench};
pub use proxy::{
    fit_proxy, lamb_k_factor, AddedMass, HydrodynamicProxy, ProxyFit, ProxyFitError, ProxyKind,
};
