//! The fixed-step tick: who runs when, real-time pacing, and initial-condition settling.

pub mod collaborators;
pub mod context;
pub mod ic;
pub mod manager;
pub mod stats;

pub use collaborators::{Actuator, Cable, Controller, Joint, Multibody, Sensor, SystemEntity};
pub use context::SimulationContext;
pub use ic::IcReport;
pub use manager::SimulationManager;
pub use stats::{SimulationMode, SimulationStats};
