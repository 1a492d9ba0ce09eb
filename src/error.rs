use std::time::Duration;

use thiserror::Error;

use crate::utils::allocator::BodyHandle;

/// Errors surfaced by the simulation orchestrator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("initial conditions did not settle within {iterations} iterations ({elapsed:?})")]
    IcNotConverged { iterations: u64, elapsed: Duration },
    #[error("initial-condition solver timed out after {iterations} iterations ({elapsed:?})")]
    IcTimedOut { iterations: u64, elapsed: Duration },
    #[error("invalid time step {0}")]
    InvalidTimeStep(f32),
    #[error("invalid real-time factor {0}")]
    InvalidRealTimeFactor(f32),
    #[error("simulation has not been started")]
    NotReady,
    #[error("body {0} is not registered with the dynamics engine")]
    UnknownBody(BodyHandle),
}

pub type SimulationResult<T> = Result<T, SimulationError>;
