use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::profiling::TickProfile;

/// Lifecycle of a simulation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationMode {
    #[default]
    Idle,
    SolvingIc,
    Running,
    Failed,
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SimulationMode::Idle => "idle",
            SimulationMode::SolvingIc => "solving initial conditions",
            SimulationMode::Running => "running",
            SimulationMode::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Counters published after every tick, readable from other threads.
#[derive(Debug, Default, Clone)]
pub struct SimulationStats {
    pub mode: SimulationMode,
    /// Simulated seconds since `start`.
    pub simulation_time: f64,
    pub step_count: u64,
    /// Real-time factor applied by the last `advance`.
    pub real_time_factor: f32,
    pub solver_fallbacks: u64,
    pub ic_iterations: u64,
    pub last_tick: TickProfile,
}
