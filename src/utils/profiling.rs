use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Phases of one fixed simulation tick, in the order they must run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickPhase {
    ClearForces,
    Actuators,
    JointDamping,
    Gravity,
    SystemEntities,
    FluidForces,
    Integration,
    Accelerations,
    Sensors,
    Controllers,
    SystemFeedback,
}

impl TickPhase {
    pub fn label(self) -> &'static str {
        match self {
            TickPhase::ClearForces => "tick::clear_forces",
            TickPhase::Actuators => "tick::actuators",
            TickPhase::JointDamping => "tick::joint_damping",
            TickPhase::Gravity => "tick::gravity",
            TickPhase::SystemEntities => "tick::system_entities",
            TickPhase::FluidForces => "tick::fluid_forces",
            TickPhase::Integration => "tick::integration",
            TickPhase::Accelerations => "tick::accelerations",
            TickPhase::Sensors => "tick::sensors",
            TickPhase::Controllers => "tick::controllers",
            TickPhase::SystemFeedback => "tick::system_feedback",
        }
    }
}

impl fmt::Display for TickPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Timing of every phase executed during the most recent tick.
#[derive(Debug, Default, Clone)]
pub struct TickProfile {
    pub phases: Vec<(TickPhase, Duration)>,
    pub fluid_pairs: usize,
    pub solver_fallbacks: u32,
}

impl TickProfile {
    pub fn reset(&mut self) {
        self.phases.clear();
        self.fluid_pairs = 0;
        self.solver_fallbacks = 0;
    }

    pub fn record(&mut self, phase: TickPhase, duration: Duration) {
        self.phases.push((phase, duration));
    }

    /// Phases in execution order, without timings.
    pub fn order(&self) -> Vec<TickPhase> {
        self.phases.iter().map(|(phase, _)| *phase).collect()
    }

    pub fn total(&self) -> Duration {
        self.phases.iter().map(|(_, duration)| *duration).sum()
    }

    pub fn report(&self) {
        let total_us = self.total().as_micros() as f32;
        if total_us < 1.0 {
            return;
        }

        log::debug!(
            "tick {:.3} ms, fluid pairs {}, solver fallbacks {}",
            total_us / 1000.0,
            self.fluid_pairs,
            self.solver_fallbacks
        );
        for (phase, duration) in &self.phases {
            log::debug!(
                "  {:<24} {:.3} ms ({:.1}%)",
                phase.label(),
                duration.as_secs_f32() * 1000.0,
                (duration.as_micros() as f32 / total_us) * 100.0
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_keeps_phase_order() {
        let mut profile = TickProfile::default();
        profile.record(TickPhase::Actuators, Duration::from_micros(3));
        profile.record(TickPhase::Integration, Duration::from_micros(7));

        assert_eq!(
            profile.order(),
            vec![TickPhase::Actuators, TickPhase::Integration]
        );
        assert_eq!(profile.total(), Duration::from_micros(10));

        profile.reset();
        assert!(profile.phases.is_empty());
    }
}
