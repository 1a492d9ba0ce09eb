//! Settling of initial conditions: step the world until everything is at rest.

use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::config::{IcSettings, IC_REST_TOLERANCE_SCALE};
use crate::error::{SimulationError, SimulationResult};
use crate::utils::logging::ScopedTimer;

use super::manager::SimulationManager;

/// Outcome of a successful settling run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IcReport {
    pub iterations: u64,
    pub elapsed: Duration,
}

impl SimulationManager {
    /// Steps the engine with gravity only until bodies and joints are at rest.
    ///
    /// Busy-steps without yielding. Fails with `IcNotConverged` once `max_iterations`
    /// steps ran, or `IcTimedOut` once `max_time` wall-clock seconds passed.
    pub fn solve_initial_conditions(&mut self) -> SimulationResult<IcReport> {
        let _timer = ScopedTimer::new("simulation::initial_conditions");
        let settings = self.context.settings_snapshot();
        let ic = settings.ic;
        if !ic.time_step.is_finite() || ic.time_step <= 0.0 {
            return Err(SimulationError::InvalidTimeStep(ic.time_step));
        }

        let warmup_iterations = (ic.warmup_time.max(0.0) / ic.time_step).round() as u64;
        let started = Instant::now();
        let mut iterations = 0;

        loop {
            let elapsed = started.elapsed();
            if iterations >= ic.max_iterations {
                self.publish_ic_iterations(iterations);
                return Err(SimulationError::IcNotConverged {
                    iterations,
                    elapsed,
                });
            }
            if elapsed.as_secs_f64() > ic.max_time {
                self.publish_ic_iterations(iterations);
                return Err(SimulationError::IcTimedOut {
                    iterations,
                    elapsed,
                });
            }

            self.context.engine_mut().clear_forces();
            if ic.gravity {
                self.context.apply_solid_gravity(settings.gravity);
                for multibody in &mut self.multibodies {
                    multibody.apply_gravity(settings.gravity, self.context.engine_mut());
                }
            }
            self.context.engine_mut().step(ic.time_step);
            iterations += 1;

            if iterations >= warmup_iterations && self.at_rest(&ic) {
                let elapsed = started.elapsed();
                debug!("Initial conditions converged in {iterations} iterations");
                self.publish_ic_iterations(iterations);
                return Ok(IcReport {
                    iterations,
                    elapsed,
                });
            }
        }
    }

    fn at_rest(&mut self, ic: &IcSettings) -> bool {
        let linear_limit = ic.linear_tolerance * IC_REST_TOLERANCE_SCALE;
        let angular_limit = ic.angular_tolerance * IC_REST_TOLERANCE_SCALE;
        let joint_limit = ic.joint_velocity_tolerance * IC_REST_TOLERANCE_SCALE;

        let engine = self.context.engine();
        for solid in self.context.solids() {
            let Some(velocity) = solid.handle().and_then(|h| engine.velocity(h)) else {
                continue;
            };
            if velocity.linear.length() >= linear_limit
                || velocity.angular.length() >= angular_limit
            {
                trace!(
                    "IC: '{}' still moving ({:.3e} m/s, {:.3e} rad/s)",
                    solid.name,
                    velocity.linear.length(),
                    velocity.angular.length()
                );
                return false;
            }
        }

        if self
            .joints
            .iter()
            .any(|joint| joint.velocity(engine).abs() >= joint_limit)
        {
            return false;
        }
        if !self
            .multibodies
            .iter()
            .all(|multibody| multibody.joints_at_rest(engine, joint_limit))
        {
            return false;
        }

        let engine = self.context.engine_mut();
        let mut solved = true;
        for joint in &mut self.joints {
            solved &= joint.solve_position_ic(engine, ic.linear_tolerance);
        }
        for multibody in &mut self.multibodies {
            solved &= multibody.solve_position_ic(engine, ic.linear_tolerance);
        }
        solved
    }

    fn publish_ic_iterations(&self, iterations: u64) {
        self.context.publish(|stats| stats.ic_iterations = iterations);
    }
}
