//! Engine-wide constants and the runtime-adjustable simulation settings.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// Default gravity vector (Y-up).
pub const DEFAULT_GRAVITY: [f32; 3] = [0.0, -9.81, 0.0];

/// Default fixed step rate of the simulation (Hz).
pub const DEFAULT_STEPS_PER_SECOND: f32 = 1000.0;

/// Sequential-impulse iterations per engine step.
pub const DEFAULT_SOLVER_ITERATIONS: u32 = 20;

/// Upper bound on ticks run by one `advance` call.
pub const DEFAULT_MAX_SUBSTEPS: u32 = 16;

/// Velocity damping applied by the reference engine's integrator (1/s).
pub const DEFAULT_LINEAR_DAMPING: f32 = 0.02;
pub const DEFAULT_ANGULAR_DAMPING: f32 = 0.02;

/// Boundary-layer thickness dividing skin friction (m).
pub const SKIN_BOUNDARY_LAYER: f32 = 1e-4;

/// Sharpness σ of the static-to-dynamic friction transition (s²/m²).
pub const STRIBECK_SHARPNESS: f32 = 100.0;

/// Scale of the spin-damping torque at contacts.
pub const SPIN_DAMPING_FACTOR: f32 = 0.002;

/// Weight of the newest sample in the velocity low-pass filter.
pub const ACCELERATION_FILTER_ALPHA: f32 = 0.5;

/// Bounds applied to the requested real-time factor.
pub const MIN_REAL_TIME_FACTOR: f32 = 0.05;
pub const MAX_REAL_TIME_FACTOR: f32 = 1.0;

/// Approach speed below which contacts do not bounce (m/s).
pub const BOUNCE_THRESHOLD: f32 = 0.2;

/// Penetration left uncorrected to keep resting contacts alive (m).
pub const PENETRATION_SLOP: f32 = 1e-3;

/// Relative off-diagonal magnitude below which an inertia tensor counts as diagonal.
pub const PRINCIPAL_AXIS_TOLERANCE: f64 = 1e-9;

/// Factor applied to the IC tolerances when checking for rest.
pub const IC_REST_TOLERANCE_SCALE: f32 = 100.0;

/// Which fluid effects are evaluated each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidDynamicsSettings {
    pub buoyancy: bool,
    pub damping: bool,
}

impl Default for FluidDynamicsSettings {
    fn default() -> Self {
        Self {
            buoyancy: true,
            damping: true,
        }
    }
}

/// Settling run performed before the first tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcSettings {
    pub enabled: bool,
    /// Let bodies fall under gravity while settling.
    pub gravity: bool,
    pub time_step: f32,
    pub max_iterations: u64,
    /// Wall-clock limit in seconds.
    pub max_time: f64,
    pub linear_tolerance: f32,
    pub angular_tolerance: f32,
    pub joint_velocity_tolerance: f32,
    /// Simulated time before the rest check starts (s).
    pub warmup_time: f32,
}

impl Default for IcSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            gravity: true,
            time_step: 0.001,
            max_iterations: 100_000,
            max_time: 1000.0,
            linear_tolerance: 1e-6,
            angular_tolerance: 1e-6,
            joint_velocity_tolerance: 1e-6,
            warmup_time: 0.1,
        }
    }
}

/// Settings shared with other threads and read once per step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub steps_per_second: f32,
    /// Requested ratio of simulated to wall-clock time.
    pub real_time_factor: f32,
    pub max_substeps: u32,
    pub solver_iterations: u32,
    /// Applied to solids each tick and copied into every fluid before its loads are computed.
    pub gravity: Vec3,
    pub fluid_dynamics: FluidDynamicsSettings,
    pub ic: IcSettings,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            steps_per_second: DEFAULT_STEPS_PER_SECOND,
            real_time_factor: 1.0,
            max_substeps: DEFAULT_MAX_SUBSTEPS,
            solver_iterations: DEFAULT_SOLVER_ITERATIONS,
            gravity: Vec3::from_array(DEFAULT_GRAVITY),
            fluid_dynamics: FluidDynamicsSettings::default(),
            ic: IcSettings::default(),
        }
    }
}

impl SimulationSettings {
    pub fn time_step(&self) -> f32 {
        1.0 / self.steps_per_second
    }

    /// Real-time factor limited to the supported range.
    /// Requested real-time factor bounded to the supported range; NaN reads as full speed.
    pub fn clamped_real_time_factor(&self) -> f32 {
        if self.real_time_factor.is_nan() {
            return MAX_REAL_TIME_FACTOR;
        }
        self.real_time_factor
            .clamp(MIN_REAL_TIME_FACTOR, MAX_REAL_TIME_FACTOR)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        let dt = self.time_step();
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimulationError::InvalidTimeStep(dt));
        }
        if self.ic.enabled && (!self.ic.time_step.is_finite() || self.ic.time_step <= 0.0) {
            return Err(SimulationError::InvalidTimeStep(self.ic.time_step));
        }
        if !self.real_time_factor.is_finite() {
            return Err(SimulationError::InvalidRealTimeFactor(self.real_time_factor));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_time_factor_is_clamped() {
        let mut settings = SimulationSettings {
            real_time_factor: 4.0,
            ..SimulationSettings::default()
        };
        assert_eq!(settings.clamped_real_time_factor(), 1.0);
        settings.real_time_factor = 0.0;
        assert_eq!(settings.clamped_real_time_factor(), 0.05);
    }

    #[test]
    fn zero_rate_is_rejected() {
        let settings = SimulationSettings {
            steps_per_second: 0.0,
            ..SimulationSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SimulationError::InvalidTimeStep(_))
        ));
        assert!(SimulationSettings::default().validate().is_ok());
    }

    #[test]
    fn non_finite_real_time_factor_is_rejected() {
        let mut settings = SimulationSettings {
            real_time_factor: f32::NAN,
            ..SimulationSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SimulationError::InvalidRealTimeFactor(_))
        ));
        assert_eq!(settings.clamped_real_time_factor(), 1.0);

        settings.real_time_factor = f32::INFINITY;
        assert!(settings.validate().is_err());
    }
}
