use std::time::Duration;

use log::{debug, info, warn};

use crate::config::SimulationSettings;
use crate::error::{SimulationError, SimulationResult};
use crate::utils::logging::{warn_if_step_budget_exceeded, ScopedTimer};
use crate::utils::profiling::{TickPhase, TickProfile};

use super::collaborators::{Actuator, Cable, Controller, Joint, Multibody, Sensor, SystemEntity};
use super::context::SimulationContext;
use super::stats::SimulationMode;

/// Drives the fixed-step simulation loop over a [`SimulationContext`].
pub struct SimulationManager {
    pub(super) context: SimulationContext,
    pub(super) actuators: Vec<Box<dyn Actuator>>,
    pub(super) joints: Vec<Box<dyn Joint>>,
    pub(super) multibodies: Vec<Box<dyn Multibody>>,
    pub(super) cables: Vec<Box<dyn Cable>>,
    pub(super) sensors: Vec<Box<dyn Sensor>>,
    pub(super) controllers: Vec<Box<dyn Controller>>,
    pub(super) systems: Vec<Box<dyn SystemEntity>>,
    pub(super) mode: SimulationMode,
    accumulator: f64,
    profile: TickProfile,
}

impl SimulationManager {
    pub fn new(context: SimulationContext) -> Self {
        Self {
            context,
            actuators: Vec::new(),
            joints: Vec::new(),
            multibodies: Vec::new(),
            cables: Vec::new(),
            sensors: Vec::new(),
            controllers: Vec::new(),
            systems: Vec::new(),
            mode: SimulationMode::Idle,
            accumulator: 0.0,
            profile: TickProfile::default(),
        }
    }

    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut SimulationContext {
        &mut self.context
    }

    pub fn mode(&self) -> SimulationMode {
        self.mode
    }

    pub fn add_actuator<A: Actuator + 'static>(&mut self, actuator: A) {
        self.actuators.push(Box::new(actuator));
    }

    pub fn add_joint<J: Joint + 'static>(&mut self, joint: J) {
        self.joints.push(Box::new(joint));
    }

    pub fn add_multibody<M: Multibody + 'static>(&mut self, multibody: M) {
        self.multibodies.push(Box::new(multibody));
    }

    pub fn add_cable<C: Cable + 'static>(&mut self, cable: C) {
        self.cables.push(Box::new(cable));
    }

    pub fn add_sensor<S: Sensor + 'static>(&mut self, sensor: S) {
        self.sensors.push(Box::new(sensor));
    }

    pub fn add_controller<C: Controller + 'static>(&mut self, controller: C) {
        self.controllers.push(Box::new(controller));
    }

    pub fn add_system_entity<S: SystemEntity + 'static>(&mut self, system: S) {
        self.systems.push(Box::new(system));
    }

    /// Prepares the engine, settles initial conditions if enabled, and starts running.
    ///
    /// A failed settling run leaves the simulation in [`SimulationMode::Failed`].
    pub fn start(&mut self) -> SimulationResult<()> {
        let settings = self.context.settings_snapshot();
        settings.validate()?;

        let materials = self.context.materials().clone();
        let engine = self.context.engine_mut();
        engine.set_material_table(&materials);
        engine.set_solver_iterations(settings.solver_iterations);

        if settings.ic.enabled {
            self.set_mode(SimulationMode::SolvingIc);
            match self.solve_initial_conditions() {
                Ok(report) => info!(
                    "Initial conditions settled after {} iterations ({:?})",
                    report.iterations, report.elapsed
                ),
                Err(err) => {
                    warn!("Initial-condition solver failed: {err}");
                    self.set_mode(SimulationMode::Failed);
                    return Err(err);
                }
            }
        }

        self.context.engine_mut().synchronize_motion_states();
        self.context.reset_motion_filters();
        self.accumulator = 0.0;
        self.set_mode(SimulationMode::Running);
        info!("Simulation running at {} Hz", settings.steps_per_second);
        Ok(())
    }

    /// Runs exactly one fixed tick.
    pub fn step(&mut self) -> SimulationResult<()> {
        self.ensure_running()?;
        let settings = self.context.settings_snapshot();
        settings.validate()?;
        self.tick(&settings);
        Ok(())
    }

    /// Feeds wall-clock time into the fixed-step accumulator and runs the ticks that are due.
    ///
    /// Returns the number of ticks run.
    pub fn advance(&mut self, wall_elapsed: Duration) -> SimulationResult<u32> {
        self.advance_limited(wall_elapsed, u64::MAX)
    }

    /// Advances by `sim_duration` of simulated time, sleeping between ticks to hold the
    /// configured real-time factor.
    pub fn run_for(&mut self, sim_duration: Duration) -> SimulationResult<u64> {
        self.ensure_running()?;
        let dt = self.context.settings_snapshot().time_step() as f64;
        let target = (sim_duration.as_secs_f64() / dt).round() as u64;

        let mut ticks = 0;
        let mut last = std::time::Instant::now();
        while ticks < target {
            let now = std::time::Instant::now();
            ticks += self.advance_limited(now - last, target - ticks)? as u64;
            last = now;
            if ticks < target {
                let settings = self.context.settings_snapshot();
                let wait = (settings.time_step() as f64 - self.accumulator).max(0.0)
                    / settings.clamped_real_time_factor() as f64;
                std::thread::sleep(Duration::from_secs_f64(wait));
            }
        }
        Ok(ticks)
    }

    fn advance_limited(&mut self, wall_elapsed: Duration, limit: u64) -> SimulationResult<u32> {
        self.ensure_running()?;
        let settings = self.context.settings_snapshot();
        settings.validate()?;
        let dt = settings.time_step() as f64;
        let rtf = settings.clamped_real_time_factor();

        self.accumulator += wall_elapsed.as_secs_f64() * rtf as f64;
        let budget = (settings.max_substeps.max(1) as u64).min(limit);
        let mut ticks = 0;
        while self.accumulator >= dt && (ticks as u64) < budget {
            self.tick(&settings);
            self.accumulator -= dt;
            ticks += 1;
        }
        if ticks as u64 == settings.max_substeps as u64 && self.accumulator >= dt {
            debug!(
                "Dropping {:.3} ms of backlog after {ticks} substeps",
                self.accumulator * 1000.0
            );
            self.accumulator %= dt;
        }

        self.context.publish(|stats| stats.real_time_factor = rtf);
        Ok(ticks)
    }

    fn tick(&mut self, settings: &SimulationSettings) {
        let dt = settings.time_step();
        self.profile.reset();
        self.context
            .engine_mut()
            .set_solver_iterations(settings.solver_iterations);

        self.pre_tick(dt, settings);
        self.integrate(dt);
        self.post_tick(dt);

        self.profile.report();
        warn_if_step_budget_exceeded(
            self.profile.total(),
            Duration::from_secs_f32(dt / settings.clamped_real_time_factor()),
        );
        let profile = self.profile.clone();
        self.context.publish(|stats| {
            stats.simulation_time += dt as f64;
            stats.step_count += 1;
            stats.solver_fallbacks += profile.solver_fallbacks as u64;
            stats.last_tick = profile;
        });
    }

    fn pre_tick(&mut self, dt: f32, settings: &SimulationSettings) {
        let timer = ScopedTimer::new(TickPhase::ClearForces.label());
        self.context.engine_mut().clear_forces();
        self.profile.record(TickPhase::ClearForces, timer.elapsed());

        let timer = ScopedTimer::new(TickPhase::Actuators.label());
        for actuator in &mut self.actuators {
            actuator.update(dt, self.context.engine_mut());
        }
        self.profile.record(TickPhase::Actuators, timer.elapsed());

        let timer = ScopedTimer::new(TickPhase::JointDamping.label());
        for joint in &mut self.joints {
            joint.apply_damping(self.context.engine_mut());
        }
        for multibody in &mut self.multibodies {
            multibody.apply_damping(self.context.engine_mut());
        }
        self.profile.record(TickPhase::JointDamping, timer.elapsed());

        let timer = ScopedTimer::new(TickPhase::Gravity.label());
        let gravity = settings.gravity;
        self.context.apply_solid_gravity(gravity);
        for multibody in &mut self.multibodies {
            multibody.apply_gravity(gravity, self.context.engine_mut());
        }
        for cable in &mut self.cables {
            cable.apply_gravity(gravity, self.context.engine_mut());
        }
        self.profile.record(TickPhase::Gravity, timer.elapsed());

        let timer = ScopedTimer::new(TickPhase::SystemEntities.label());
        for system in &mut self.systems {
            let engine = self.context.engine_mut();
            system.update_actuators(dt, engine);
            system.apply_gravity(gravity, engine);
            system.apply_damping(engine);
        }
        self.profile.record(TickPhase::SystemEntities, timer.elapsed());

        let timer = ScopedTimer::new(TickPhase::FluidForces.label());
        self.context.sync_fluid_gravity(gravity);
        self.profile.fluid_pairs = self.context.apply_fluid_forces(&settings.fluid_dynamics);
        self.profile.record(TickPhase::FluidForces, timer.elapsed());
    }

    fn integrate(&mut self, dt: f32) {
        let timer = ScopedTimer::new(TickPhase::Integration.label());
        let report = self.context.engine_mut().step(dt);
        if report.solver_fallbacks > 0 {
            warn!(
                "Solver fell back on {} constraints this step",
                report.solver_fallbacks
            );
        }
        self.profile.solver_fallbacks = report.solver_fallbacks;
        self.profile.record(TickPhase::Integration, timer.elapsed());
    }

    fn post_tick(&mut self, dt: f32) {
        let timer = ScopedTimer::new(TickPhase::Accelerations.label());
        self.context.update_accelerations(dt);
        self.profile.record(TickPhase::Accelerations, timer.elapsed());

        let timer = ScopedTimer::new(TickPhase::Sensors.label());
        for sensor in &mut self.sensors {
            sensor.update(dt, &self.context);
        }
        self.profile.record(TickPhase::Sensors, timer.elapsed());

        let timer = ScopedTimer::new(TickPhase::Controllers.label());
        for controller in &mut self.controllers {
            controller.update(dt);
        }
        self.profile.record(TickPhase::Controllers, timer.elapsed());

        let timer = ScopedTimer::new(TickPhase::SystemFeedback.label());
        for system in &mut self.systems {
            system.update_sensors(dt, &self.context);
            system.update_controllers(dt);
        }
        self.profile.record(TickPhase::SystemFeedback, timer.elapsed());
    }

    fn ensure_running(&self) -> SimulationResult<()> {
        if self.mode == SimulationMode::Running {
            Ok(())
        } else {
            Err(SimulationError::NotReady)
        }
    }

    pub(super) fn set_mode(&mut self, mode: SimulationMode) {
        self.mode = mode;
        self.context.publish(|stats| stats.mode = mode);
    }
}
